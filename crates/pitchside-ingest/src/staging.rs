//! CSV readers for the staging tables. Rows are taken as-is; every cell stays
//! text and empty cells become `None`.

use std::io::Read;

use pitchside_core::{competition::CompetitionStaging, player::PlayerStaging};
use serde::de::DeserializeOwned;

use crate::error::Result;

fn read_rows<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
  let mut rdr = csv::ReaderBuilder::new()
    .trim(csv::Trim::Headers)
    .flexible(true)
    .from_reader(reader);
  let mut rows = Vec::new();
  for row in rdr.deserialize() {
    rows.push(row?);
  }
  Ok(rows)
}

pub fn read_players<R: Read>(reader: R) -> Result<Vec<PlayerStaging>> { read_rows(reader) }

pub fn read_competitions<R: Read>(reader: R) -> Result<Vec<CompetitionStaging>> {
  read_rows(reader)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn camel_case_headers_and_empty_cells() {
    let data = "\
id,birthDate,firstName,lastName,nickname,height,positionGroupType
9,1990-01-02,Ana,Silva,,171.5,CM
9,,,,Ace,,
";
    let rows = read_players(data.as_bytes()).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].birth_date.as_deref(), Some("1990-01-02"));
    assert_eq!(rows[0].nickname, None);
    assert_eq!(rows[0].height.as_deref(), Some("171.5"));
    assert_eq!(rows[1].nickname.as_deref(), Some("Ace"));
    assert_eq!(rows[1].first_name, None);
  }

  #[test]
  fn snake_case_headers_and_missing_columns() {
    let data = "id,first_name,position_group_type\n4,Bo,FW\n";
    let rows = read_players(data.as_bytes()).unwrap();
    assert_eq!(rows[0].first_name.as_deref(), Some("Bo"));
    assert_eq!(rows[0].position_group_type.as_deref(), Some("FW"));
    assert_eq!(rows[0].height, None);
  }

  #[test]
  fn competition_games_cell_is_kept_verbatim() {
    let data = "id,name,games\n5,League,\"[{'id': 100, 'season': '2021'}]\"\n";
    let rows = read_competitions(data.as_bytes()).unwrap();
    assert_eq!(rows[0].games.as_deref(), Some("[{'id': 100, 'season': '2021'}]"));
  }
}
