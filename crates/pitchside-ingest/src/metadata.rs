//! Match metadata documents: one JSON file per match, holding either the
//! match object or a one-element array wrapping it.

use std::path::Path;

use pitchside_core::{competition::Competition, fixture::MatchMetadata, lenient};
use serde_json::Value;

use crate::{
  error::{Error, Result},
  source,
};

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMatch {
  pub fixture:     MatchMetadata,
  /// The embedded competition, present only when it has both an id and a name.
  pub competition: Option<Competition>,
}

pub fn decode(path: &Path, doc: Value) -> Result<DecodedMatch> {
  let obj = match doc {
    Value::Array(mut items) => {
      if items.is_empty() {
        return Err(Error::malformed(path, "empty metadata array"));
      }
      items.swap_remove(0)
    }
    other => other,
  };
  if !obj.is_object() {
    return Err(Error::malformed(path, "metadata is not an object"));
  }

  let match_id = lenient::int(obj.get("id"))
    .or_else(|| source::id_from_stem(path))
    .ok_or_else(|| Error::malformed(path, "match has no id"))?;

  let comp = obj.get("competition");
  let home = obj.get("homeTeam");
  let away = obj.get("awayTeam");
  let stadium = obj.get("stadium");
  let pitch = stadium.and_then(|s| s.get("pitches")).and_then(|p| p.get(0));
  fn field<'a>(parent: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    parent.and_then(|p| p.get(key))
  }

  let competition_id = lenient::int(field(comp, "id"));
  let competition_name = lenient::text(field(comp, "name"));
  let competition = competition_id
    .zip(competition_name.clone())
    .map(|(id, name)| Competition { id, name });

  let fixture = MatchMetadata {
    match_id,
    competition_id,
    competition_name,
    season: lenient::text(obj.get("season")),
    week: lenient::int(obj.get("week")),
    match_date: lenient::text(obj.get("date")),
    home_team_id: lenient::int(field(home, "id")),
    home_team_name: lenient::text(field(home, "name")),
    home_team_short: lenient::text(field(home, "shortName")),
    away_team_id: lenient::int(field(away, "id")),
    away_team_name: lenient::text(field(away, "name")),
    away_team_short: lenient::text(field(away, "shortName")),
    stadium_id: lenient::int(field(stadium, "id")),
    stadium_name: lenient::text(field(stadium, "name")),
    pitch_length: lenient::float(field(pitch, "length")),
    pitch_width: lenient::float(field(pitch, "width")),
    home_team_start_left: lenient::flag(obj.get("homeTeamStartLeft")),
    home_team_start_left_extra_time: lenient::flag(obj.get("homeTeamStartLeftExtraTime")),
    fps: lenient::float(obj.get("fps")),
    video_url: lenient::text(obj.get("videoUrl")),
    raw: obj,
  };

  Ok(DecodedMatch { fixture, competition })
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn doc() -> Value {
    json!({
      "id": "3812",
      "competition": { "id": 1, "name": "World Cup" },
      "date": "2022-11-20 16:00:00",
      "season": 2022,
      "week": 1,
      "homeTeam": { "id": 364, "name": "Qatar", "shortName": "QAT" },
      "awayTeam": { "id": "365", "name": "Ecuador", "shortName": "ECU" },
      "stadium": { "id": 4, "name": "Al Bayt", "pitches": [{ "length": 105, "width": 68.0 }] },
      "homeTeamStartLeft": true,
      "fps": 29.97,
      "videoUrl": null
    })
  }

  #[test]
  fn maps_nested_sections_and_keeps_raw() {
    let d = decode(Path::new("3812.json"), doc()).unwrap();
    let m = &d.fixture;
    assert_eq!(m.match_id, 3812);
    assert_eq!(m.competition_id, Some(1));
    assert_eq!(m.season.as_deref(), Some("2022"));
    assert_eq!(m.away_team_id, Some(365));
    assert_eq!(m.home_team_short.as_deref(), Some("QAT"));
    assert_eq!(m.pitch_length, Some(105.0));
    assert_eq!(m.home_team_start_left, Some(true));
    assert_eq!(m.home_team_start_left_extra_time, None);
    assert_eq!(m.video_url, None);
    assert_eq!(m.raw, doc());
    assert_eq!(d.competition, Some(Competition { id: 1, name: "World Cup".into() }));
  }

  #[test]
  fn unwraps_single_element_array() {
    let d = decode(Path::new("x.json"), json!([doc()])).unwrap();
    assert_eq!(d.fixture.match_id, 3812);
  }

  #[test]
  fn falls_back_to_file_stem_for_id() {
    let d = decode(Path::new("meta/4455.json"), json!({ "fps": 25 })).unwrap();
    assert_eq!(d.fixture.match_id, 4455);
    assert_eq!(d.competition, None);
  }

  #[test]
  fn rejects_documents_without_a_match() {
    assert!(matches!(
      decode(Path::new("x.json"), json!([])),
      Err(Error::Malformed { .. })
    ));
    assert!(matches!(
      decode(Path::new("x.json"), json!({ "fps": 25 })),
      Err(Error::Malformed { .. })
    ));
  }
}
