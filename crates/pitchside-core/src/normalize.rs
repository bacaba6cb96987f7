//! Staging → canonical normalization.
//!
//! Duplicate identifiers are resolved by a "best row wins" reducer: rows
//! sharing an identifier are ranked by field presence, checked in a fixed
//! priority order, and the top row becomes the canonical row. Ties on presence
//! fall back to the row contents, so the result never depends on arrival
//! order. Everything here is pure; storage is not involved.

use std::{cmp::Ordering, collections::BTreeMap};

use crate::{
  competition::{Competition, CompetitionGame, CompetitionStaging},
  lenient::{self, present},
  player::{Player, PlayerStaging},
  pseudo_json,
  report::NormalizationIssue,
  store::CompetitionBatch,
};

// ─── Ranking ─────────────────────────────────────────────────────────────────

/// One step of a field-priority ranking: a row that passes `test` outranks a
/// row that does not, provided all earlier steps tied.
pub struct Presence<T> {
  pub field: &'static str,
  pub test:  fn(&T) -> bool,
}

pub const PLAYER_PRIORITY: &[Presence<PlayerStaging>] = &[
  Presence { field: "nickname", test: |p| present(&p.nickname) },
  Presence { field: "first_name", test: |p| present(&p.first_name) },
  Presence { field: "last_name", test: |p| present(&p.last_name) },
  Presence { field: "position_group_type", test: |p| present(&p.position_group_type) },
  Presence { field: "birth_date", test: |p| present(&p.birth_date) },
  Presence { field: "height", test: |p| present(&p.height) },
];

pub const COMPETITION_PRIORITY: &[Presence<CompetitionStaging>] = &[
  Presence { field: "name", test: |c| present(&c.name) },
  Presence { field: "games", test: |c| present(&c.games) },
];

/// Compare two rows by presence only. `Greater` means `a` ranks higher.
pub fn compare_rank<T>(a: &T, b: &T, priority: &[Presence<T>]) -> Ordering {
  priority
    .iter()
    .map(|p| (p.test)(a).cmp(&(p.test)(b)))
    .find(|o| o.is_ne())
    .unwrap_or(Ordering::Equal)
}

/// Sort rows best-first: highest presence rank, then smallest by content.
pub fn sort_ranked<T: Ord>(rows: &mut [T], priority: &[Presence<T>]) {
  rows.sort_by(|a, b| compare_rank(b, a, priority).then_with(|| a.cmp(b)));
}

/// Reduce a group of rows sharing an identifier to its canonical row.
pub fn best_row<T: Ord>(mut rows: Vec<T>, priority: &[Presence<T>]) -> Option<T> {
  sort_ranked(&mut rows, priority);
  rows.into_iter().next()
}

// ─── Grouping ────────────────────────────────────────────────────────────────

struct Grouped<T> {
  /// Rows per parsed identifier, in staging order.
  groups:    BTreeMap<i64, Vec<T>>,
  discarded: usize,
  issues:    Vec<NormalizationIssue>,
}

fn group_by_id<T>(rows: Vec<T>, entity: &str, id: fn(&T) -> Option<&str>) -> Grouped<T> {
  let mut groups: BTreeMap<i64, Vec<T>> = BTreeMap::new();
  let mut discarded = 0;
  let mut issues = Vec::new();

  for row in rows {
    let raw = id(&row).map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned);
    let Some(raw) = raw else {
      discarded += 1;
      continue;
    };
    match lenient::parse_int(&raw) {
      Some(key) => groups.entry(key).or_default().push(row),
      None => issues.push(NormalizationIssue::new(entity, raw, "identifier is not an integer")),
    }
  }

  Grouped { groups, discarded, issues }
}

fn clean(cell: Option<String>) -> Option<String> {
  cell.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

// ─── Players ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct PlayerNormalization {
  pub players:   Vec<Player>,
  /// Staged rows dropped for having no identifier.
  pub discarded: usize,
  pub issues:    Vec<NormalizationIssue>,
}

/// Produce exactly one [`Player`] per staged identifier, ordered by id.
pub fn normalize_players(rows: Vec<PlayerStaging>) -> PlayerNormalization {
  let Grouped { groups, discarded, mut issues } =
    group_by_id(rows, "player", |p| p.id.as_deref());

  let mut players = Vec::with_capacity(groups.len());
  for (id, group) in groups {
    let Some(best) = best_row(group, PLAYER_PRIORITY) else { continue };

    let height = match clean(best.height) {
      None => None,
      Some(raw) => {
        let parsed = lenient::parse_float(&raw);
        if parsed.is_none() {
          issues.push(NormalizationIssue::new(
            "player",
            id.to_string(),
            format!("height {raw:?} is not a number"),
          ));
        }
        parsed
      }
    };

    players.push(Player {
      id,
      birth_date: clean(best.birth_date),
      first_name: clean(best.first_name),
      last_name: clean(best.last_name),
      nickname: clean(best.nickname),
      height,
      position_group_type: clean(best.position_group_type),
    });
  }

  PlayerNormalization { players, discarded, issues }
}

// ─── Competitions ────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct CompetitionNormalization {
  pub batch:     CompetitionBatch,
  pub discarded: usize,
  pub issues:    Vec<NormalizationIssue>,
}

/// Produce one [`Competition`] per staged identifier plus the game mappings
/// expanded from every staged `games` cell for that identifier.
///
/// Cells are read best row first, so when two rows map the same game to
/// different seasons the better-ranked row's season is kept. A malformed cell
/// is reported against its competition and skipped; the competition itself
/// and its other cells still load.
pub fn normalize_competitions(rows: Vec<CompetitionStaging>) -> CompetitionNormalization {
  let Grouped { groups, discarded, mut issues } =
    group_by_id(rows, "competition", |c| c.id.as_deref());

  let mut batch = CompetitionBatch::default();
  for (id, mut group) in groups {
    sort_ranked(&mut group, COMPETITION_PRIORITY);
    let Some(name) = group.first().and_then(|row| clean(row.name.clone())) else {
      issues.push(NormalizationIssue::new(
        "competition",
        id.to_string(),
        "no staged row has a name",
      ));
      continue;
    };

    let mut games: BTreeMap<i64, Option<String>> = BTreeMap::new();
    for row in group.iter().filter(|row| present(&row.games)) {
      let text = row.games.as_deref().unwrap_or_default();
      match pseudo_json::parse_game_refs(text) {
        Err(e) => issues.push(NormalizationIssue::new("competition", id.to_string(), e.to_string())),
        Ok(refs) => {
          for game in refs {
            match game {
              Ok(game) => {
                games.entry(game.id).or_insert(game.season);
              }
              Err(e) => {
                issues.push(NormalizationIssue::new("competition", id.to_string(), e.to_string()))
              }
            }
          }
        }
      }
    }

    batch.competitions.push(Competition { id, name });
    batch.games.extend(games.into_iter().map(|(game_id, season)| CompetitionGame {
      competition_id: id,
      game_id,
      season,
    }));
  }

  CompetitionNormalization { batch, discarded, issues }
}
