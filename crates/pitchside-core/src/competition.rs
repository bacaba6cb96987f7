//! Competitions and the competition → game mapping.

use serde::{Deserialize, Serialize};

/// A competitions CSV row as imported. `games` holds the legacy
/// single-quoted array text, e.g. `[{'id': '3812', 'season': '2022'}]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompetitionStaging {
  pub id:    Option<String>,
  pub name:  Option<String>,
  pub games: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competition {
  pub id:   i64,
  pub name: String,
}

/// Links a competition to one of its matches for a given season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitionGame {
  pub competition_id: i64,
  pub game_id:        i64,
  pub season:         Option<String>,
}
