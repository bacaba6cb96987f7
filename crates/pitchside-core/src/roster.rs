//! Per-match rosters.

use serde::{Deserialize, Serialize};

/// A player as referenced from roster documents. Distinct from
/// [`crate::player::Player`], which is fed from the players CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterPlayer {
  pub id:       i64,
  pub nickname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRoster {
  pub match_id:            i64,
  pub team_id:             i64,
  pub player_id:           i64,
  pub position_group_type: Option<String>,
  pub shirt_number:        Option<i64>,
  pub started:             bool,
}
