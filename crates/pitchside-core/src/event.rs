//! Match events: the raw timeline, the game-event wrapper, and on-the-ball
//! possession events with their pass and shot specializations.

use serde::{Deserialize, Serialize};

// ─── Timeline ────────────────────────────────────────────────────────────────

/// One raw event record, in the order the event feed produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTimeline {
  pub match_id:            i64,
  pub game_event_id:       i64,
  pub possession_event_id: Option<i64>,
  pub start_time:          Option<f64>,
  pub end_time:            Option<f64>,
  pub duration:            Option<f64>,
  pub event_time:          Option<f64>,
  pub sequence:            Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
  pub match_id:                   i64,
  pub game_event_id:              i64,
  pub game_event_type:            Option<String>,
  pub period:                     Option<i64>,
  pub team_id:                    Option<i64>,
  pub team_name:                  Option<String>,
  pub player_id:                  Option<i64>,
  pub player_name:                Option<String>,
  pub start_game_clock:           Option<i64>,
  pub start_formatted_game_clock: Option<String>,
  pub initial_non_event:          Option<bool>,
  pub video_missing:              Option<bool>,
}

// ─── Possession events ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PossessionEvent {
  pub match_id:              i64,
  pub possession_event_id:   i64,
  /// Feed code, e.g. `PA` (pass), `CR` (cross), `SH` (shot).
  pub possession_event_type: Option<String>,
  pub non_event:             Option<bool>,
  pub game_clock:            Option<f64>,
  pub formatted_game_clock:  Option<String>,
  pub ball_height_type:      Option<String>,
  pub body_type:             Option<String>,
  pub high_point_type:       Option<String>,
}

impl PossessionEvent {
  pub fn kind(&self) -> PossessionKind {
    PossessionKind::from_code(self.possession_event_type.as_deref())
  }
}

/// Which specialization table, if any, a possession event belongs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PossessionKind {
  Pass,
  Shot,
  Other,
}

impl PossessionKind {
  /// Crosses are stored as passes.
  pub fn from_code(code: Option<&str>) -> Self {
    match code {
      Some("PA" | "CR") => Self::Pass,
      Some("SH") => Self::Shot,
      _ => Self::Other,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pass {
  pub match_id:             i64,
  pub possession_event_id:  i64,
  pub passer_player_id:     Option<i64>,
  pub passer_player_name:   Option<String>,
  pub receiver_player_id:   Option<i64>,
  pub receiver_player_name: Option<String>,
  pub target_player_id:     Option<i64>,
  pub target_player_name:   Option<String>,
  pub pass_type:            Option<String>,
  pub pass_outcome_type:    Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shot {
  pub match_id:                 i64,
  pub possession_event_id:      i64,
  pub shooter_player_id:        Option<i64>,
  pub shooter_player_name:      Option<String>,
  pub shot_type:                Option<String>,
  pub shot_nature_type:         Option<String>,
  pub shot_initial_height_type: Option<String>,
  pub shot_outcome_type:        Option<String>,
  pub ball_moving:              Option<bool>,
}

// ─── Resolved view ───────────────────────────────────────────────────────────

/// The specialization attached to a possession event. Storage keeps passes and
/// shots in separate tables joined by key; readers see one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PossessionDetail {
  Pass(Pass),
  Shot(Shot),
  None,
}

/// A possession event with its specialization resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPossession {
  pub event:  PossessionEvent,
  pub detail: PossessionDetail,
}
