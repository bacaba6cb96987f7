//! Encoding and decoding between domain types and SQLite columns.
//!
//! Embedded documents (match `raw`, frame event payloads) are stored as
//! compact JSON text. Booleans are stored as 0/1 integers, which rusqlite
//! maps to `bool` directly. `side` is stored as its lowercase name.

use pitchside_core::{
  competition::{Competition, CompetitionGame, CompetitionStaging},
  event::{EventTimeline, GameEvent, Pass, PossessionEvent, Shot},
  fixture::MatchMetadata,
  player::{Player, PlayerStaging},
  roster::MatchRoster,
  tracking::{BallPosition, Side, SmoothedPlayerPosition, TrackingFrame},
};
use rusqlite::Row;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_json(v: &serde_json::Value) -> Result<String> { Ok(serde_json::to_string(v)?) }

pub fn decode_json(s: &str) -> Result<serde_json::Value> { Ok(serde_json::from_str(s)?) }

pub fn encode_side(side: Side) -> &'static str { side.as_str() }

pub fn decode_side(s: &str) -> Result<Side> {
  s.parse().map_err(|_| Error::UnknownSide(s.to_owned()))
}

// ─── Plain rows ──────────────────────────────────────────────────────────────
//
// Each mapper reads columns in the order of the matching `*_COLUMNS` constant
// in `store.rs`.

pub fn player_staging_from_row(row: &Row<'_>) -> rusqlite::Result<PlayerStaging> {
  Ok(PlayerStaging {
    id:                  row.get(0)?,
    nickname:            row.get(1)?,
    first_name:          row.get(2)?,
    last_name:           row.get(3)?,
    position_group_type: row.get(4)?,
    birth_date:          row.get(5)?,
    height:              row.get(6)?,
  })
}

pub fn competition_staging_from_row(row: &Row<'_>) -> rusqlite::Result<CompetitionStaging> {
  Ok(CompetitionStaging { id: row.get(0)?, name: row.get(1)?, games: row.get(2)? })
}

pub fn player_from_row(row: &Row<'_>) -> rusqlite::Result<Player> {
  Ok(Player {
    id:                  row.get(0)?,
    birth_date:          row.get(1)?,
    first_name:          row.get(2)?,
    last_name:           row.get(3)?,
    nickname:            row.get(4)?,
    height:              row.get(5)?,
    position_group_type: row.get(6)?,
  })
}

pub fn competition_from_row(row: &Row<'_>) -> rusqlite::Result<Competition> {
  Ok(Competition { id: row.get(0)?, name: row.get(1)? })
}

pub fn competition_game_from_row(row: &Row<'_>) -> rusqlite::Result<CompetitionGame> {
  Ok(CompetitionGame {
    competition_id: row.get(0)?,
    game_id:        row.get(1)?,
    season:         row.get(2)?,
  })
}

pub fn match_roster_from_row(row: &Row<'_>) -> rusqlite::Result<MatchRoster> {
  Ok(MatchRoster {
    match_id:            row.get(0)?,
    team_id:             row.get(1)?,
    player_id:           row.get(2)?,
    position_group_type: row.get(3)?,
    shirt_number:        row.get(4)?,
    started:             row.get(5)?,
  })
}

pub fn ball_from_row(row: &Row<'_>) -> rusqlite::Result<BallPosition> {
  Ok(BallPosition {
    game_id:    row.get(0)?,
    frame_num:  row.get(1)?,
    ball_idx:   row.get(2)?,
    visibility: row.get(3)?,
    x:          row.get(4)?,
    y:          row.get(5)?,
    z:          row.get(6)?,
  })
}

pub fn timeline_from_row(row: &Row<'_>) -> rusqlite::Result<EventTimeline> {
  Ok(EventTimeline {
    match_id:            row.get(0)?,
    game_event_id:       row.get(1)?,
    possession_event_id: row.get(2)?,
    start_time:          row.get(3)?,
    end_time:            row.get(4)?,
    duration:            row.get(5)?,
    event_time:          row.get(6)?,
    sequence:            row.get(7)?,
  })
}

pub fn game_event_from_row(row: &Row<'_>) -> rusqlite::Result<GameEvent> {
  Ok(GameEvent {
    match_id:                   row.get(0)?,
    game_event_id:              row.get(1)?,
    game_event_type:            row.get(2)?,
    period:                     row.get(3)?,
    team_id:                    row.get(4)?,
    team_name:                  row.get(5)?,
    player_id:                  row.get(6)?,
    player_name:                row.get(7)?,
    start_game_clock:           row.get(8)?,
    start_formatted_game_clock: row.get(9)?,
    initial_non_event:          row.get(10)?,
    video_missing:              row.get(11)?,
  })
}

pub fn possession_from_row(row: &Row<'_>) -> rusqlite::Result<PossessionEvent> {
  Ok(PossessionEvent {
    match_id:              row.get(0)?,
    possession_event_id:   row.get(1)?,
    possession_event_type: row.get(2)?,
    non_event:             row.get(3)?,
    game_clock:            row.get(4)?,
    formatted_game_clock:  row.get(5)?,
    ball_height_type:      row.get(6)?,
    body_type:             row.get(7)?,
    high_point_type:       row.get(8)?,
  })
}

pub fn pass_from_row(row: &Row<'_>) -> rusqlite::Result<Pass> {
  Ok(Pass {
    match_id:             row.get(0)?,
    possession_event_id:  row.get(1)?,
    passer_player_id:     row.get(2)?,
    passer_player_name:   row.get(3)?,
    receiver_player_id:   row.get(4)?,
    receiver_player_name: row.get(5)?,
    target_player_id:     row.get(6)?,
    target_player_name:   row.get(7)?,
    pass_type:            row.get(8)?,
    pass_outcome_type:    row.get(9)?,
  })
}

pub fn shot_from_row(row: &Row<'_>) -> rusqlite::Result<Shot> {
  Ok(Shot {
    match_id:                 row.get(0)?,
    possession_event_id:      row.get(1)?,
    shooter_player_id:        row.get(2)?,
    shooter_player_name:      row.get(3)?,
    shot_type:                row.get(4)?,
    shot_nature_type:         row.get(5)?,
    shot_initial_height_type: row.get(6)?,
    shot_outcome_type:        row.get(7)?,
    ball_moving:              row.get(8)?,
  })
}

// ─── Rows with encoded columns ───────────────────────────────────────────────

/// A `match_metadata` row whose `raw` document is still JSON text.
pub struct RawMatch {
  pub meta: MatchMetadata,
  pub raw:  String,
}

impl RawMatch {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      meta: MatchMetadata {
        match_id:                        row.get(0)?,
        competition_id:                  row.get(1)?,
        competition_name:                row.get(2)?,
        season:                          row.get(3)?,
        week:                            row.get(4)?,
        match_date:                      row.get(5)?,
        home_team_id:                    row.get(6)?,
        home_team_name:                  row.get(7)?,
        home_team_short:                 row.get(8)?,
        away_team_id:                    row.get(9)?,
        away_team_name:                  row.get(10)?,
        away_team_short:                 row.get(11)?,
        stadium_id:                      row.get(12)?,
        stadium_name:                    row.get(13)?,
        pitch_length:                    row.get(14)?,
        pitch_width:                     row.get(15)?,
        home_team_start_left:            row.get(16)?,
        home_team_start_left_extra_time: row.get(17)?,
        fps:                             row.get(18)?,
        video_url:                       row.get(19)?,
        raw:                             serde_json::Value::Null,
      },
      raw:  row.get(20)?,
    })
  }

  pub fn into_match(self) -> Result<MatchMetadata> {
    Ok(MatchMetadata { raw: decode_json(&self.raw)?, ..self.meta })
  }
}

/// A `tracking_frames` row whose embedded event payloads are still JSON text.
pub struct RawFrame {
  pub frame:            TrackingFrame,
  pub game_event:       Option<String>,
  pub possession_event: Option<String>,
}

impl RawFrame {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      frame:            TrackingFrame {
        video_time_ms:          row.get(2)?,
        period:                 row.get(3)?,
        period_elapsed_time:    row.get(4)?,
        period_game_clock_time: row.get(5)?,
        generated_time:         row.get(6)?,
        smoothed_time:          row.get(7)?,
        version:                row.get(8)?,
        game_event_id:          row.get(9)?,
        possession_event_id:    row.get(10)?,
        ..TrackingFrame::new(row.get(0)?, row.get(1)?)
      },
      game_event:       row.get(11)?,
      possession_event: row.get(12)?,
    })
  }

  pub fn into_frame(self) -> Result<TrackingFrame> {
    Ok(TrackingFrame {
      game_event: self.game_event.as_deref().map(decode_json).transpose()?,
      possession_event: self.possession_event.as_deref().map(decode_json).transpose()?,
      ..self.frame
    })
  }
}

/// A `tracking_player_positions_smoothed` row with `side` still as text.
pub struct RawSmoothedPosition {
  pub game_id:    i64,
  pub frame_num:  i64,
  pub side:       String,
  pub jersey_num: i64,
  pub confidence: Option<String>,
  pub visibility: Option<String>,
  pub x:          Option<f64>,
  pub y:          Option<f64>,
  pub speed:      Option<f64>,
}

impl RawSmoothedPosition {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      game_id:    row.get(0)?,
      frame_num:  row.get(1)?,
      side:       row.get(2)?,
      jersey_num: row.get(3)?,
      confidence: row.get(4)?,
      visibility: row.get(5)?,
      x:          row.get(6)?,
      y:          row.get(7)?,
      speed:      row.get(8)?,
    })
  }

  pub fn into_position(self) -> Result<SmoothedPlayerPosition> {
    Ok(SmoothedPlayerPosition {
      game_id:    self.game_id,
      frame_num:  self.frame_num,
      side:       decode_side(&self.side)?,
      jersey_num: self.jersey_num,
      confidence: self.confidence,
      visibility: self.visibility,
      x:          self.x,
      y:          self.y,
      speed:      self.speed,
    })
  }
}
