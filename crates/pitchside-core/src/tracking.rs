//! Tracking frames and the positional rows hanging off them.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Which team a tracked player belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
  Home,
  Away,
}

impl Side {
  pub const ALL: [Side; 2] = [Side::Home, Side::Away];

  pub fn as_str(self) -> &'static str {
    match self {
      Side::Home => "home",
      Side::Away => "away",
    }
  }
}

impl fmt::Display for Side {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Side {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "home" => Ok(Side::Home),
      "away" => Ok(Side::Away),
      other => Err(Error::InvalidSide(other.to_owned())),
    }
  }
}

/// One video frame of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingFrame {
  pub game_id:                i64,
  pub frame_num:              i64,
  pub video_time_ms:          Option<f64>,
  pub period:                 Option<i64>,
  pub period_elapsed_time:    Option<f64>,
  pub period_game_clock_time: Option<f64>,
  pub generated_time:         Option<String>,
  pub smoothed_time:          Option<String>,
  pub version:                Option<String>,
  pub game_event_id:          Option<i64>,
  pub possession_event_id:    Option<i64>,
  /// Event payloads embedded in the frame, kept verbatim.
  pub game_event:             Option<serde_json::Value>,
  pub possession_event:       Option<serde_json::Value>,
}

impl TrackingFrame {
  pub fn new(game_id: i64, frame_num: i64) -> Self {
    Self {
      game_id,
      frame_num,
      video_time_ms: None,
      period: None,
      period_elapsed_time: None,
      period_game_clock_time: None,
      generated_time: None,
      smoothed_time: None,
      version: None,
      game_event_id: None,
      possession_event_id: None,
      game_event: None,
      possession_event: None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallPosition {
  pub game_id:    i64,
  pub frame_num:  i64,
  pub ball_idx:   i64,
  pub visibility: Option<String>,
  pub x:          Option<f64>,
  pub y:          Option<f64>,
  pub z:          Option<f64>,
}

/// A filtered player coordinate for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothedPlayerPosition {
  pub game_id:    i64,
  pub frame_num:  i64,
  pub side:       Side,
  pub jersey_num: i64,
  pub confidence: Option<String>,
  pub visibility: Option<String>,
  pub x:          Option<f64>,
  pub y:          Option<f64>,
  pub speed:      Option<f64>,
}
