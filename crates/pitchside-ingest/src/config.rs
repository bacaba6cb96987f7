//! Ingest settings, deserialized from the binary's layered configuration.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
  pub tracking: TrackingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
  /// Minimum video-time gap between kept frames. 100 ms keeps roughly 10 fps.
  pub min_frame_gap_ms: f64,
  pub ball_source:      BallSource,
  /// Frames per store transaction.
  pub frames_per_batch: usize,
}

impl Default for TrackingConfig {
  fn default() -> Self {
    Self {
      min_frame_gap_ms: 100.0,
      ball_source:      BallSource::Smoothed,
      frames_per_batch: 400,
    }
  }
}

/// Which per-frame ball array feeds `tracking_ball_positions`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BallSource {
  /// `ballsSmoothed`
  #[default]
  Smoothed,
  /// `balls`
  Raw,
}

impl BallSource {
  pub fn field(self) -> &'static str {
    match self {
      BallSource::Smoothed => "ballsSmoothed",
      BallSource::Raw => "balls",
    }
  }
}

impl fmt::Display for BallSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      BallSource::Smoothed => "smoothed",
      BallSource::Raw => "raw",
    })
  }
}

impl FromStr for BallSource {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "smoothed" => Ok(BallSource::Smoothed),
      "raw" => Ok(BallSource::Raw),
      other => Err(format!("unknown ball source {other:?} (expected smoothed or raw)")),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_tables_fall_back_to_defaults() {
    let cfg: IngestConfig =
      serde_json::from_value(serde_json::json!({ "tracking": { "ball_source": "raw" } }))
        .unwrap();
    assert_eq!(cfg.tracking.ball_source, BallSource::Raw);
    assert_eq!(cfg.tracking.min_frame_gap_ms, 100.0);
    assert_eq!(cfg.tracking.frames_per_batch, 400);
  }

  #[test]
  fn ball_source_parses_cli_spelling() {
    assert_eq!("raw".parse::<BallSource>().unwrap(), BallSource::Raw);
    assert_eq!("smoothed".parse::<BallSource>().unwrap().field(), "ballsSmoothed");
    assert!("both".parse::<BallSource>().is_err());
  }
}
