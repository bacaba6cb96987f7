//! Match metadata: one row per match, loaded from per-match JSON documents.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchMetadata {
  pub match_id:                        i64,
  pub competition_id:                  Option<i64>,
  pub competition_name:                Option<String>,
  pub season:                          Option<String>,
  pub week:                            Option<i64>,
  pub match_date:                      Option<String>,
  pub home_team_id:                    Option<i64>,
  pub home_team_name:                  Option<String>,
  pub home_team_short:                 Option<String>,
  pub away_team_id:                    Option<i64>,
  pub away_team_name:                  Option<String>,
  pub away_team_short:                 Option<String>,
  pub stadium_id:                      Option<i64>,
  pub stadium_name:                    Option<String>,
  pub pitch_length:                    Option<f64>,
  pub pitch_width:                     Option<f64>,
  /// Whether the home side kicks off attacking from the left.
  pub home_team_start_left:            Option<bool>,
  pub home_team_start_left_extra_time: Option<bool>,
  pub fps:                             Option<f64>,
  pub video_url:                       Option<String>,
  /// The full source document, kept so no metadata is lost.
  pub raw:                             serde_json::Value,
}
