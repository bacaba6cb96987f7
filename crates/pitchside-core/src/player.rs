//! Players: the global player dimension fed from CSV staging.

use serde::{Deserialize, Serialize};

/// A players CSV row exactly as imported. Every cell is optional text; nothing
/// is validated until normalization.
///
/// Field order matters: the derived `Ord` is the final, content-based
/// tie-break between equally complete duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerStaging {
  pub id:                  Option<String>,
  #[serde(alias = "nickName")]
  pub nickname:            Option<String>,
  #[serde(alias = "firstName")]
  pub first_name:          Option<String>,
  #[serde(alias = "lastName")]
  pub last_name:           Option<String>,
  #[serde(alias = "positionGroupType", alias = "position_group")]
  pub position_group_type: Option<String>,
  #[serde(alias = "dob", alias = "birthDate", alias = "date_of_birth")]
  pub birth_date:          Option<String>,
  pub height:              Option<String>,
}

/// The canonical player row: exactly one per `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
  pub id:                  i64,
  pub birth_date:          Option<String>,
  pub first_name:          Option<String>,
  pub last_name:           Option<String>,
  pub nickname:            Option<String>,
  pub height:              Option<f64>,
  pub position_group_type: Option<String>,
}
