//! Error types for `pitchside-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid side {0:?}: expected \"home\" or \"away\"")]
  InvalidSide(String),

  #[error("embedded JSON is malformed after quote repair: {0}")]
  PseudoJsonSyntax(#[source] serde_json::Error),

  #[error("embedded JSON is not an array (found {0})")]
  PseudoJsonNotArray(&'static str),

  #[error("embedded JSON element {index} is invalid: {reason}")]
  InvalidElement { index: usize, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
