//! Error type for `pitchside-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  /// A primary-key, foreign-key, or CHECK constraint rejected a write.
  #[error("constraint violation: {0}")]
  Constraint(String),

  /// A child row referenced a parent that is neither stored nor in the batch.
  #[error("missing parent in {table}: {key}")]
  MissingParent { table: &'static str, key: String },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("unknown side in stored row: {0:?}")]
  UnknownSide(String),
}

impl Error {
  pub fn is_constraint(&self) -> bool { matches!(self, Self::Constraint(_)) }
}

/// Constraint failures are lifted out of the driver error. Errors of this
/// type raised inside a `call` closure travel as `Other` and are unwrapped
/// here.
impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    match e {
      tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(failure, message))
        if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
      {
        Self::Constraint(message.unwrap_or_else(|| failure.to_string()))
      }
      tokio_rusqlite::Error::Other(inner) => match inner.downcast::<Error>() {
        Ok(e) => *e,
        Err(inner) => Self::Database(tokio_rusqlite::Error::Other(inner)),
      },
      other => Self::Database(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
