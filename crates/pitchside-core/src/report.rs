//! Outcome records for normalization and load runs.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A data problem attributed to one parent row. Issues never abort a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationIssue {
  /// Entity being normalized, e.g. `"player"` or `"competition"`.
  pub entity:  String,
  /// The parent identifier as staged, or a row locator when there is none.
  pub key:     String,
  pub message: String,
}

impl NormalizationIssue {
  pub fn new(entity: &str, key: impl Into<String>, message: impl Into<String>) -> Self {
    Self { entity: entity.to_owned(), key: key.into(), message: message.into() }
  }
}

impl fmt::Display for NormalizationIssue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}: {}", self.entity, self.key, self.message)
  }
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadReport {
  pub run_id:      Uuid,
  /// What was loaded: a file path or a staging step name.
  pub source:      String,
  pub started_at:  DateTime<Utc>,
  pub finished_at: Option<DateTime<Utc>>,
  /// Rows written per table.
  pub rows:        BTreeMap<String, u64>,
  /// Source records skipped because they lacked a usable key.
  pub skipped:     u64,
  pub issues:      Vec<NormalizationIssue>,
}

impl LoadReport {
  pub fn start(source: impl Into<String>) -> Self {
    Self {
      run_id:      Uuid::new_v4(),
      source:      source.into(),
      started_at:  Utc::now(),
      finished_at: None,
      rows:        BTreeMap::new(),
      skipped:     0,
      issues:      Vec::new(),
    }
  }

  pub fn add_rows(&mut self, table: &str, count: usize) {
    *self.rows.entry(table.to_owned()).or_default() += count as u64;
  }

  pub fn rows_for(&self, table: &str) -> u64 { self.rows.get(table).copied().unwrap_or(0) }

  /// Fold a per-file report into an aggregate one, keeping this run's id.
  pub fn absorb(&mut self, other: LoadReport) {
    for (table, count) in other.rows {
      *self.rows.entry(table).or_default() += count;
    }
    self.skipped += other.skipped;
    self.issues.extend(other.issues);
  }

  pub fn finish(mut self) -> Self {
    self.finished_at = Some(Utc::now());
    self
  }
}

impl fmt::Display for LoadReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} [{}]", self.source, self.run_id)?;
    for (table, count) in &self.rows {
      write!(f, " {table}={count}")?;
    }
    if self.skipped > 0 {
      write!(f, " skipped={}", self.skipped)?;
    }
    if !self.issues.is_empty() {
      write!(f, " issues={}", self.issues.len())?;
    }
    Ok(())
  }
}
