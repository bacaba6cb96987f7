//! Lenient scalar extraction from loosely-typed source documents.
//!
//! Source files mix numbers and numeric strings freely (`"3812"`, `3812`,
//! `3812.0`). Every helper here returns `None` instead of failing when a value
//! is absent, null, or unparsable.

use serde_json::Value;

/// Parse an identifier or integer from text, accepting float spellings with
/// no fractional part (`"3812.0"`).
pub fn parse_int(raw: &str) -> Option<i64> {
  let s = raw.trim();
  if s.is_empty() {
    return None;
  }
  if let Ok(n) = s.parse::<i64>() {
    return Some(n);
  }
  s.parse::<f64>().ok().and_then(float_to_int)
}

pub fn parse_float(raw: &str) -> Option<f64> {
  let s = raw.trim();
  if s.is_empty() {
    return None;
  }
  s.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn float_to_int(f: f64) -> Option<i64> {
  if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
    Some(f as i64)
  } else {
    None
  }
}

pub fn int(v: Option<&Value>) -> Option<i64> {
  match v? {
    Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(float_to_int)),
    Value::String(s) => parse_int(s),
    _ => None,
  }
}

pub fn float(v: Option<&Value>) -> Option<f64> {
  match v? {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => parse_float(s),
    _ => None,
  }
}

/// Text form of a scalar. Numbers and booleans are rendered; containers and
/// null yield `None`.
pub fn text(v: Option<&Value>) -> Option<String> {
  match v? {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

pub fn flag(v: Option<&Value>) -> Option<bool> {
  match v? {
    Value::Bool(b) => Some(*b),
    Value::Number(n) => n.as_i64().map(|n| n != 0),
    Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
      "true" | "1" => Some(true),
      "false" | "0" => Some(false),
      _ => None,
    },
    _ => None,
  }
}

/// `true` when an optional text cell holds something other than whitespace.
pub fn present(cell: &Option<String>) -> bool {
  cell.as_deref().is_some_and(|s| !s.trim().is_empty())
}
