//! Repair and parsing of single-quoted "pseudo-JSON" text cells.
//!
//! Some CSV exports serialise nested lists with single quotes
//! (`[{'id': '3812', 'season': '2022'}]`). Parsing is two explicit stages:
//! [`sanitize`] rewrites the quoting, then [`parse_array`] validates the result
//! as a JSON array. Element decoding reports failures per element so that one
//! bad entry does not hide the others.

use serde_json::Value;

use crate::{Error, Result, lenient};

/// Rewrite single quotes to double quotes.
pub fn sanitize(raw: &str) -> String { raw.replace('\'', "\"") }

/// Sanitize `raw` and parse it as a JSON array.
pub fn parse_array(raw: &str) -> Result<Vec<Value>> {
  let repaired = sanitize(raw.trim());
  match serde_json::from_str::<Value>(&repaired).map_err(Error::PseudoJsonSyntax)? {
    Value::Array(items) => Ok(items),
    other => Err(Error::PseudoJsonNotArray(value_kind(&other))),
  }
}

fn value_kind(v: &Value) -> &'static str {
  match v {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

/// One `{id, season}` entry of a competition's games list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRef {
  pub id:     i64,
  pub season: Option<String>,
}

impl GameRef {
  fn from_value(index: usize, value: &Value) -> Result<Self> {
    let Value::Object(map) = value else {
      return Err(Error::InvalidElement {
        index,
        reason: format!("expected an object, found {}", value_kind(value)),
      });
    };
    let id = lenient::int(map.get("id")).ok_or_else(|| Error::InvalidElement {
      index,
      reason: "missing or non-integer \"id\"".to_owned(),
    })?;
    Ok(Self { id, season: lenient::text(map.get("season")) })
  }
}

/// Parse a games cell. The outer `Result` fails when the text as a whole is
/// unusable; the inner results carry per-element outcomes in input order.
pub fn parse_game_refs(raw: &str) -> Result<Vec<Result<GameRef>>> {
  let items = parse_array(raw)?;
  Ok(
    items
      .iter()
      .enumerate()
      .map(|(index, item)| GameRef::from_value(index, item))
      .collect(),
  )
}
