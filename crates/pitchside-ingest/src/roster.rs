//! Per-match roster documents: a JSON array of `{player, team, ...}` entries.

use std::path::Path;

use pitchside_core::{
  lenient,
  roster::{MatchRoster, RosterPlayer},
  store::RosterBatch,
};
use serde_json::Value;

use crate::{
  error::{Error, Result},
  source::keep_last,
};

#[derive(Debug, Default)]
pub struct DecodedRoster {
  pub batch:   RosterBatch,
  /// Entries without a usable player or team id.
  pub skipped: usize,
}

fn shirt_number(v: Option<&Value>) -> Option<i64> {
  match v? {
    Value::String(s) if s.trim().is_empty() || s.trim().eq_ignore_ascii_case("nan") => None,
    other => lenient::int(Some(other)),
  }
}

pub fn decode(path: &Path, match_id: i64, doc: &Value) -> Result<DecodedRoster> {
  let entries = doc
    .as_array()
    .ok_or_else(|| Error::malformed(path, "roster is not an array"))?;

  let mut out = DecodedRoster::default();
  for entry in entries {
    let player = entry.get("player");
    let player_id = lenient::int(player.and_then(|p| p.get("id")));
    let team_id = lenient::int(entry.get("team").and_then(|t| t.get("id")));
    let (Some(player_id), Some(team_id)) = (player_id, team_id) else {
      tracing::warn!(path = %path.display(), "roster entry without player or team id");
      out.skipped += 1;
      continue;
    };

    out.batch.players.push(RosterPlayer {
      id:       player_id,
      nickname: lenient::text(player.and_then(|p| p.get("nickname"))),
    });
    out.batch.entries.push(MatchRoster {
      match_id,
      team_id,
      player_id,
      position_group_type: lenient::text(entry.get("positionGroupType")),
      shirt_number: shirt_number(entry.get("shirtNumber")),
      started: lenient::flag(entry.get("started")).unwrap_or(false),
    });
  }

  let RosterBatch { players, entries } = std::mem::take(&mut out.batch);
  out.batch = RosterBatch {
    players: keep_last(players, |p| p.id),
    entries: keep_last(entries, |r| (r.match_id, r.team_id, r.player_id)),
  };
  Ok(out)
}
