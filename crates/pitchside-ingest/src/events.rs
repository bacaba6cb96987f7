//! Event documents: a JSON array per match, one element per game event, each
//! optionally carrying the on-the-ball possession event it produced.

use std::{collections::BTreeMap, path::Path};

use pitchside_core::{
  event::{EventTimeline, GameEvent, Pass, PossessionEvent, PossessionKind, Shot},
  lenient::{flag, float, int, text},
  store::EventBatch,
};
use serde_json::Value;

use crate::{
  error::{Error, Result},
  source::keep_last,
};

#[derive(Debug, Default)]
pub struct DecodedEvents {
  pub batch:   EventBatch,
  /// Elements without a `gameEventId`.
  pub skipped: usize,
}

fn pass(match_id: i64, possession_event_id: i64, pe: &Value) -> Pass {
  Pass {
    match_id,
    possession_event_id,
    passer_player_id: int(pe.get("passerPlayerId")),
    passer_player_name: text(pe.get("passerPlayerName")),
    receiver_player_id: int(pe.get("receiverPlayerId")),
    receiver_player_name: text(pe.get("receiverPlayerName")),
    target_player_id: int(pe.get("targetPlayerId")),
    target_player_name: text(pe.get("targetPlayerName")),
    pass_type: text(pe.get("passType")),
    pass_outcome_type: text(pe.get("passOutcomeType")),
  }
}

fn shot(match_id: i64, possession_event_id: i64, pe: &Value) -> Shot {
  Shot {
    match_id,
    possession_event_id,
    shooter_player_id: int(pe.get("shooterPlayerId")),
    shooter_player_name: text(pe.get("shooterPlayerName")),
    shot_type: text(pe.get("shotType")),
    shot_nature_type: text(pe.get("shotNatureType")),
    shot_initial_height_type: text(pe.get("shotInitialHeightType")),
    shot_outcome_type: text(pe.get("shotOutcomeType")),
    ball_moving: flag(pe.get("ballMoving")),
  }
}

pub fn decode(path: &Path, match_id: i64, doc: &Value) -> Result<DecodedEvents> {
  let elements = doc
    .as_array()
    .ok_or_else(|| Error::malformed(path, "events document is not an array"))?;

  let empty = Value::Null;
  let mut out = DecodedEvents::default();
  let batch = &mut out.batch;

  for e in elements {
    let Some(game_event_id) = int(e.get("gameEventId")) else {
      tracing::warn!(path = %path.display(), "event without gameEventId");
      out.skipped += 1;
      continue;
    };
    let possession_event_id = int(e.get("possessionEventId"));
    let ge = e.get("gameEvents").unwrap_or(&empty);
    let pe = e.get("possessionEvents").unwrap_or(&empty);

    batch.timeline.push(EventTimeline {
      match_id,
      game_event_id,
      possession_event_id,
      start_time: float(e.get("startTime")),
      end_time: float(e.get("endTime")),
      duration: float(e.get("duration")),
      event_time: float(e.get("eventTime")),
      sequence: int(e.get("sequence")),
    });

    batch.game_events.push(GameEvent {
      match_id,
      game_event_id,
      game_event_type: text(ge.get("gameEventType")),
      period: int(ge.get("period")),
      team_id: int(ge.get("teamId")),
      team_name: text(ge.get("teamName")),
      player_id: int(ge.get("playerId")),
      player_name: text(ge.get("playerName")),
      start_game_clock: int(ge.get("startGameClock")),
      start_formatted_game_clock: text(ge.get("startFormattedGameClock")),
      initial_non_event: flag(ge.get("initialNonEvent")),
      video_missing: flag(ge.get("videoMissing")),
    });

    let Some(possession_event_id) = possession_event_id else { continue };
    let possession = PossessionEvent {
      match_id,
      possession_event_id,
      possession_event_type: text(pe.get("possessionEventType")),
      non_event: flag(pe.get("nonEvent")),
      game_clock: float(pe.get("gameClock")),
      formatted_game_clock: text(pe.get("formattedGameClock")),
      ball_height_type: text(pe.get("ballHeightType")),
      body_type: text(pe.get("bodyType")),
      high_point_type: text(pe.get("highPointType")),
    };
    match possession.kind() {
      PossessionKind::Pass => batch.passes.push(pass(match_id, possession_event_id, pe)),
      PossessionKind::Shot => batch.shots.push(shot(match_id, possession_event_id, pe)),
      PossessionKind::Other => {}
    }
    batch.possessions.push(possession);
  }

  let EventBatch { timeline, game_events, possessions, passes, shots } =
    std::mem::take(&mut out.batch);
  let possessions = keep_last(possessions, |p| (p.match_id, p.possession_event_id));

  // A repeated possession id whose type changed keeps only the specialization
  // matching its final type.
  let kind_of: BTreeMap<(i64, i64), PossessionKind> = possessions
    .iter()
    .map(|p| ((p.match_id, p.possession_event_id), p.kind()))
    .collect();
  let is = |key: (i64, i64), kind: PossessionKind| kind_of.get(&key) == Some(&kind);

  let mut passes = keep_last(passes, |p| (p.match_id, p.possession_event_id));
  passes.retain(|p| is((p.match_id, p.possession_event_id), PossessionKind::Pass));
  let mut shots = keep_last(shots, |s| (s.match_id, s.possession_event_id));
  shots.retain(|s| is((s.match_id, s.possession_event_id), PossessionKind::Shot));

  out.batch = EventBatch {
    timeline: keep_last(timeline, |t| (t.match_id, t.game_event_id)),
    game_events: keep_last(game_events, |g| (g.match_id, g.game_event_id)),
    possessions,
    passes,
    shots,
  };
  Ok(out)
}
