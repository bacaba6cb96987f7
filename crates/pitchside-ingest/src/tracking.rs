//! Tracking files: JSON Lines, one object per video frame, usually
//! bz2-compressed. Frames are downsampled by video time and emitted in
//! bounded batches so a whole match never sits in memory.

use std::{
  collections::BTreeSet,
  io::{BufRead, Lines},
  path::{Path, PathBuf},
};

use pitchside_core::{
  lenient::{float, int, text},
  store::TrackingBatch,
  tracking::{BallPosition, Side, SmoothedPlayerPosition, TrackingFrame},
};
use serde_json::Value;

use crate::{
  config::{BallSource, TrackingConfig},
  error::{Error, Result},
  source::keep_last,
};

// ─── Downsampling ────────────────────────────────────────────────────────────

/// Keeps a frame only when it is at least `min_gap_ms` of video time after the
/// previously kept one.
#[derive(Debug, Clone)]
pub struct Downsampler {
  min_gap_ms:   f64,
  last_kept_ms: Option<f64>,
}

impl Downsampler {
  pub fn new(min_gap_ms: f64) -> Self { Self { min_gap_ms, last_kept_ms: None } }

  pub fn admit(&mut self, video_time_ms: f64) -> bool {
    if let Some(last) = self.last_kept_ms
      && video_time_ms - last < self.min_gap_ms
    {
      return false;
    }
    self.last_kept_ms = Some(video_time_ms);
    true
  }
}

// ─── Per-frame decoding ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
  pub frame:   TrackingFrame,
  pub balls:   Vec<BallPosition>,
  pub players: Vec<SmoothedPlayerPosition>,
}

fn embedded(obj: &Value, key: &str) -> Option<Value> {
  obj.get(key).filter(|v| v.is_object()).cloned()
}

fn balls(game_id: i64, frame_num: i64, raw: Option<&Value>) -> Vec<BallPosition> {
  let entries: &[Value] = match raw {
    Some(Value::Array(items)) => items,
    Some(single @ Value::Object(_)) => std::slice::from_ref(single),
    _ => &[],
  };
  entries
    .iter()
    .enumerate()
    .filter(|(_, b)| b.is_object())
    .map(|(idx, b)| BallPosition {
      game_id,
      frame_num,
      ball_idx: idx as i64,
      visibility: text(b.get("visibility")),
      x: float(b.get("x")),
      y: float(b.get("y")),
      z: float(b.get("z")),
    })
    .collect()
}

fn smoothed_players(game_id: i64, frame_num: i64, obj: &Value) -> Vec<SmoothedPlayerPosition> {
  let mut out = Vec::new();
  for side in Side::ALL {
    let key = format!("{side}PlayersSmoothed");
    let Some(players) = obj.get(&key).and_then(Value::as_array) else { continue };
    for p in players.iter().filter(|p| p.is_object()) {
      let Some(jersey_num) = int(p.get("jerseyNum")) else { continue };
      out.push(SmoothedPlayerPosition {
        game_id,
        frame_num,
        side,
        jersey_num,
        confidence: text(p.get("confidence")),
        visibility: text(p.get("visibility")),
        x: float(p.get("x")),
        y: float(p.get("y")),
        speed: float(p.get("speed")),
      });
    }
  }
  out
}

/// Decode one frame object. `None` when it has no frame number.
pub fn decode_frame(game_id: i64, obj: &Value, ball_source: BallSource) -> Option<DecodedFrame> {
  let frame_num = int(obj.get("frameNum"))?;
  let frame = TrackingFrame {
    video_time_ms: float(obj.get("videoTimeMs")),
    period: int(obj.get("period")),
    period_elapsed_time: float(obj.get("periodElapsedTime")),
    period_game_clock_time: float(obj.get("periodGameClockTime")),
    generated_time: text(obj.get("generatedTime")),
    smoothed_time: text(obj.get("smoothedTime")),
    version: text(obj.get("version")),
    game_event_id: int(obj.get("game_event_id")),
    possession_event_id: int(obj.get("possession_event_id")),
    game_event: embedded(obj, "game_event"),
    possession_event: embedded(obj, "possession_event"),
    ..TrackingFrame::new(game_id, frame_num)
  };
  Some(DecodedFrame {
    balls: balls(game_id, frame_num, obj.get(ball_source.field())),
    players: smoothed_players(game_id, frame_num, obj),
    frame,
  })
}

// ─── Streaming reader ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
  pub lines:   usize,
  pub kept:    usize,
  /// Lines lacking `videoTimeMs` or `frameNum`.
  pub skipped: usize,
}

pub struct FrameReader<R> {
  path:        PathBuf,
  lines:       Lines<R>,
  game_id:     i64,
  sampler:     Downsampler,
  ball_source: BallSource,
  stats:       FrameStats,
}

impl<R: BufRead> FrameReader<R> {
  pub fn new(path: &Path, reader: R, game_id: i64, config: &TrackingConfig) -> Self {
    Self {
      path: path.to_path_buf(),
      lines: reader.lines(),
      game_id,
      sampler: Downsampler::new(config.min_frame_gap_ms),
      ball_source: config.ball_source,
      stats: FrameStats::default(),
    }
  }

  pub fn stats(&self) -> FrameStats { self.stats }

  /// Read up to `max_frames` kept frames. `None` once the input is exhausted.
  /// A frame repeated within the batch keeps its last occurrence, positions
  /// included.
  pub fn next_batch(&mut self, max_frames: usize) -> Result<Option<TrackingBatch>> {
    let mut batch = TrackingBatch::default();
    let mut seen = BTreeSet::new();

    while batch.frames.len() < max_frames.max(1) {
      let Some(line) = self.lines.next() else { break };
      let line = line.map_err(|e| Error::io(&self.path, e))?;
      let line = line.trim();
      if line.is_empty() {
        continue;
      }
      self.stats.lines += 1;

      let obj: Value = serde_json::from_str(line).map_err(|e| Error::json(&self.path, e))?;
      let Some(t) = float(obj.get("videoTimeMs")) else {
        self.stats.skipped += 1;
        continue;
      };
      // The time slot is spent even if the frame turns out to be unusable.
      if !self.sampler.admit(t) {
        continue;
      }
      let Some(decoded) = decode_frame(self.game_id, &obj, self.ball_source) else {
        self.stats.skipped += 1;
        continue;
      };

      self.stats.kept += 1;
      let frame_num = decoded.frame.frame_num;
      if !seen.insert(frame_num) {
        // A repeated frame replaces the positions read for it earlier.
        batch.balls.retain(|b| b.frame_num != frame_num);
        batch.players.retain(|p| p.frame_num != frame_num);
      }
      batch.frames.push(decoded.frame);
      batch.balls.extend(decoded.balls);
      batch.players.extend(decoded.players);
    }

    if batch.is_empty() {
      return Ok(None);
    }
    Ok(Some(TrackingBatch {
      frames:  keep_last(batch.frames, |f| (f.game_id, f.frame_num)),
      balls:   keep_last(batch.balls, |b| (b.game_id, b.frame_num, b.ball_idx)),
      players: keep_last(batch.players, |p| (p.game_id, p.frame_num, p.side, p.jersey_num)),
    }))
  }
}
