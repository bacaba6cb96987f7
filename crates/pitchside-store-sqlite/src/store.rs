//! [`SqliteStore`], the SQLite implementation of [`MatchStore`].

use std::path::Path;

use rusqlite::{Connection, OptionalExtension as _, Row, params};

use pitchside_core::{
  competition::{Competition, CompetitionGame, CompetitionStaging},
  event::{
    EventTimeline, GameEvent, Pass, PossessionDetail, PossessionEvent, PossessionKind,
    ResolvedPossession, Shot,
  },
  fixture::MatchMetadata,
  player::{Player, PlayerStaging},
  roster::{MatchRoster, RosterPlayer},
  store::{
    CompetitionBatch, EventBatch, MatchBatch, MatchStore, RosterBatch, RowCounts, TrackingBatch,
  },
  tracking::{BallPosition, SmoothedPlayerPosition, TrackingFrame},
};

use crate::{
  Error, Result,
  encode::{
    RawFrame, RawMatch, RawSmoothedPosition, ball_from_row, competition_from_row,
    competition_game_from_row, competition_staging_from_row, encode_json, encode_side,
    game_event_from_row, match_roster_from_row, pass_from_row, player_from_row,
    player_staging_from_row, possession_from_row, shot_from_row, timeline_from_row,
  },
  schema::{CORE_TABLES, SCHEMA},
};

type CallResult<T> = std::result::Result<T, tokio_rusqlite::Error>;

/// Abort a `call` closure with one of this crate's errors; unwrapped again by
/// `From<tokio_rusqlite::Error> for Error`.
fn abort(e: impl Into<Error>) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e.into()))
}

fn missing_parent(table: &'static str, key: String) -> tokio_rusqlite::Error {
  abort(Error::MissingParent { table, key })
}

// ─── Table descriptions ──────────────────────────────────────────────────────

/// Column layout of one table. The first `key_len` columns form the primary
/// key; column order matches the row mappers in `encode.rs`.
struct Table {
  name:    &'static str,
  columns: &'static [&'static str],
  key_len: usize,
}

impl Table {
  fn select(&self, tail: &str) -> String {
    format!("SELECT {} FROM {} {tail}", self.columns.join(", "), self.name)
  }

  fn placeholders(&self) -> String {
    (1..=self.columns.len())
      .map(|i| format!("?{i}"))
      .collect::<Vec<_>>()
      .join(", ")
  }

  fn insert(&self) -> String {
    format!(
      "INSERT INTO {} ({}) VALUES ({})",
      self.name,
      self.columns.join(", "),
      self.placeholders()
    )
  }

  /// Insert, or overwrite every non-key column of the existing row.
  ///
  /// `INSERT OR REPLACE` is not used: it deletes the old row first, which
  /// would cascade to child rows.
  fn upsert(&self) -> String {
    let (key, rest) = self.columns.split_at(self.key_len.min(self.columns.len()));
    let updates = rest
      .iter()
      .map(|c| format!("{c} = excluded.{c}"))
      .collect::<Vec<_>>()
      .join(", ");
    format!("{} ON CONFLICT ({}) DO UPDATE SET {updates}", self.insert(), key.join(", "))
  }
}

const PLAYERS_STAGING: Table = Table {
  name:    "players_staging",
  columns: &[
    "id",
    "nickname",
    "first_name",
    "last_name",
    "position_group_type",
    "birth_date",
    "height",
  ],
  key_len: 0,
};

const COMPETITIONS_STAGING: Table = Table {
  name:    "competitions_staging",
  columns: &["id", "name", "games"],
  key_len: 0,
};

const PLAYERS: Table = Table {
  name:    "players",
  columns: &[
    "id",
    "birth_date",
    "first_name",
    "last_name",
    "nickname",
    "height",
    "position_group_type",
  ],
  key_len: 1,
};

const COMPETITIONS: Table = Table {
  name:    "competitions",
  columns: &["id", "name"],
  key_len: 1,
};

const COMPETITION_GAMES: Table = Table {
  name:    "competition_games",
  columns: &["competition_id", "game_id", "season"],
  key_len: 2,
};

const MATCH_METADATA: Table = Table {
  name:    "match_metadata",
  columns: &[
    "match_id",
    "competition_id",
    "competition_name",
    "season",
    "week",
    "match_date",
    "home_team_id",
    "home_team_name",
    "home_team_short",
    "away_team_id",
    "away_team_name",
    "away_team_short",
    "stadium_id",
    "stadium_name",
    "pitch_length",
    "pitch_width",
    "home_team_start_left",
    "home_team_start_left_extra_time",
    "fps",
    "video_url",
    "raw",
  ],
  key_len: 1,
};

const ROSTER_PLAYERS: Table = Table {
  name:    "roster_players",
  columns: &["id", "nickname"],
  key_len: 1,
};

const MATCH_ROSTERS: Table = Table {
  name:    "match_rosters",
  columns: &[
    "match_id",
    "team_id",
    "player_id",
    "position_group_type",
    "shirt_number",
    "started",
  ],
  key_len: 3,
};

const TRACKING_FRAMES: Table = Table {
  name:    "tracking_frames",
  columns: &[
    "game_id",
    "frame_num",
    "video_time_ms",
    "period",
    "period_elapsed_time",
    "period_game_clock_time",
    "generated_time",
    "smoothed_time",
    "version",
    "game_event_id",
    "possession_event_id",
    "game_event",
    "possession_event",
  ],
  key_len: 2,
};

const BALL_POSITIONS: Table = Table {
  name:    "tracking_ball_positions",
  columns: &["game_id", "frame_num", "ball_idx", "visibility", "x", "y", "z"],
  key_len: 3,
};

const SMOOTHED_POSITIONS: Table = Table {
  name:    "tracking_player_positions_smoothed",
  columns: &[
    "game_id",
    "frame_num",
    "side",
    "jersey_num",
    "confidence",
    "visibility",
    "x",
    "y",
    "speed",
  ],
  key_len: 4,
};

const EVENT_TIMELINE: Table = Table {
  name:    "event_timeline",
  columns: &[
    "match_id",
    "game_event_id",
    "possession_event_id",
    "start_time",
    "end_time",
    "duration",
    "event_time",
    "sequence",
  ],
  key_len: 2,
};

const GAME_EVENTS: Table = Table {
  name:    "game_events",
  columns: &[
    "match_id",
    "game_event_id",
    "game_event_type",
    "period",
    "team_id",
    "team_name",
    "player_id",
    "player_name",
    "start_game_clock",
    "start_formatted_game_clock",
    "initial_non_event",
    "video_missing",
  ],
  key_len: 2,
};

const POSSESSION_EVENTS: Table = Table {
  name:    "possession_events",
  columns: &[
    "match_id",
    "possession_event_id",
    "possession_event_type",
    "non_event",
    "game_clock",
    "formatted_game_clock",
    "ball_height_type",
    "body_type",
    "high_point_type",
  ],
  key_len: 2,
};

const PASSES: Table = Table {
  name:    "passes",
  columns: &[
    "match_id",
    "possession_event_id",
    "passer_player_id",
    "passer_player_name",
    "receiver_player_id",
    "receiver_player_name",
    "target_player_id",
    "target_player_name",
    "pass_type",
    "pass_outcome_type",
  ],
  key_len: 2,
};

const SHOTS: Table = Table {
  name:    "shots",
  columns: &[
    "match_id",
    "possession_event_id",
    "shooter_player_id",
    "shooter_player_name",
    "shot_type",
    "shot_nature_type",
    "shot_initial_height_type",
    "shot_outcome_type",
    "ball_moving",
  ],
  key_len: 2,
};

// ─── Writers ─────────────────────────────────────────────────────────────────
//
// Each writer runs inside the caller's transaction. Child writers check their
// parent first so a missing parent is reported by key rather than as a bare
// foreign-key failure.

fn upsert_competitions(conn: &Connection, rows: &[Competition]) -> CallResult<()> {
  let mut stmt = conn.prepare_cached(&COMPETITIONS.upsert())?;
  for c in rows {
    stmt.execute(params![c.id, c.name])?;
  }
  Ok(())
}

fn upsert_competition_games(conn: &Connection, rows: &[CompetitionGame]) -> CallResult<()> {
  let mut parent = conn.prepare_cached("SELECT 1 FROM competitions WHERE id = ?1")?;
  let mut stmt = conn.prepare_cached(&COMPETITION_GAMES.upsert())?;
  for g in rows {
    if !parent.exists([g.competition_id])? {
      return Err(missing_parent("competitions", format!("id={}", g.competition_id)));
    }
    stmt.execute(params![g.competition_id, g.game_id, g.season])?;
  }
  Ok(())
}

fn upsert_matches(conn: &Connection, rows: &[MatchMetadata]) -> CallResult<()> {
  let mut parent = conn.prepare_cached("SELECT 1 FROM competitions WHERE id = ?1")?;
  let mut stmt = conn.prepare_cached(&MATCH_METADATA.upsert())?;
  for m in rows {
    if let Some(competition_id) = m.competition_id
      && !parent.exists([competition_id])?
    {
      return Err(missing_parent("competitions", format!("id={competition_id}")));
    }
    let raw = encode_json(&m.raw).map_err(abort)?;
    stmt.execute(params![
      m.match_id,
      m.competition_id,
      m.competition_name,
      m.season,
      m.week,
      m.match_date,
      m.home_team_id,
      m.home_team_name,
      m.home_team_short,
      m.away_team_id,
      m.away_team_name,
      m.away_team_short,
      m.stadium_id,
      m.stadium_name,
      m.pitch_length,
      m.pitch_width,
      m.home_team_start_left,
      m.home_team_start_left_extra_time,
      m.fps,
      m.video_url,
      raw,
    ])?;
  }
  Ok(())
}

fn upsert_roster(conn: &Connection, batch: &RosterBatch) -> CallResult<()> {
  let mut stmt = conn.prepare_cached(&ROSTER_PLAYERS.upsert())?;
  for p in &batch.players {
    stmt.execute(params![p.id, p.nickname])?;
  }

  let mut parent = conn.prepare_cached("SELECT 1 FROM roster_players WHERE id = ?1")?;
  let mut stmt = conn.prepare_cached(&MATCH_ROSTERS.upsert())?;
  for r in &batch.entries {
    if !parent.exists([r.player_id])? {
      return Err(missing_parent("roster_players", format!("id={}", r.player_id)));
    }
    stmt.execute(params![
      r.match_id,
      r.team_id,
      r.player_id,
      r.position_group_type,
      r.shirt_number,
      r.started,
    ])?;
  }
  Ok(())
}

fn upsert_tracking(conn: &Connection, batch: &TrackingBatch) -> CallResult<()> {
  let mut stmt = conn.prepare_cached(&TRACKING_FRAMES.upsert())?;
  for f in &batch.frames {
    let game_event = f.game_event.as_ref().map(encode_json).transpose().map_err(abort)?;
    let possession_event =
      f.possession_event.as_ref().map(encode_json).transpose().map_err(abort)?;
    stmt.execute(params![
      f.game_id,
      f.frame_num,
      f.video_time_ms,
      f.period,
      f.period_elapsed_time,
      f.period_game_clock_time,
      f.generated_time,
      f.smoothed_time,
      f.version,
      f.game_event_id,
      f.possession_event_id,
      game_event,
      possession_event,
    ])?;
  }

  // A frame in the batch carries its whole position set; drop what an earlier
  // load stored for it.
  let mut drop_balls = conn.prepare_cached(
    "DELETE FROM tracking_ball_positions WHERE game_id = ?1 AND frame_num = ?2",
  )?;
  let mut drop_players = conn.prepare_cached(
    "DELETE FROM tracking_player_positions_smoothed WHERE game_id = ?1 AND frame_num = ?2",
  )?;
  for f in &batch.frames {
    drop_balls.execute([f.game_id, f.frame_num])?;
    drop_players.execute([f.game_id, f.frame_num])?;
  }

  let mut parent =
    conn.prepare_cached("SELECT 1 FROM tracking_frames WHERE game_id = ?1 AND frame_num = ?2")?;
  let frame_key = |game_id: i64, frame_num: i64| format!("game_id={game_id}, frame_num={frame_num}");

  let mut stmt = conn.prepare_cached(&BALL_POSITIONS.upsert())?;
  for b in &batch.balls {
    if !parent.exists([b.game_id, b.frame_num])? {
      return Err(missing_parent("tracking_frames", frame_key(b.game_id, b.frame_num)));
    }
    stmt.execute(params![b.game_id, b.frame_num, b.ball_idx, b.visibility, b.x, b.y, b.z])?;
  }

  let mut stmt = conn.prepare_cached(&SMOOTHED_POSITIONS.upsert())?;
  for p in &batch.players {
    if !parent.exists([p.game_id, p.frame_num])? {
      return Err(missing_parent("tracking_frames", frame_key(p.game_id, p.frame_num)));
    }
    stmt.execute(params![
      p.game_id,
      p.frame_num,
      encode_side(p.side),
      p.jersey_num,
      p.confidence,
      p.visibility,
      p.x,
      p.y,
      p.speed,
    ])?;
  }
  Ok(())
}

fn upsert_events(conn: &Connection, batch: &EventBatch) -> CallResult<()> {
  let mut stmt = conn.prepare_cached(&EVENT_TIMELINE.upsert())?;
  for t in &batch.timeline {
    stmt.execute(params![
      t.match_id,
      t.game_event_id,
      t.possession_event_id,
      t.start_time,
      t.end_time,
      t.duration,
      t.event_time,
      t.sequence,
    ])?;
  }

  let mut parent = conn
    .prepare_cached("SELECT 1 FROM event_timeline WHERE match_id = ?1 AND game_event_id = ?2")?;
  let mut stmt = conn.prepare_cached(&GAME_EVENTS.upsert())?;
  for g in &batch.game_events {
    if !parent.exists([g.match_id, g.game_event_id])? {
      return Err(missing_parent(
        "event_timeline",
        format!("match_id={}, game_event_id={}", g.match_id, g.game_event_id),
      ));
    }
    stmt.execute(params![
      g.match_id,
      g.game_event_id,
      g.game_event_type,
      g.period,
      g.team_id,
      g.team_name,
      g.player_id,
      g.player_name,
      g.start_game_clock,
      g.start_formatted_game_clock,
      g.initial_non_event,
      g.video_missing,
    ])?;
  }

  let mut stmt = conn.prepare_cached(&POSSESSION_EVENTS.upsert())?;
  let mut drop_pass =
    conn.prepare_cached("DELETE FROM passes WHERE match_id = ?1 AND possession_event_id = ?2")?;
  let mut drop_shot =
    conn.prepare_cached("DELETE FROM shots WHERE match_id = ?1 AND possession_event_id = ?2")?;
  for p in &batch.possessions {
    // A reload may change the event's type; only the matching specialization
    // may survive.
    let key = [p.match_id, p.possession_event_id];
    match p.kind() {
      PossessionKind::Pass => drop_shot.execute(key)?,
      PossessionKind::Shot => drop_pass.execute(key)?,
      PossessionKind::Other => drop_pass.execute(key)? + drop_shot.execute(key)?,
    };
    stmt.execute(params![
      p.match_id,
      p.possession_event_id,
      p.possession_event_type,
      p.non_event,
      p.game_clock,
      p.formatted_game_clock,
      p.ball_height_type,
      p.body_type,
      p.high_point_type,
    ])?;
  }

  let mut parent = conn.prepare_cached(
    "SELECT 1 FROM possession_events WHERE match_id = ?1 AND possession_event_id = ?2",
  )?;
  let possession_key =
    |match_id: i64, id: i64| format!("match_id={match_id}, possession_event_id={id}");

  let mut stmt = conn.prepare_cached(&PASSES.upsert())?;
  for p in &batch.passes {
    if !parent.exists([p.match_id, p.possession_event_id])? {
      return Err(missing_parent(
        "possession_events",
        possession_key(p.match_id, p.possession_event_id),
      ));
    }
    stmt.execute(params![
      p.match_id,
      p.possession_event_id,
      p.passer_player_id,
      p.passer_player_name,
      p.receiver_player_id,
      p.receiver_player_name,
      p.target_player_id,
      p.target_player_name,
      p.pass_type,
      p.pass_outcome_type,
    ])?;
  }

  let mut stmt = conn.prepare_cached(&SHOTS.upsert())?;
  for s in &batch.shots {
    if !parent.exists([s.match_id, s.possession_event_id])? {
      return Err(missing_parent(
        "possession_events",
        possession_key(s.match_id, s.possession_event_id),
      ));
    }
    stmt.execute(params![
      s.match_id,
      s.possession_event_id,
      s.shooter_player_id,
      s.shooter_player_name,
      s.shot_type,
      s.shot_nature_type,
      s.shot_initial_height_type,
      s.shot_outcome_type,
      s.ball_moving,
    ])?;
  }
  Ok(())
}

// ─── Readers ─────────────────────────────────────────────────────────────────

fn query_all<T, P: rusqlite::Params>(
  conn: &Connection,
  sql: &str,
  params: P,
  map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> CallResult<Vec<T>> {
  let mut stmt = conn.prepare_cached(sql)?;
  let rows = stmt.query_map(params, map)?.collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Pitchside match store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let conn = tokio_rusqlite::Connection::open(&path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "opened store");
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `sql` (keyed by `?1` and optionally `?2`) in its own transaction and report
  /// whether anything was removed. Child rows cascade inside the same
  /// transaction.
  async fn delete_one(&self, sql: &'static str, a: i64, b: Option<i64>) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = match b {
          Some(b) => tx.execute(sql, [a, b])?,
          None => tx.execute(sql, [a])?,
        };
        tx.commit()?;
        Ok(n > 0)
      })
      .await?;
    Ok(removed)
  }
}

// ─── MatchStore impl ─────────────────────────────────────────────────────────

impl MatchStore for SqliteStore {
  type Error = Error;

  // ── Staging ───────────────────────────────────────────────────────────────

  async fn stage_players(&self, rows: Vec<PlayerStaging>) -> Result<usize> {
    let sql = PLAYERS_STAGING.insert();
    let staged = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM players_staging", [])?;
        {
          let mut stmt = tx.prepare_cached(&sql)?;
          for r in &rows {
            stmt.execute(params![
              r.id,
              r.nickname,
              r.first_name,
              r.last_name,
              r.position_group_type,
              r.birth_date,
              r.height,
            ])?;
          }
        }
        tx.commit()?;
        Ok(rows.len())
      })
      .await?;
    Ok(staged)
  }

  async fn stage_competitions(&self, rows: Vec<CompetitionStaging>) -> Result<usize> {
    let sql = COMPETITIONS_STAGING.insert();
    let staged = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM competitions_staging", [])?;
        {
          let mut stmt = tx.prepare_cached(&sql)?;
          for r in &rows {
            stmt.execute(params![r.id, r.name, r.games])?;
          }
        }
        tx.commit()?;
        Ok(rows.len())
      })
      .await?;
    Ok(staged)
  }

  async fn staged_players(&self) -> Result<Vec<PlayerStaging>> {
    let sql = PLAYERS_STAGING.select("ORDER BY rowid");
    Ok(
      self
        .conn
        .call(move |conn| query_all(conn, &sql, [], player_staging_from_row))
        .await?,
    )
  }

  async fn staged_competitions(&self) -> Result<Vec<CompetitionStaging>> {
    let sql = COMPETITIONS_STAGING.select("ORDER BY rowid");
    Ok(
      self
        .conn
        .call(move |conn| query_all(conn, &sql, [], competition_staging_from_row))
        .await?,
    )
  }

  async fn clear_staging(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(
          "BEGIN;
           DELETE FROM players_staging;
           DELETE FROM competitions_staging;
           COMMIT;",
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Upserts ───────────────────────────────────────────────────────────────

  async fn upsert_players(&self, players: Vec<Player>) -> Result<()> {
    let sql = PLAYERS.upsert();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare_cached(&sql)?;
          for p in &players {
            stmt.execute(params![
              p.id,
              p.birth_date,
              p.first_name,
              p.last_name,
              p.nickname,
              p.height,
              p.position_group_type,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn load_competitions(&self, batch: CompetitionBatch) -> Result<()> {
    let (competitions, games) = (batch.competitions.len(), batch.games.len());
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        upsert_competitions(&tx, &batch.competitions)?;
        upsert_competition_games(&tx, &batch.games)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    tracing::debug!(competitions, games, "loaded competition batch");
    Ok(())
  }

  async fn load_matches(&self, batch: MatchBatch) -> Result<()> {
    let matches = batch.matches.len();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        upsert_competitions(&tx, &batch.competitions)?;
        upsert_matches(&tx, &batch.matches)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    tracing::debug!(matches, "loaded match batch");
    Ok(())
  }

  async fn load_roster(&self, batch: RosterBatch) -> Result<()> {
    let entries = batch.entries.len();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        upsert_roster(&tx, &batch)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    tracing::debug!(entries, "loaded roster batch");
    Ok(())
  }

  async fn load_events(&self, batch: EventBatch) -> Result<()> {
    let timeline = batch.timeline.len();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        upsert_events(&tx, &batch)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    tracing::debug!(timeline, "loaded event batch");
    Ok(())
  }

  async fn load_tracking(&self, batch: TrackingBatch) -> Result<()> {
    let frames = batch.frames.len();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        upsert_tracking(&tx, &batch)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    tracing::debug!(frames, "loaded tracking batch");
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_player(&self, id: i64) -> Result<Option<Player>> {
    let sql = PLAYERS.select("WHERE id = ?1");
    Ok(
      self
        .conn
        .call(move |conn| Ok(conn.query_row(&sql, [id], player_from_row).optional()?))
        .await?,
    )
  }

  async fn get_competition(&self, id: i64) -> Result<Option<Competition>> {
    let sql = COMPETITIONS.select("WHERE id = ?1");
    Ok(
      self
        .conn
        .call(move |conn| Ok(conn.query_row(&sql, [id], competition_from_row).optional()?))
        .await?,
    )
  }

  async fn competition_games(&self, competition_id: i64) -> Result<Vec<CompetitionGame>> {
    let sql = COMPETITION_GAMES.select("WHERE competition_id = ?1 ORDER BY game_id");
    Ok(
      self
        .conn
        .call(move |conn| query_all(conn, &sql, [competition_id], competition_game_from_row))
        .await?,
    )
  }

  async fn get_match(&self, match_id: i64) -> Result<Option<MatchMetadata>> {
    let sql = MATCH_METADATA.select("WHERE match_id = ?1");
    let raw = self
      .conn
      .call(move |conn| Ok(conn.query_row(&sql, [match_id], RawMatch::from_row).optional()?))
      .await?;
    raw.map(RawMatch::into_match).transpose()
  }

  async fn match_roster(&self, match_id: i64) -> Result<Vec<MatchRoster>> {
    let sql = MATCH_ROSTERS.select("WHERE match_id = ?1 ORDER BY team_id, player_id");
    Ok(
      self
        .conn
        .call(move |conn| query_all(conn, &sql, [match_id], match_roster_from_row))
        .await?,
    )
  }

  async fn frames_for_match(&self, game_id: i64) -> Result<Vec<TrackingFrame>> {
    let sql = TRACKING_FRAMES.select("WHERE game_id = ?1 ORDER BY video_time_ms, frame_num");
    let raws = self
      .conn
      .call(move |conn| query_all(conn, &sql, [game_id], RawFrame::from_row))
      .await?;
    raws.into_iter().map(RawFrame::into_frame).collect()
  }

  async fn ball_positions(&self, game_id: i64, frame_num: i64) -> Result<Vec<BallPosition>> {
    let sql = BALL_POSITIONS.select("WHERE game_id = ?1 AND frame_num = ?2 ORDER BY ball_idx");
    Ok(
      self
        .conn
        .call(move |conn| query_all(conn, &sql, [game_id, frame_num], ball_from_row))
        .await?,
    )
  }

  async fn player_positions(
    &self,
    game_id: i64,
    frame_num: i64,
  ) -> Result<Vec<SmoothedPlayerPosition>> {
    let sql = SMOOTHED_POSITIONS
      .select("WHERE game_id = ?1 AND frame_num = ?2 ORDER BY side, jersey_num");
    let raws = self
      .conn
      .call(move |conn| query_all(conn, &sql, [game_id, frame_num], RawSmoothedPosition::from_row))
      .await?;
    raws.into_iter().map(RawSmoothedPosition::into_position).collect()
  }

  async fn events_for_match(&self, match_id: i64) -> Result<Vec<EventTimeline>> {
    let sql = EVENT_TIMELINE
      .select("WHERE match_id = ?1 ORDER BY event_time, sequence, game_event_id");
    Ok(
      self
        .conn
        .call(move |conn| query_all(conn, &sql, [match_id], timeline_from_row))
        .await?,
    )
  }

  async fn get_game_event(&self, match_id: i64, game_event_id: i64) -> Result<Option<GameEvent>> {
    let sql = GAME_EVENTS.select("WHERE match_id = ?1 AND game_event_id = ?2");
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(conn.query_row(&sql, [match_id, game_event_id], game_event_from_row).optional()?)
        })
        .await?,
    )
  }

  async fn possession_detail(
    &self,
    match_id: i64,
    possession_event_id: i64,
  ) -> Result<Option<ResolvedPossession>> {
    let filter = "WHERE match_id = ?1 AND possession_event_id = ?2";
    let (event_sql, pass_sql, shot_sql) =
      (POSSESSION_EVENTS.select(filter), PASSES.select(filter), SHOTS.select(filter));
    let key = [match_id, possession_event_id];

    let resolved = self
      .conn
      .call(move |conn| {
        let Some(event) = conn.query_row(&event_sql, key, possession_from_row).optional()? else {
          return Ok(None);
        };
        let detail = match event.kind() {
          PossessionKind::Pass => conn
            .query_row(&pass_sql, key, pass_from_row)
            .optional()?
            .map_or(PossessionDetail::None, PossessionDetail::Pass),
          PossessionKind::Shot => conn
            .query_row(&shot_sql, key, shot_from_row)
            .optional()?
            .map_or(PossessionDetail::None, PossessionDetail::Shot),
          PossessionKind::Other => PossessionDetail::None,
        };
        Ok(Some(ResolvedPossession { event, detail }))
      })
      .await?;
    Ok(resolved)
  }

  async fn row_counts(&self) -> Result<RowCounts> {
    let counts = self
      .conn
      .call(|conn| {
        let mut counts = RowCounts::new();
        for table in CORE_TABLES {
          let n: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
          counts.insert((*table).to_owned(), n.unsigned_abs());
        }
        Ok(counts)
      })
      .await?;
    Ok(counts)
  }

  // ── Deletes ───────────────────────────────────────────────────────────────

  async fn delete_competition(&self, id: i64) -> Result<bool> {
    self.delete_one("DELETE FROM competitions WHERE id = ?1", id, None).await
  }

  async fn delete_roster_player(&self, id: i64) -> Result<bool> {
    self.delete_one("DELETE FROM roster_players WHERE id = ?1", id, None).await
  }

  async fn delete_frame(&self, game_id: i64, frame_num: i64) -> Result<bool> {
    self
      .delete_one(
        "DELETE FROM tracking_frames WHERE game_id = ?1 AND frame_num = ?2",
        game_id,
        Some(frame_num),
      )
      .await
  }

  async fn delete_possession_event(&self, match_id: i64, possession_event_id: i64) -> Result<bool> {
    self
      .delete_one(
        "DELETE FROM possession_events WHERE match_id = ?1 AND possession_event_id = ?2",
        match_id,
        Some(possession_event_id),
      )
      .await
  }

  async fn delete_match(&self, match_id: i64) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut n = 0;
        // Parents only; positions, game events, passes and shots cascade.
        for sql in [
          "DELETE FROM tracking_frames   WHERE game_id  = ?1",
          "DELETE FROM event_timeline    WHERE match_id = ?1",
          "DELETE FROM possession_events WHERE match_id = ?1",
          "DELETE FROM match_rosters     WHERE match_id = ?1",
          "DELETE FROM match_metadata    WHERE match_id = ?1",
        ] {
          n += tx.execute(sql, [match_id])?;
        }
        tx.commit()?;
        Ok(n > 0)
      })
      .await?;
    Ok(removed)
  }
}
