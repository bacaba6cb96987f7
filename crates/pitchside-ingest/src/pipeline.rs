//! [`Pipeline`]: drives source files through decoding, normalization, and the
//! store's transactional loads, reporting what each run did.

use std::{
  fs::File,
  path::{Path, PathBuf},
};

use pitchside_core::{
  normalize::{normalize_competitions, normalize_players},
  report::{LoadReport, NormalizationIssue},
  store::{MatchBatch, MatchStore},
};

use crate::{
  config::IngestConfig,
  error::{Error, Result},
  events, metadata, roster, source, staging,
  tracking::FrameReader,
};

pub struct Pipeline<S> {
  store:  S,
  config: IngestConfig,
}

fn open(path: &Path) -> Result<File> { File::open(path).map_err(|e| Error::io(path, e)) }

fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
  let files = source::json_files(dir)?;
  if files.is_empty() {
    tracing::warn!(dir = %dir.display(), "no .json files found");
  }
  Ok(files)
}

fn log_issues(report: &LoadReport) {
  for issue in &report.issues {
    tracing::warn!(entity = %issue.entity, key = %issue.key, "{}", issue.message);
  }
}

impl<S: MatchStore> Pipeline<S> {
  pub fn new(store: S, config: IngestConfig) -> Self { Self { store, config } }

  pub fn store(&self) -> &S { &self.store }

  pub fn config(&self) -> &IngestConfig { &self.config }

  // ── Staging ───────────────────────────────────────────────────────────────

  pub async fn stage_players_csv(&self, path: &Path) -> Result<LoadReport> {
    let mut report = LoadReport::start(path.display().to_string());
    let rows = staging::read_players(open(path)?)?;
    let n = self.store.stage_players(rows).await.map_err(Error::store)?;
    report.add_rows("players_staging", n);
    tracing::info!(path = %path.display(), rows = n, "staged players");
    Ok(report.finish())
  }

  pub async fn stage_competitions_csv(&self, path: &Path) -> Result<LoadReport> {
    let mut report = LoadReport::start(path.display().to_string());
    let rows = staging::read_competitions(open(path)?)?;
    let n = self.store.stage_competitions(rows).await.map_err(Error::store)?;
    report.add_rows("competitions_staging", n);
    tracing::info!(path = %path.display(), rows = n, "staged competitions");
    Ok(report.finish())
  }

  /// Collapse everything in staging into the canonical `players`,
  /// `competitions` and `competition_games` tables. Staging is left in place.
  pub async fn normalize(&self) -> Result<LoadReport> {
    let mut report = LoadReport::start("staging");

    let staged = self.store.staged_players().await.map_err(Error::store)?;
    let players = normalize_players(staged);
    report.add_rows("players", players.players.len());
    report.skipped += players.discarded as u64;
    report.issues.extend(players.issues);
    self.store.upsert_players(players.players).await.map_err(Error::store)?;

    let staged = self.store.staged_competitions().await.map_err(Error::store)?;
    let comps = normalize_competitions(staged);
    report.add_rows("competitions", comps.batch.competitions.len());
    report.add_rows("competition_games", comps.batch.games.len());
    report.skipped += comps.discarded as u64;
    report.issues.extend(comps.issues);
    self.store.load_competitions(comps.batch).await.map_err(Error::store)?;

    log_issues(&report);
    tracing::info!(%report, "normalized staging");
    Ok(report.finish())
  }

  pub async fn clear_staging(&self) -> Result<()> {
    self.store.clear_staging().await.map_err(Error::store)?;
    tracing::info!("cleared staging");
    Ok(())
  }

  // ── Match metadata ────────────────────────────────────────────────────────

  pub async fn load_metadata_file(&self, path: &Path) -> Result<LoadReport> {
    let mut report = LoadReport::start(path.display().to_string());
    let metadata::DecodedMatch { mut fixture, competition } =
      metadata::decode(path, source::read_json(path)?)?;

    // A competition referenced without a name can only be linked if it is
    // already stored.
    if competition.is_none()
      && let Some(id) = fixture.competition_id
      && self.store.get_competition(id).await.map_err(Error::store)?.is_none()
    {
      report.issues.push(NormalizationIssue::new(
        "match",
        fixture.match_id.to_string(),
        format!("competition {id} has no name and is not stored; link dropped"),
      ));
      fixture.competition_id = None;
    }

    let competitions: Vec<_> = competition.into_iter().collect();
    report.add_rows("competitions", competitions.len());
    report.add_rows("match_metadata", 1);
    self
      .store
      .load_matches(MatchBatch { competitions, matches: vec![fixture] })
      .await
      .map_err(Error::store)?;

    log_issues(&report);
    tracing::info!(%report, "loaded match metadata");
    Ok(report.finish())
  }

  pub async fn load_metadata_dir(&self, dir: &Path) -> Result<LoadReport> {
    let mut total = LoadReport::start(dir.display().to_string());
    for path in json_files(dir)? {
      total.absorb(self.load_metadata_file(&path).await?);
    }
    Ok(total.finish())
  }

  // ── Rosters ───────────────────────────────────────────────────────────────

  pub async fn load_roster_file(&self, path: &Path) -> Result<LoadReport> {
    let match_id =
      source::id_from_digit_run(path).ok_or_else(|| Error::InvalidFileName(path.into()))?;
    let mut report = LoadReport::start(path.display().to_string());

    let decoded = roster::decode(path, match_id, &source::read_json(path)?)?;
    report.skipped += decoded.skipped as u64;
    report.add_rows("roster_players", decoded.batch.players.len());
    report.add_rows("match_rosters", decoded.batch.entries.len());
    self.store.load_roster(decoded.batch).await.map_err(Error::store)?;

    tracing::info!(%report, match_id, "loaded roster");
    Ok(report.finish())
  }

  pub async fn load_rosters_dir(&self, dir: &Path) -> Result<LoadReport> {
    let mut total = LoadReport::start(dir.display().to_string());
    for path in json_files(dir)? {
      total.absorb(self.load_roster_file(&path).await?);
    }
    Ok(total.finish())
  }

  // ── Events ────────────────────────────────────────────────────────────────

  pub async fn load_events_file(&self, path: &Path) -> Result<LoadReport> {
    let match_id = source::id_from_stem(path).ok_or_else(|| Error::InvalidFileName(path.into()))?;
    let mut report = LoadReport::start(path.display().to_string());

    let decoded = events::decode(path, match_id, &source::read_json(path)?)?;
    let b = &decoded.batch;
    report.skipped += decoded.skipped as u64;
    report.add_rows("event_timeline", b.timeline.len());
    report.add_rows("game_events", b.game_events.len());
    report.add_rows("possession_events", b.possessions.len());
    report.add_rows("passes", b.passes.len());
    report.add_rows("shots", b.shots.len());
    self.store.load_events(decoded.batch).await.map_err(Error::store)?;

    tracing::info!(%report, match_id, "loaded events");
    Ok(report.finish())
  }

  pub async fn load_events_dir(&self, dir: &Path) -> Result<LoadReport> {
    let mut total = LoadReport::start(dir.display().to_string());
    for path in json_files(dir)? {
      total.absorb(self.load_events_file(&path).await?);
    }
    Ok(total.finish())
  }

  // ── Tracking ──────────────────────────────────────────────────────────────

  /// Stream one tracking file into the store, one transaction per batch.
  /// Batches already flushed stay committed if a later one fails.
  pub async fn load_tracking_file(&self, path: &Path) -> Result<LoadReport> {
    let game_id = source::id_from_prefix(path).ok_or_else(|| Error::InvalidFileName(path.into()))?;
    let mut report = LoadReport::start(path.display().to_string());
    let cfg = &self.config.tracking;

    let mut reader = FrameReader::new(path, source::open_lines(path)?, game_id, cfg);
    while let Some(batch) = reader.next_batch(cfg.frames_per_batch)? {
      let (frames, balls, players) = (batch.frames.len(), batch.balls.len(), batch.players.len());
      self.store.load_tracking(batch).await.map_err(Error::store)?;
      report.add_rows("tracking_frames", frames);
      report.add_rows("tracking_ball_positions", balls);
      report.add_rows("tracking_player_positions_smoothed", players);
      tracing::debug!(game_id, frames, balls, players, "flushed tracking batch");
    }

    let stats = reader.stats();
    report.skipped += stats.skipped as u64;
    tracing::info!(%report, game_id, lines = stats.lines, kept = stats.kept, "loaded tracking");
    Ok(report.finish())
  }

  /// Load several tracking files. Files whose name carries no game id are
  /// skipped with a warning rather than failing the run.
  pub async fn load_tracking_files(&self, files: &[PathBuf]) -> Result<LoadReport> {
    let mut total = LoadReport::start("tracking");
    for path in files {
      match self.load_tracking_file(path).await {
        Err(Error::InvalidFileName(path)) => {
          tracing::warn!(path = %path.display(), "cannot infer game id; skipping file");
          total.skipped += 1;
        }
        other => total.absorb(other?),
      }
    }
    Ok(total.finish())
  }
}
