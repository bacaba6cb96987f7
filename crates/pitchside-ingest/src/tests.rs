//! End-to-end tests: source files on disk through `Pipeline` into an
//! in-memory `SqliteStore`.

use std::{
  fs,
  io::Write,
  path::{Path, PathBuf},
};

use bzip2::{Compression, write::BzEncoder};
use pitchside_core::{
  competition::CompetitionGame,
  event::PossessionDetail,
  store::MatchStore,
};
use pitchside_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tempfile::TempDir;

use crate::{BallSource, Error, IngestConfig, Pipeline};

async fn pipeline() -> Pipeline<SqliteStore> {
  pipeline_with(IngestConfig::default()).await
}

async fn pipeline_with(config: IngestConfig) -> Pipeline<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  Pipeline::new(store, config)
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
  let path = dir.join(name);
  fs::write(&path, contents).unwrap();
  path
}

fn write_json(dir: &Path, name: &str, doc: &Value) -> PathBuf {
  write(dir, name, &doc.to_string())
}

fn write_bz2_lines(dir: &Path, name: &str, lines: &[Value]) -> PathBuf {
  let path = dir.join(name);
  let mut enc = BzEncoder::new(fs::File::create(&path).unwrap(), Compression::default());
  for line in lines {
    writeln!(enc, "{line}").unwrap();
  }
  enc.finish().unwrap();
  path
}

// ─── Staging and normalization ───────────────────────────────────────────────

const PLAYERS_CSV: &str = "\
id,birthDate,firstName,lastName,nickname,height,positionGroupType
9,,A,,,,
9,,B,,Ace,,
10,1995-03-04,Cal,Doe,,181,FW
10,1995-03-04,Cal,Doe,,tall,
,,Nobody,,,,
";

const COMPETITIONS_CSV: &str = "\
id,name,games
5,League,\"[{'id': 100, 'season': '2021'}, {'id': 101, 'season': '2022'}]\"
6,Cup,[{'id': oops
";

#[tokio::test]
async fn staging_then_normalize_produces_one_row_per_id() {
  let dir = TempDir::new().unwrap();
  let p = pipeline().await;

  let staged = p.stage_players_csv(&write(dir.path(), "players.csv", PLAYERS_CSV)).await.unwrap();
  assert_eq!(staged.rows_for("players_staging"), 5);
  p.stage_competitions_csv(&write(dir.path(), "competitions.csv", COMPETITIONS_CSV))
    .await
    .unwrap();

  let report = p.normalize().await.unwrap();
  assert_eq!(report.rows_for("players"), 2);
  assert_eq!(report.rows_for("competitions"), 2);
  assert_eq!(report.rows_for("competition_games"), 2);
  assert_eq!(report.skipped, 1);
  assert!(report.finished_at.is_some());
  // The malformed games cell for competition 6 is reported, not fatal.
  assert!(report.issues.iter().any(|i| i.entity == "competition" && i.key == "6"));

  let s = p.store();
  let ace = s.get_player(9).await.unwrap().unwrap();
  assert_eq!(ace.nickname.as_deref(), Some("Ace"));
  assert_eq!(ace.first_name.as_deref(), Some("B"));
  assert_eq!(s.get_player(10).await.unwrap().unwrap().height, Some(181.0));

  assert_eq!(s.competition_games(5).await.unwrap(), vec![
    CompetitionGame { competition_id: 5, game_id: 100, season: Some("2021".into()) },
    CompetitionGame { competition_id: 5, game_id: 101, season: Some("2022".into()) },
  ]);
  assert_eq!(s.get_competition(6).await.unwrap().unwrap().name, "Cup");
  assert!(s.competition_games(6).await.unwrap().is_empty());
}

#[tokio::test]
async fn normalizing_twice_changes_nothing() {
  let dir = TempDir::new().unwrap();
  let p = pipeline().await;
  p.stage_players_csv(&write(dir.path(), "players.csv", PLAYERS_CSV)).await.unwrap();
  p.stage_competitions_csv(&write(dir.path(), "competitions.csv", COMPETITIONS_CSV))
    .await
    .unwrap();

  p.normalize().await.unwrap();
  let once = p.store().row_counts().await.unwrap();
  let player_once = p.store().get_player(9).await.unwrap();
  p.normalize().await.unwrap();

  assert_eq!(p.store().row_counts().await.unwrap(), once);
  assert_eq!(p.store().get_player(9).await.unwrap(), player_once);
}

#[tokio::test]
async fn latest_import_overwrites_earlier_values() {
  let dir = TempDir::new().unwrap();
  let p = pipeline().await;
  let import = |tag: &str, height: u32, name: &str| {
    (
      write(dir.path(), &format!("players_{tag}.csv"), &format!("id,nickname,height\n1,Ace,{height}\n")),
      write(dir.path(), &format!("comps_{tag}.csv"), &format!("id,name,games\n5,{name},\n")),
    )
  };

  for (players, comps) in [import("v1", 185, "FIFA World Cup"), import("v2", 190, "World Cup")] {
    p.stage_players_csv(&players).await.unwrap();
    p.stage_competitions_csv(&comps).await.unwrap();
    p.normalize().await.unwrap();
  }

  assert_eq!(p.store().staged_players().await.unwrap().len(), 1);
  assert_eq!(p.store().get_player(1).await.unwrap().unwrap().height, Some(190.0));
  assert_eq!(p.store().get_competition(5).await.unwrap().unwrap().name, "World Cup");
}

#[tokio::test]
async fn clearing_staging_keeps_normalized_rows() {
  let dir = TempDir::new().unwrap();
  let p = pipeline().await;
  p.stage_players_csv(&write(dir.path(), "players.csv", PLAYERS_CSV)).await.unwrap();
  p.normalize().await.unwrap();

  p.clear_staging().await.unwrap();

  assert!(p.store().staged_players().await.unwrap().is_empty());
  assert_eq!(p.store().row_counts().await.unwrap()["players"], 2);
}

// ─── Match metadata ──────────────────────────────────────────────────────────

fn metadata(id: i64, competition: Value) -> Value {
  json!({
    "id": id,
    "competition": competition,
    "season": "2022",
    "homeTeam": { "id": 1, "name": "Home", "shortName": "HOM" },
    "awayTeam": { "id": 2, "name": "Away", "shortName": "AWY" },
    "stadium": { "id": 3, "name": "Ground", "pitches": [{ "length": 105, "width": 68 }] },
    "fps": 29.97
  })
}

#[tokio::test]
async fn metadata_dir_loads_matches_and_their_competition() {
  let dir = TempDir::new().unwrap();
  write_json(dir.path(), "3812.json", &metadata(3812, json!({ "id": 1, "name": "Old name" })));
  write_json(dir.path(), "3813.json", &json!([metadata(3813, json!({ "id": 1, "name": "New name" }))]));
  write(dir.path(), "notes.txt", "ignored");
  let p = pipeline().await;

  let report = p.load_metadata_dir(dir.path()).await.unwrap();
  assert_eq!(report.rows_for("match_metadata"), 2);

  let s = p.store();
  assert_eq!(s.get_competition(1).await.unwrap().unwrap().name, "New name");
  let m = s.get_match(3813).await.unwrap().unwrap();
  assert_eq!(m.competition_id, Some(1));
  assert_eq!(m.pitch_width, Some(68.0));
  assert_eq!(m.raw["homeTeam"]["shortName"], "HOM");
}

#[tokio::test]
async fn nameless_unknown_competition_is_unlinked_with_an_issue() {
  let dir = TempDir::new().unwrap();
  let path = write_json(dir.path(), "4000.json", &metadata(4000, json!({ "id": 77 })));
  let p = pipeline().await;

  let report = p.load_metadata_file(&path).await.unwrap();
  assert_eq!(report.issues.len(), 1);
  assert_eq!(p.store().get_match(4000).await.unwrap().unwrap().competition_id, None);
}

#[tokio::test]
async fn nameless_known_competition_stays_linked() {
  let dir = TempDir::new().unwrap();
  let first = write_json(dir.path(), "1.json", &metadata(1, json!({ "id": 7, "name": "Cup" })));
  let second = write_json(dir.path(), "2.json", &metadata(2, json!({ "id": 7 })));
  let p = pipeline().await;

  p.load_metadata_file(&first).await.unwrap();
  let report = p.load_metadata_file(&second).await.unwrap();

  assert!(report.issues.is_empty());
  assert_eq!(p.store().get_match(2).await.unwrap().unwrap().competition_id, Some(7));
  assert_eq!(p.store().get_competition(7).await.unwrap().unwrap().name, "Cup");
}

// ─── Rosters ─────────────────────────────────────────────────────────────────

fn roster_doc() -> Value {
  json!([
    { "player": { "id": 100, "nickname": "Keeper" }, "team": { "id": 1 },
      "positionGroupType": "GK", "shirtNumber": 1, "started": true },
    { "player": { "id": 101 }, "team": { "id": 1 }, "shirtNumber": "nan" },
    { "player": { "id": 102 }, "team": { "id": 2 }, "shirtNumber": "" },
  ])
}

#[tokio::test]
async fn roster_match_id_comes_from_the_file_name() {
  let dir = TempDir::new().unwrap();
  write_json(dir.path(), "roster_3812.json", &roster_doc());
  let p = pipeline().await;

  let report = p.load_rosters_dir(dir.path()).await.unwrap();
  assert_eq!(report.rows_for("match_rosters"), 3);

  let roster = p.store().match_roster(3812).await.unwrap();
  assert_eq!(roster.len(), 3);
  let keeper = roster.iter().find(|r| r.player_id == 100).unwrap();
  assert!(keeper.started);
  assert_eq!(keeper.shirt_number, Some(1));
  assert!(roster.iter().filter(|r| r.player_id != 100).all(|r| r.shirt_number.is_none()));
}

#[tokio::test]
async fn roster_without_id_in_name_is_rejected() {
  let dir = TempDir::new().unwrap();
  let path = write_json(dir.path(), "roster.json", &roster_doc());
  let p = pipeline().await;

  let err = p.load_roster_file(&path).await.unwrap_err();
  assert!(matches!(err, Error::InvalidFileName(_)));
}

// ─── Events ──────────────────────────────────────────────────────────────────

fn events_doc() -> Value {
  json!([
    {
      "gameEventId": 1, "possessionEventId": 10, "eventTime": 5.0, "sequence": 1,
      "gameEvents": { "gameEventType": "OTB", "teamId": 1 },
      "possessionEvents": { "possessionEventType": "PA", "passerPlayerId": 100,
                            "passOutcomeType": "C" }
    },
    {
      "gameEventId": 2, "possessionEventId": 20, "eventTime": 9.0, "sequence": 2,
      "gameEvents": { "gameEventType": "OTB", "teamId": 1 },
      "possessionEvents": { "possessionEventType": "SH", "shooterPlayerId": 101,
                            "shotOutcomeType": "G" }
    },
    {
      "gameEventId": 3, "eventTime": 1.0, "sequence": 0,
      "gameEvents": { "gameEventType": "KO" }
    }
  ])
}

#[tokio::test]
async fn events_load_with_specializations_and_reload_idempotently() {
  let dir = TempDir::new().unwrap();
  let path = write_json(dir.path(), "3812.json", &events_doc());
  let p = pipeline().await;

  let report = p.load_events_file(&path).await.unwrap();
  assert_eq!(report.rows_for("event_timeline"), 3);
  assert_eq!(report.rows_for("possession_events"), 2);
  let once = p.store().row_counts().await.unwrap();

  p.load_events_dir(dir.path()).await.unwrap();
  assert_eq!(p.store().row_counts().await.unwrap(), once);

  let s = p.store();
  let ordered: Vec<_> =
    s.events_for_match(3812).await.unwrap().iter().map(|e| e.game_event_id).collect();
  assert_eq!(ordered, vec![3, 1, 2]);

  let pass = s.possession_detail(3812, 10).await.unwrap().unwrap();
  assert!(matches!(pass.detail, PossessionDetail::Pass(ref p) if p.passer_player_id == Some(100)));
  let shot = s.possession_detail(3812, 20).await.unwrap().unwrap();
  assert!(matches!(
    shot.detail,
    PossessionDetail::Shot(ref s) if s.shot_outcome_type.as_deref() == Some("G")
  ));
}

// ─── Tracking ────────────────────────────────────────────────────────────────

fn frame_line(frame: i64, t: f64) -> Value {
  json!({
    "frameNum": frame,
    "videoTimeMs": t,
    "period": 1,
    "possession_event_id": 10,
    "possession_event": { "possession_event_type": "PA" },
    "ballsSmoothed": { "x": 0.5, "y": 0.5, "z": 0.0 },
    "balls": [{ "x": 0.4 }, { "x": 0.6 }],
    "homePlayersSmoothed": [{ "jerseyNum": 1, "x": -50.0 }, { "jerseyNum": 4 }],
    "awayPlayersSmoothed": [{ "jerseyNum": 1, "x": 50.0 }],
  })
}

fn tracking_lines() -> Vec<Value> {
  // 30 fps for one second.
  (0..30).map(|i| frame_line(i, i as f64 * 100.0 / 3.0)).collect()
}

#[tokio::test]
async fn compressed_tracking_is_downsampled_and_batched() {
  let dir = TempDir::new().unwrap();
  let path = write_bz2_lines(dir.path(), "3812.jsonl.bz2", &tracking_lines());
  let mut config = IngestConfig::default();
  config.tracking.frames_per_batch = 4;
  let p = pipeline_with(config).await;

  let report = p.load_tracking_files(&[path.clone()]).await.unwrap();
  // 0, 100, 200, ..., 900 ms (frames 0, 3, 6, ..., 27).
  assert_eq!(report.rows_for("tracking_frames"), 10);
  assert_eq!(report.rows_for("tracking_ball_positions"), 10);
  assert_eq!(report.rows_for("tracking_player_positions_smoothed"), 30);

  let s = p.store();
  let frames = s.frames_for_match(3812).await.unwrap();
  let kept: Vec<i64> = frames.iter().map(|f| f.frame_num).collect();
  assert_eq!(kept, (0..30i64).step_by(3).collect::<Vec<_>>());
  assert_eq!(frames[0].possession_event, Some(json!({ "possession_event_type": "PA" })));
  assert_eq!(s.player_positions(3812, 3).await.unwrap().len(), 3);

  let once = s.row_counts().await.unwrap();
  p.load_tracking_file(&path).await.unwrap();
  assert_eq!(s.row_counts().await.unwrap(), once);
}

#[tokio::test]
async fn raw_ball_source_and_plain_jsonl() {
  let dir = TempDir::new().unwrap();
  let lines: Vec<String> = tracking_lines().iter().map(Value::to_string).collect();
  let path = write(dir.path(), "77.jsonl", &lines.join("\n"));
  let mut config = IngestConfig::default();
  config.tracking.ball_source = BallSource::Raw;
  config.tracking.min_frame_gap_ms = 500.0;
  let p = pipeline_with(config).await;

  let report = p.load_tracking_file(&path).await.unwrap();
  assert_eq!(report.rows_for("tracking_frames"), 2);
  assert_eq!(report.rows_for("tracking_ball_positions"), 4);
  assert_eq!(p.store().ball_positions(77, 15).await.unwrap().len(), 2);
}

#[tokio::test]
async fn tracking_files_without_game_id_are_skipped() {
  let dir = TempDir::new().unwrap();
  let good = write_bz2_lines(dir.path(), "5.jsonl.bz2", &tracking_lines()[..3]);
  let bad = write_bz2_lines(dir.path(), "match.jsonl.bz2", &tracking_lines()[..3]);
  let p = pipeline().await;

  let report = p.load_tracking_files(&[bad, good]).await.unwrap();
  assert_eq!(report.skipped, 1);
  assert_eq!(report.rows_for("tracking_frames"), 1);
}
