//! The `MatchStore` trait and the load-batch types it accepts.
//!
//! The trait is implemented by storage backends (e.g.
//! `pitchside-store-sqlite`). The ingest pipeline and the CLI depend on this
//! abstraction, not on any concrete backend.
//!
//! Every `load_*` method applies one batch as a single transaction, writing
//! parent tables before child tables. Rows whose primary key already exists
//! have all non-key columns replaced; absent rows are inserted. Applying the
//! same batch twice leaves the store as applying it once. A child row whose
//! parent is neither in the batch nor already stored aborts the whole batch.

use std::{collections::BTreeMap, future::Future};

use crate::{
  competition::{Competition, CompetitionGame, CompetitionStaging},
  event::{EventTimeline, GameEvent, Pass, PossessionEvent, ResolvedPossession, Shot},
  fixture::MatchMetadata,
  player::{Player, PlayerStaging},
  roster::{MatchRoster, RosterPlayer},
  tracking::{BallPosition, SmoothedPlayerPosition, TrackingFrame},
};

// ─── Batches ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompetitionBatch {
  pub competitions: Vec<Competition>,
  pub games:        Vec<CompetitionGame>,
}

/// Match metadata plus the competitions it references.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchBatch {
  pub competitions: Vec<Competition>,
  pub matches:      Vec<MatchMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterBatch {
  pub players: Vec<RosterPlayer>,
  pub entries: Vec<MatchRoster>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventBatch {
  pub timeline:    Vec<EventTimeline>,
  pub game_events: Vec<GameEvent>,
  pub possessions: Vec<PossessionEvent>,
  pub passes:      Vec<Pass>,
  pub shots:       Vec<Shot>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackingBatch {
  pub frames:  Vec<TrackingFrame>,
  pub balls:   Vec<BallPosition>,
  pub players: Vec<SmoothedPlayerPosition>,
}

impl TrackingBatch {
  pub fn is_empty(&self) -> bool {
    self.frames.is_empty() && self.balls.is_empty() && self.players.is_empty()
  }
}

/// Row count per core table, keyed by table name.
pub type RowCounts = BTreeMap<String, u64>;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Pitchside match store backend.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes.
pub trait MatchStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Staging ───────────────────────────────────────────────────────────

  /// Replace the player staging table with `rows`, in one transaction. No
  /// validation is performed.
  fn stage_players(
    &self,
    rows: Vec<PlayerStaging>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Replace the competition staging table with `rows`, in one transaction.
  /// No validation is performed.
  fn stage_competitions(
    &self,
    rows: Vec<CompetitionStaging>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn staged_players(
    &self,
  ) -> impl Future<Output = Result<Vec<PlayerStaging>, Self::Error>> + Send + '_;

  fn staged_competitions(
    &self,
  ) -> impl Future<Output = Result<Vec<CompetitionStaging>, Self::Error>> + Send + '_;

  /// Empty the staging tables. Core tables are untouched.
  fn clear_staging(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Upserts ───────────────────────────────────────────────────────────

  fn upsert_players(
    &self,
    players: Vec<Player>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn load_competitions(
    &self,
    batch: CompetitionBatch,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn load_matches(
    &self,
    batch: MatchBatch,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn load_roster(
    &self,
    batch: RosterBatch,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn load_events(
    &self,
    batch: EventBatch,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn load_tracking(
    &self,
    batch: TrackingBatch,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn get_player(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Player>, Self::Error>> + Send + '_;

  fn get_competition(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Competition>, Self::Error>> + Send + '_;

  fn competition_games(
    &self,
    competition_id: i64,
  ) -> impl Future<Output = Result<Vec<CompetitionGame>, Self::Error>> + Send + '_;

  fn get_match(
    &self,
    match_id: i64,
  ) -> impl Future<Output = Result<Option<MatchMetadata>, Self::Error>> + Send + '_;

  fn match_roster(
    &self,
    match_id: i64,
  ) -> impl Future<Output = Result<Vec<MatchRoster>, Self::Error>> + Send + '_;

  /// All frames of a match ordered by video time, then frame number.
  fn frames_for_match(
    &self,
    game_id: i64,
  ) -> impl Future<Output = Result<Vec<TrackingFrame>, Self::Error>> + Send + '_;

  fn ball_positions(
    &self,
    game_id: i64,
    frame_num: i64,
  ) -> impl Future<Output = Result<Vec<BallPosition>, Self::Error>> + Send + '_;

  fn player_positions(
    &self,
    game_id: i64,
    frame_num: i64,
  ) -> impl Future<Output = Result<Vec<SmoothedPlayerPosition>, Self::Error>> + Send + '_;

  /// All timeline rows of a match ordered by event time, then sequence.
  fn events_for_match(
    &self,
    match_id: i64,
  ) -> impl Future<Output = Result<Vec<EventTimeline>, Self::Error>> + Send + '_;

  fn get_game_event(
    &self,
    match_id: i64,
    game_event_id: i64,
  ) -> impl Future<Output = Result<Option<GameEvent>, Self::Error>> + Send + '_;

  /// A possession event with its pass or shot specialization attached.
  fn possession_detail(
    &self,
    match_id: i64,
    possession_event_id: i64,
  ) -> impl Future<Output = Result<Option<ResolvedPossession>, Self::Error>> + Send + '_;

  fn row_counts(&self) -> impl Future<Output = Result<RowCounts, Self::Error>> + Send + '_;

  // ── Deletes ───────────────────────────────────────────────────────────
  //
  // Each returns whether the parent row existed. Child rows go with it.

  fn delete_competition(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn delete_roster_player(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn delete_frame(
    &self,
    game_id: i64,
    frame_num: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn delete_possession_event(
    &self,
    match_id: i64,
    possession_event_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Remove a match's metadata, roster, events and tracking data.
  fn delete_match(
    &self,
    match_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
