//! SQL schema for the Pitchside SQLite store.
//!
//! Executed at connection startup. `PRAGMA foreign_keys` is per connection,
//! so it must run every time; the DDL itself is idempotent.

/// Core tables in dependency order, parents first.
pub const CORE_TABLES: &[&str] = &[
  "players",
  "competitions",
  "competition_games",
  "match_metadata",
  "roster_players",
  "match_rosters",
  "tracking_frames",
  "tracking_ball_positions",
  "tracking_player_positions_smoothed",
  "event_timeline",
  "game_events",
  "possession_events",
  "passes",
  "shots",
];

pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Staging: source-shaped, unconstrained, disposable.
-- Nothing in the core schema references these tables.
CREATE TABLE IF NOT EXISTS players_staging (
    id                  TEXT,
    nickname            TEXT,
    first_name          TEXT,
    last_name           TEXT,
    position_group_type TEXT,
    birth_date          TEXT,
    height              TEXT
);

CREATE TABLE IF NOT EXISTS competitions_staging (
    id    TEXT,
    name  TEXT,
    games TEXT    -- single-quoted pseudo-JSON array
);

-- Dimensions.
CREATE TABLE IF NOT EXISTS players (
    id                  INTEGER PRIMARY KEY,
    birth_date          TEXT,
    first_name          TEXT,
    last_name           TEXT,
    nickname            TEXT,
    height              REAL,
    position_group_type TEXT
);

CREATE TABLE IF NOT EXISTS competitions (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS competition_games (
    competition_id INTEGER NOT NULL REFERENCES competitions(id) ON DELETE CASCADE,
    game_id        INTEGER NOT NULL,
    season         TEXT,
    PRIMARY KEY (competition_id, game_id)
);

CREATE TABLE IF NOT EXISTS match_metadata (
    match_id                        INTEGER PRIMARY KEY,
    competition_id                  INTEGER REFERENCES competitions(id) ON DELETE SET NULL,
    competition_name                TEXT,
    season                          TEXT,
    week                            INTEGER,
    match_date                      TEXT,
    home_team_id                    INTEGER,
    home_team_name                  TEXT,
    home_team_short                 TEXT,
    away_team_id                    INTEGER,
    away_team_name                  TEXT,
    away_team_short                 TEXT,
    stadium_id                      INTEGER,
    stadium_name                    TEXT,
    pitch_length                    REAL,
    pitch_width                     REAL,
    home_team_start_left            INTEGER,
    home_team_start_left_extra_time INTEGER,
    fps                             REAL,
    video_url                       TEXT,
    raw                             TEXT NOT NULL    -- full source document
);

-- Rosters.
CREATE TABLE IF NOT EXISTS roster_players (
    id       INTEGER PRIMARY KEY,
    nickname TEXT
);

CREATE TABLE IF NOT EXISTS match_rosters (
    match_id            INTEGER NOT NULL,
    team_id             INTEGER NOT NULL,
    player_id           INTEGER NOT NULL REFERENCES roster_players(id) ON DELETE CASCADE,
    position_group_type TEXT,
    shirt_number        INTEGER,
    started             INTEGER NOT NULL DEFAULT 0 CHECK (started IN (0, 1)),
    PRIMARY KEY (match_id, team_id, player_id)
);

-- Tracking.
CREATE TABLE IF NOT EXISTS tracking_frames (
    game_id                INTEGER NOT NULL,
    frame_num              INTEGER NOT NULL,
    video_time_ms          REAL,
    period                 INTEGER,
    period_elapsed_time    REAL,
    period_game_clock_time REAL,
    generated_time         TEXT,
    smoothed_time          TEXT,
    version                TEXT,
    game_event_id          INTEGER,
    possession_event_id    INTEGER,
    game_event             TEXT,    -- embedded JSON or NULL
    possession_event       TEXT,    -- embedded JSON or NULL
    PRIMARY KEY (game_id, frame_num)
);

CREATE TABLE IF NOT EXISTS tracking_ball_positions (
    game_id    INTEGER NOT NULL,
    frame_num  INTEGER NOT NULL,
    ball_idx   INTEGER NOT NULL,
    visibility TEXT,
    x          REAL,
    y          REAL,
    z          REAL,
    PRIMARY KEY (game_id, frame_num, ball_idx),
    FOREIGN KEY (game_id, frame_num)
        REFERENCES tracking_frames(game_id, frame_num) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS tracking_player_positions_smoothed (
    game_id    INTEGER NOT NULL,
    frame_num  INTEGER NOT NULL,
    side       TEXT    NOT NULL CHECK (side IN ('home', 'away')),
    jersey_num INTEGER NOT NULL,
    confidence TEXT,
    visibility TEXT,
    x          REAL,
    y          REAL,
    speed      REAL,
    PRIMARY KEY (game_id, frame_num, side, jersey_num),
    FOREIGN KEY (game_id, frame_num)
        REFERENCES tracking_frames(game_id, frame_num) ON DELETE CASCADE
);

-- Events.
CREATE TABLE IF NOT EXISTS event_timeline (
    match_id            INTEGER NOT NULL,
    game_event_id       INTEGER NOT NULL,
    possession_event_id INTEGER,
    start_time          REAL,
    end_time            REAL,
    duration            REAL,
    event_time          REAL,
    sequence            INTEGER,
    PRIMARY KEY (match_id, game_event_id)
);

CREATE TABLE IF NOT EXISTS game_events (
    match_id                   INTEGER NOT NULL,
    game_event_id              INTEGER NOT NULL,
    game_event_type            TEXT,
    period                     INTEGER,
    team_id                    INTEGER,
    team_name                  TEXT,
    player_id                  INTEGER,
    player_name                TEXT,
    start_game_clock           INTEGER,
    start_formatted_game_clock TEXT,
    initial_non_event          INTEGER,
    video_missing              INTEGER,
    PRIMARY KEY (match_id, game_event_id),
    FOREIGN KEY (match_id, game_event_id)
        REFERENCES event_timeline(match_id, game_event_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS possession_events (
    match_id              INTEGER NOT NULL,
    possession_event_id   INTEGER NOT NULL,
    possession_event_type TEXT,
    non_event             INTEGER,
    game_clock            REAL,
    formatted_game_clock  TEXT,
    ball_height_type      TEXT,
    body_type             TEXT,
    high_point_type       TEXT,
    PRIMARY KEY (match_id, possession_event_id)
);

CREATE TABLE IF NOT EXISTS passes (
    match_id             INTEGER NOT NULL,
    possession_event_id  INTEGER NOT NULL,
    passer_player_id     INTEGER,
    passer_player_name   TEXT,
    receiver_player_id   INTEGER,
    receiver_player_name TEXT,
    target_player_id     INTEGER,
    target_player_name   TEXT,
    pass_type            TEXT,
    pass_outcome_type    TEXT,
    PRIMARY KEY (match_id, possession_event_id),
    FOREIGN KEY (match_id, possession_event_id)
        REFERENCES possession_events(match_id, possession_event_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS shots (
    match_id                 INTEGER NOT NULL,
    possession_event_id      INTEGER NOT NULL,
    shooter_player_id        INTEGER,
    shooter_player_name      TEXT,
    shot_type                TEXT,
    shot_nature_type         TEXT,
    shot_initial_height_type TEXT,
    shot_outcome_type        TEXT,
    ball_moving              INTEGER,
    PRIMARY KEY (match_id, possession_event_id),
    FOREIGN KEY (match_id, possession_event_id)
        REFERENCES possession_events(match_id, possession_event_id) ON DELETE CASCADE
);

-- Range scans by match in temporal order.
CREATE INDEX IF NOT EXISTS tracking_frames_time_idx ON tracking_frames(game_id, video_time_ms, frame_num);
CREATE INDEX IF NOT EXISTS event_timeline_time_idx  ON event_timeline(match_id, event_time, sequence, game_event_id);
CREATE INDEX IF NOT EXISTS match_metadata_comp_idx  ON match_metadata(competition_id);
CREATE INDEX IF NOT EXISTS match_rosters_player_idx ON match_rosters(player_id);

PRAGMA user_version = 1;
";
