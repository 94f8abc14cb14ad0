//! SQLite schema creation and version checks.

use rusqlite::Connection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Schema version mismatch: expected at most {expected}, found {found}")]
    VersionMismatch { expected: i32, found: i32 },
}

/// Current schema version. Increment when adding migrations.
pub const CURRENT_VERSION: i32 = 1;

/// Create all tables and indexes if they don't exist.
///
/// This is idempotent: safe to call on an existing database.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    set_schema_version(conn, CURRENT_VERSION)?;
    Ok(())
}

/// Open or create a game database at the given path.
pub fn open_database(path: &std::path::Path) -> Result<Connection, SchemaError> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    let version = get_schema_version(&conn)?;
    if version == 0 {
        create_schema(&conn)?;
    } else if version > CURRENT_VERSION {
        return Err(SchemaError::VersionMismatch {
            expected: CURRENT_VERSION,
            found: version,
        });
    }

    Ok(conn)
}

/// Open an in-memory database with the full schema. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Get the current schema version, or 0 if no schema exists.
pub fn get_schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), SchemaError> {
    conn.execute(
        "INSERT INTO schema_version (version)
         SELECT ?1 WHERE NOT EXISTS (SELECT 1 FROM schema_version WHERE version = ?1)",
        [version],
    )?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS game (
    id TEXT PRIMARY KEY CHECK (id <> ''),
    parent_game_id TEXT NOT NULL DEFAULT '',
    title TEXT NOT NULL DEFAULT '',
    alternate_titles TEXT NOT NULL DEFAULT '',
    series TEXT NOT NULL DEFAULT '',
    developer TEXT NOT NULL DEFAULT '',
    publisher TEXT NOT NULL DEFAULT '',
    date_added TEXT NOT NULL DEFAULT '',
    date_modified TEXT NOT NULL DEFAULT '',
    platform TEXT NOT NULL DEFAULT '',
    broken BOOLEAN NOT NULL DEFAULT 0,
    extreme BOOLEAN NOT NULL DEFAULT 0,
    play_mode TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT '',
    notes TEXT NOT NULL DEFAULT '',
    tags TEXT NOT NULL DEFAULT '',
    source TEXT NOT NULL DEFAULT '',
    application_path TEXT NOT NULL DEFAULT '',
    launch_command TEXT NOT NULL DEFAULT '',
    release_date TEXT NOT NULL DEFAULT '',
    version TEXT NOT NULL DEFAULT '',
    original_description TEXT NOT NULL DEFAULT '',
    language TEXT NOT NULL DEFAULT '',
    library TEXT NOT NULL DEFAULT '',
    order_title TEXT NOT NULL DEFAULT ''
);
-- Keyset pagination walks (order column, id)
CREATE INDEX IF NOT EXISTS idx_game_title ON game(title, id);
CREATE INDEX IF NOT EXISTS idx_game_order_title ON game(order_title, id);
CREATE INDEX IF NOT EXISTS idx_game_developer ON game(developer, id);
CREATE INDEX IF NOT EXISTS idx_game_publisher ON game(publisher, id);
CREATE INDEX IF NOT EXISTS idx_game_series ON game(series, id);
CREATE INDEX IF NOT EXISTS idx_game_platform ON game(platform, id);
CREATE INDEX IF NOT EXISTS idx_game_date_added ON game(date_added, id);
CREATE INDEX IF NOT EXISTS idx_game_date_modified ON game(date_modified, id);
CREATE INDEX IF NOT EXISTS idx_game_release_date ON game(release_date, id);
CREATE INDEX IF NOT EXISTS idx_game_library ON game(library);

CREATE TABLE IF NOT EXISTS additional_app (
    id TEXT PRIMARY KEY CHECK (id <> ''),
    parent_game_id TEXT NOT NULL REFERENCES game(id),
    name TEXT NOT NULL DEFAULT '',
    application_path TEXT NOT NULL DEFAULT '',
    launch_command TEXT NOT NULL DEFAULT '',
    auto_run_before BOOLEAN NOT NULL DEFAULT 0,
    wait_for_exit BOOLEAN NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_additional_app_parent ON additional_app(parent_game_id);

CREATE TABLE IF NOT EXISTS playlist (
    id TEXT PRIMARY KEY CHECK (id <> ''),
    title TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    author TEXT NOT NULL DEFAULT '',
    icon TEXT NOT NULL DEFAULT '',
    library TEXT NOT NULL DEFAULT '',
    extreme BOOLEAN NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS playlist_game (
    playlist_id TEXT NOT NULL REFERENCES playlist(id),
    game_id TEXT NOT NULL REFERENCES game(id) ON DELETE CASCADE,
    position INTEGER NOT NULL DEFAULT 0,
    notes TEXT NOT NULL DEFAULT '',
    PRIMARY KEY (playlist_id, game_id)
);
CREATE INDEX IF NOT EXISTS idx_playlist_game_position ON playlist_game(playlist_id, position);
CREATE INDEX IF NOT EXISTS idx_playlist_game_game ON playlist_game(game_id);
"#;
