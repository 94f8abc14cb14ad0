//! Write operations for games, additional apps and playlists.
//!
//! These work on a bare connection and know nothing about the page-index
//! cache; [`crate::Catalog`] wraps them and invalidates after every write.

use std::fmt;
use std::str::FromStr;

use arcadia_catalog::{Game, Playlist, PlaylistGame};
use rusqlite::{params, Connection};
use thiserror::Error;

use crate::queries;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    UnknownField(#[from] arcadia_catalog::UnknownField),
    #[error("Invalid value '{value}' for field '{field}'")]
    InvalidFilterValue { field: String, value: String },
    #[error("Page size must be at least 1")]
    InvalidPageSize,
    #[error("Bulk update failed in chunk {chunk} of {chunks} ({committed} games already committed): {source}")]
    ChunkFailed {
        chunk: usize,
        chunks: usize,
        committed: usize,
        #[source]
        source: rusqlite::Error,
    },
    #[error("Could not serialize cache key: {0}")]
    CacheKey(#[from] serde_json::Error),
}

/// Outcome of a successful bulk update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkUpdateStats {
    pub games: usize,
    pub chunks: usize,
}

// ── Game Operations ─────────────────────────────────────────────────────────

/// Insert or update a game and its additional apps in one transaction.
pub(crate) fn save_game(conn: &Connection, game: &Game) -> Result<(), OperationError> {
    let tx = conn.unchecked_transaction()?;
    upsert_game(&tx, game)?;
    tx.commit()?;
    Ok(())
}

/// Upsert many games, committing every `chunk_size` games.
///
/// A failing chunk rolls back only itself; earlier chunks stay committed and
/// the error reports how far the update got.
pub(crate) fn save_games_chunked(
    conn: &Connection,
    games: &[Game],
    chunk_size: usize,
) -> Result<BulkUpdateStats, OperationError> {
    let chunk_size = chunk_size.max(1);
    let chunks = games.len().div_ceil(chunk_size);
    let mut committed = 0;

    for (i, chunk) in games.chunks(chunk_size).enumerate() {
        if let Err(source) = save_chunk(conn, chunk) {
            log::warn!(
                "Bulk update stopped at chunk {}/{} with {} games committed",
                i + 1,
                chunks,
                committed
            );
            return Err(OperationError::ChunkFailed {
                chunk: i + 1,
                chunks,
                committed,
                source,
            });
        }

        committed += chunk.len();
        log::info!("  [{}/{}] saved {} games", i + 1, chunks, committed);
    }

    Ok(BulkUpdateStats {
        games: committed,
        chunks,
    })
}

fn save_chunk(conn: &Connection, chunk: &[Game]) -> rusqlite::Result<()> {
    let tx = conn.unchecked_transaction()?;
    for game in chunk {
        upsert_game(&tx, game)?;
    }
    tx.commit()
}

/// Upsert many games in a single transaction: all or nothing.
pub(crate) fn save_games_atomic(
    conn: &Connection,
    games: &[Game],
) -> Result<BulkUpdateStats, OperationError> {
    let tx = conn.unchecked_transaction()?;
    for game in games {
        upsert_game(&tx, game)?;
    }
    tx.commit()?;
    log::info!("Saved {} games in one transaction", games.len());
    Ok(BulkUpdateStats {
        games: games.len(),
        chunks: usize::from(!games.is_empty()),
    })
}

/// Delete a game's additional apps and then the game itself.
///
/// With `atomic` both deletes share a transaction; otherwise each commits on
/// its own. Returns the removed game, or `None` if it did not exist.
pub(crate) fn delete_game_and_add_apps(
    conn: &Connection,
    id: &str,
    atomic: bool,
) -> Result<Option<Game>, OperationError> {
    let Some(game) = queries::find_game(conn, id)? else {
        return Ok(None);
    };

    if atomic {
        let tx = conn.unchecked_transaction()?;
        delete_add_apps(&tx, id)?;
        delete_game_row(&tx, id)?;
        tx.commit()?;
    } else {
        delete_add_apps(conn, id)?;
        delete_game_row(conn, id)?;
    }
    Ok(Some(game))
}

/// Copy a game and its additional apps under fresh ids.
pub(crate) fn duplicate_game(conn: &Connection, id: &str) -> Result<Option<Game>, OperationError> {
    let Some(mut game) = queries::find_game(conn, id)? else {
        return Ok(None);
    };

    game.id = new_id();
    game.date_modified = now_timestamp();
    for app in &mut game.add_apps {
        app.id = new_id();
        app.parent_game_id = game.id.clone();
    }

    save_game(conn, &game)?;
    Ok(Some(game))
}

fn upsert_game(conn: &Connection, game: &Game) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO game (id, parent_game_id, title, alternate_titles, series, developer,
             publisher, date_added, date_modified, platform, broken, extreme, play_mode, status,
             notes, tags, source, application_path, launch_command, release_date, version,
             original_description, language, library, order_title)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
             ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25)
         ON CONFLICT(id) DO UPDATE SET
             parent_game_id = excluded.parent_game_id,
             title = excluded.title,
             alternate_titles = excluded.alternate_titles,
             series = excluded.series,
             developer = excluded.developer,
             publisher = excluded.publisher,
             date_added = excluded.date_added,
             date_modified = excluded.date_modified,
             platform = excluded.platform,
             broken = excluded.broken,
             extreme = excluded.extreme,
             play_mode = excluded.play_mode,
             status = excluded.status,
             notes = excluded.notes,
             tags = excluded.tags,
             source = excluded.source,
             application_path = excluded.application_path,
             launch_command = excluded.launch_command,
             release_date = excluded.release_date,
             version = excluded.version,
             original_description = excluded.original_description,
             language = excluded.language,
             library = excluded.library,
             order_title = excluded.order_title",
        params![
            game.id,
            game.parent_game_id,
            game.title,
            game.alternate_titles,
            game.series,
            game.developer,
            game.publisher,
            game.date_added,
            game.date_modified,
            game.platform,
            game.broken,
            game.extreme,
            game.play_mode,
            game.status,
            game.notes,
            game.tags,
            game.source,
            game.application_path,
            game.launch_command,
            game.release_date,
            game.version,
            game.original_description,
            game.language,
            game.library,
            game.order_title,
        ],
    )?;

    // Add apps always belong to the game they are saved with
    for app in &game.add_apps {
        conn.execute(
            "INSERT INTO additional_app (id, parent_game_id, name, application_path,
                 launch_command, auto_run_before, wait_for_exit)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                 parent_game_id = excluded.parent_game_id,
                 name = excluded.name,
                 application_path = excluded.application_path,
                 launch_command = excluded.launch_command,
                 auto_run_before = excluded.auto_run_before,
                 wait_for_exit = excluded.wait_for_exit",
            params![
                app.id,
                game.id,
                app.name,
                app.application_path,
                app.launch_command,
                app.auto_run_before,
                app.wait_for_exit,
            ],
        )?;
    }

    Ok(())
}

fn delete_add_apps(conn: &Connection, game_id: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM additional_app WHERE parent_game_id = ?1",
        params![game_id],
    )
}

fn delete_game_row(conn: &Connection, id: &str) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM game WHERE id = ?1", params![id])
}

// ── Playlist Operations ─────────────────────────────────────────────────────

/// Insert or update a playlist and its membership rows.
pub(crate) fn save_playlist(conn: &Connection, playlist: &Playlist) -> Result<(), OperationError> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO playlist (id, title, description, author, icon, library, extreme)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
             title = excluded.title,
             description = excluded.description,
             author = excluded.author,
             icon = excluded.icon,
             library = excluded.library,
             extreme = excluded.extreme",
        params![
            playlist.id,
            playlist.title,
            playlist.description,
            playlist.author,
            playlist.icon,
            playlist.library,
            playlist.extreme,
        ],
    )?;
    for entry in &playlist.games {
        upsert_playlist_game(&tx, &playlist.id, entry)?;
    }
    tx.commit()?;
    Ok(())
}

/// Delete a playlist's membership rows and then the playlist.
pub(crate) fn delete_playlist(
    conn: &Connection,
    id: &str,
    atomic: bool,
) -> Result<Option<Playlist>, OperationError> {
    let Some(playlist) = queries::find_playlist(conn, id, true)? else {
        return Ok(None);
    };

    let run = |conn: &Connection| -> rusqlite::Result<()> {
        conn.execute("DELETE FROM playlist_game WHERE playlist_id = ?1", params![id])?;
        conn.execute("DELETE FROM playlist WHERE id = ?1", params![id])?;
        Ok(())
    };
    if atomic {
        let tx = conn.unchecked_transaction()?;
        run(&tx)?;
        tx.commit()?;
    } else {
        run(conn)?;
    }
    Ok(Some(playlist))
}

/// Copy a playlist and its membership rows under a fresh id.
pub(crate) fn duplicate_playlist(
    conn: &Connection,
    id: &str,
) -> Result<Option<Playlist>, OperationError> {
    let Some(mut playlist) = queries::find_playlist(conn, id, true)? else {
        return Ok(None);
    };

    reassign_playlist_id(&mut playlist);
    save_playlist(conn, &playlist)?;
    Ok(Some(playlist))
}

/// How an imported playlist is saved when its id is already taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaylistConflict {
    /// Keep the stored entries and append imported games not already present.
    #[default]
    Merge,
    /// Save the import as a separate playlist under a fresh id.
    Copy,
}

impl PlaylistConflict {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Copy => "copy",
        }
    }
}

impl fmt::Display for PlaylistConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaylistConflict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "merge" => Ok(Self::Merge),
            "copy" => Ok(Self::Copy),
            other => Err(format!("unknown conflict policy '{other}' (expected merge or copy)")),
        }
    }
}

/// Save an imported playlist, resolving an id collision with `on_conflict`.
///
/// Returns the playlist as stored, with every entry pointing at its id.
pub(crate) fn import_playlist(
    conn: &Connection,
    mut playlist: Playlist,
    on_conflict: PlaylistConflict,
) -> Result<Playlist, OperationError> {
    if let Some(existing) = queries::find_playlist(conn, &playlist.id, true)? {
        log::debug!(
            "Playlist '{}' already exists, resolving with {}",
            playlist.id,
            on_conflict
        );
        match on_conflict {
            PlaylistConflict::Merge => {
                playlist.games = merge_entries(existing.games, playlist.games);
            }
            PlaylistConflict::Copy => reassign_playlist_id(&mut playlist),
        }
    }

    for entry in &mut playlist.games {
        entry.playlist_id = playlist.id.clone();
    }
    save_playlist(conn, &playlist)?;
    Ok(playlist)
}

/// Append imported entries whose game is not yet present, numbered after the
/// highest stored position.
fn merge_entries(
    mut existing: Vec<PlaylistGame>,
    imported: Vec<PlaylistGame>,
) -> Vec<PlaylistGame> {
    let top = existing.iter().map(|e| e.position).max().unwrap_or(0).max(0);
    let mut added = 0;
    for mut entry in imported {
        if existing.iter().any(|e| e.game_id == entry.game_id) {
            continue;
        }
        added += 1;
        entry.position = top + added;
        existing.push(entry);
    }
    existing
}

fn reassign_playlist_id(playlist: &mut Playlist) {
    playlist.id = new_id();
    playlist.title.push_str(" - Copy");
    for entry in &mut playlist.games {
        entry.playlist_id = playlist.id.clone();
    }
}

/// Insert or update one membership row.
pub(crate) fn save_playlist_game(
    conn: &Connection,
    entry: &PlaylistGame,
) -> Result<(), OperationError> {
    upsert_playlist_game(conn, &entry.playlist_id, entry)?;
    Ok(())
}

/// Delete one membership row, returning it if it existed.
pub(crate) fn delete_playlist_game(
    conn: &Connection,
    playlist_id: &str,
    game_id: &str,
) -> Result<Option<PlaylistGame>, OperationError> {
    let Some(entry) = queries::find_playlist_game(conn, playlist_id, game_id)? else {
        return Ok(None);
    };
    conn.execute(
        "DELETE FROM playlist_game WHERE playlist_id = ?1 AND game_id = ?2",
        params![playlist_id, game_id],
    )?;
    Ok(Some(entry))
}

fn upsert_playlist_game(
    conn: &Connection,
    playlist_id: &str,
    entry: &PlaylistGame,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO playlist_game (playlist_id, game_id, position, notes)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(playlist_id, game_id) DO UPDATE SET
             position = excluded.position,
             notes = excluded.notes",
        params![playlist_id, entry.game_id, entry.position, entry.notes],
    )?;
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// RFC 3339 UTC timestamp, the format stored in `date_added`/`date_modified`.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
