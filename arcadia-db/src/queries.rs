//! Read queries for the game database.
//!
//! Provides lookups by id, random sampling, suggestion lists and playlist
//! reads. Absent rows come back as `None`, never as an error.

use std::collections::HashMap;

use arcadia_catalog::{AdditionalApp, Game, GameField, Playlist, PlaylistGame, ViewGame};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use crate::operations::OperationError;

/// Largest id list bound into a single `IN (...)`.
const IN_CHUNK: usize = 500;

// ── Game Lookups ────────────────────────────────────────────────────────────

/// Count every game in the table.
pub fn count_games(conn: &Connection) -> Result<i64, OperationError> {
    let count = conn.query_row("SELECT COUNT(*) FROM game", [], |r| r.get(0))?;
    Ok(count)
}

/// Find a game by id, with its additional apps.
pub fn find_game(conn: &Connection, id: &str) -> Result<Option<Game>, OperationError> {
    let game = conn
        .query_row(
            &format!("SELECT {GAME_COLUMNS} FROM game WHERE game.id = ?1"),
            params![id],
            row_to_game,
        )
        .optional()?;
    let Some(mut game) = game else {
        return Ok(None);
    };
    game.add_apps = add_apps_for_game(conn, &game.id)?;
    Ok(Some(game))
}

/// Pick `count` distinct games uniformly at random.
///
/// Ignores any filter or order; the result order is unspecified.
pub fn find_random_games(conn: &Connection, count: u32) -> Result<Vec<Game>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GAME_COLUMNS} FROM game
         WHERE game.id IN (SELECT id FROM game ORDER BY RANDOM() LIMIT ?1)"
    ))?;
    let rows = stmt.query_map(params![count], row_to_game)?;
    let mut games = rows.collect::<Result<Vec<_>, _>>()?;
    attach_add_apps(conn, &mut games)?;
    Ok(games)
}

/// Application paths used by a platform, most common first.
pub fn find_platform_app_paths(
    conn: &Connection,
    platform: &str,
) -> Result<Vec<String>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT application_path FROM game WHERE platform = ?1
         GROUP BY application_path ORDER BY COUNT(*) DESC, application_path",
    )?;
    let rows = stmt.query_map(params![platform], |row| row.get(0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Distinct values of one game column, sorted. Used for filter suggestions.
pub fn find_unique_values(
    conn: &Connection,
    field: GameField,
) -> Result<Vec<String>, OperationError> {
    let column = field.column();
    let mut stmt = conn.prepare(&format!(
        "SELECT DISTINCT CAST({column} AS TEXT) FROM game ORDER BY 1"
    ))?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Distinct platforms present in a library, sorted.
pub fn find_platforms(conn: &Connection, library: &str) -> Result<Vec<String>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT platform FROM game WHERE library = ?1 ORDER BY platform",
    )?;
    let rows = stmt.query_map(params![library], |row| row.get(0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Additional App Lookups ──────────────────────────────────────────────────

/// Find an additional app by id.
pub fn find_add_app(conn: &Connection, id: &str) -> Result<Option<AdditionalApp>, OperationError> {
    conn.query_row(
        &format!("SELECT {ADD_APP_COLUMNS} FROM additional_app WHERE id = ?1"),
        params![id],
        row_to_add_app,
    )
    .optional()
    .map_err(Into::into)
}

/// Additional apps owned by a game.
pub fn add_apps_for_game(
    conn: &Connection,
    game_id: &str,
) -> Result<Vec<AdditionalApp>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ADD_APP_COLUMNS} FROM additional_app WHERE parent_game_id = ?1 ORDER BY name, id"
    ))?;
    let rows = stmt.query_map(params![game_id], row_to_add_app)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Load the additional apps of every game in `games` with batched queries.
pub(crate) fn attach_add_apps(conn: &Connection, games: &mut [Game]) -> Result<(), OperationError> {
    let mut by_parent: HashMap<String, Vec<AdditionalApp>> = HashMap::new();
    {
        let ids: Vec<&str> = games.iter().map(|g| g.id.as_str()).collect();
        for chunk in ids.chunks(IN_CHUNK) {
            let marks = vec!["?"; chunk.len()].join(", ");
            let mut stmt = conn.prepare(&format!(
                "SELECT {ADD_APP_COLUMNS} FROM additional_app
                 WHERE parent_game_id IN ({marks}) ORDER BY name, id"
            ))?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), row_to_add_app)?;
            for app in rows {
                let app = app?;
                by_parent
                    .entry(app.parent_game_id.clone())
                    .or_default()
                    .push(app);
            }
        }
    }
    for game in games.iter_mut() {
        if let Some(apps) = by_parent.remove(&game.id) {
            game.add_apps = apps;
        }
    }
    Ok(())
}

// ── Playlist Lookups ────────────────────────────────────────────────────────

/// Find a playlist by id. With `join_games`, its membership rows are loaded too.
pub fn find_playlist(
    conn: &Connection,
    id: &str,
    join_games: bool,
) -> Result<Option<Playlist>, OperationError> {
    let playlist = conn
        .query_row(
            &format!("SELECT {PLAYLIST_COLUMNS} FROM playlist WHERE id = ?1"),
            params![id],
            row_to_playlist,
        )
        .optional()?;
    let Some(mut playlist) = playlist else {
        return Ok(None);
    };
    if join_games {
        playlist.games = playlist_games(conn, &playlist.id)?;
    }
    Ok(Some(playlist))
}

/// All playlists, without membership rows, sorted by title.
pub fn find_playlists(conn: &Connection) -> Result<Vec<Playlist>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PLAYLIST_COLUMNS} FROM playlist ORDER BY title, id"
    ))?;
    let rows = stmt.query_map([], row_to_playlist)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Membership rows of a playlist in display order.
pub fn playlist_games(
    conn: &Connection,
    playlist_id: &str,
) -> Result<Vec<PlaylistGame>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PLAYLIST_GAME_COLUMNS} FROM playlist_game
         WHERE playlist_id = ?1 ORDER BY position, game_id"
    ))?;
    let rows = stmt.query_map(params![playlist_id], row_to_playlist_game)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Find the membership row of one game in one playlist.
pub fn find_playlist_game(
    conn: &Connection,
    playlist_id: &str,
    game_id: &str,
) -> Result<Option<PlaylistGame>, OperationError> {
    conn.query_row(
        &format!(
            "SELECT {PLAYLIST_GAME_COLUMNS} FROM playlist_game
             WHERE playlist_id = ?1 AND game_id = ?2"
        ),
        params![playlist_id, game_id],
        row_to_playlist_game,
    )
    .optional()
    .map_err(Into::into)
}

// ── Row Mapping Helpers ─────────────────────────────────────────────────────

/// Full game projection, in [`row_to_game`] order.
pub(crate) const GAME_COLUMNS: &str = "game.id, game.parent_game_id, game.title, \
    game.alternate_titles, game.series, game.developer, game.publisher, game.date_added, \
    game.date_modified, game.platform, game.broken, game.extreme, game.play_mode, game.status, \
    game.notes, game.tags, game.source, game.application_path, game.launch_command, \
    game.release_date, game.version, game.original_description, game.language, game.library, \
    game.order_title";
pub(crate) const GAME_COLUMN_COUNT: usize = 25;

/// Shallow list-view projection, in [`row_to_view`] order.
pub(crate) const VIEW_COLUMNS: &str =
    "game.id, game.title, game.platform, game.tags, game.developer, game.publisher";
pub(crate) const VIEW_COLUMN_COUNT: usize = 6;

const ADD_APP_COLUMNS: &str = "id, parent_game_id, name, application_path, launch_command, \
    auto_run_before, wait_for_exit";

const PLAYLIST_COLUMNS: &str = "id, title, description, author, icon, library, extreme";

const PLAYLIST_GAME_COLUMNS: &str = "playlist_id, game_id, position, notes";

pub(crate) fn row_to_game(row: &rusqlite::Row<'_>) -> rusqlite::Result<Game> {
    Ok(Game {
        id: row.get(0)?,
        parent_game_id: row.get(1)?,
        title: row.get(2)?,
        alternate_titles: row.get(3)?,
        series: row.get(4)?,
        developer: row.get(5)?,
        publisher: row.get(6)?,
        date_added: row.get(7)?,
        date_modified: row.get(8)?,
        platform: row.get(9)?,
        broken: row.get(10)?,
        extreme: row.get(11)?,
        play_mode: row.get(12)?,
        status: row.get(13)?,
        notes: row.get(14)?,
        tags: row.get(15)?,
        source: row.get(16)?,
        application_path: row.get(17)?,
        launch_command: row.get(18)?,
        release_date: row.get(19)?,
        version: row.get(20)?,
        original_description: row.get(21)?,
        language: row.get(22)?,
        library: row.get(23)?,
        order_title: row.get(24)?,
        add_apps: Vec::new(),
    })
}

pub(crate) fn row_to_view(row: &rusqlite::Row<'_>) -> rusqlite::Result<ViewGame> {
    Ok(ViewGame {
        id: row.get(0)?,
        title: row.get(1)?,
        platform: row.get(2)?,
        tags: row.get(3)?,
        developer: row.get(4)?,
        publisher: row.get(5)?,
    })
}

fn row_to_add_app(row: &rusqlite::Row<'_>) -> rusqlite::Result<AdditionalApp> {
    Ok(AdditionalApp {
        id: row.get(0)?,
        parent_game_id: row.get(1)?,
        name: row.get(2)?,
        application_path: row.get(3)?,
        launch_command: row.get(4)?,
        auto_run_before: row.get(5)?,
        wait_for_exit: row.get(6)?,
    })
}

fn row_to_playlist(row: &rusqlite::Row<'_>) -> rusqlite::Result<Playlist> {
    Ok(Playlist {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        author: row.get(3)?,
        icon: row.get(4)?,
        library: row.get(5)?,
        extreme: row.get(6)?,
        games: Vec::new(),
    })
}

fn row_to_playlist_game(row: &rusqlite::Row<'_>) -> rusqlite::Result<PlaylistGame> {
    Ok(PlaylistGame {
        playlist_id: row.get(0)?,
        game_id: row.get(1)?,
        position: row.get(2)?,
        notes: row.get(3)?,
    })
}
