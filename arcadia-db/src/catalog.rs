//! The game repository handle.
//!
//! [`Catalog`] owns a connection and a shared [`QueryCache`]. Reads pass
//! straight through; every write clears the cache once it succeeds.

use std::path::Path;
use std::sync::Arc;

use arcadia_catalog::{
    AdditionalApp, FilterSpec, Game, GameField, GameQuery, OrderSpec, PageIndex, Playlist,
    PlaylistGame,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::cache::{CacheKey, QueryCache};
use crate::operations::{self, BulkUpdateStats, OperationError, PlaylistConflict};
use crate::page_index::build_page_index;
use crate::paginate::{self, GameResults};
use crate::queries;
use crate::schema::{self, SchemaError};

/// Tunables read from the `[catalog]` settings section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogOptions {
    /// Rows per page for page indexes.
    pub page_size: u32,
    /// Games per transaction in bulk updates.
    pub chunk_size: usize,
    /// Run multi-step writes in a single transaction.
    pub atomic_writes: bool,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            page_size: 250,
            chunk_size: 2000,
            atomic_writes: false,
        }
    }
}

pub struct Catalog {
    conn: Connection,
    cache: Arc<QueryCache>,
    options: CatalogOptions,
}

impl Catalog {
    /// Open (or create) the database at `path` with a fresh cache.
    pub fn open(path: &Path, options: CatalogOptions) -> Result<Self, SchemaError> {
        let conn = schema::open_database(path)?;
        Ok(Self::with_cache(conn, Arc::new(QueryCache::new()), options))
    }

    /// In-memory catalog with the full schema. Useful for testing.
    pub fn open_memory(options: CatalogOptions) -> Result<Self, SchemaError> {
        let conn = schema::open_memory()?;
        Ok(Self::with_cache(conn, Arc::new(QueryCache::new()), options))
    }

    /// Wrap an open connection, sharing `cache` with other handles on the
    /// same database.
    pub fn with_cache(conn: Connection, cache: Arc<QueryCache>, options: CatalogOptions) -> Self {
        Self {
            conn,
            cache,
            options,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn options(&self) -> &CatalogOptions {
        &self.options
    }

    // ── Browsing ────────────────────────────────────────────────────────────

    pub fn find_games(&self, query: &GameQuery) -> Result<GameResults, OperationError> {
        paginate::find_games(&self.conn, query)
    }

    /// Page index at the configured page size, served from the cache.
    pub fn page_index(
        &self,
        filter: &FilterSpec,
        order: &OrderSpec,
    ) -> Result<Arc<PageIndex>, OperationError> {
        self.page_index_with_size(filter, order, self.options.page_size)
    }

    pub fn page_index_with_size(
        &self,
        filter: &FilterSpec,
        order: &OrderSpec,
        page_size: u32,
    ) -> Result<Arc<PageIndex>, OperationError> {
        if page_size == 0 {
            return Err(OperationError::InvalidPageSize);
        }
        let key = CacheKey::new(filter, order, page_size)?;
        self.cache.get_or_build(key, || {
            build_page_index(&self.conn, filter, order, page_size)
        })
    }

    pub fn find_game_row(
        &self,
        game_id: &str,
        filter: &FilterSpec,
        order: &OrderSpec,
    ) -> Result<Option<i64>, OperationError> {
        paginate::find_game_row(&self.conn, game_id, filter, order)
    }

    pub fn find_random_games(&self, count: u32) -> Result<Vec<Game>, OperationError> {
        queries::find_random_games(&self.conn, count)
    }

    // ── Lookups ─────────────────────────────────────────────────────────────

    pub fn count_games(&self) -> Result<i64, OperationError> {
        queries::count_games(&self.conn)
    }

    pub fn find_game(&self, id: &str) -> Result<Option<Game>, OperationError> {
        queries::find_game(&self.conn, id)
    }

    pub fn find_add_app(&self, id: &str) -> Result<Option<AdditionalApp>, OperationError> {
        queries::find_add_app(&self.conn, id)
    }

    pub fn find_playlist(
        &self,
        id: &str,
        join_games: bool,
    ) -> Result<Option<Playlist>, OperationError> {
        queries::find_playlist(&self.conn, id, join_games)
    }

    pub fn find_playlists(&self) -> Result<Vec<Playlist>, OperationError> {
        queries::find_playlists(&self.conn)
    }

    pub fn find_playlist_game(
        &self,
        playlist_id: &str,
        game_id: &str,
    ) -> Result<Option<PlaylistGame>, OperationError> {
        queries::find_playlist_game(&self.conn, playlist_id, game_id)
    }

    pub fn find_platform_app_paths(&self, platform: &str) -> Result<Vec<String>, OperationError> {
        queries::find_platform_app_paths(&self.conn, platform)
    }

    pub fn find_unique_values(&self, field: GameField) -> Result<Vec<String>, OperationError> {
        queries::find_unique_values(&self.conn, field)
    }

    pub fn find_platforms(&self, library: &str) -> Result<Vec<String>, OperationError> {
        queries::find_platforms(&self.conn, library)
    }

    // ── Mutations ───────────────────────────────────────────────────────────

    /// Insert or update a game with its additional apps.
    pub fn update_game(&self, game: &Game) -> Result<Game, OperationError> {
        operations::save_game(&self.conn, game)?;
        self.cache.invalidate();

        let mut saved = game.clone();
        for app in &mut saved.add_apps {
            app.parent_game_id = saved.id.clone();
        }
        Ok(saved)
    }

    /// Insert or update many games in chunks of `chunk_size`.
    ///
    /// On a chunk failure the earlier chunks stay committed (unless
    /// `atomic_writes` is set) and the cache is still cleared for them.
    pub fn update_games(&self, games: &[Game]) -> Result<BulkUpdateStats, OperationError> {
        let result = if self.options.atomic_writes {
            operations::save_games_atomic(&self.conn, games)
        } else {
            operations::save_games_chunked(&self.conn, games, self.options.chunk_size)
        };
        match &result {
            Ok(_) => self.cache.invalidate(),
            Err(OperationError::ChunkFailed { committed, .. }) if *committed > 0 => {
                self.cache.invalidate()
            }
            Err(_) => {}
        }
        result
    }

    /// Delete a game and the additional apps it owns.
    pub fn remove_game_and_add_apps(&self, id: &str) -> Result<Option<Game>, OperationError> {
        let removed =
            operations::delete_game_and_add_apps(&self.conn, id, self.options.atomic_writes)?;
        self.cache.invalidate();
        Ok(removed)
    }

    /// Copy a game under a new id. `None` if the source does not exist.
    pub fn duplicate_game(&self, id: &str) -> Result<Option<Game>, OperationError> {
        let copy = operations::duplicate_game(&self.conn, id)?;
        self.cache.invalidate();
        Ok(copy)
    }

    pub fn update_playlist(&self, playlist: &Playlist) -> Result<Playlist, OperationError> {
        operations::save_playlist(&self.conn, playlist)?;
        self.cache.invalidate();

        let mut saved = playlist.clone();
        for entry in &mut saved.games {
            entry.playlist_id = saved.id.clone();
        }
        Ok(saved)
    }

    /// Save a playlist read from an export file. See [`PlaylistConflict`].
    pub fn import_playlist(
        &self,
        playlist: &Playlist,
        on_conflict: PlaylistConflict,
    ) -> Result<Playlist, OperationError> {
        let saved = operations::import_playlist(&self.conn, playlist.clone(), on_conflict)?;
        self.cache.invalidate();
        Ok(saved)
    }

    pub fn remove_playlist(&self, id: &str) -> Result<Option<Playlist>, OperationError> {
        let removed = operations::delete_playlist(&self.conn, id, self.options.atomic_writes)?;
        self.cache.invalidate();
        Ok(removed)
    }

    pub fn duplicate_playlist(&self, id: &str) -> Result<Option<Playlist>, OperationError> {
        let copy = operations::duplicate_playlist(&self.conn, id)?;
        self.cache.invalidate();
        Ok(copy)
    }

    pub fn update_playlist_game(
        &self,
        entry: &PlaylistGame,
    ) -> Result<PlaylistGame, OperationError> {
        operations::save_playlist_game(&self.conn, entry)?;
        self.cache.invalidate();
        Ok(entry.clone())
    }

    pub fn remove_playlist_game(
        &self,
        playlist_id: &str,
        game_id: &str,
    ) -> Result<Option<PlaylistGame>, OperationError> {
        let removed = operations::delete_playlist_game(&self.conn, playlist_id, game_id)?;
        self.cache.invalidate();
        Ok(removed)
    }
}
