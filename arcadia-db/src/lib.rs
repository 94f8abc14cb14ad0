//! SQLite query engine for the game catalog.
//!
//! Provides schema creation, filter compilation, keyset pagination,
//! page-boundary indexes and a cache for them, backed by SQLite (via
//! rusqlite with bundled feature).

pub mod cache;
pub mod catalog;
pub mod operations;
pub mod page_index;
pub mod paginate;
pub mod plan;
pub mod predicate;
pub mod queries;
pub mod schema;

pub use cache::{CacheKey, QueryCache};
pub use catalog::{Catalog, CatalogOptions};
pub use operations::{now_timestamp, BulkUpdateStats, OperationError, PlaylistConflict};
pub use page_index::build_page_index;
pub use paginate::{find_game_row, find_games, GameResults, GameRows};
pub use predicate::{build_filter, WhereClause};
pub use queries::{
    count_games, find_add_app, find_game, find_platform_app_paths, find_platforms,
    find_playlist, find_playlist_game, find_playlists, find_random_games, find_unique_values,
};
pub use schema::{open_database, open_memory, SchemaError};
