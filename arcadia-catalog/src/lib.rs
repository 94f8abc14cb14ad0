//! Game catalog data model types, query value objects, and YAML I/O.
//!
//! This crate defines the catalog entities (games, additional apps,
//! playlists) and the request types the query engine consumes, without any
//! database dependencies. Consumers pass these types to `arcadia-db` for
//! persistence and querying.

pub mod field;
pub mod query;
pub mod types;
pub mod yaml;

pub use field::{FieldKind, FieldValue, GameField, UnknownField};
pub use query::{
    Cursor, FieldTerm, FilterSpec, GameQuery, OrderDirection, OrderSpec, PageIndex,
};
pub use types::*;
pub use yaml::{load_games, load_games_dir, load_playlist, YamlError};
