//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use arcadia_catalog::{FieldTerm, FieldValue, FilterSpec, OrderDirection, OrderSpec};
use arcadia_db::PlaylistConflict;
use clap::{Args, Parser, Subcommand};

use crate::CliError;

#[derive(Parser)]
#[command(name = "arcadia")]
#[command(about = "Browse and maintain a game catalog database", long_about = None)]
pub(crate) struct Cli {
    /// Database file (defaults to the configured path, then ~/.cache/arcadia/arcadia.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Only show warnings and errors
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable debug logging (query timings, cache hits)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Filter arguments shared by the browsing commands.
#[derive(Args, Clone, Default)]
pub(crate) struct FilterArgs {
    /// Keep games whose FIELD matches VALUE (repeatable), e.g. library=arcade
    #[arg(long = "where", value_name = "FIELD=VALUE")]
    pub include: Vec<String>,

    /// Drop games whose FIELD matches VALUE (repeatable)
    #[arg(long = "where-not", value_name = "FIELD=VALUE")]
    pub exclude: Vec<String>,

    /// Keep games whose title, alternate titles, developer or publisher contain TEXT
    #[arg(long, value_name = "TEXT")]
    pub search: Vec<String>,

    /// Drop games whose title, alternate titles, developer and publisher all contain TEXT
    #[arg(long = "search-not", value_name = "TEXT")]
    pub search_not: Vec<String>,

    /// Only games in this playlist, in playlist order
    #[arg(long)]
    pub playlist: Option<String>,
}

impl FilterArgs {
    pub(crate) fn to_filter(&self) -> Result<FilterSpec, CliError> {
        Ok(FilterSpec {
            whitelist: parse_terms(&self.include)?,
            blacklist: parse_terms(&self.exclude)?,
            generic_whitelist: self.search.clone(),
            generic_blacklist: self.search_not.clone(),
            playlist_id: self.playlist.clone(),
        })
    }
}

fn parse_terms(raw: &[String]) -> Result<Vec<FieldTerm>, CliError> {
    raw.iter()
        .map(|term| {
            let (field, value) = term.split_once('=').ok_or_else(|| {
                CliError::invalid_argument(format!("expected FIELD=VALUE, got '{}'", term))
            })?;
            Ok(FieldTerm {
                field: field.trim().to_string(),
                value: FieldValue::Text(value.to_string()),
            })
        })
        .collect()
}

/// Ordering arguments shared by the browsing commands.
#[derive(Args, Clone, Default)]
pub(crate) struct OrderArgs {
    /// Field to order by (e.g. title, dateAdded, developer)
    #[arg(long = "order-by", value_name = "FIELD")]
    pub order_by: Option<String>,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,
}

impl OrderArgs {
    pub(crate) fn direction(&self) -> OrderDirection {
        if self.desc {
            OrderDirection::Desc
        } else {
            OrderDirection::Asc
        }
    }

    pub(crate) fn to_order(&self) -> Result<OrderSpec, CliError> {
        match &self.order_by {
            Some(field) => OrderSpec::parse(field, self.direction())
                .map_err(|e| CliError::invalid_argument(e.to_string())),
            None => Ok(OrderSpec::default()),
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Create the database (no-op if it exists)
    Init,

    /// Import games from YAML files or directories of YAML files
    Import {
        /// Files or directories to import
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Import a playlist document (YAML or JSON)
    ImportPlaylist {
        path: PathBuf,

        /// When the id already exists: merge into it, or save as a copy
        #[arg(long, value_name = "POLICY", default_value = "merge")]
        on_conflict: PlaylistConflict,
    },

    /// Write a playlist and its entries to a JSON file
    ExportPlaylist {
        id: String,
        path: PathBuf,
    },

    /// List games page by page
    Query {
        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        order: OrderArgs,

        /// Maximum rows to return
        #[arg(short, long)]
        limit: Option<u64>,

        /// Rows to skip (ignored with --after)
        #[arg(long)]
        offset: Option<u64>,

        /// Resume after this cursor, as JSON: {"orderVal": ..., "id": ...}
        #[arg(long, value_name = "JSON")]
        after: Option<String>,

        /// Jump to this page, at the configured page size
        #[arg(long, conflicts_with_all = ["after", "offset", "limit"])]
        page: Option<u32>,

        /// Return list-view rows only
        #[arg(long)]
        shallow: bool,

        /// Also count every matching row
        #[arg(long)]
        total: bool,

        /// Read the whole request from a JSON file instead of flags
        #[arg(long, value_name = "FILE", conflicts_with_all = ["after", "page", "offset", "limit"])]
        request: Option<PathBuf>,
    },

    /// Print the page-boundary index for a filter and order
    Index {
        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        order: OrderArgs,

        /// Rows per page (defaults to the configured page size)
        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Print the 1-based position of a game within a listing
    Row {
        game_id: String,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        order: OrderArgs,
    },

    /// Pick random games
    Random {
        #[arg(short, long, default_value_t = 5)]
        count: u32,
    },

    /// Show one game with its additional apps
    Show {
        id: String,
    },

    /// Delete a game and its additional apps
    Delete {
        id: String,
    },

    /// Copy a game under a new id
    Duplicate {
        id: String,
    },

    /// Show database statistics
    Stats {
        /// Also list platforms of this library
        #[arg(long)]
        library: Option<String>,
    },

    /// List playlists, or show one with its games
    Playlists {
        id: Option<String>,

        /// Copy the playlist under a new id
        #[arg(long, requires = "id", conflicts_with = "delete")]
        duplicate: bool,

        /// Delete the playlist
        #[arg(long, requires = "id")]
        delete: bool,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show the settings file and effective values
    Show,
    /// Save the database path
    SetDb {
        path: PathBuf,
    },
    /// Forget the saved database path
    ClearDb,
}
