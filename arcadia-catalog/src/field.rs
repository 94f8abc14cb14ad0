//! Registry of queryable game fields.
//!
//! Every column a filter term or an order key may reference is listed here.
//! Names coming from requests are resolved through [`GameField::from_str`],
//! so an unknown name is rejected before any SQL is built.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Game;

/// A field name that is not a game column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown game field: '{0}'")]
pub struct UnknownField(pub String);

/// Storage type of a game column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Bool,
}

/// A scalar value used in filter terms and cursors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

/// A game column that can be filtered on or ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameField {
    Id,
    ParentGameId,
    Title,
    AlternateTitles,
    Series,
    Developer,
    Publisher,
    DateAdded,
    DateModified,
    Platform,
    Broken,
    Extreme,
    PlayMode,
    Status,
    Notes,
    Tags,
    Source,
    ApplicationPath,
    LaunchCommand,
    ReleaseDate,
    Version,
    OriginalDescription,
    Language,
    Library,
    OrderTitle,
}

impl GameField {
    pub const ALL: [GameField; 25] = [
        Self::Id,
        Self::ParentGameId,
        Self::Title,
        Self::AlternateTitles,
        Self::Series,
        Self::Developer,
        Self::Publisher,
        Self::DateAdded,
        Self::DateModified,
        Self::Platform,
        Self::Broken,
        Self::Extreme,
        Self::PlayMode,
        Self::Status,
        Self::Notes,
        Self::Tags,
        Self::Source,
        Self::ApplicationPath,
        Self::LaunchCommand,
        Self::ReleaseDate,
        Self::Version,
        Self::OriginalDescription,
        Self::Language,
        Self::Library,
        Self::OrderTitle,
    ];

    /// Columns searched by free-text phrases.
    pub const GENERIC_SEARCH: [GameField; 4] = [
        Self::Title,
        Self::AlternateTitles,
        Self::Developer,
        Self::Publisher,
    ];

    /// Request-facing (camelCase) name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::ParentGameId => "parentGameId",
            Self::Title => "title",
            Self::AlternateTitles => "alternateTitles",
            Self::Series => "series",
            Self::Developer => "developer",
            Self::Publisher => "publisher",
            Self::DateAdded => "dateAdded",
            Self::DateModified => "dateModified",
            Self::Platform => "platform",
            Self::Broken => "broken",
            Self::Extreme => "extreme",
            Self::PlayMode => "playMode",
            Self::Status => "status",
            Self::Notes => "notes",
            Self::Tags => "tags",
            Self::Source => "source",
            Self::ApplicationPath => "applicationPath",
            Self::LaunchCommand => "launchCommand",
            Self::ReleaseDate => "releaseDate",
            Self::Version => "version",
            Self::OriginalDescription => "originalDescription",
            Self::Language => "language",
            Self::Library => "library",
            Self::OrderTitle => "orderTitle",
        }
    }

    /// SQL column name in the `game` table.
    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::ParentGameId => "parent_game_id",
            Self::Title => "title",
            Self::AlternateTitles => "alternate_titles",
            Self::Series => "series",
            Self::Developer => "developer",
            Self::Publisher => "publisher",
            Self::DateAdded => "date_added",
            Self::DateModified => "date_modified",
            Self::Platform => "platform",
            Self::Broken => "broken",
            Self::Extreme => "extreme",
            Self::PlayMode => "play_mode",
            Self::Status => "status",
            Self::Notes => "notes",
            Self::Tags => "tags",
            Self::Source => "source",
            Self::ApplicationPath => "application_path",
            Self::LaunchCommand => "launch_command",
            Self::ReleaseDate => "release_date",
            Self::Version => "version",
            Self::OriginalDescription => "original_description",
            Self::Language => "language",
            Self::Library => "library",
            Self::OrderTitle => "order_title",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Self::Broken | Self::Extreme => FieldKind::Bool,
            _ => FieldKind::Text,
        }
    }

    /// Fields that are always compared with equality, never substring match.
    pub fn is_exact(self) -> bool {
        matches!(self, Self::Extreme | Self::Broken | Self::Library)
    }

    /// Read this field from a game.
    pub fn value_of(self, game: &Game) -> FieldValue {
        let text = |s: &String| FieldValue::Text(s.clone());
        match self {
            Self::Id => text(&game.id),
            Self::ParentGameId => text(&game.parent_game_id),
            Self::Title => text(&game.title),
            Self::AlternateTitles => text(&game.alternate_titles),
            Self::Series => text(&game.series),
            Self::Developer => text(&game.developer),
            Self::Publisher => text(&game.publisher),
            Self::DateAdded => text(&game.date_added),
            Self::DateModified => text(&game.date_modified),
            Self::Platform => text(&game.platform),
            Self::Broken => FieldValue::Bool(game.broken),
            Self::Extreme => FieldValue::Bool(game.extreme),
            Self::PlayMode => text(&game.play_mode),
            Self::Status => text(&game.status),
            Self::Notes => text(&game.notes),
            Self::Tags => text(&game.tags),
            Self::Source => text(&game.source),
            Self::ApplicationPath => text(&game.application_path),
            Self::LaunchCommand => text(&game.launch_command),
            Self::ReleaseDate => text(&game.release_date),
            Self::Version => text(&game.version),
            Self::OriginalDescription => text(&game.original_description),
            Self::Language => text(&game.language),
            Self::Library => text(&game.library),
            Self::OrderTitle => text(&game.order_title),
        }
    }
}

impl fmt::Display for GameField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GameField {
    type Err = UnknownField;

    /// Accepts either the request name (`playMode`) or the column name (`play_mode`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == s || f.column() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}
