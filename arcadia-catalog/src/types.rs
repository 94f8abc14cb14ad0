//! Data model types for the game catalog.
//!
//! These types represent the persistent catalog schema: games, their
//! additional applications, playlists, and playlist membership.

use serde::{Deserialize, Serialize};

// ── Game ────────────────────────────────────────────────────────────────────

/// A single catalog entry.
///
/// Text fields are never null; an unknown value is the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Game {
    pub id: String,
    /// Set when this entry is a child of another game.
    pub parent_game_id: String,
    pub title: String,
    /// Semicolon-separated alternate titles.
    pub alternate_titles: String,
    pub series: String,
    pub developer: String,
    pub publisher: String,
    /// RFC 3339 timestamp of import.
    pub date_added: String,
    /// RFC 3339 timestamp of the last edit.
    pub date_modified: String,
    pub platform: String,
    pub broken: bool,
    pub extreme: bool,
    pub play_mode: String,
    pub status: String,
    pub notes: String,
    /// Semicolon-separated tag list.
    pub tags: String,
    pub source: String,
    pub application_path: String,
    pub launch_command: String,
    pub release_date: String,
    pub version: String,
    pub original_description: String,
    pub language: String,
    /// Library the game is shown in ("arcade", "theatre", ...).
    pub library: String,
    /// Sort title used by the browse view.
    pub order_title: String,
    pub add_apps: Vec<AdditionalApp>,
}

impl Game {
    /// Create a game with an id and title; every other field is empty.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// The shallow projection used by list views.
    pub fn to_view(&self) -> ViewGame {
        ViewGame {
            id: self.id.clone(),
            title: self.title.clone(),
            platform: self.platform.clone(),
            tags: self.tags.clone(),
            developer: self.developer.clone(),
            publisher: self.publisher.clone(),
        }
    }
}

/// Reduced game row for list rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewGame {
    pub id: String,
    pub title: String,
    pub platform: String,
    pub tags: String,
    pub developer: String,
    pub publisher: String,
}

// ── Additional App ──────────────────────────────────────────────────────────

/// An alternate launch entry owned by exactly one game ("extras", "message",
/// a secondary executable).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdditionalApp {
    pub id: String,
    /// Owning game. Filled in from the parent when saved through a game.
    pub parent_game_id: String,
    pub name: String,
    pub application_path: String,
    pub launch_command: String,
    pub auto_run_before: bool,
    pub wait_for_exit: bool,
}

// ── Playlist ────────────────────────────────────────────────────────────────

/// A user-curated, ordered list of games.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Playlist {
    pub id: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub icon: String,
    pub library: String,
    pub extreme: bool,
    /// Membership rows. Only populated when the playlist is loaded with its games.
    pub games: Vec<PlaylistGame>,
}

/// Membership of a game in a playlist. Unique per (playlist, game).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaylistGame {
    pub playlist_id: String,
    pub game_id: String,
    /// Display position within the playlist, ascending.
    #[serde(alias = "order")]
    pub position: i64,
    pub notes: String,
}
