//! YAML loading for game and playlist import files.
//!
//! YAML is a superset of JSON, so exported JSON playlists load through the
//! same functions.

use crate::types::{Game, Playlist};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum YamlError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("YAML parse error in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yml::Error,
    },
    #[error("Directory not found: {0}")]
    DirNotFound(String),
}

/// Load a YAML file containing a sequence (list) of games.
pub fn load_games(path: &Path) -> Result<Vec<Game>, YamlError> {
    load_yaml_file(path)
}

/// Load a single playlist document, including its membership rows.
pub fn load_playlist(path: &Path) -> Result<Playlist, YamlError> {
    load_yaml_file(path)
}

/// Load every `.yaml`/`.yml` file in a directory, each holding a list of games.
///
/// Files are read in name order so repeated imports are deterministic. A
/// missing directory yields no games.
pub fn load_games_dir(dir: &Path) -> Result<Vec<Game>, YamlError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    if !dir.is_dir() {
        return Err(YamlError::DirNotFound(dir.display().to_string()));
    }

    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| YamlError::Io {
            path: dir.display().to_string(),
            source: e,
        })?
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
        })
        .collect();
    entries.sort_by_key(|e| e.file_name());

    let mut all = Vec::new();
    for entry in entries {
        let games: Vec<Game> = load_yaml_file(&entry.path())?;
        all.extend(games);
    }
    Ok(all)
}

fn load_yaml_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, YamlError> {
    let contents = std::fs::read_to_string(path).map_err(|e| YamlError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_yml::from_str(&contents).map_err(|e| YamlError::Parse {
        path: path.display().to_string(),
        source: e,
    })
}
