use std::path::{Path, PathBuf};

use arcadia_catalog::{load_games, load_games_dir, load_playlist, Game};
use arcadia_db::{now_timestamp, OperationError, PlaylistConflict};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use crate::settings::Settings;
use crate::CliError;

use super::open_catalog;

pub(crate) fn run_import(
    settings: &Settings,
    db: Option<PathBuf>,
    paths: &[PathBuf],
) -> Result<(), CliError> {
    let mut games = Vec::new();
    for path in paths {
        let loaded = read_games(path)?;
        log::info!("  {} games from {}", loaded.len(), path.display());
        games.extend(loaded);
    }

    if games.is_empty() {
        log::warn!("Nothing to import");
        return Ok(());
    }

    stamp_dates(&mut games, &now_timestamp());

    let catalog = open_catalog(settings, db)?;
    log::info!(
        "{}",
        format!("Importing {} games", games.len()).if_supports_color(Stderr, |t| t.bold()),
    );

    match catalog.update_games(&games) {
        Ok(stats) => {
            log::info!(
                "{} {} games in {} chunk(s)",
                "Imported".if_supports_color(Stderr, |t| t.green()),
                stats.games,
                stats.chunks,
            );
            Ok(())
        }
        Err(OperationError::ChunkFailed {
            chunk,
            chunks,
            committed,
            source,
        }) => {
            log::warn!(
                "{} games were saved before the failure; re-running the import is safe",
                committed
            );
            Err(CliError::database(format!(
                "chunk {}/{} failed: {}",
                chunk, chunks, source
            )))
        }
        Err(e) => Err(CliError::database(format!("Import failed: {}", e))),
    }
}

pub(crate) fn run_import_playlist(
    settings: &Settings,
    db: Option<PathBuf>,
    path: &Path,
    on_conflict: PlaylistConflict,
) -> Result<(), CliError> {
    let playlist = load_playlist(path).map_err(|e| CliError::import(e.to_string()))?;
    if playlist.id.is_empty() {
        return Err(CliError::import(format!(
            "{} has no playlist id",
            path.display()
        )));
    }

    let catalog = open_catalog(settings, db)?;
    let saved = catalog
        .import_playlist(&playlist, on_conflict)
        .map_err(|e| CliError::database(format!("Failed to save playlist: {}", e)))?;
    if saved.id != playlist.id {
        log::info!("Playlist '{}' already exists; imported as {}", playlist.id, saved.id);
    }
    log::info!(
        "{} playlist '{}' with {} games",
        "Imported".if_supports_color(Stderr, |t| t.green()),
        saved.title,
        saved.games.len()
    );
    Ok(())
}

fn read_games(path: &Path) -> Result<Vec<Game>, CliError> {
    let result = if path.is_dir() {
        load_games_dir(path)
    } else {
        load_games(path)
    };
    result.map_err(|e| CliError::import(e.to_string()))
}

/// Fill in missing `date_added` and refresh `date_modified`.
fn stamp_dates(games: &mut [Game], now: &str) {
    for game in games {
        if game.date_added.is_empty() {
            game.date_added = now.to_string();
        }
        game.date_modified = now.to_string();
    }
}
