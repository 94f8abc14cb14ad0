use std::path::PathBuf;

use arcadia_catalog::GameField;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use crate::settings::Settings;
use crate::CliError;

use super::open_catalog;

pub(crate) fn run_init(settings: &Settings, db: Option<PathBuf>) -> Result<(), CliError> {
    let path = settings.resolve_db_path(db.clone());
    let existed = path.exists();
    let catalog = open_catalog(settings, db)?;
    let games = catalog
        .count_games()
        .map_err(|e| CliError::database(e.to_string()))?;

    if existed {
        log::info!("Database already exists at {} ({} games)", path.display(), games);
    } else {
        log::info!(
            "{} {}",
            "Created".if_supports_color(Stderr, |t| t.green()),
            path.display()
        );
    }
    Ok(())
}

pub(crate) fn run_stats(
    settings: &Settings,
    db: Option<PathBuf>,
    library: Option<&str>,
) -> Result<(), CliError> {
    let path = settings.resolve_db_path(db.clone());
    if !path.exists() {
        log::warn!("No database found at {}", path.display());
        log::info!("Run 'arcadia import <files>' to create one.");
        return Ok(());
    }

    let catalog = open_catalog(settings, db)?;
    let query_err = |e: arcadia_db::OperationError| {
        CliError::database(format!("Failed to query stats: {}", e))
    };

    let games = catalog.count_games().map_err(query_err)?;
    let libraries = catalog
        .find_unique_values(GameField::Library)
        .map_err(query_err)?;
    let playlists = catalog.find_playlists().map_err(query_err)?;

    log::info!(
        "{}",
        "Game Database Statistics".if_supports_color(Stderr, |t| t.bold()),
    );
    log::info!("  Database: {}", path.display());
    crate::log_blank();
    log::info!("  Games:      {:>8}", games);
    log::info!("  Libraries:  {:>8}", libraries.len());
    log::info!("  Playlists:  {:>8}", playlists.len());

    if let Some(library) = library {
        let platforms = catalog.find_platforms(library).map_err(query_err)?;
        crate::log_blank();
        log::info!(
            "{}",
            format!("Platforms in '{}'", library).if_supports_color(Stderr, |t| t.bold()),
        );
        for platform in platforms {
            let paths = catalog
                .find_platform_app_paths(&platform)
                .map_err(query_err)?;
            match paths.first() {
                Some(top) => log::info!("  {:<24} {}", platform, top),
                None => log::info!("  {}", platform),
            }
        }
    }

    Ok(())
}
