use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use crate::settings::Settings;
use crate::CliError;

use super::{open_catalog, print_json};

pub(crate) fn run_show(settings: &Settings, db: Option<PathBuf>, id: &str) -> Result<(), CliError> {
    let catalog = open_catalog(settings, db)?;
    let game = catalog
        .find_game(id)
        .map_err(|e| CliError::database(format!("Lookup failed: {}", e)))?
        .ok_or_else(|| CliError::not_found(format!("game '{}'", id)))?;
    print_json(&game)
}

pub(crate) fn run_delete(
    settings: &Settings,
    db: Option<PathBuf>,
    id: &str,
) -> Result<(), CliError> {
    let catalog = open_catalog(settings, db)?;
    let removed = catalog
        .remove_game_and_add_apps(id)
        .map_err(|e| CliError::database(format!("Delete failed: {}", e)))?
        .ok_or_else(|| CliError::not_found(format!("game '{}'", id)))?;

    log::info!(
        "{} '{}' and {} additional app(s)",
        "Deleted".if_supports_color(Stderr, |t| t.red()),
        removed.title,
        removed.add_apps.len()
    );
    Ok(())
}

pub(crate) fn run_duplicate(
    settings: &Settings,
    db: Option<PathBuf>,
    id: &str,
) -> Result<(), CliError> {
    let catalog = open_catalog(settings, db)?;
    let copy = catalog
        .duplicate_game(id)
        .map_err(|e| CliError::database(format!("Duplicate failed: {}", e)))?
        .ok_or_else(|| CliError::not_found(format!("game '{}'", id)))?;

    log::info!(
        "{} '{}' as {}",
        "Copied".if_supports_color(Stderr, |t| t.green()),
        copy.title,
        copy.id.if_supports_color(Stderr, |t| t.cyan())
    );
    Ok(())
}
