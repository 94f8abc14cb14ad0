use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use crate::settings::{self, Settings};
use crate::CliError;

/// Show the settings file and the values in effect.
pub(crate) fn run_config_show(settings: &Settings, db: Option<PathBuf>) -> Result<(), CliError> {
    let path = settings::settings_path();

    log::info!(
        "{}",
        "Arcadia Configuration".if_supports_color(Stderr, |t| t.bold()),
    );
    crate::log_blank();

    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stderr, |t| t.cyan()),
            "(exists)".if_supports_color(Stderr, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stderr, |t| t.cyan()),
            "(not found)".if_supports_color(Stderr, |t| t.dimmed()),
        );
    }

    let source = if db.is_some() {
        "--db"
    } else if settings.db_path.is_some() {
        "settings"
    } else {
        "default"
    };
    log::info!(
        "  Database:      {} {}",
        settings.resolve_db_path(db).display(),
        format!("({source})").if_supports_color(Stderr, |t| t.dimmed()),
    );
    log::info!("  Page size:     {}", settings.catalog.page_size);
    log::info!("  Chunk size:    {}", settings.catalog.chunk_size);
    log::info!("  Atomic writes: {}", settings.catalog.atomic_writes);

    if let Some(contents) = settings::load_settings_string() {
        crate::log_blank();
        for line in contents.lines() {
            log::info!("  {}", line.if_supports_color(Stderr, |t| t.dimmed()));
        }
    }
    Ok(())
}

pub(crate) fn run_config_set_db(path: &Path) -> Result<(), CliError> {
    let absolute = std::path::absolute(path)?;
    settings::save_db_path(Some(&absolute))
        .map_err(|e| CliError::config(format!("Failed to save settings: {}", e)))?;
    log::info!(
        "Database path set to {}",
        absolute.display().if_supports_color(Stderr, |t| t.cyan())
    );
    Ok(())
}

pub(crate) fn run_config_clear_db() -> Result<(), CliError> {
    settings::save_db_path(None)
        .map_err(|e| CliError::config(format!("Failed to save settings: {}", e)))?;
    log::info!("Database path cleared; using {}", settings::default_db_path().display());
    Ok(())
}
