pub(crate) mod browse;
pub(crate) mod catalog;
pub(crate) mod config;
pub(crate) mod game;
pub(crate) mod import;
pub(crate) mod playlist;

use std::path::PathBuf;

use arcadia_db::Catalog;
use serde::Serialize;

use crate::settings::Settings;
use crate::CliError;

/// Open the catalog at the resolved database path, creating it if needed.
pub(crate) fn open_catalog(settings: &Settings, db: Option<PathBuf>) -> Result<Catalog, CliError> {
    let path = settings.resolve_db_path(db);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    log::debug!("Opening database {}", path.display());
    Catalog::open(&path, settings.catalog)
        .map_err(|e| CliError::database(format!("Failed to open {}: {}", path.display(), e)))
}

/// Write `value` to stdout as pretty JSON.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::invalid_argument(format!("Could not serialize output: {}", e)))?;
    println!("{json}");
    Ok(())
}

/// Truncate a string to a maximum width, appending "..." if needed.
pub(crate) fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max > 3 {
        let head: String = s.chars().take(max - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::truncate_str;

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate_str("Galaga", 10), "Galaga");
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_str("ポケモン スタジアム", 6), "ポケモ...");
    }
}
