//! User settings (database location, catalog tunables).
//!
//! The settings file is `~/.config/arcadia/settings.toml`:
//!
//! ```toml
//! [database]
//! path = "/srv/arcadia/games.db"
//!
//! [catalog]
//! page_size = 250
//! chunk_size = 2000
//! atomic_writes = false
//! ```

use std::io;
use std::path::{Path, PathBuf};

use arcadia_db::CatalogOptions;

/// Canonical path to the settings file: `~/.config/arcadia/settings.toml`.
pub(crate) fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("arcadia").join("settings.toml")
}

/// Default database location: `~/.cache/arcadia/arcadia.db`.
pub(crate) fn default_db_path() -> PathBuf {
    let cache = dirs::cache_dir().unwrap_or_else(|| PathBuf::from(".cache"));
    cache.join("arcadia").join("arcadia.db")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Settings {
    pub(crate) db_path: Option<PathBuf>,
    pub(crate) catalog: CatalogOptions,
}

impl Settings {
    /// Resolve the database path using a priority chain:
    ///
    /// 1. CLI override (if `Some`)
    /// 2. Saved `database.path` in `settings.toml`
    /// 3. [`default_db_path`]
    pub(crate) fn resolve_db_path(&self, cli_override: Option<PathBuf>) -> PathBuf {
        cli_override
            .or_else(|| self.db_path.clone())
            .unwrap_or_else(default_db_path)
    }
}

pub(crate) fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

/// Read settings from `path`. A missing or unreadable file yields defaults.
pub(crate) fn load_settings_from(path: &Path) -> Settings {
    let Some(doc) = read_doc(path) else {
        return Settings::default();
    };

    let db_path = doc
        .get("database")
        .and_then(|db| db.get("path"))
        .and_then(|p| p.as_str())
        .filter(|p| !p.is_empty())
        .map(PathBuf::from);

    let catalog = match doc.get("catalog") {
        Some(section) => section.clone().try_into::<CatalogOptions>().unwrap_or_else(|e| {
            log::warn!("Ignoring invalid [catalog] settings: {}", e);
            CatalogOptions::default()
        }),
        None => CatalogOptions::default(),
    };

    Settings { db_path, catalog }
}

fn read_doc(path: &Path) -> Option<toml::Value> {
    let contents = std::fs::read_to_string(path).ok()?;
    contents.parse().ok()
}

/// Save (or clear) the database path in `settings.toml`.
pub(crate) fn save_db_path(db: Option<&Path>) -> io::Result<()> {
    save_db_path_to(&settings_path(), db)
}

/// Update `database.path` in the settings file at `settings`.
///
/// Uses `toml::Value` for a surgical update so other sections are preserved.
pub(crate) fn save_db_path_to(settings: &Path, db: Option<&Path>) -> io::Result<()> {
    let mut doc = read_doc(settings).unwrap_or_else(|| toml::Value::Table(Default::default()));

    // Ensure [database] table exists
    let table = doc
        .as_table_mut()
        .ok_or_else(|| io::Error::other("settings.toml root is not a table"))?;
    let database = table
        .entry("database")
        .or_insert_with(|| toml::Value::Table(Default::default()));
    let db_table = database
        .as_table_mut()
        .ok_or_else(|| io::Error::other("[database] is not a table"))?;

    match db {
        Some(p) => {
            db_table.insert(
                "path".to_string(),
                toml::Value::String(p.to_string_lossy().into_owned()),
            );
        }
        None => {
            db_table.remove("path");
        }
    }

    // Write atomically
    if let Some(parent) = settings.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let serialized = toml::to_string_pretty(&doc).map_err(io::Error::other)?;
    let tmp = settings.with_extension("toml.tmp");
    std::fs::write(&tmp, &serialized)?;
    std::fs::rename(&tmp, settings)?;

    Ok(())
}

/// Load the full settings file as a pretty-printed TOML string for display.
pub(crate) fn load_settings_string() -> Option<String> {
    let doc = read_doc(&settings_path())?;
    toml::to_string_pretty(&doc).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from(&dir.path().join("settings.toml"));
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.catalog.page_size, 250);
        assert_eq!(settings.catalog.chunk_size, 2000);
        assert!(!settings.catalog.atomic_writes);
    }

    #[test]
    fn reads_both_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            "[database]\npath = \"/tmp/games.db\"\n\n[catalog]\npage_size = 100\natomic_writes = true\n",
        )
        .unwrap();

        let settings = load_settings_from(&path);
        assert_eq!(settings.db_path, Some(PathBuf::from("/tmp/games.db")));
        assert_eq!(settings.catalog.page_size, 100);
        assert_eq!(settings.catalog.chunk_size, 2000);
        assert!(settings.catalog.atomic_writes);
    }

    #[test]
    fn cli_override_wins() {
        let settings = Settings {
            db_path: Some(PathBuf::from("saved.db")),
            ..Settings::default()
        };
        assert_eq!(
            settings.resolve_db_path(Some(PathBuf::from("flag.db"))),
            PathBuf::from("flag.db")
        );
        assert_eq!(settings.resolve_db_path(None), PathBuf::from("saved.db"));
    }

    #[test]
    fn save_preserves_other_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[catalog]\npage_size = 50\n").unwrap();

        save_db_path_to(&path, Some(Path::new("/data/arcadia.db"))).unwrap();
        let settings = load_settings_from(&path);
        assert_eq!(settings.db_path, Some(PathBuf::from("/data/arcadia.db")));
        assert_eq!(settings.catalog.page_size, 50);

        save_db_path_to(&path, None).unwrap();
        assert_eq!(load_settings_from(&path).db_path, None);
    }
}
