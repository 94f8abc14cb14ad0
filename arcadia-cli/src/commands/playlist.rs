use std::path::{Path, PathBuf};

use arcadia_catalog::Playlist;
use arcadia_db::Catalog;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use crate::settings::Settings;
use crate::CliError;

use super::{open_catalog, truncate_str};

pub(crate) fn run_playlists(
    settings: &Settings,
    db: Option<PathBuf>,
    id: Option<&str>,
    duplicate: bool,
    delete: bool,
) -> Result<(), CliError> {
    let catalog = open_catalog(settings, db)?;
    match id {
        None => list_playlists(&catalog),
        Some(id) if duplicate => duplicate_playlist(&catalog, id),
        Some(id) if delete => delete_playlist(&catalog, id),
        Some(id) => show_playlist(&catalog, id),
    }
}

fn list_playlists(catalog: &Catalog) -> Result<(), CliError> {
    let playlists = catalog
        .find_playlists()
        .map_err(|e| CliError::database(e.to_string()))?;
    if playlists.is_empty() {
        log::info!("No playlists");
        return Ok(());
    }
    for playlist in playlists {
        log::info!(
            "  {:<38} {:<40} {}",
            playlist.id.if_supports_color(Stderr, |t| t.dimmed()),
            truncate_str(&playlist.title, 40),
            playlist.library
        );
    }
    Ok(())
}

fn show_playlist(catalog: &Catalog, id: &str) -> Result<(), CliError> {
    let playlist = catalog
        .find_playlist(id, true)
        .map_err(|e| CliError::database(e.to_string()))?
        .ok_or_else(|| CliError::not_found(format!("playlist '{}'", id)))?;

    log::info!("{}", playlist.title.if_supports_color(Stderr, |t| t.bold()));
    if !playlist.description.is_empty() {
        log::info!("{}", playlist.description);
    }
    crate::log_blank();
    for entry in &playlist.games {
        let title = catalog
            .find_game(&entry.game_id)
            .map_err(|e| CliError::database(e.to_string()))?
            .map(|g| g.title)
            .unwrap_or_else(|| "(missing game)".to_string());
        log::info!("  {:>4}  {}", entry.position, truncate_str(&title, 60));
    }
    Ok(())
}

fn duplicate_playlist(catalog: &Catalog, id: &str) -> Result<(), CliError> {
    let copy = catalog
        .duplicate_playlist(id)
        .map_err(|e| CliError::database(format!("Duplicate failed: {}", e)))?
        .ok_or_else(|| CliError::not_found(format!("playlist '{}'", id)))?;
    log::info!(
        "{} '{}' as {}",
        "Copied".if_supports_color(Stderr, |t| t.green()),
        copy.title,
        copy.id
    );
    Ok(())
}

fn delete_playlist(catalog: &Catalog, id: &str) -> Result<(), CliError> {
    let removed = catalog
        .remove_playlist(id)
        .map_err(|e| CliError::database(format!("Delete failed: {}", e)))?
        .ok_or_else(|| CliError::not_found(format!("playlist '{}'", id)))?;
    log::info!(
        "{} '{}' ({} entries)",
        "Deleted".if_supports_color(Stderr, |t| t.red()),
        removed.title,
        removed.games.len()
    );
    Ok(())
}

/// Write a playlist with its entries as pretty JSON, readable by `import-playlist`.
pub(crate) fn run_export_playlist(
    settings: &Settings,
    db: Option<PathBuf>,
    id: &str,
    path: &Path,
) -> Result<(), CliError> {
    let catalog = open_catalog(settings, db)?;
    let playlist = catalog
        .find_playlist(id, true)
        .map_err(|e| CliError::database(e.to_string()))?
        .ok_or_else(|| CliError::not_found(format!("playlist '{}'", id)))?;
    write_playlist(&playlist, path)?;
    log::info!(
        "{} '{}' ({} entries) to {}",
        "Exported".if_supports_color(Stderr, |t| t.green()),
        playlist.title,
        playlist.games.len(),
        path.display()
    );
    Ok(())
}

fn write_playlist(playlist: &Playlist, path: &Path) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(playlist)
        .map_err(|e| CliError::invalid_argument(format!("Could not serialize playlist: {}", e)))?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcadia_catalog::{load_playlist, PlaylistGame};

    #[test]
    fn exported_playlist_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favourites.json");
        let playlist = Playlist {
            id: "p1".to_string(),
            title: "Favourites".to_string(),
            games: vec![PlaylistGame {
                playlist_id: "p1".to_string(),
                game_id: "g1".to_string(),
                position: 3,
                notes: String::new(),
            }],
            ..Playlist::default()
        };

        write_playlist(&playlist, &path).unwrap();
        assert_eq!(load_playlist(&path).unwrap(), playlist);
    }
}
