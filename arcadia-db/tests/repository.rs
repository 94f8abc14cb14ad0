use std::sync::Arc;

use arcadia_catalog::{
    AdditionalApp, FilterSpec, Game, GameField, OrderSpec, Playlist, PlaylistGame,
};
use arcadia_db::*;

fn numbered_games(n: usize) -> Vec<Game> {
    (0..n)
        .map(|i| Game::new(format!("game-{i:05}"), format!("Title {i}")))
        .collect()
}

fn game_with_apps(id: &str, apps: usize) -> Game {
    let mut game = Game::new(id, "Galaga");
    game.add_apps = (0..apps)
        .map(|i| AdditionalApp {
            id: format!("{id}-app{i}"),
            name: format!("Extra {i}"),
            application_path: "extras.exe".to_string(),
            ..AdditionalApp::default()
        })
        .collect();
    game
}

fn add_app_count(catalog: &Catalog) -> i64 {
    catalog
        .connection()
        .query_row("SELECT COUNT(*) FROM additional_app", [], |row| row.get(0))
        .unwrap()
}

fn prime_cache(catalog: &Catalog) {
    catalog
        .page_index_with_size(&FilterSpec::default(), &OrderSpec::asc(GameField::Title), 2)
        .unwrap();
    assert_eq!(catalog.cache().len(), 1);
}

fn entry(playlist_id: &str, game_id: &str, position: i64) -> PlaylistGame {
    PlaylistGame {
        playlist_id: playlist_id.to_string(),
        game_id: game_id.to_string(),
        position,
        notes: String::new(),
    }
}

// ── Games ───────────────────────────────────────────────────────────────────

#[test]
fn update_game_upserts() {
    let catalog = Catalog::open_memory(CatalogOptions::default()).unwrap();
    let mut game = game_with_apps("g1", 1);
    catalog.update_game(&game).unwrap();

    game.title = "Galaga '88".to_string();
    let saved = catalog.update_game(&game).unwrap();
    assert_eq!(saved.add_apps[0].parent_game_id, "g1");

    let found = catalog.find_game("g1").unwrap().unwrap();
    assert_eq!(found.title, "Galaga '88");
    assert_eq!(found.add_apps.len(), 1);
    assert_eq!(catalog.count_games().unwrap(), 1);
}

#[test]
fn bulk_update_commits_in_chunks() {
    let catalog = Catalog::open_memory(CatalogOptions::default()).unwrap();
    let stats = catalog.update_games(&numbered_games(4500)).unwrap();
    assert_eq!(stats, BulkUpdateStats { games: 4500, chunks: 3 });
    assert_eq!(catalog.count_games().unwrap(), 4500);
}

#[test]
fn failure_in_second_chunk_keeps_first_chunk() {
    let catalog = Catalog::open_memory(CatalogOptions::default()).unwrap();
    let mut games = numbered_games(2500);
    games[2100].id = String::new();

    let err = catalog.update_games(&games).unwrap_err();
    match err {
        OperationError::ChunkFailed {
            chunk,
            chunks,
            committed,
            ..
        } => {
            assert_eq!(chunk, 2);
            assert_eq!(chunks, 2);
            assert_eq!(committed, 2000);
        }
        other => panic!("expected ChunkFailed, got {other:?}"),
    }
    assert_eq!(catalog.count_games().unwrap(), 2000);
}

#[test]
fn partial_bulk_failure_still_invalidates() {
    let catalog = Catalog::open_memory(CatalogOptions::default()).unwrap();
    catalog.update_games(&numbered_games(3)).unwrap();
    prime_cache(&catalog);

    let mut games = numbered_games(2500);
    games[2499].id = String::new();
    catalog.update_games(&games).unwrap_err();
    assert!(catalog.cache().is_empty());
}

#[test]
fn failure_in_first_chunk_leaves_cache_alone() {
    let catalog = Catalog::open_memory(CatalogOptions::default()).unwrap();
    catalog.update_games(&numbered_games(3)).unwrap();
    prime_cache(&catalog);

    let mut games = numbered_games(10);
    games[5].id = String::new();
    catalog.update_games(&games).unwrap_err();
    assert_eq!(catalog.cache().len(), 1);
    assert_eq!(catalog.count_games().unwrap(), 3);
}

#[test]
fn atomic_bulk_update_is_all_or_nothing() {
    let options = CatalogOptions {
        atomic_writes: true,
        ..CatalogOptions::default()
    };
    let catalog = Catalog::open_memory(options).unwrap();
    let mut games = numbered_games(2500);
    games[2100].id = String::new();

    let err = catalog.update_games(&games).unwrap_err();
    assert!(matches!(err, OperationError::Sqlite(_)));
    assert_eq!(catalog.count_games().unwrap(), 0);
}

#[test]
fn removing_a_game_removes_its_add_apps_and_clears_cache() {
    let catalog = Catalog::open_memory(CatalogOptions::default()).unwrap();
    catalog.update_game(&game_with_apps("g1", 2)).unwrap();
    assert_eq!(add_app_count(&catalog), 2);
    prime_cache(&catalog);

    let removed = catalog.remove_game_and_add_apps("g1").unwrap().unwrap();
    assert_eq!(removed.add_apps.len(), 2);
    assert_eq!(add_app_count(&catalog), 0);
    assert_eq!(catalog.count_games().unwrap(), 0);
    assert!(catalog.cache().is_empty());
}

#[test]
fn atomic_remove_behaves_the_same() {
    let options = CatalogOptions {
        atomic_writes: true,
        ..CatalogOptions::default()
    };
    let catalog = Catalog::open_memory(options).unwrap();
    catalog.update_game(&game_with_apps("g1", 2)).unwrap();
    catalog.remove_game_and_add_apps("g1").unwrap().unwrap();
    assert_eq!(add_app_count(&catalog), 0);
    assert_eq!(catalog.count_games().unwrap(), 0);
}

#[test]
fn removing_a_missing_game_is_not_an_error() {
    let catalog = Catalog::open_memory(CatalogOptions::default()).unwrap();
    assert!(catalog.remove_game_and_add_apps("nope").unwrap().is_none());
}

#[test]
fn removing_a_game_drops_its_playlist_entries() {
    let catalog = Catalog::open_memory(CatalogOptions::default()).unwrap();
    catalog.update_games(&numbered_games(2)).unwrap();
    catalog
        .update_playlist(&Playlist {
            id: "p1".to_string(),
            games: vec![entry("p1", "game-00000", 0), entry("p1", "game-00001", 1)],
            ..Playlist::default()
        })
        .unwrap();

    catalog.remove_game_and_add_apps("game-00000").unwrap();
    let playlist = catalog.find_playlist("p1", true).unwrap().unwrap();
    assert_eq!(playlist.games.len(), 1);
    assert_eq!(playlist.games[0].game_id, "game-00001");
}

#[test]
fn duplicate_game_copies_under_new_ids() {
    let catalog = Catalog::open_memory(CatalogOptions::default()).unwrap();
    catalog.update_game(&game_with_apps("g1", 2)).unwrap();
    prime_cache(&catalog);

    let copy = catalog.duplicate_game("g1").unwrap().unwrap();
    assert_ne!(copy.id, "g1");
    assert_eq!(copy.title, "Galaga");
    assert!(!copy.date_modified.is_empty());
    assert!(copy.add_apps.iter().all(|a| a.parent_game_id == copy.id));
    assert!(copy.add_apps.iter().all(|a| !a.id.starts_with("g1-")));

    assert_eq!(catalog.count_games().unwrap(), 2);
    assert_eq!(add_app_count(&catalog), 4);
    assert!(catalog.cache().is_empty());
    assert!(catalog.duplicate_game("nope").unwrap().is_none());
}

// ── Playlists ───────────────────────────────────────────────────────────────

fn catalog_with_playlist() -> Catalog {
    let catalog = Catalog::open_memory(CatalogOptions::default()).unwrap();
    catalog.update_games(&numbered_games(3)).unwrap();
    catalog
        .update_playlist(&Playlist {
            id: "p1".to_string(),
            title: "Favourites".to_string(),
            author: "someone".to_string(),
            games: vec![entry("p1", "game-00002", 0), entry("p1", "game-00000", 1)],
            ..Playlist::default()
        })
        .unwrap();
    catalog
}

#[test]
fn playlist_round_trip() {
    let catalog = catalog_with_playlist();

    let bare = catalog.find_playlist("p1", false).unwrap().unwrap();
    assert_eq!(bare.title, "Favourites");
    assert!(bare.games.is_empty());

    let joined = catalog.find_playlist("p1", true).unwrap().unwrap();
    let ids: Vec<&str> = joined.games.iter().map(|g| g.game_id.as_str()).collect();
    assert_eq!(ids, vec!["game-00002", "game-00000"]);

    assert_eq!(catalog.find_playlists().unwrap().len(), 1);
    assert!(catalog.find_playlist("nope", true).unwrap().is_none());
}

#[test]
fn remove_playlist_removes_membership() {
    let catalog = catalog_with_playlist();
    prime_cache(&catalog);

    let removed = catalog.remove_playlist("p1").unwrap().unwrap();
    assert_eq!(removed.games.len(), 2);
    assert!(catalog.find_playlist("p1", false).unwrap().is_none());
    assert!(catalog.find_playlist_game("p1", "game-00000").unwrap().is_none());
    assert!(catalog.cache().is_empty());
    // Games themselves stay
    assert_eq!(catalog.count_games().unwrap(), 3);
}

#[test]
fn duplicate_playlist_copies_membership() {
    let catalog = catalog_with_playlist();
    let copy = catalog.duplicate_playlist("p1").unwrap().unwrap();
    assert_ne!(copy.id, "p1");
    assert_eq!(copy.title, "Favourites - Copy");

    let stored = catalog.find_playlist(&copy.id, true).unwrap().unwrap();
    assert_eq!(stored.games.len(), 2);
    assert!(stored.games.iter().all(|g| g.playlist_id == copy.id));
    assert_eq!(catalog.find_playlists().unwrap().len(), 2);
}

fn imported_p1() -> Playlist {
    Playlist {
        id: "p1".to_string(),
        title: "Imported".to_string(),
        games: vec![entry("", "game-00000", 0), entry("", "game-00001", 0)],
        ..Playlist::default()
    }
}

#[test]
fn import_merge_appends_only_new_games_after_top_position() {
    let catalog = catalog_with_playlist();
    prime_cache(&catalog);

    let saved = catalog
        .import_playlist(&imported_p1(), PlaylistConflict::Merge)
        .unwrap();
    assert_eq!(saved.id, "p1");
    assert!(catalog.cache().is_empty());

    let stored = catalog.find_playlist("p1", true).unwrap().unwrap();
    assert_eq!(stored.title, "Imported");
    let entries: Vec<(&str, i64)> = stored
        .games
        .iter()
        .map(|g| (g.game_id.as_str(), g.position))
        .collect();
    assert_eq!(
        entries,
        vec![("game-00002", 0), ("game-00000", 1), ("game-00001", 2)]
    );
    assert_eq!(catalog.find_playlists().unwrap().len(), 1);
}

#[test]
fn import_copy_keeps_existing_playlist_untouched() {
    let catalog = catalog_with_playlist();

    let saved = catalog
        .import_playlist(&imported_p1(), PlaylistConflict::Copy)
        .unwrap();
    assert_ne!(saved.id, "p1");
    assert_eq!(saved.title, "Imported - Copy");

    let copy = catalog.find_playlist(&saved.id, true).unwrap().unwrap();
    assert_eq!(copy.games.len(), 2);
    assert!(copy.games.iter().all(|g| g.playlist_id == saved.id));

    let original = catalog.find_playlist("p1", true).unwrap().unwrap();
    assert_eq!(original.title, "Favourites");
    assert_eq!(original.games.len(), 2);
    assert_eq!(catalog.find_playlists().unwrap().len(), 2);
}

#[test]
fn import_without_conflict_saves_as_is() {
    let catalog = catalog_with_playlist();
    let mut fresh = imported_p1();
    fresh.id = "p2".to_string();

    let saved = catalog.import_playlist(&fresh, PlaylistConflict::Copy).unwrap();
    assert_eq!(saved.id, "p2");
    assert_eq!(saved.title, "Imported");
    assert!(saved.games.iter().all(|g| g.playlist_id == "p2"));
    assert_eq!(catalog.find_playlist("p2", true).unwrap().unwrap().games.len(), 2);
}

#[test]
fn conflict_policy_parses_case_insensitively() {
    assert_eq!("merge".parse::<PlaylistConflict>(), Ok(PlaylistConflict::Merge));
    assert_eq!("COPY".parse::<PlaylistConflict>(), Ok(PlaylistConflict::Copy));
    assert!("replace".parse::<PlaylistConflict>().is_err());
    assert_eq!(PlaylistConflict::default(), PlaylistConflict::Merge);
}

#[test]
fn playlist_game_update_and_remove() {
    let catalog = catalog_with_playlist();

    let mut moved = entry("p1", "game-00000", -1);
    moved.notes = "play first".to_string();
    catalog.update_playlist_game(&moved).unwrap();
    let found = catalog.find_playlist_game("p1", "game-00000").unwrap().unwrap();
    assert_eq!(found.position, -1);
    assert_eq!(found.notes, "play first");

    prime_cache(&catalog);
    let removed = catalog.remove_playlist_game("p1", "game-00000").unwrap();
    assert_eq!(removed, Some(found));
    assert!(catalog.cache().is_empty());
    assert!(catalog.remove_playlist_game("p1", "game-00000").unwrap().is_none());
}

// ── Lookups ─────────────────────────────────────────────────────────────────

#[test]
fn suggestion_lookups() {
    let catalog = Catalog::open_memory(CatalogOptions::default()).unwrap();
    let game = |id: &str, platform: &str, path: &str, library: &str| Game {
        platform: platform.to_string(),
        application_path: path.to_string(),
        library: library.to_string(),
        ..Game::new(id, id)
    };
    catalog
        .update_games(&[
            game("a", "Flash", "flashplayer.exe", "arcade"),
            game("b", "Flash", "flashplayer.exe", "arcade"),
            game("c", "Flash", "projector.exe", "arcade"),
            game("d", "Unity", "unity.exe", "theatre"),
        ])
        .unwrap();

    assert_eq!(
        catalog.find_platform_app_paths("Flash").unwrap(),
        vec!["flashplayer.exe", "projector.exe"]
    );
    assert_eq!(catalog.find_platforms("arcade").unwrap(), vec!["Flash"]);
    assert_eq!(
        catalog.find_unique_values(GameField::Library).unwrap(),
        vec!["arcade", "theatre"]
    );
    assert_eq!(
        catalog.find_unique_values(GameField::Extreme).unwrap(),
        vec!["0"]
    );
}

#[test]
fn find_add_app_by_id() {
    let catalog = Catalog::open_memory(CatalogOptions::default()).unwrap();
    catalog.update_game(&game_with_apps("g1", 1)).unwrap();
    let app = catalog.find_add_app("g1-app0").unwrap().unwrap();
    assert_eq!(app.parent_game_id, "g1");
    assert!(catalog.find_add_app("missing").unwrap().is_none());
}

#[test]
fn random_games_are_distinct_and_bounded() {
    let catalog = Catalog::open_memory(CatalogOptions::default()).unwrap();
    catalog.update_games(&numbered_games(20)).unwrap();

    let picked = catalog.find_random_games(5).unwrap();
    assert_eq!(picked.len(), 5);
    let mut ids: Vec<&str> = picked.iter().map(|g| g.id.as_str()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 5);

    assert_eq!(catalog.find_random_games(50).unwrap().len(), 20);
}

#[test]
fn catalogs_can_share_a_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("games.db");
    let first = Catalog::open(&path, CatalogOptions::default()).unwrap();
    first.update_games(&numbered_games(4)).unwrap();

    let shared = Arc::clone(first.cache());
    let second = Catalog::with_cache(
        open_database(&path).unwrap(),
        shared,
        CatalogOptions::default(),
    );
    prime_cache(&first);
    assert_eq!(second.cache().len(), 1);

    second.update_game(&Game::new("extra", "Extra")).unwrap();
    assert!(first.cache().is_empty());
    assert_eq!(first.count_games().unwrap(), 5);
}
