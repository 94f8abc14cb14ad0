use arcadia_catalog::{load_games, load_games_dir, load_playlist};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_yaml(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn load_games_with_add_apps() {
    let tmp = TempDir::new().unwrap();
    write_yaml(
        tmp.path(),
        "arcade.yaml",
        r#"
- id: 6b1c0a
  title: "Alien Hominid"
  developer: "The Behemoth"
  platform: Flash
  library: arcade
  tags: "Action; Shooter"
  extreme: false
  addApps:
    - id: 6b1c0a-extras
      name: Extras
      applicationPath: ":extras:"
      launchCommand: "Alien Hominid"
- id: 9f2e11
  title: "Bloons"
  library: arcade
"#,
    );

    let games = load_games(&tmp.path().join("arcade.yaml")).unwrap();
    assert_eq!(games.len(), 2);
    assert_eq!(games[0].title, "Alien Hominid");
    assert_eq!(games[0].developer, "The Behemoth");
    assert_eq!(games[0].add_apps.len(), 1);
    assert_eq!(games[0].add_apps[0].application_path, ":extras:");
    // Unspecified fields default to empty
    assert_eq!(games[1].developer, "");
    assert!(games[1].add_apps.is_empty());
}

#[test]
fn load_playlist_accepts_json_and_order_alias() {
    let tmp = TempDir::new().unwrap();
    write_yaml(
        tmp.path(),
        "favs.json",
        r#"{
  "id": "favs",
  "title": "Favourites",
  "author": "someone",
  "games": [
    { "playlistId": "favs", "gameId": "9f2e11", "order": 1 },
    { "playlistId": "favs", "gameId": "6b1c0a", "order": 0 }
  ]
}"#,
    );

    let playlist = load_playlist(&tmp.path().join("favs.json")).unwrap();
    assert_eq!(playlist.title, "Favourites");
    assert_eq!(playlist.games.len(), 2);
    assert_eq!(playlist.games[0].position, 1);
    assert_eq!(playlist.games[1].game_id, "6b1c0a");
}

#[test]
fn load_dir_reads_files_in_name_order() {
    let tmp = TempDir::new().unwrap();
    write_yaml(tmp.path(), "b.yaml", "- id: second\n  title: Second\n");
    write_yaml(tmp.path(), "a.yml", "- id: first\n  title: First\n");
    write_yaml(tmp.path(), "notes.txt", "not yaml at all: [");

    let games = load_games_dir(tmp.path()).unwrap();
    let ids: Vec<_> = games.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, vec!["first", "second"]);
}

#[test]
fn missing_dir_returns_empty() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nonexistent");
    let result = load_games_dir(&missing).unwrap();
    assert!(result.is_empty());
}

#[test]
fn parse_error_names_the_file() {
    let tmp = TempDir::new().unwrap();
    write_yaml(tmp.path(), "broken.yaml", "- id: [unterminated\n");
    let err = load_games(&tmp.path().join("broken.yaml")).unwrap_err();
    assert!(err.to_string().contains("broken.yaml"));
}
