use arcadia_catalog::{
    Cursor, FilterSpec, GameField, GameQuery, OrderDirection, OrderSpec, PageIndex,
};

#[test]
fn browse_request_deserializes_from_wire_shape() {
    let json = r#"{
        "filter": {
            "whitelist": [{ "field": "library", "value": "arcade" }],
            "genericWhitelist": ["mario"]
        },
        "orderBy": "title",
        "orderDirection": "DESC",
        "limit": 50,
        "shallow": true,
        "getTotal": true,
        "cursor": { "orderVal": "Mario Bros", "id": "abc" }
    }"#;
    let query: GameQuery = serde_json::from_str(json).unwrap();
    let filter = query.filter.as_ref().unwrap();
    assert_eq!(filter.whitelist[0].field, "library");
    assert_eq!(filter.generic_whitelist, vec!["mario"]);
    assert_eq!(query.limit, Some(50));
    assert!(query.shallow && query.get_total);
    assert_eq!(query.cursor, Some(Cursor::new("Mario Bros", "abc")));
    assert_eq!(
        query.order_spec().unwrap(),
        OrderSpec::desc(GameField::Title)
    );
}

#[test]
fn order_spec_defaults_to_id_ascending() {
    let query = GameQuery::new();
    assert_eq!(query.order_spec().unwrap(), OrderSpec::asc(GameField::Id));
}

#[test]
fn order_spec_rejects_unknown_field() {
    let query = GameQuery {
        order_by: Some("popularity".to_string()),
        ..GameQuery::default()
    };
    assert!(query.order_spec().is_err());
}

#[test]
fn direction_parses_loosely() {
    assert_eq!("asc".parse::<OrderDirection>().unwrap(), OrderDirection::Asc);
    assert_eq!("DESC".parse::<OrderDirection>().unwrap(), OrderDirection::Desc);
    assert!("sideways".parse::<OrderDirection>().is_err());
}

#[test]
fn page_index_keys_and_resume_cursors() {
    let index = PageIndex::from_boundaries(vec![Cursor::new("B", "b"), Cursor::new("D", "d")]);
    assert_eq!(index.len(), 2);
    assert_eq!(index.get(1), Some(&Cursor::new("B", "b")));
    assert_eq!(index.get(2), Some(&Cursor::new("D", "d")));

    assert_eq!(index.resume_cursor(0), None);
    assert_eq!(index.resume_cursor(1), None);
    assert_eq!(index.resume_cursor(2), Some(&Cursor::new("B", "b")));
    assert_eq!(index.resume_cursor(3), Some(&Cursor::new("D", "d")));
    assert_eq!(index.resume_cursor(4), None);
}

#[test]
fn page_count_covers_trailing_partial_page() {
    assert_eq!(PageIndex::page_count(0, 2), 1);
    assert_eq!(PageIndex::page_count(4, 2), 2);
    assert_eq!(PageIndex::page_count(5, 2), 3);
    assert_eq!(PageIndex::page_count(1, 250), 1);
    // Zero page size is treated as one row per page
    assert_eq!(PageIndex::page_count(3, 0), 3);
}

#[test]
fn page_index_serializes_as_page_map() {
    let index = PageIndex::from_boundaries(vec![Cursor::new("B", "b")]);
    let json = serde_json::to_string(&index).unwrap();
    assert_eq!(json, r#"{"1":{"orderVal":"B","id":"b"}}"#);
}

#[test]
fn filter_builders_accumulate_terms() {
    let filter = FilterSpec::default()
        .with_whitelist("library", "arcade")
        .with_blacklist("extreme", true)
        .with_phrase("mario")
        .without_phrase("demo")
        .in_playlist("favs");
    assert_eq!(filter.whitelist.len(), 1);
    assert_eq!(filter.blacklist.len(), 1);
    assert_eq!(filter.generic_blacklist, vec!["demo"]);
    assert_eq!(filter.playlist_id.as_deref(), Some("favs"));
    assert!(!filter.is_empty());
    assert!(FilterSpec::default().is_empty());
}
