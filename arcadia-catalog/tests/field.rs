use arcadia_catalog::{FieldKind, FieldValue, Game, GameField};

#[test]
fn parse_accepts_request_and_column_names() {
    assert_eq!("playMode".parse::<GameField>().unwrap(), GameField::PlayMode);
    assert_eq!("play_mode".parse::<GameField>().unwrap(), GameField::PlayMode);
    assert_eq!("title".parse::<GameField>().unwrap(), GameField::Title);
}

#[test]
fn parse_rejects_unknown_names() {
    let err = "favouriteColour".parse::<GameField>().unwrap_err();
    assert_eq!(err.0, "favouriteColour");
    assert!("game.title".parse::<GameField>().is_err());
    assert!("".parse::<GameField>().is_err());
}

#[test]
fn registry_names_round_trip() {
    for field in GameField::ALL {
        assert_eq!(field.name().parse::<GameField>().unwrap(), field);
        assert_eq!(field.column().parse::<GameField>().unwrap(), field);
    }
}

#[test]
fn exact_fields_are_extreme_broken_library() {
    let exact: Vec<_> = GameField::ALL.into_iter().filter(|f| f.is_exact()).collect();
    assert_eq!(
        exact,
        vec![GameField::Broken, GameField::Extreme, GameField::Library]
    );
    assert_eq!(GameField::Extreme.kind(), FieldKind::Bool);
    assert_eq!(GameField::Library.kind(), FieldKind::Text);
}

#[test]
fn value_of_reads_typed_fields() {
    let mut game = Game::new("g1", "Bloons");
    game.extreme = true;
    game.developer = "Ninja Kiwi".to_string();

    assert_eq!(GameField::Title.value_of(&game), FieldValue::from("Bloons"));
    assert_eq!(GameField::Extreme.value_of(&game), FieldValue::Bool(true));
    assert_eq!(
        GameField::Developer.value_of(&game),
        FieldValue::Text("Ninja Kiwi".to_string())
    );
}

#[test]
fn field_value_deserializes_untagged() {
    let v: FieldValue = serde_json::from_str("true").unwrap();
    assert_eq!(v, FieldValue::Bool(true));
    let v: FieldValue = serde_json::from_str("3").unwrap();
    assert_eq!(v, FieldValue::Int(3));
    let v: FieldValue = serde_json::from_str("\"arcade\"").unwrap();
    assert_eq!(v, FieldValue::Text("arcade".to_string()));
}
