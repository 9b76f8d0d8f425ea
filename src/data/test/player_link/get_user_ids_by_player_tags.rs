use super::*;

/// Tests looking up a mix of linked and unlinked players.
///
/// Expected: only linked tags present in the map
#[tokio::test]
async fn maps_linked_players_only() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_reminder_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::create_player_link(db, "#LQ2", "111").await?;
    factory::create_player_link(db, "#PY8", "222").await?;

    let users = PlayerLinkRepository::new(db)
        .get_user_ids_by_player_tags(&["#LQ2".to_string(), "#UUU".to_string()])
        .await?;

    assert_eq!(users.len(), 1);
    assert_eq!(users.get("#LQ2"), Some(&111));

    Ok(())
}

/// Tests an empty lookup does not query.
///
/// Expected: empty map
#[tokio::test]
async fn empty_input_returns_empty_map() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_reminder_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let users = PlayerLinkRepository::new(db)
        .get_user_ids_by_player_tags(&[])
        .await?;
    assert!(users.is_empty());

    Ok(())
}
