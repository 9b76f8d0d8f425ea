use super::*;

/// Tests relinking a player to a different user.
///
/// Expected: the newer user replaces the old link
#[tokio::test]
async fn replaces_existing_link() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_reminder_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::create_player_link(db, "#LQ2", "111").await?;

    let repo = PlayerLinkRepository::new(db);
    let link = repo.upsert("#LQ2", 222).await?;
    assert_eq!(link.user_id, 222);

    let users = repo.get_user_ids_by_player_tags(&["#LQ2".to_string()]).await?;
    assert_eq!(users.get("#LQ2"), Some(&222));

    assert!(repo.delete("#LQ2").await?);
    assert!(!repo.delete("#LQ2").await?);

    Ok(())
}
