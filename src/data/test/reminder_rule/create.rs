use super::*;

/// Tests creating a rule with filters and a webhook target.
///
/// Verifies that every column survives the JSON and string encoding used for
/// storage and decodes back to the same domain values.
///
/// Expected: Ok with rule created and readable by ID
#[tokio::test]
async fn creates_rule_with_filters_and_webhook() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_reminder_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = ReminderRuleRepository::new(db);
    let mut param = create_param(42);
    param.target = DeliveryTarget {
        channel_id: 555,
        webhook: Some(WebhookTarget {
            id: 777,
            token: "secret".to_string(),
        }),
        thread_id: Some(888),
    };
    param.filters = RuleFilters {
        town_hall_min: Some(12),
        town_hall_max: None,
        linked_only: true,
        roles: vec![ClanRole::Leader, ClanRole::CoLeader],
        min_remaining_attacks: Some(2),
    };

    let rule = repo.create(param.clone()).await?;

    assert_eq!(rule.guild_id, 42);
    assert_eq!(rule.kind, ReminderKind::War);
    assert_eq!(rule.lead_times, param.lead_times);
    assert_eq!(rule.target, param.target);
    assert_eq!(rule.filters, param.filters);

    let found = repo.find_by_id(rule.id).await?;
    assert_eq!(found, Some(rule));

    Ok(())
}

/// Tests finding a rule that does not exist.
///
/// Expected: Ok(None)
#[tokio::test]
async fn find_by_id_returns_none_for_missing_rule() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_reminder_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = ReminderRuleRepository::new(db);
    assert!(repo.find_by_id(999).await?.is_none());

    Ok(())
}
