use super::*;

/// Tests replacing a rule's editable fields.
///
/// Expected: Ok(Some) with new lead times and template, guild and kind unchanged
#[tokio::test]
async fn updates_editable_fields() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_reminder_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = ReminderRuleRepository::new(db);
    let rule = repo.create(create_param(42)).await?;

    let updated = repo
        .update(UpdateReminderRuleParam {
            id: rule.id,
            clan_tags: vec!["#8QU".to_string()],
            lead_times: vec![Duration::hours(2)],
            target: DeliveryTarget::channel(556),
            filters: RuleFilters::default(),
            message_template: "hurry".to_string(),
            disabled: true,
        })
        .await?
        .unwrap();

    assert_eq!(updated.guild_id, 42);
    assert_eq!(updated.kind, ReminderKind::War);
    assert_eq!(updated.clan_tags, vec!["#8QU".to_string()]);
    assert_eq!(updated.lead_times, vec![Duration::hours(2)]);
    assert_eq!(updated.target.channel_id, 556);
    assert_eq!(updated.message_template, "hurry");
    assert!(updated.disabled);

    Ok(())
}

/// Tests updating a rule that does not exist.
///
/// Expected: Ok(None)
#[tokio::test]
async fn returns_none_for_missing_rule() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_reminder_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = ReminderRuleRepository::new(db);
    let result = repo
        .update(UpdateReminderRuleParam {
            id: 999,
            clan_tags: vec![],
            lead_times: vec![],
            target: DeliveryTarget::channel(1),
            filters: RuleFilters::default(),
            message_template: String::new(),
            disabled: true,
        })
        .await?;

    assert!(result.is_none());

    Ok(())
}
