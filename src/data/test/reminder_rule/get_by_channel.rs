use super::*;

/// Tests matching rules by channel or thread.
///
/// Expected: Ok with the rule posting into the channel and the rule posting into
/// the thread, not the unrelated rule
#[tokio::test]
async fn matches_channel_and_thread() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_reminder_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let direct = factory::reminder_rule::ReminderRuleFactory::new(db)
        .channel_id("300")
        .build()
        .await?;
    let threaded = factory::reminder_rule::ReminderRuleFactory::new(db)
        .channel_id("301")
        .thread_id("300")
        .build()
        .await?;
    factory::reminder_rule::ReminderRuleFactory::new(db)
        .channel_id("302")
        .build()
        .await?;

    let rules = ReminderRuleRepository::new(db).get_by_channel(300).await?;
    let ids: Vec<i32> = rules.iter().map(|r| r.id).collect();

    assert_eq!(ids, vec![direct.id, threaded.id]);

    Ok(())
}

/// Tests that stored filters and webhook target decode onto the rule.
///
/// Expected: Ok with town hall range, roles, linked_only and webhook populated
#[tokio::test]
async fn decodes_filters_and_webhook() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_reminder_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::reminder_rule::ReminderRuleFactory::new(db)
        .channel_id("400")
        .webhook("900", "secret")
        .town_hall_range(Some(12), Some(16))
        .roles(["admin", "coLeader"])
        .linked_only(true)
        .min_remaining_attacks(2)
        .build()
        .await?;

    let rules = ReminderRuleRepository::new(db).get_by_channel(400).await?;
    assert_eq!(rules.len(), 1);

    let rule = &rules[0];
    assert_eq!(rule.filters.town_hall_min, Some(12));
    assert_eq!(rule.filters.town_hall_max, Some(16));
    assert_eq!(rule.filters.roles, vec![ClanRole::Elder, ClanRole::CoLeader]);
    assert!(rule.filters.linked_only);
    assert_eq!(rule.filters.min_remaining_attacks, Some(2));
    assert_eq!(
        rule.target.webhook,
        Some(WebhookTarget {
            id: 900,
            token: "secret".to_string()
        })
    );

    Ok(())
}
