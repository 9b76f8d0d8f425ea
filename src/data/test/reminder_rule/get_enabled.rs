use super::*;

/// Tests that disabled rules are left out.
///
/// Expected: Ok with only the enabled rule
#[tokio::test]
async fn excludes_disabled_rules() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_reminder_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let enabled = factory::create_rule(db).await?;
    factory::reminder_rule::ReminderRuleFactory::new(db)
        .disabled(true)
        .build()
        .await?;

    let rules = ReminderRuleRepository::new(db).get_enabled().await?;

    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].id, enabled.id);

    Ok(())
}

/// Tests that a rule with an undecodable column does not hide the others.
///
/// Expected: Ok with the malformed rule skipped
#[tokio::test]
async fn skips_malformed_rules() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_reminder_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::reminder_rule::ReminderRuleFactory::new(db)
        .kind("cwl")
        .build()
        .await?;
    let good = factory::create_rule(db).await?;

    let rules = ReminderRuleRepository::new(db).get_enabled().await?;

    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].id, good.id);

    Ok(())
}

/// Tests filtering rules by guild.
///
/// Expected: Ok with only the guild's rules, disabled ones included
#[tokio::test]
async fn get_by_guild_returns_guild_rules() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_reminder_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::reminder_rule::ReminderRuleFactory::new(db)
        .guild_id("100")
        .build()
        .await?;
    factory::reminder_rule::ReminderRuleFactory::new(db)
        .guild_id("100")
        .disabled(true)
        .build()
        .await?;
    factory::reminder_rule::ReminderRuleFactory::new(db)
        .guild_id("200")
        .build()
        .await?;

    let rules = ReminderRuleRepository::new(db).get_by_guild(100).await?;

    assert_eq!(rules.len(), 2);
    assert!(rules.iter().all(|r| r.guild_id == 100));

    Ok(())
}
