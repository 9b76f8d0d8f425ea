use super::*;

/// Tests deleting a rule leaves its scheduler records in place.
///
/// Records have no foreign key to their rule so delivery history survives.
///
/// Expected: Ok(1) and the record still present
#[tokio::test]
async fn deletes_rule_but_keeps_records() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_reminder_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let rule = factory::create_rule(db).await?;
    let record = factory::create_record(db, &rule).await?;

    let repo = ReminderRuleRepository::new(db);
    assert_eq!(repo.delete(rule.id).await?, 1);
    assert_eq!(repo.delete(rule.id).await?, 0);

    assert!(repo.find_by_id(rule.id).await?.is_none());
    let kept = entity::prelude::ReminderScheduler::find_by_id(record.id)
        .one(db)
        .await?;
    assert!(kept.is_some());

    Ok(())
}
