use super::*;

/// Tests claiming a due record.
///
/// Expected: first claim true and the record marked triggered, second claim false
#[tokio::test]
async fn claims_due_record_once() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_reminder_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let rule = factory::create_rule(db).await?;
    let record = factory::create_record(db, &rule).await?;
    let now = Utc::now();
    let repo = SchedulerRepository::new(db);

    assert!(repo.claim(record.id, now).await?);
    assert!(!repo.claim(record.id, now).await?);

    let stored = repo.find_by_id(record.id).await?.unwrap();
    assert!(stored.triggered);
    assert!(stored.triggered_at.is_some());

    Ok(())
}

/// Tests that a record cannot be claimed before its fire time.
///
/// Expected: false and the record still untriggered
#[tokio::test]
async fn refuses_record_not_yet_due() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_reminder_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let rule = factory::create_rule(db).await?;
    let now = Utc::now();
    let record = factory::scheduler_record::SchedulerRecordFactory::new(db, &rule)
        .fire_at(now + Duration::seconds(30))
        .build()
        .await?;
    let repo = SchedulerRepository::new(db);

    assert!(!repo.claim(record.id, now).await?);
    assert!(!repo.find_by_id(record.id).await?.unwrap().triggered);

    Ok(())
}

/// Tests many workers racing for the same record.
///
/// Expected: exactly one claim succeeds
#[tokio::test]
async fn concurrent_claims_have_single_winner() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_reminder_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let rule = factory::create_rule(db).await?;
    let record = factory::create_record(db, &rule).await?;
    let now = Utc::now();

    let claim = || async { SchedulerRepository::new(db).claim(record.id, now).await };
    let results = tokio::join!(claim(), claim(), claim(), claim(), claim());
    let wins = [results.0?, results.1?, results.2?, results.3?, results.4?]
        .into_iter()
        .filter(|won| *won)
        .count();

    assert_eq!(wins, 1);

    Ok(())
}
