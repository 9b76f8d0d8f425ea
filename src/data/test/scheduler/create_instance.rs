use super::*;

const INSTANCE: &str = "war:20261016T120000.000Z";

/// Tests inserting all lead times of an instance at once.
///
/// Expected: Ok(Some) with one untriggered record per lead time
#[tokio::test]
async fn inserts_every_lead_time() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_reminder_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let rule = factory::create_rule(db).await?;
    let end = Utc::now() + Duration::hours(3);
    let repo = SchedulerRepository::new(db);

    let records = repo
        .create_instance(vec![
            create_param(&rule, Duration::hours(1), end),
            create_param(&rule, Duration::minutes(15), end),
        ])
        .await?
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].rule_id, rule.id);
    assert_eq!(records[0].fire_at, end - Duration::hours(1));
    assert!(records.iter().all(|r| !r.triggered && r.triggered_at.is_none()));
    assert!(repo.has_instance(rule.id, "#2PP", INSTANCE).await?);

    Ok(())
}

/// Tests that a conflict on one lead time rolls back the whole instance.
///
/// Expected: Ok(None) and only the record written beforehand remains
#[tokio::test]
async fn conflict_rolls_back_whole_instance() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_reminder_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let rule = factory::create_rule(db).await?;
    let end = Utc::now() + Duration::hours(3);
    let repo = SchedulerRepository::new(db);

    repo.create_instance(vec![create_param(&rule, Duration::minutes(15), end)])
        .await?
        .unwrap();

    let result = repo
        .create_instance(vec![
            create_param(&rule, Duration::hours(1), end),
            create_param(&rule, Duration::minutes(15), end),
        ])
        .await?;

    assert!(result.is_none());

    let records = repo.get_by_instance(rule.id, "#2PP", INSTANCE).await?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].lead_time, Duration::minutes(15));

    Ok(())
}

/// Tests concurrent inserts of the same instance.
///
/// Expected: exactly one caller wins and every lead time is stored once
#[tokio::test]
async fn concurrent_inserts_store_each_record_once() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_reminder_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let rule = factory::create_rule(db).await?;
    let end = Utc::now() + Duration::hours(3);

    let insert_all = || async {
        SchedulerRepository::new(db)
            .create_instance(vec![
                create_param(&rule, Duration::hours(1), end),
                create_param(&rule, Duration::minutes(15), end),
            ])
            .await
    };

    let (a, b, c) = tokio::join!(insert_all(), insert_all(), insert_all());
    let winners = [a?, b?, c?].iter().filter(|r| r.is_some()).count();
    assert_eq!(winners, 1);

    let records = SchedulerRepository::new(db)
        .get_by_instance(rule.id, "#2PP", INSTANCE)
        .await?;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].lead_time, Duration::hours(1));
    assert_eq!(records[1].lead_time, Duration::minutes(15));

    Ok(())
}

/// Tests inserting a record already skipped by the catch-up policy.
///
/// Expected: record stored triggered and skipped
#[tokio::test]
async fn inserts_skipped_record_as_triggered() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_reminder_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let rule = factory::create_rule(db).await?;
    let end = Utc::now() + Duration::minutes(10);
    let mut param = create_param(&rule, Duration::hours(1), end);
    param.skipped = true;

    let records = SchedulerRepository::new(db)
        .create_instance(vec![param])
        .await?
        .unwrap();

    assert!(records[0].triggered);
    assert!(records[0].skipped);
    assert!(records[0].triggered_at.is_some());

    Ok(())
}
