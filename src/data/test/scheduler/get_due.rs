use super::*;

/// Tests that only untriggered, due records are returned, oldest first.
///
/// Expected: the two due records ordered by fire time
#[tokio::test]
async fn returns_due_untriggered_records_in_order() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_reminder_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let rule = factory::create_rule(db).await?;
    let now = Utc::now();

    let later = factory::scheduler_record::SchedulerRecordFactory::new(db, &rule)
        .instance_key("war:a")
        .fire_at(now - Duration::minutes(1))
        .build()
        .await?;
    let earlier = factory::scheduler_record::SchedulerRecordFactory::new(db, &rule)
        .instance_key("war:b")
        .fire_at(now - Duration::minutes(5))
        .build()
        .await?;
    factory::scheduler_record::SchedulerRecordFactory::new(db, &rule)
        .instance_key("war:c")
        .fire_at(now + Duration::minutes(5))
        .build()
        .await?;
    factory::scheduler_record::SchedulerRecordFactory::new(db, &rule)
        .instance_key("war:d")
        .fire_at(now - Duration::minutes(10))
        .triggered(true)
        .build()
        .await?;

    let due = SchedulerRepository::new(db).get_due(now, 100).await?;
    let ids: Vec<i32> = due.iter().map(|r| r.id).collect();

    assert_eq!(ids, vec![earlier.id, later.id]);

    Ok(())
}

/// Tests the batch limit.
///
/// Expected: at most `limit` records
#[tokio::test]
async fn respects_limit() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_reminder_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let rule = factory::create_rule(db).await?;
    let now = Utc::now();
    for i in 0..3 {
        factory::scheduler_record::SchedulerRecordFactory::new(db, &rule)
            .instance_key(format!("war:{}", i))
            .fire_at(now - Duration::minutes(i))
            .build()
            .await?;
    }

    let due = SchedulerRepository::new(db).get_due(now, 2).await?;
    assert_eq!(due.len(), 2);

    Ok(())
}
