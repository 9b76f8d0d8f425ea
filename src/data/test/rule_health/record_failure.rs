use super::*;

/// Tests the first failure of a healthy rule.
///
/// Expected: health row with one consecutive failure
#[tokio::test]
async fn creates_health_row_on_first_failure() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_reminder_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let rule = factory::create_rule(db).await?;
    let repo = RuleHealthRepository::new(db);

    let health = repo
        .record_failure(rule.id, HealthStatus::Failing, "HTTP 503: unavailable")
        .await?;

    assert_eq!(health.status, HealthStatus::Failing);
    assert_eq!(health.consecutive_failures, 1);
    assert_eq!(health.last_error, "HTTP 503: unavailable");

    Ok(())
}

/// Tests repeated failures increment the counter and escalate to broken.
///
/// Expected: broken after a terminal failure, still broken after a later
/// retryable failure
#[tokio::test]
async fn escalates_and_never_downgrades_broken() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_reminder_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let rule = factory::create_rule(db).await?;
    let repo = RuleHealthRepository::new(db);

    repo.record_failure(rule.id, HealthStatus::Failing, "timeout")
        .await?;
    let broken = repo
        .record_failure(rule.id, HealthStatus::Broken, "HTTP 404: Unknown Channel")
        .await?;
    assert_eq!(broken.status, HealthStatus::Broken);
    assert_eq!(broken.consecutive_failures, 2);

    let still_broken = repo
        .record_failure(rule.id, HealthStatus::Failing, "timeout")
        .await?;
    assert_eq!(still_broken.status, HealthStatus::Broken);
    assert_eq!(still_broken.consecutive_failures, 3);
    assert_eq!(still_broken.last_error, "timeout");

    assert_eq!(repo.get_broken_rule_ids().await?, vec![rule.id]);

    Ok(())
}
