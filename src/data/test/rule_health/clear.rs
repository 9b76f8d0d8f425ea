use super::*;

/// Tests clearing health after a successful delivery.
///
/// Expected: true the first time, false once the rule is healthy
#[tokio::test]
async fn clears_health_row() -> Result<(), AppError> {
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

    assert!(repo.clear(rule.id).await?);
    assert!(!repo.clear(rule.id).await?);
    assert!(repo.find_by_rule(rule.id).await?.is_none());

    Ok(())
}
