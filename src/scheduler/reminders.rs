use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::{
    config::EngineConfig,
    error::AppError,
    service::{dispatch::ReminderDispatcher, materializer::TriggerMaterializer},
};

/// Starts the reminder scheduler
///
/// Registers two jobs:
/// - The materialization pass, which writes scheduler records for every active event
///   instance of every enabled rule
/// - The dispatch tick, which claims due records and delivers them
///
/// Job failures are logged and never stop the scheduler. The returned handle is kept
/// by the caller so it can shut the scheduler down.
///
/// # Arguments
/// - `materializer`: Trigger materializer run by the materialization job
/// - `dispatcher`: Reminder dispatcher run by the dispatch job
/// - `config`: Engine configuration holding both cron schedules
pub async fn start_scheduler(
    materializer: TriggerMaterializer,
    dispatcher: ReminderDispatcher,
    config: &EngineConfig,
) -> Result<JobScheduler, AppError> {
    let scheduler = JobScheduler::new().await?;

    let materialize_job = Job::new_async(config.materialize_schedule.as_str(), move |_uuid, _lock| {
        let materializer = materializer.clone();

        Box::pin(async move {
            match materializer.materialize_all(Utc::now()).await {
                Ok(summary) => {
                    if summary.records_created > 0 || summary.records_skipped > 0 {
                        tracing::info!(
                            "Materialized {} reminder records ({} skipped as past) across {} rules",
                            summary.records_created,
                            summary.records_skipped,
                            summary.rules_scanned
                        );
                    } else {
                        tracing::debug!(
                            "Materialization pass scanned {} rules, nothing new",
                            summary.rules_scanned
                        );
                    }
                }
                Err(e) => tracing::error!("Error materializing reminder records: {}", e),
            }
        })
    })?;

    let dispatch_job = Job::new_async(config.dispatch_schedule.as_str(), move |_uuid, _lock| {
        let dispatcher = dispatcher.clone();

        Box::pin(async move {
            match dispatcher.run_once(Utc::now()).await {
                Ok(summary) => {
                    if summary.claimed > 0 || summary.retried > 0 {
                        tracing::info!(
                            "Dispatched {} due reminders ({} retries)",
                            summary.claimed,
                            summary.retried
                        );
                    }
                }
                Err(e) => tracing::error!("Error dispatching reminders: {}", e),
            }
        })
    })?;

    scheduler.add(materialize_job).await?;
    scheduler.add(dispatch_job).await?;
    scheduler.start().await?;

    tracing::info!("Reminder scheduler started");

    Ok(scheduler)
}
