use chrono::Utc;
use migration::OnConflict;
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect,
};

use crate::{
    error::AppError,
    model::health::{HealthStatus, RuleHealth},
};

pub struct RuleHealthRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> RuleHealthRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a delivery failure for a rule
    ///
    /// Increments the consecutive failure count and stores the latest error. A rule
    /// already marked broken stays broken even when a later failure is only failing.
    ///
    /// # Arguments
    /// - `rule_id`: Rule whose delivery failed
    /// - `status`: Health status implied by this failure
    /// - `error`: Failure description shown to guild admins
    ///
    /// # Returns
    /// - `Ok(RuleHealth)`: Health row after the update
    /// - `Err(AppError)`: Database error
    pub async fn record_failure(
        &self,
        rule_id: i32,
        status: HealthStatus,
        error: &str,
    ) -> Result<RuleHealth, AppError> {
        let existing = self.find_by_rule(rule_id).await?;

        let (status, consecutive_failures) = match existing {
            Some(health) => {
                let status = if health.status == HealthStatus::Broken {
                    HealthStatus::Broken
                } else {
                    status
                };
                (status, health.consecutive_failures + 1)
            }
            None => (status, 1),
        };

        let model = entity::prelude::RuleHealth::insert(entity::rule_health::ActiveModel {
            rule_id: ActiveValue::Set(rule_id),
            status: ActiveValue::Set(status.as_str().to_string()),
            last_error: ActiveValue::Set(error.to_string()),
            consecutive_failures: ActiveValue::Set(consecutive_failures),
            updated_at: ActiveValue::Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::column(entity::rule_health::Column::RuleId)
                .update_columns([
                    entity::rule_health::Column::Status,
                    entity::rule_health::Column::LastError,
                    entity::rule_health::Column::ConsecutiveFailures,
                    entity::rule_health::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_with_returning(self.db)
        .await?;

        RuleHealth::from_entity(model)
    }

    /// Clears a rule's health after a successful delivery
    ///
    /// # Returns
    /// - `Ok(true)`: A health row was removed
    /// - `Ok(false)`: The rule was already healthy
    pub async fn clear(&self, rule_id: i32) -> Result<bool, DbErr> {
        let result = entity::prelude::RuleHealth::delete_by_id(rule_id)
            .exec(self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Finds the health row of a rule, `None` meaning healthy
    pub async fn find_by_rule(&self, rule_id: i32) -> Result<Option<RuleHealth>, AppError> {
        entity::prelude::RuleHealth::find_by_id(rule_id)
            .one(self.db)
            .await?
            .map(RuleHealth::from_entity)
            .transpose()
    }

    /// Gets the IDs of every rule marked broken
    pub async fn get_broken_rule_ids(&self) -> Result<Vec<i32>, DbErr> {
        entity::prelude::RuleHealth::find()
            .select_only()
            .column(entity::rule_health::Column::RuleId)
            .filter(entity::rule_health::Column::Status.eq(HealthStatus::Broken.as_str()))
            .into_tuple::<i32>()
            .all(self.db)
            .await
    }
}
