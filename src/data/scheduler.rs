use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};

use crate::{
    error::AppError,
    model::scheduler::{CreateSchedulerRecordParam, SchedulerRecord},
};

pub struct SchedulerRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SchedulerRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Checks whether any record exists for a rule, clan and event instance
    ///
    /// Used by the materializer to tell a newly observed instance (where the
    /// catch-up policy applies) from one that was already materialized.
    pub async fn has_instance(
        &self,
        rule_id: i32,
        clan_tag: &str,
        instance_key: &str,
    ) -> Result<bool, DbErr> {
        let count = entity::prelude::ReminderScheduler::find()
            .filter(entity::reminder_scheduler::Column::RuleId.eq(rule_id))
            .filter(entity::reminder_scheduler::Column::ClanTag.eq(clan_tag))
            .filter(entity::reminder_scheduler::Column::InstanceKey.eq(instance_key))
            .count(self.db)
            .await?;

        Ok(count > 0)
    }

    /// Inserts every record of one (rule, clan, instance) in a single transaction
    ///
    /// Either all records are written or none are, so an interrupted pass never
    /// leaves an instance partially materialized. Relies on the unique index over
    /// (rule, clan, instance, lead time): a conflict on any record means another
    /// pass already wrote the instance, and the whole batch is rolled back.
    ///
    /// # Returns
    /// - `Ok(Some(Vec<SchedulerRecord>))`: Every record was inserted
    /// - `Ok(None)`: At least one record already existed, nothing was inserted
    /// - `Err(AppError)`: Any other database error
    pub async fn create_instance(
        &self,
        params: Vec<CreateSchedulerRecordParam>,
    ) -> Result<Option<Vec<SchedulerRecord>>, AppError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let mut models = Vec::with_capacity(params.len());
        for param in params {
            match active_model(param, now).insert(&txn).await {
                Ok(model) => models.push(model),
                Err(err) if is_unique_violation(&err) => {
                    txn.rollback().await?;
                    return Ok(None);
                }
                Err(err) => return Err(err.into()),
            }
        }

        txn.commit().await?;

        let records = models
            .into_iter()
            .map(SchedulerRecord::from_entity)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(records))
    }

    /// Gets untriggered records whose fire time has passed, oldest first
    ///
    /// # Arguments
    /// - `now`: Current time
    /// - `limit`: Maximum number of records to return
    pub async fn get_due(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<SchedulerRecord>, AppError> {
        entity::prelude::ReminderScheduler::find()
            .filter(entity::reminder_scheduler::Column::Triggered.eq(false))
            .filter(entity::reminder_scheduler::Column::FireAt.lte(now))
            .order_by_asc(entity::reminder_scheduler::Column::FireAt)
            .order_by_asc(entity::reminder_scheduler::Column::Id)
            .limit(limit)
            .all(self.db)
            .await?
            .into_iter()
            .map(SchedulerRecord::from_entity)
            .collect()
    }

    /// Atomically claims a due record for delivery
    ///
    /// The update only matches while the record is untriggered and due, so among
    /// any number of concurrent callers exactly one sees a row affected.
    ///
    /// # Returns
    /// - `Ok(true)`: This caller owns delivery of the record
    /// - `Ok(false)`: Already claimed, not yet due, or missing
    /// - `Err(DbErr)`: Database error
    pub async fn claim(&self, id: i32, now: DateTime<Utc>) -> Result<bool, DbErr> {
        let result = entity::prelude::ReminderScheduler::update_many()
            .col_expr(entity::reminder_scheduler::Column::Triggered, Expr::value(true))
            .col_expr(
                entity::reminder_scheduler::Column::TriggeredAt,
                Expr::value(Some(now)),
            )
            .filter(entity::reminder_scheduler::Column::Id.eq(id))
            .filter(entity::reminder_scheduler::Column::Triggered.eq(false))
            .filter(entity::reminder_scheduler::Column::FireAt.lte(now))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Finds a record by ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<SchedulerRecord>, AppError> {
        entity::prelude::ReminderScheduler::find_by_id(id)
            .one(self.db)
            .await?
            .map(SchedulerRecord::from_entity)
            .transpose()
    }

    /// Gets every record of one rule's event instance for a clan, largest lead time first
    pub async fn get_by_instance(
        &self,
        rule_id: i32,
        clan_tag: &str,
        instance_key: &str,
    ) -> Result<Vec<SchedulerRecord>, AppError> {
        entity::prelude::ReminderScheduler::find()
            .filter(entity::reminder_scheduler::Column::RuleId.eq(rule_id))
            .filter(entity::reminder_scheduler::Column::ClanTag.eq(clan_tag))
            .filter(entity::reminder_scheduler::Column::InstanceKey.eq(instance_key))
            .order_by_desc(entity::reminder_scheduler::Column::LeadTimeSecs)
            .all(self.db)
            .await?
            .into_iter()
            .map(SchedulerRecord::from_entity)
            .collect()
    }

    /// Gets every record produced by a rule, ordered by fire time
    pub async fn get_by_rule(&self, rule_id: i32) -> Result<Vec<SchedulerRecord>, AppError> {
        entity::prelude::ReminderScheduler::find()
            .filter(entity::reminder_scheduler::Column::RuleId.eq(rule_id))
            .order_by_asc(entity::reminder_scheduler::Column::FireAt)
            .all(self.db)
            .await?
            .into_iter()
            .map(SchedulerRecord::from_entity)
            .collect()
    }
}

fn active_model(
    param: CreateSchedulerRecordParam,
    now: DateTime<Utc>,
) -> entity::reminder_scheduler::ActiveModel {
    entity::reminder_scheduler::ActiveModel {
        guild_id: ActiveValue::Set(param.guild_id.to_string()),
        rule_id: ActiveValue::Set(param.rule_id),
        clan_tag: ActiveValue::Set(param.clan_tag),
        instance_key: ActiveValue::Set(param.instance_key),
        kind: ActiveValue::Set(param.kind.as_str().to_string()),
        lead_time_secs: ActiveValue::Set(param.lead_time.num_seconds()),
        end_time: ActiveValue::Set(param.end_time),
        fire_at: ActiveValue::Set(param.fire_at),
        triggered: ActiveValue::Set(param.skipped),
        triggered_at: ActiveValue::Set(param.skipped.then_some(now)),
        skipped: ActiveValue::Set(param.skipped),
        created_at: ActiveValue::Set(now),
        ..Default::default()
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
