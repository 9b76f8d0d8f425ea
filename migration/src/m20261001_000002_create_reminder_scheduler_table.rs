use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // No foreign key to reminder_rule: scheduler rows outlive deleted rules
        manager
            .create_table(
                Table::create()
                    .table(ReminderScheduler::Table)
                    .if_not_exists()
                    .col(pk_auto(ReminderScheduler::Id))
                    .col(string(ReminderScheduler::GuildId))
                    .col(integer(ReminderScheduler::RuleId))
                    .col(string(ReminderScheduler::ClanTag))
                    .col(string(ReminderScheduler::InstanceKey))
                    .col(string(ReminderScheduler::Kind))
                    .col(big_integer(ReminderScheduler::LeadTimeSecs))
                    .col(timestamp_with_time_zone(ReminderScheduler::EndTime))
                    .col(timestamp_with_time_zone(ReminderScheduler::FireAt))
                    .col(boolean(ReminderScheduler::Triggered).default(false))
                    .col(timestamp_with_time_zone_null(ReminderScheduler::TriggeredAt))
                    .col(boolean(ReminderScheduler::Skipped).default(false))
                    .col(
                        timestamp_with_time_zone(ReminderScheduler::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // De-duplication barrier for concurrent materialization
        manager
            .create_index(
                Index::create()
                    .name("idx_reminder_scheduler_unique")
                    .table(ReminderScheduler::Table)
                    .col(ReminderScheduler::RuleId)
                    .col(ReminderScheduler::ClanTag)
                    .col(ReminderScheduler::InstanceKey)
                    .col(ReminderScheduler::LeadTimeSecs)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Due record polling
        manager
            .create_index(
                Index::create()
                    .name("idx_reminder_scheduler_due")
                    .table(ReminderScheduler::Table)
                    .col(ReminderScheduler::Triggered)
                    .col(ReminderScheduler::FireAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_reminder_scheduler_due")
                    .table(ReminderScheduler::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_reminder_scheduler_unique")
                    .table(ReminderScheduler::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ReminderScheduler::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ReminderScheduler {
    Table,
    Id,
    GuildId,
    RuleId,
    ClanTag,
    InstanceKey,
    Kind,
    LeadTimeSecs,
    EndTime,
    FireAt,
    Triggered,
    TriggeredAt,
    Skipped,
    CreatedAt,
}
