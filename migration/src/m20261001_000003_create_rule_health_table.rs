use sea_orm_migration::{prelude::*, schema::*};

use super::m20261001_000001_create_reminder_rule_table::ReminderRule;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RuleHealth::Table)
                    .if_not_exists()
                    .col(integer(RuleHealth::RuleId).primary_key())
                    .col(string(RuleHealth::Status))
                    .col(text(RuleHealth::LastError))
                    .col(integer(RuleHealth::ConsecutiveFailures).default(0))
                    .col(
                        timestamp_with_time_zone(RuleHealth::UpdatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rule_health_rule_id")
                            .from(RuleHealth::Table, RuleHealth::RuleId)
                            .to(ReminderRule::Table, ReminderRule::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RuleHealth::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum RuleHealth {
    Table,
    RuleId,
    Status,
    LastError,
    ConsecutiveFailures,
    UpdatedAt,
}
