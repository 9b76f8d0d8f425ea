use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReminderRule::Table)
                    .if_not_exists()
                    .col(pk_auto(ReminderRule::Id))
                    .col(string(ReminderRule::GuildId))
                    .col(string(ReminderRule::Kind))
                    .col(json(ReminderRule::ClanTags))
                    .col(json(ReminderRule::LeadTimes))
                    .col(string(ReminderRule::ChannelId))
                    .col(string_null(ReminderRule::WebhookId))
                    .col(string_null(ReminderRule::WebhookToken))
                    .col(string_null(ReminderRule::ThreadId))
                    .col(integer_null(ReminderRule::TownHallMin))
                    .col(integer_null(ReminderRule::TownHallMax))
                    .col(boolean(ReminderRule::LinkedOnly).default(false))
                    .col(json(ReminderRule::Roles))
                    .col(integer_null(ReminderRule::MinRemainingAttacks))
                    .col(text(ReminderRule::MessageTemplate))
                    .col(boolean(ReminderRule::Disabled).default(false))
                    .col(
                        timestamp_with_time_zone(ReminderRule::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(
                        timestamp_with_time_zone(ReminderRule::UpdatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reminder_rule_guild_id")
                    .table(ReminderRule::Table)
                    .col(ReminderRule::GuildId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_reminder_rule_guild_id")
                    .table(ReminderRule::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ReminderRule::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ReminderRule {
    Table,
    Id,
    GuildId,
    Kind,
    ClanTags,
    LeadTimes,
    ChannelId,
    WebhookId,
    WebhookToken,
    ThreadId,
    TownHallMin,
    TownHallMax,
    LinkedOnly,
    Roles,
    MinRemainingAttacks,
    MessageTemplate,
    Disabled,
    CreatedAt,
    UpdatedAt,
}
