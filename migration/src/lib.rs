pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_reminder_rule_table;
mod m20261001_000002_create_reminder_scheduler_table;
mod m20261001_000003_create_rule_health_table;
mod m20261001_000004_create_player_link_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_reminder_rule_table::Migration),
            Box::new(m20261001_000002_create_reminder_scheduler_table::Migration),
            Box::new(m20261001_000003_create_rule_health_table::Migration),
            Box::new(m20261001_000004_create_player_link_table::Migration),
        ]
    }
}
