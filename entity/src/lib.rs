//! SeaORM entities for the reminder engine tables.

pub mod prelude;

pub mod player_link;
pub mod reminder_rule;
pub mod reminder_scheduler;
pub mod rule_health;
