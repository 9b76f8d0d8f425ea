pub use super::player_link::Entity as PlayerLink;
pub use super::reminder_rule::Entity as ReminderRule;
pub use super::reminder_scheduler::Entity as ReminderScheduler;
pub use super::rule_health::Entity as RuleHealth;
