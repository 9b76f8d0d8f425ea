mod player_link;
mod reminder_rule;
mod rule_health;
mod scheduler;
