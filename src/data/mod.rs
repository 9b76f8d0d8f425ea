//! Database repository layer.
//!
//! Repositories wrap SeaORM entity operations for each table and return domain models
//! so services never see entity rows. The scheduler repository holds the two store
//! primitives the engine's concurrency model relies on: the unique-constrained insert
//! and the conditional claim update.

pub mod player_link;
pub mod reminder_rule;
pub mod rule_health;
pub mod scheduler;

#[cfg(test)]
mod test;
