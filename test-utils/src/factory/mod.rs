//! Factory methods for creating test data.
//!
//! This module provides factory methods for creating test entities with sensible
//! defaults, reducing boilerplate in tests.
//!
//! # Overview
//!
//! Each entity has its own factory module with both a `Factory` struct for
//! customization and a `create_*` convenience function for quick default creation.
//!
//! # Basic Usage
//!
//! ```rust,ignore
//! use test_utils::factory;
//!
//! let rule = factory::create_rule(&db).await?;
//! let record = factory::create_record(&db, &rule).await?;
//! ```
//!
//! # Customization
//!
//! ```rust,ignore
//! let rule = factory::reminder_rule::ReminderRuleFactory::new(&db)
//!     .kind("raid")
//!     .clan_tags(["#2PP", "#8QU"])
//!     .lead_times_minutes([60, 15])
//!     .build()
//!     .await?;
//! ```
//!
//! # Available Factories
//!
//! - `reminder_rule` - Create reminder rule entities
//! - `scheduler_record` - Create scheduler record entities
//! - `player_link` - Create player link entities
//! - `helpers` - Unique ID generation shared by all factories

pub mod helpers;
pub mod player_link;
pub mod reminder_rule;
pub mod scheduler_record;

pub use player_link::create_player_link;
pub use reminder_rule::create_rule;
pub use scheduler_record::create_record;
