//! Clan Reminders Test Utils
//!
//! Provides shared testing utilities for the reminder engine. This crate offers a
//! builder pattern for creating test contexts with in-memory SQLite databases and
//! factories for inserting rules, scheduler records and player links.
//!
//! # Overview
//!
//! - **TestBuilder**: Fluent builder for configuring test environments
//! - **TestContext**: Test environment containing the database connection
//! - **TestError**: Error types that can occur during test setup
//! - **factory**: Entity factories with sensible defaults
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::builder::TestBuilder;
//!
//! #[tokio::test]
//! async fn test_scheduler_operations() -> Result<(), TestError> {
//!     let test = TestBuilder::new()
//!         .with_reminder_tables()
//!         .build()
//!         .await?;
//!
//!     let db = test.db.as_ref().unwrap();
//!     // Perform database operations...
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod factory;
