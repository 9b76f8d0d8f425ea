use entity::prelude::*;
use sea_orm::{
    sea_query::{Index, IndexCreateStatement, TableCreateStatement},
    EntityTrait, Schema,
};

use crate::{context::TestContext, error::TestError};

/// Builder for creating test contexts with customizable database schemas.
///
/// Provides a fluent interface for configuring test environments with in-memory SQLite
/// databases. Use the builder pattern to add entity tables and indexes, then call
/// `build()` to create the configured test context.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::builder::TestBuilder;
/// use entity::prelude::{ReminderRule, RuleHealth};
///
/// let test = TestBuilder::new()
///     .with_table(ReminderRule)
///     .with_table(RuleHealth)
///     .build()
///     .await?;
/// ```
pub struct TestBuilder {
    /// CREATE TABLE statements executed in insertion order during `build()`.
    tables: Vec<TableCreateStatement>,

    /// CREATE INDEX statements executed after every table exists.
    ///
    /// Entity-derived schemas carry no secondary indexes, so any unique constraint
    /// a test relies on must be added here.
    indexes: Vec<IndexCreateStatement>,
}

impl TestBuilder {
    /// Creates a new test builder with no tables configured.
    ///
    /// # Returns
    /// - New `TestBuilder` instance with empty table configuration
    pub fn new() -> Self {
        Self {
            tables: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Adds an entity table to the test database schema.
    ///
    /// Generates a CREATE TABLE statement from the provided SeaORM entity using SQLite
    /// backend syntax. Tables should be added in dependency order (tables with foreign
    /// keys after their referenced tables).
    ///
    /// # Arguments
    /// - `entity` - SeaORM entity model implementing `EntityTrait` to create table for
    ///
    /// # Returns
    /// - `Self` - Builder instance for method chaining
    pub fn with_table<E: EntityTrait>(mut self, entity: E) -> Self {
        let schema = Schema::new(sea_orm::DbBackend::Sqlite);
        self.tables.push(schema.create_table_from_entity(entity));
        self
    }

    /// Adds an index to the test database schema.
    ///
    /// # Arguments
    /// - `index` - CREATE INDEX statement for a table added via `with_table()`
    ///
    /// # Returns
    /// - `Self` - Builder instance for method chaining
    pub fn with_index(mut self, index: IndexCreateStatement) -> Self {
        self.indexes.push(index);
        self
    }

    /// Adds all tables used by the reminder engine.
    ///
    /// This convenience method adds the following in dependency order:
    /// - ReminderRule
    /// - ReminderScheduler, with its unique (rule, clan, instance, lead time) index
    /// - RuleHealth
    /// - PlayerLink
    ///
    /// # Returns
    /// - `Self` - Builder instance for method chaining
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let test = TestBuilder::new()
    ///     .with_reminder_tables()
    ///     .build()
    ///     .await?;
    /// ```
    pub fn with_reminder_tables(self) -> Self {
        self.with_table(ReminderRule)
            .with_table(ReminderScheduler)
            .with_index(
                Index::create()
                    .name("idx_reminder_scheduler_unique")
                    .table(ReminderScheduler)
                    .col(entity::reminder_scheduler::Column::RuleId)
                    .col(entity::reminder_scheduler::Column::ClanTag)
                    .col(entity::reminder_scheduler::Column::InstanceKey)
                    .col(entity::reminder_scheduler::Column::LeadTimeSecs)
                    .unique()
                    .to_owned(),
            )
            .with_table(RuleHealth)
            .with_table(PlayerLink)
    }

    /// Builds and initializes the test context with configured tables and indexes.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Fully initialized test context with database and tables ready
    /// - `Err(TestError::Database)`- Failed to connect to database or create the schema
    pub async fn build(self) -> Result<TestContext, TestError> {
        let mut setup = TestContext::new();

        setup.with_tables(self.tables).await?;
        setup.with_indexes(self.indexes).await?;

        Ok(setup)
    }
}

impl Default for TestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
