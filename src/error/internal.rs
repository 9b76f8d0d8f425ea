use std::num::ParseIntError;
use thiserror::Error;

/// Internal issues with the codebase indicating unexpected behavior & possible bugs
#[derive(Error, Debug)]
pub enum InternalError {
    /// Failure to parse id from String
    #[error("Failed to parse ID from String '{value}': {source}")]
    ParseStringId {
        /// The string value that failed to parse
        value: String,
        /// The underlying parse error
        #[source]
        source: ParseIntError,
    },

    /// A stored reminder kind is not one of the known kinds.
    #[error("Unknown reminder kind '{0}'")]
    UnknownReminderKind(String),

    /// A stored health status is not one of the known statuses.
    #[error("Unknown rule health status '{0}'")]
    UnknownHealthStatus(String),

    /// A JSON column of a stored rule does not have the expected shape.
    #[error("Malformed JSON column '{column}' on reminder rule {rule_id}: {source}")]
    MalformedRuleColumn {
        /// ID of the rule holding the bad value
        rule_id: i32,
        /// Name of the column
        column: &'static str,
        /// The underlying decode error
        #[source]
        source: serde_json::Error,
    },
}
