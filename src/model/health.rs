//! Delivery health of reminder rules.
//!
//! Health rows are owned by the engine so that delivery failures can be surfaced to
//! the configuration layer without the engine ever writing to a rule.

use chrono::{DateTime, Utc};
use std::str::FromStr;

use crate::error::{internal::InternalError, AppError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// Retries were exhausted at least once; the target may still work.
    Failing,
    /// The target is gone or permissions were revoked; the rule is skipped.
    Broken,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Failing => "failing",
            HealthStatus::Broken => "broken",
        }
    }
}

impl FromStr for HealthStatus {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "failing" => Ok(HealthStatus::Failing),
            "broken" => Ok(HealthStatus::Broken),
            other => Err(InternalError::UnknownHealthStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleHealth {
    pub rule_id: i32,
    pub status: HealthStatus,
    pub last_error: String,
    pub consecutive_failures: i32,
    pub updated_at: DateTime<Utc>,
}

impl RuleHealth {
    pub fn from_entity(entity: entity::rule_health::Model) -> Result<Self, AppError> {
        Ok(Self {
            rule_id: entity.rule_id,
            status: entity.status.parse()?,
            last_error: entity.last_error,
            consecutive_failures: entity.consecutive_failures,
            updated_at: entity.updated_at,
        })
    }
}
