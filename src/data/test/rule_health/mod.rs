use crate::{data::rule_health::RuleHealthRepository, error::AppError, model::health::HealthStatus};
use test_utils::{builder::TestBuilder, factory};

mod clear;
mod record_failure;
