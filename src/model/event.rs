use chrono::{DateTime, Duration, Utc};

use crate::model::reminder::ReminderKind;

/// One concrete occurrence of a recurring game event for a clan.
///
/// Derived from live game state and never persisted directly; the materializer
/// turns it into scheduler records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventInstance {
    pub clan_tag: String,
    pub kind: ReminderKind,
    /// Stable identifier of this occurrence, e.g. `war:20261016T120000.000Z`
    pub instance_key: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl EventInstance {
    /// Absolute fire time of a reminder `lead_time` before the event ends.
    pub fn fire_at(&self, lead_time: Duration) -> DateTime<Utc> {
        self.end_time - lead_time
    }
}
