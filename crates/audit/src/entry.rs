//! Audit trail entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Actor name used when nobody is authenticated (or the actor source is not wired yet).
pub const SYSTEM_ACTOR: &str = "SYSTEM";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single append-only audit record.
///
/// Entries are never mutated after creation; the trail's insertion order is the
/// order of occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub recorded_at: DateTime<Utc>,
    pub actor: String,
    pub action: String,
}

impl AuditEntry {
    pub fn new(
        recorded_at: DateTime<Utc>,
        actor: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            recorded_at,
            actor: actor.into(),
            action: action.into(),
        }
    }

    /// The raw textual form: `[timestamp] Actor: [name] - Action: [description]`.
    pub fn raw(&self) -> String {
        self.to_string()
    }
}

impl core::fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "[{}] Actor: [{}] - Action: [{}]",
            self.recorded_at.format(TIMESTAMP_FORMAT),
            self.actor,
            self.action
        )
    }
}
