use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DelayedConsequence, ProtagonistId, QueuedConsequenceId};

/// A delayed consequence waiting in the process-wide queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedConsequence {
    pub id: QueuedConsequenceId,
    pub protagonist_id: ProtagonistId,
    pub consequence: DelayedConsequence,
    pub queued_at: DateTime<Utc>,
}

impl QueuedConsequence {
    pub fn new(
        protagonist_id: ProtagonistId,
        consequence: DelayedConsequence,
        queued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: QueuedConsequenceId::new(),
            protagonist_id,
            consequence,
            queued_at,
        }
    }

    /// Due once `now - queued_at >= delay`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        let delay_ms = i64::try_from(self.consequence.delay_secs)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000);
        now.signed_duration_since(self.queued_at).num_milliseconds() >= delay_ms
    }
}
