//! Promotion of due delayed consequences.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use solterra_domain::QueuedConsequence;

use crate::infrastructure::ports::ClockPort;
use crate::stores::DelayedQueue;

/// Removes due entries from the delayed queue and hands them back.
///
/// Nothing is applied here; callers decide what a triggered consequence
/// means for the story.
pub struct PromoteDelayed {
    queue: Arc<DelayedQueue>,
    clock: Arc<dyn ClockPort>,
}

impl PromoteDelayed {
    pub fn new(queue: Arc<DelayedQueue>, clock: Arc<dyn ClockPort>) -> Self {
        Self { queue, clock }
    }

    /// Tick at the current clock time.
    pub async fn execute(&self) -> Vec<QueuedConsequence> {
        self.tick(self.clock.now()).await
    }

    pub async fn tick(&self, now: DateTime<Utc>) -> Vec<QueuedConsequence> {
        let due = self.queue.take_due(now).await;
        for entry in &due {
            tracing::info!(
                character_id = %entry.protagonist_id,
                trigger = %entry.consequence.trigger,
                effect = %entry.consequence.effect,
                "Delayed consequence triggered"
            );
        }
        due
    }
}
