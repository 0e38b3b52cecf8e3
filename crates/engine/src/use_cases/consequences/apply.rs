//! Applying a consequence set to a character and the world.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use solterra_domain::{
    ChapterProgress, Consequence, ConsequenceKind, ConsequenceSet, Protagonist, QueuedConsequence,
};

use crate::stores::{DelayedQueue, GameStore};

/// Counts from one application, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub applied: usize,
    pub skipped: usize,
    pub queued: usize,
}

/// Dispatches immediate consequences by kind and queues delayed ones.
///
/// Works on the caller's working copy of the protagonist and chapter
/// progress; the caller commits both once the whole choice has been
/// processed. World changes go straight to the store as increments.
pub struct ApplyConsequences {
    store: Arc<GameStore>,
    queue: Arc<DelayedQueue>,
}

impl ApplyConsequences {
    pub fn new(store: Arc<GameStore>, queue: Arc<DelayedQueue>) -> Self {
        Self { store, queue }
    }

    pub async fn execute(
        &self,
        set: &ConsequenceSet,
        protagonist: &mut Protagonist,
        progress: &mut ChapterProgress,
        now: DateTime<Utc>,
    ) -> ApplySummary {
        let mut summary = ApplySummary::default();

        for consequence in &set.immediate {
            if self.apply_one(consequence, protagonist, progress).await {
                summary.applied += 1;
            } else {
                summary.skipped += 1;
                tracing::debug!(
                    character_id = %protagonist.id,
                    kind = %consequence.kind,
                    target = %consequence.target,
                    "Skipped consequence with unknown target"
                );
            }
        }

        for delayed in &set.delayed {
            self.queue
                .enqueue(QueuedConsequence::new(protagonist.id, delayed.clone(), now))
                .await;
            summary.queued += 1;
        }

        tracing::debug!(
            character_id = %protagonist.id,
            applied = summary.applied,
            skipped = summary.skipped,
            queued = summary.queued,
            "Applied consequences"
        );
        summary
    }

    async fn apply_one(
        &self,
        consequence: &Consequence,
        protagonist: &mut Protagonist,
        progress: &mut ChapterProgress,
    ) -> bool {
        let Consequence {
            kind,
            target,
            value,
            ..
        } = consequence;

        match kind {
            ConsequenceKind::Reputation => protagonist.adjust_reputation(target, *value),
            ConsequenceKind::Relationship => {
                protagonist.adjust_relationship(target, *value)
                    || progress.adjust_colleague(target, *value)
            }
            ConsequenceKind::Stat => protagonist.adjust_stat(target, *value),
            ConsequenceKind::Trait => {
                let tag = target.trim();
                if tag.is_empty() {
                    return false;
                }
                protagonist.add_trait(tag);
                true
            }
            ConsequenceKind::WorldState => {
                if consequence.targets_surveillance() {
                    self.store.add_surveillance(*value).await;
                    true
                } else {
                    false
                }
            }
            ConsequenceKind::StoryFlag => {
                tracing::debug!(flag = %target, value, "Story flag noted");
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use solterra_domain::{DelayedConsequence, Faction, Region, StatKind};

    fn setup() -> (ApplyConsequences, Arc<GameStore>, Arc<DelayedQueue>, Protagonist, ChapterProgress) {
        let store = Arc::new(GameStore::new());
        let queue = Arc::new(DelayedQueue::new());
        let protagonist = Protagonist::new("Aria", Utc::now());
        let progress = ChapterProgress::start(&protagonist, Utc::now());
        (
            ApplyConsequences::new(store.clone(), queue.clone()),
            store,
            queue,
            protagonist,
            progress,
        )
    }

    #[tokio::test]
    async fn dispatches_each_kind() {
        let (apply, store, queue, mut protagonist, mut progress) = setup();
        let set = ConsequenceSet::new(
            vec![
                Consequence::reputation("Koro", 2, ""),
                Consequence::relationship("Echo Traders", -1, ""),
                Consequence::relationship("Supervisor Thane", 1, ""),
                Consequence::stat("stress", 3, ""),
                Consequence::trait_tag("observant", ""),
                Consequence::new(ConsequenceKind::WorldState, "surveillance_influence", 4, ""),
                Consequence::story_flag("general_progress", 1, ""),
            ],
            vec![DelayedConsequence::event("Review", "Questions", "3 days")],
            "n",
        );

        let summary = apply.execute(&set, &mut protagonist, &mut progress, Utc::now()).await;

        assert_eq!(summary, ApplySummary { applied: 7, skipped: 0, queued: 1 });
        assert_eq!(protagonist.reputation_in(Region::Koro), 2);
        assert_eq!(protagonist.relationship_with(Faction::EchoTraders), -1);
        assert_eq!(progress.colleague_relationships["Supervisor Thane"], 1);
        assert_eq!(protagonist.stat(StatKind::Stress), 3);
        assert!(protagonist.traits.contains("observant"));
        assert_eq!(store.world().await.surveillance_influence, 4);
        assert_eq!(queue.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_targets_leave_state_unchanged() {
        let (apply, store, _queue, mut protagonist, mut progress) = setup();
        let before = protagonist.clone();
        let progress_before = progress.clone();
        let set = ConsequenceSet::new(
            vec![
                Consequence::reputation("Atlantis", 5, ""),
                Consequence::relationship("The Guild", 5, ""),
                Consequence::stat("resources", 1, ""),
                Consequence::new(ConsequenceKind::WorldState, "weather", 3, ""),
            ],
            vec![],
            "n",
        );

        let summary = apply.execute(&set, &mut protagonist, &mut progress, Utc::now()).await;

        assert_eq!(summary.skipped, 4);
        assert_eq!(protagonist, before);
        assert_eq!(progress, progress_before);
        assert_eq!(store.world().await.surveillance_influence, 0);
    }

    #[tokio::test]
    async fn duplicate_traits_are_not_added_twice() {
        let (apply, _store, _queue, mut protagonist, mut progress) = setup();
        let set = ConsequenceSet::new(
            vec![
                Consequence::trait_tag("aware", ""),
                Consequence::trait_tag("aware", ""),
            ],
            vec![],
            "n",
        );
        apply.execute(&set, &mut protagonist, &mut progress, Utc::now()).await;
        assert_eq!(protagonist.traits.len(), 1);
    }
}
