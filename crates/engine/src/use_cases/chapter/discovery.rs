//! Discovery state machine for the technical investigation.

use std::sync::Arc;

use solterra_domain::{
    choice_pattern, discovery_fallback, ChapterProgress, DiscoveryState, DiscoveryTier,
    Protagonist, StatKind,
};

use super::accumulator::accumulate;
use super::{ChapterError, StepOutcome};
use crate::stores::GameStore;
use crate::use_cases::consequences::ResolveConsequences;
use crate::use_cases::prompts;

/// Resolves the one investigation of a chapter at an explicit tier.
pub struct ResolveDiscovery {
    store: Arc<GameStore>,
    resolver: Arc<ResolveConsequences>,
    threshold: u32,
}

impl ResolveDiscovery {
    pub fn new(store: Arc<GameStore>, resolver: Arc<ResolveConsequences>, threshold: u32) -> Self {
        Self {
            store,
            resolver,
            threshold,
        }
    }

    pub async fn execute(
        &self,
        protagonist: &mut Protagonist,
        progress: &mut ChapterProgress,
        level: &str,
    ) -> Result<StepOutcome, ChapterError> {
        let tier: DiscoveryTier = level.parse()?;
        if progress.discovery.is_some() {
            return Err(ChapterError::DiscoveryAlreadyResolved);
        }

        let state = DiscoveryState::reached(tier);
        let known = state.known_count();
        progress.discovery = Some(state);
        protagonist.adjust_stat(StatKind::Knowledge.as_str(), tier.knowledge_gain());

        let established = match choice_pattern("discovery_approach", tier.approach()) {
            Ok(weights) => accumulate(protagonist, progress, weights, self.threshold),
            Err(_) => None,
        };

        let alert = tier.policy().surveillance_delta();
        if alert > 0 {
            let total = self.store.add_surveillance(alert).await;
            tracing::info!(
                character_id = %protagonist.id,
                delta = alert,
                surveillance_influence = total,
                "Security alert raised"
            );
        }

        tracing::info!(
            character_id = %protagonist.id,
            tier = %tier,
            knowledge_flags = known,
            "Discovery resolved"
        );

        let world = self.store.world().await;
        let request = prompts::discovery_request(protagonist, &world, tier);
        let (consequences, source) = self
            .resolver
            .execute(protagonist.id, request, || discovery_fallback(tier))
            .await;

        let mut outcome = StepOutcome::new(consequences, source);
        outcome.background_established = established;
        Ok(outcome)
    }
}
