//! Generator-or-fallback resolution of a consequence set.

use std::sync::Arc;

use solterra_domain::{ConsequenceSet, ConsequenceSource, ProtagonistId};

use super::normalize::normalize;
use crate::infrastructure::ports::{GenerationRequest, NarrativeGenerator};

/// Ask the generator for consequences, falling back on any failure.
///
/// Never fails: an unavailable generator, a timeout, a transport error and
/// unparseable output all end in the supplied fallback set.
pub struct ResolveConsequences {
    generator: Arc<dyn NarrativeGenerator>,
}

impl ResolveConsequences {
    pub fn new(generator: Arc<dyn NarrativeGenerator>) -> Self {
        Self { generator }
    }

    pub async fn execute(
        &self,
        character_id: ProtagonistId,
        request: GenerationRequest,
        fallback: impl FnOnce() -> ConsequenceSet + Send,
    ) -> (ConsequenceSet, ConsequenceSource) {
        let raw = match self.generator.generate(request).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    character_id = %character_id,
                    error = %e,
                    "Narrative generator failed, using fallback consequences"
                );
                return (fallback(), ConsequenceSource::Fallback);
            }
        };

        match normalize(&raw) {
            Ok(set) => (set, ConsequenceSource::Generated),
            Err(e) => {
                tracing::warn!(
                    character_id = %character_id,
                    error = %e,
                    "Generated consequences rejected, using fallback"
                );
                (fallback(), ConsequenceSource::Fallback)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{GenerationKind, GeneratorError, MockNarrativeGenerator};
    use solterra_domain::{choice_fallback, ConsequenceKind};

    fn request() -> GenerationRequest {
        GenerationRequest {
            kind: GenerationKind::Consequences,
            system_prompt: String::new(),
            prompt: "p".into(),
        }
    }

    #[tokio::test]
    async fn valid_output_is_used() {
        let mut generator = MockNarrativeGenerator::new();
        generator.expect_generate().returning(|_| {
            Ok(r#"{"immediate":[{"type":"trait","target":"bold","value":1}],"narrative":"n"}"#.into())
        });
        let resolver = ResolveConsequences::new(Arc::new(generator));

        let (set, source) = resolver
            .execute(ProtagonistId::new(), request(), || choice_fallback("work_priority"))
            .await;
        assert_eq!(source, ConsequenceSource::Generated);
        assert_eq!(set.immediate[0].kind, ConsequenceKind::Trait);
    }

    #[tokio::test]
    async fn timeout_falls_back() {
        let mut generator = MockNarrativeGenerator::new();
        generator
            .expect_generate()
            .returning(|_| Err(GeneratorError::Timeout(30)));
        let resolver = ResolveConsequences::new(Arc::new(generator));

        let (set, source) = resolver
            .execute(ProtagonistId::new(), request(), || choice_fallback("work_priority"))
            .await;
        assert_eq!(source, ConsequenceSource::Fallback);
        assert_eq!(set, choice_fallback("work_priority"));
    }

    #[tokio::test]
    async fn payload_without_immediate_falls_back() {
        let mut generator = MockNarrativeGenerator::new();
        generator
            .expect_generate()
            .returning(|_| Ok(r#"{"delayed": [], "narrative": "x"}"#.into()));
        let resolver = ResolveConsequences::new(Arc::new(generator));

        let (set, source) = resolver
            .execute(ProtagonistId::new(), request(), || choice_fallback("investigation_start"))
            .await;
        assert_eq!(source, ConsequenceSource::Fallback);
        assert_eq!(set, choice_fallback("investigation_start"));
    }
}
