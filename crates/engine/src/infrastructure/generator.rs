//! Narrative generator implementations.
//!
//! [`LiveGenerator`] sits in front of a language model client with a response
//! cache, a hard timeout and usage accounting. [`NullGenerator`] is wired in
//! when no API key is configured, so every request falls back.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::cache::ResponseCache;
use super::ports::{
    ChatMessage, GenerationRequest, GeneratorError, GeneratorUsage, LlmPort, LlmRequest,
    NarrativeGenerator,
};

/// Dollars per input token.
pub const INPUT_TOKEN_COST: f64 = 0.000_003;
/// Dollars per output token.
pub const OUTPUT_TOKEN_COST: f64 = 0.000_015;

#[derive(Debug, Clone, Copy)]
pub struct GeneratorSettings {
    pub timeout: Duration,
    pub cache_ttl: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
}

pub struct LiveGenerator {
    llm: Arc<dyn LlmPort>,
    cache: ResponseCache,
    usage: Mutex<GeneratorUsage>,
    settings: GeneratorSettings,
}

impl LiveGenerator {
    pub fn new(llm: Arc<dyn LlmPort>, settings: GeneratorSettings) -> Self {
        Self {
            llm,
            cache: ResponseCache::new(settings.cache_ttl),
            usage: Mutex::new(GeneratorUsage::default()),
            settings,
        }
    }

    fn to_llm_request(&self, request: &GenerationRequest) -> LlmRequest {
        LlmRequest::new(vec![ChatMessage::user(request.prompt.clone())])
            .with_system_prompt(request.system_prompt.clone())
            .with_temperature(self.settings.temperature)
            .with_max_tokens(Some(self.settings.max_tokens))
    }
}

#[async_trait]
impl NarrativeGenerator for LiveGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GeneratorError> {
        let key = ResponseCache::key_for(&request);
        if let Some(text) = self.cache.get(&key).await {
            self.usage.lock().await.cache_hits += 1;
            tracing::debug!(kind = ?request.kind, "Generator cache hit");
            return Ok(text);
        }

        let llm_request = self.to_llm_request(&request);
        let timeout = self.settings.timeout;
        let response = match tokio::time::timeout(timeout, self.llm.generate(llm_request)).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(
                    kind = ?request.kind,
                    timeout_secs = timeout.as_secs(),
                    "Generator request timed out"
                );
                return Err(GeneratorError::Timeout(timeout.as_secs()));
            }
        };

        {
            let mut usage = self.usage.lock().await;
            usage.request_count += 1;
            if let Some(tokens) = response.usage {
                usage.input_tokens += u64::from(tokens.input_tokens);
                usage.output_tokens += u64::from(tokens.output_tokens);
                usage.estimated_cost += f64::from(tokens.input_tokens) * INPUT_TOKEN_COST
                    + f64::from(tokens.output_tokens) * OUTPUT_TOKEN_COST;
            }
        }

        let evicted = self.cache.cleanup_expired().await;
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted expired generator cache entries");
        }
        self.cache.insert(key, response.content.clone()).await;
        Ok(response.content)
    }

    async fn usage(&self) -> GeneratorUsage {
        self.cache.cleanup_expired().await;
        let mut usage = *self.usage.lock().await;
        usage.cache_size = self.cache.len().await;
        usage
    }

    async fn clear_cache(&self) {
        self.cache.clear().await;
        tracing::info!("Generator cache cleared");
    }
}

/// Generator used when no live service is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullGenerator;

#[async_trait]
impl NarrativeGenerator for NullGenerator {
    async fn generate(&self, _request: GenerationRequest) -> Result<String, GeneratorError> {
        Err(GeneratorError::Unavailable)
    }

    async fn usage(&self) -> GeneratorUsage {
        GeneratorUsage::default()
    }

    async fn clear_cache(&self) {}
}
