//! Retrying wrapper for language model transports.
//!
//! Transient transport failures (connection errors, 429, 5xx, garbled
//! bodies) are retried with exponential backoff. Client errors are returned
//! immediately. The caller's overall timeout still bounds the whole attempt
//! chain, so retries only ever happen inside that budget.

use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use crate::infrastructure::ports::{LlmError, LlmPort, LlmRequest, LlmResponse};

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = just the initial attempt)
    pub max_retries: u32,
    pub base_delay_ms: u64,
    /// Caps exponential growth
    pub max_delay_ms: u64,
    /// Jitter factor (0.0-1.0) applied around each delay
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 500,
            max_delay_ms: 4000,
            jitter_factor: 0.2,
        }
    }
}

pub struct ResilientLlmClient {
    inner: Arc<dyn LlmPort>,
    config: RetryConfig,
}

impl ResilientLlmClient {
    pub fn new(inner: Arc<dyn LlmPort>, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// Delay before retry number `attempt` (1-based): base * 2^(attempt-1), capped, jittered.
    fn calculate_delay(&self, attempt: u32) -> u64 {
        let base = self.config.base_delay_ms;
        let exponential = base.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        let capped = exponential.min(self.config.max_delay_ms);

        let jitter_range = (capped as f64 * self.config.jitter_factor) as i64;
        if jitter_range > 0 {
            let jitter = rand::thread_rng().gen_range(-jitter_range..=jitter_range);
            (capped as i64 + jitter).max(0) as u64
        } else {
            capped
        }
    }

    fn is_retryable(error: &LlmError) -> bool {
        match error {
            LlmError::RequestFailed(msg) => match leading_status(msg) {
                Some(429) => true,
                Some(code) => code >= 500,
                // No status: connection reset, DNS failure and the like.
                None => true,
            },
            LlmError::InvalidResponse(_) => true,
        }
    }
}

/// HTTP status at the start of an error message ("503 Service Unavailable: ...").
fn leading_status(msg: &str) -> Option<u16> {
    let digits: String = msg.trim_start().chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() == 3 {
        digits.parse().ok()
    } else {
        None
    }
}

#[async_trait]
impl LlmPort for ResilientLlmClient {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let mut attempt = 0;
        loop {
            match self.inner.generate(request.clone()).await {
                Ok(response) => {
                    if attempt > 0 {
                        tracing::info!(attempt = attempt + 1, "Generator request succeeded after retry");
                    }
                    return Ok(response);
                }
                Err(e) if attempt < self.config.max_retries && Self::is_retryable(&e) => {
                    attempt += 1;
                    let delay = self.calculate_delay(attempt);
                    tracing::warn!(
                        attempt,
                        max_retries = self.config.max_retries,
                        delay_ms = delay,
                        error = %e,
                        "Generator request failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => {
                    tracing::warn!(
                        attempts = attempt + 1,
                        retryable = Self::is_retryable(&e),
                        error = %e,
                        "Generator request failed"
                    );
                    return Err(e);
                }
            }
        }
    }
}
