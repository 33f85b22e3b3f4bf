//! Host analysis through a chat completion API, falling back to the rule engine.

pub mod chat;
pub mod parse;
pub mod prompts;

use rand::{thread_rng, Rng};
use std::sync::Arc;
use std::time::Duration;
use summarizer_core::ratelimiter::RateLimiter;
use summarizer_core::{HostRecord, HostSummary};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use chat::{ChatBackend, ChatError, CompletionParams, OpenAiChat, Prompt};

#[derive(Debug, Error)]
pub enum AttemptError {
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error("completion was not a valid summary: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct AiOptions {
    pub attempts: u32,
    pub retry_delay: Duration,
    pub params: CompletionParams,
}

impl Default for AiOptions {
    fn default() -> Self {
        Self { attempts: 3, retry_delay: Duration::from_millis(250), params: CompletionParams::default() }
    }
}

#[derive(Clone)]
pub struct AiAnalyzer {
    backend: Arc<dyn ChatBackend>,
    options: AiOptions,
    pacer: Option<RateLimiter>,
}

impl AiAnalyzer {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend, options: AiOptions::default(), pacer: None }
    }

    pub fn with_options(mut self, options: AiOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_rate_limit(mut self, pacer: Option<RateLimiter>) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    /// Analyze one host. Never fails: after the last attempt the rule engine answers.
    pub async fn analyze(&self, host: &HostRecord) -> HostSummary {
        let host_id = mock_analyzer::host_id(host);
        let prompt = prompts::build_prompt(host);
        let attempts = self.options.attempts.max(1);
        for attempt in 1..=attempts {
            if let Some(p) = &self.pacer {
                p.acquire().await;
            }
            debug!(host = %host_id, attempt, model = self.model(), "requesting completion");
            match self.attempt(&prompt, &host_id).await {
                Ok(summary) => {
                    info!(
                        host = %host_id,
                        risks = summary.risks.len(),
                        recommendations = summary.recommendations.len(),
                        "AI analysis succeeded"
                    );
                    return summary;
                }
                Err(e) => {
                    warn!(host = %host_id, attempt, error = %e, "AI analysis attempt failed");
                    if attempt < attempts {
                        tokio::time::sleep(self.backoff(attempt)).await;
                    }
                }
            }
        }
        warn!(host = %host_id, "all AI attempts failed, falling back to rule-based analysis");
        mock_analyzer::analyze(host)
    }

    async fn attempt(&self, prompt: &Prompt, host_id: &str) -> Result<HostSummary, AttemptError> {
        let content = self.backend.complete(prompt, &self.options.params).await?;
        debug!(host = %host_id, chars = content.len(), "completion received");
        Ok(parse::parse_summary(&content, host_id)?)
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.options.retry_delay.as_millis() as u64;
        let exp = base.saturating_mul(1u64 << (attempt - 1).min(6));
        let jitter = thread_rng().gen_range(0..(exp / 4 + 1));
        Duration::from_millis(exp + jitter)
    }
}
