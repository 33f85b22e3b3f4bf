use ai_analyzer::{AiAnalyzer, AiOptions, OpenAiChat};
use std::sync::Arc;
use std::time::Duration;
use summarizer_core::ratelimiter::RateLimiter;
use summarizer_core::{HostRecord, HostSummary, Mode};
use tracing::{info, warn};

use crate::config::AiSettings;

/// Analysis strategy chosen once at startup.
#[derive(Clone)]
pub enum Engine {
    Mock { delay: Duration },
    Ai(AiAnalyzer),
}

impl Engine {
    pub fn mock(delay: Duration) -> Self {
        Engine::Mock { delay }
    }

    /// AI mode when a usable key is configured and the HTTP client builds, mock mode otherwise.
    ///
    /// Must run inside a Tokio runtime when `ai.qps > 0`.
    pub fn from_settings(ai: &AiSettings, mock_delay: Duration) -> Self {
        let Some(key) = ai.usable_key() else {
            info!("mock mode: rule-based analysis (set OPENAI_API_KEY for AI analysis)");
            return Engine::mock(mock_delay);
        };
        match OpenAiChat::new(&ai.base_url, key, &ai.model, ai.timeout) {
            Ok(chat) => {
                info!(model = %ai.model, base_url = %ai.base_url, "AI mode: chat completion analysis");
                let options = AiOptions { attempts: ai.attempts, ..AiOptions::default() };
                let analyzer = AiAnalyzer::new(Arc::new(chat))
                    .with_options(options)
                    .with_rate_limit(RateLimiter::optional(ai.qps));
                Engine::Ai(analyzer)
            }
            Err(e) => {
                warn!(error = %e, "completion client initialization failed, falling back to mock mode");
                Engine::mock(mock_delay)
            }
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Engine::Mock { .. } => Mode::Mock,
            Engine::Ai(_) => Mode::Ai,
        }
    }

    pub async fn analyze(&self, host: &HostRecord) -> HostSummary {
        match self {
            Engine::Mock { delay } => {
                if !delay.is_zero() {
                    tokio::time::sleep(*delay).await;
                }
                mock_analyzer::analyze(host)
            }
            Engine::Ai(analyzer) => analyzer.analyze(host).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PLACEHOLDER_API_KEY;

    #[test]
    fn placeholder_key_selects_mock() {
        let ai = AiSettings { api_key: Some(PLACEHOLDER_API_KEY.into()), ..AiSettings::default() };
        assert_eq!(Engine::from_settings(&ai, Duration::ZERO).mode(), Mode::Mock);
    }

    #[test]
    fn real_key_selects_ai() {
        let ai = AiSettings { api_key: Some("sk-test".into()), ..AiSettings::default() };
        assert_eq!(Engine::from_settings(&ai, Duration::ZERO).mode(), Mode::Ai);
    }

    #[tokio::test]
    async fn mock_engine_matches_rules() {
        let host: HostRecord = serde_json::from_str(r#"{"ip":"203.0.113.9","ports":[80]}"#).unwrap();
        let summary = Engine::mock(Duration::ZERO).analyze(&host).await;
        assert_eq!(summary, mock_analyzer::analyze(&host));
    }
}
