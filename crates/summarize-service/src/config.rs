use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Key shipped in example environment files; never a real credential.
pub const PLACEHOLDER_API_KEY: &str = "your_openai_api_key_here";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_AI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct AiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    /// Completion requests per second across all hosts; 0 disables pacing.
    pub qps: u32,
    pub attempts: u32,
}

impl AiSettings {
    /// The API key, unless it is missing, blank or the placeholder.
    pub fn usable_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && *k != PLACEHOLDER_API_KEY)
    }
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_AI_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            qps: 0,
            attempts: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind: SocketAddr,
    pub allowed_origins: Vec<String>,
    pub body_limit: usize,
    /// Simulated processing time per host in mock mode.
    pub mock_delay: Duration,
    /// Served at `/hosts_dataset.json` instead of the bundled dataset.
    pub sample_file: Option<PathBuf>,
    pub ai: AiSettings,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
            allowed_origins: vec!["http://localhost:5173".into(), "http://127.0.0.1:5173".into()],
            body_limit: 8 * 1024 * 1024,
            mock_delay: Duration::from_millis(500),
            sample_file: None,
            ai: AiSettings::default(),
        }
    }
}
