use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Default, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub allowed_origins: Option<Vec<String>>,
    pub body_limit_bytes: Option<usize>,
    pub mock_delay_ms: Option<u64>,
    pub sample_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub qps: Option<u32>,
    pub attempts: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct ClientConfig {
    pub api_url: Option<String>,
    pub sample: Option<String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Config {
    pub server: Option<ServerConfig>,
    pub ai: Option<AiConfig>,
    pub client: Option<ClientConfig>,
}

/// Load `path`, or `./summarizer.yaml` when it exists. No file means defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = Path::new("summarizer.yaml");
            if p.exists() { p.to_path_buf() } else { return Ok(Config::default()); }
        }
    };
    let s = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    serde_yaml::from_str(&s).with_context(|| format!("parsing {}", path.display()))
}

impl Config {
    /// Environment variables win over the file.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let ai = self.ai.get_or_insert_with(AiConfig::default);
        if let Some(v) = lookup("OPENAI_API_KEY") { ai.api_key = Some(v); }
        if let Some(v) = lookup("MODEL") { ai.model = Some(v); }
        if let Some(v) = lookup("OPENAI_BASE_URL") { ai.base_url = Some(v); }
        if let Some(v) = lookup("SUMMARIZER_API_URL") {
            self.client.get_or_insert_with(ClientConfig::default).api_url = Some(v);
        }
    }

    pub fn api_url(&self) -> String {
        self.client
            .as_ref()
            .and_then(|c| c.api_url.clone())
            .unwrap_or_else(|| summarizer_client::DEFAULT_API_URL.to_string())
    }

    pub fn sample(&self) -> Option<String> {
        self.client.as_ref().and_then(|c| c.sample.clone())
    }

    pub fn client_timeout(&self) -> Duration {
        self.client
            .as_ref()
            .and_then(|c| c.timeout_ms)
            .map(Duration::from_millis)
            .unwrap_or(summarizer_client::api::DEFAULT_TIMEOUT)
    }

    #[cfg(feature = "serve")]
    pub fn service_config(&self) -> Result<summarize_service::ServiceConfig> {
        let mut cfg = summarize_service::ServiceConfig::default();
        if let Some(s) = &self.server {
            if let Some(b) = &s.bind {
                cfg.bind = b.parse().with_context(|| format!("invalid server.bind {b}"))?;
            }
            if let Some(o) = &s.allowed_origins { cfg.allowed_origins = o.clone(); }
            if let Some(n) = s.body_limit_bytes { cfg.body_limit = n; }
            if let Some(ms) = s.mock_delay_ms { cfg.mock_delay = Duration::from_millis(ms); }
            cfg.sample_file = s.sample_file.clone();
        }
        if let Some(a) = &self.ai {
            cfg.ai.api_key = a.api_key.clone();
            if let Some(m) = &a.model { cfg.ai.model = m.clone(); }
            if let Some(u) = &a.base_url { cfg.ai.base_url = u.clone(); }
            if let Some(ms) = a.timeout_ms { cfg.ai.timeout = Duration::from_millis(ms); }
            if let Some(q) = a.qps { cfg.ai.qps = q; }
            if let Some(n) = a.attempts { cfg.ai.attempts = n.max(1); }
        }
        Ok(cfg)
    }
}
