use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use summarizer_core::{parse_host_document, HealthResponse, HostRecord, HostSummary, SummarizeResponse};
use tracing::debug;
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Serialize)]
struct SummarizeBody<'a> {
    hosts: &'a [HostRecord],
}

/// HTTP client for the analysis service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let invalid = |reason: String| ClientError::InvalidUrl { url: base_url.to_string(), reason };
        let mut base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid("expected an http or https URL".into()));
        }
        // Url::join replaces the last segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| invalid(e.to_string()))?;
        Ok(ApiClient { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base.join(path).map_err(|e| ClientError::InvalidUrl {
            url: format!("{}{}", self.base, path),
            reason: e.to_string(),
        })
    }

    /// Where the service publishes its bundled sample dataset.
    pub fn default_sample_url(&self) -> Result<Url, ClientError> {
        self.endpoint("hosts_dataset.json")
    }

    fn unreachable(&self, e: reqwest::Error) -> ClientError {
        ClientError::Unreachable { url: self.base.to_string(), reason: e.to_string() }
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = self.endpoint("health")?;
        let resp = self.http.get(url).send().await.map_err(|e| self.unreachable(e))?;
        self.read_json(resp).await
    }

    /// Submit one batch. The service may return fewer items than hosts sent.
    pub async fn summarize(&self, hosts: &[HostRecord]) -> Result<Vec<HostSummary>, ClientError> {
        let url = self.endpoint("summarize")?;
        debug!(hosts = hosts.len(), %url, "submitting hosts for analysis");
        let resp = self
            .http
            .post(url)
            .json(&SummarizeBody { hosts })
            .send()
            .await
            .map_err(|e| self.unreachable(e))?;
        let body: SummarizeResponse = self.read_json(resp).await?;
        Ok(body.items)
    }

    /// GET a host document from `url`.
    pub async fn fetch_hosts(&self, url: &Url) -> Result<Vec<HostRecord>, ClientError> {
        let resp = self.http.get(url.clone()).send().await.map_err(|e| self.unreachable(e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::SampleStatus { status: status.as_u16() });
        }
        let text = resp.text().await.map_err(|e| self.unreachable(e))?;
        Ok(parse_host_document(&text)?)
    }

    async fn read_json<T: DeserializeOwned>(&self, resp: Response) -> Result<T, ClientError> {
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|e| self.unreachable(e))?;
        if !status.is_success() {
            return Err(ClientError::Service {
                status: status.as_u16(),
                message: error_detail(&bytes).unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            });
        }
        serde_json::from_slice(&bytes).map_err(|e| ClientError::MalformedResponse(e.to_string()))
    }
}

/// The string `detail` of an error body, if there is one.
fn error_detail(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value.get("detail")?.as_str().map(str::to_string)
}
