//! Request and response bodies of the analysis service.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::host::HostRecord;
use crate::summary::HostSummary;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SummarizeRequest {
    pub hosts: Vec<HostRecord>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub items: Vec<HostSummary>,
}

/// Analysis strategy the service runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "AI")]
    Ai,
    Mock,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Ai => f.write_str("AI"),
            Mode::Mock => f.write_str("Mock"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    // Kept as a string so newer servers reporting other modes still parse.
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_item_response() {
        let body = r#"{"items":[{"host_id":"1.1.1.1","overview":"ok","key_services":[],"risks":[],"recommendations":[]}]}"#;
        let resp: SummarizeResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.items.len(), 1);
        assert_eq!(resp.items[0].host_id, "1.1.1.1");
        assert_eq!(resp.items[0].overview, "ok");
    }

    #[test]
    fn mode_uses_service_spelling() {
        assert_eq!(serde_json::to_string(&Mode::Ai).unwrap(), "\"AI\"");
        assert_eq!(serde_json::to_string(&Mode::Mock).unwrap(), "\"Mock\"");
        assert_eq!(Mode::Ai.to_string(), "AI");
    }

    #[test]
    fn health_without_model_parses() {
        let h: HealthResponse = serde_json::from_str(r#"{"ok":true,"mode":"Mock"}"#).unwrap();
        assert!(h.ok);
        assert_eq!(h.model, None);
    }
}
