//! Per-host analysis findings as returned by `/summarize`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

// Emitted lower-case, accepted in any case.
impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyService {
    // Any integer; model output is not range-checked.
    #[serde(default)]
    pub port: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finding: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Risk {
    pub severity: Severity,
    pub risk: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

impl Risk {
    pub fn new(severity: Severity, risk: impl Into<String>, evidence: impl Into<String>) -> Self {
        Risk { severity, risk: risk.into(), evidence: Some(evidence.into()) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSummary {
    pub host_id: String,
    pub overview: String,
    #[serde(default)]
    pub key_services: Vec<KeyService>,
    #[serde(default)]
    pub risks: Vec<Risk>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl HostSummary {
    pub fn highest_severity(&self) -> Option<Severity> {
        self.risks.iter().map(|r| r.severity).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_accepts_any_case() {
        let r: Risk = serde_json::from_str(r#"{"severity":"CRITICAL","risk":"x"}"#).unwrap();
        assert_eq!(r.severity, Severity::Critical);
        let r: Risk = serde_json::from_str(r#"{"severity":"Medium","risk":"x","evidence":"e"}"#).unwrap();
        assert_eq!(r.severity, Severity::Medium);
        assert_eq!(r.evidence.as_deref(), Some("e"));
        assert!(serde_json::from_str::<Risk>(r#"{"severity":"severe","risk":"x"}"#).is_err());
    }

    #[test]
    fn severity_serializes_lower_and_displays_upper() {
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"high\"");
        assert_eq!(Severity::High.to_string(), "HIGH");
    }

    #[test]
    fn summary_defaults_missing_lists() {
        let s: HostSummary = serde_json::from_str(r#"{"host_id":"1.1.1.1","overview":"ok"}"#).unwrap();
        assert!(s.key_services.is_empty() && s.risks.is_empty() && s.recommendations.is_empty());
        assert_eq!(s.highest_severity(), None);
    }

    #[test]
    fn out_of_range_ports_still_parse() {
        let s: HostSummary = serde_json::from_str(
            r#"{"host_id":"h","overview":"o","key_services":[{"port":70000,"name":"X"},{"port":-1}]}"#,
        )
        .unwrap();
        assert_eq!(s.key_services[0].port, Some(70000));
        assert_eq!(s.key_services[1].port, Some(-1));
    }

    #[test]
    fn highest_severity_picks_max() {
        let s = HostSummary {
            host_id: "h".into(),
            overview: String::new(),
            key_services: vec![],
            risks: vec![Risk::new(Severity::Medium, "a", "b"), Risk::new(Severity::Critical, "c", "d")],
            recommendations: vec![],
        };
        assert_eq!(s.highest_severity(), Some(Severity::Critical));
    }
}
