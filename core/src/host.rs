//! Opaque host records and the two document shapes a host list can arrive in.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Keys consulted, in order, for a host's identity.
const IDENTITY_KEYS: [&str; 3] = ["ip", "host", "hostname"];

/// One network host as loaded from a dataset.
///
/// Only the identity keys and the `services`/`ports` arrays are ever read.
/// Everything else is carried through untouched so that unknown fields survive
/// the trip to the analysis service and back out through exports.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostRecord(Map<String, Value>);

impl HostRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        HostRecord(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// First truthy value among `ip`, `host`, `hostname`.
    pub fn identity(&self) -> Option<String> {
        IDENTITY_KEYS
            .iter()
            .filter_map(|k| self.0.get(*k))
            .find(|v| is_truthy(v))
            .map(display_value)
    }

    /// Identity for display, `"Unknown"` when the record carries none.
    pub fn display_id(&self) -> String {
        self.identity().unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn services(&self) -> Option<&Vec<Value>> {
        self.0.get("services").and_then(Value::as_array)
    }

    pub fn ports(&self) -> Option<&Vec<Value>> {
        self.0.get("ports").and_then(Value::as_array)
    }

    /// Number of services, falling back to the number of ports.
    pub fn service_count(&self) -> usize {
        self.services().or_else(|| self.ports()).map(Vec::len).unwrap_or(0)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for HostRecord {
    fn from(fields: Map<String, Value>) -> Self {
        HostRecord(fields)
    }
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("expected an array of hosts or an object with a \"hosts\" array")]
    UnexpectedShape,
    #[error("host entry {0} is not a JSON object")]
    NotAnObject(usize),
}

/// Parse a host list from text: either `[...]` or `{"hosts": [...]}`.
pub fn parse_host_document(text: &str) -> Result<Vec<HostRecord>, DocumentError> {
    let value: Value = serde_json::from_str(text)?;
    hosts_from_value(value)
}

pub fn hosts_from_value(value: Value) -> Result<Vec<HostRecord>, DocumentError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("hosts") {
            Some(Value::Array(items)) => items,
            _ => return Err(DocumentError::UnexpectedShape),
        },
        _ => return Err(DocumentError::UnexpectedShape),
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(fields) => Ok(HostRecord(fields)),
            _ => Err(DocumentError::NotAnObject(i)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> HostRecord {
        match v {
            Value::Object(m) => HostRecord::new(m),
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn identity_prefers_ip_then_host_then_hostname() {
        let r = record(json!({"hostname": "c", "host": "b", "ip": "a"}));
        assert_eq!(r.identity().as_deref(), Some("a"));
        let r = record(json!({"hostname": "c", "host": "b"}));
        assert_eq!(r.identity().as_deref(), Some("b"));
        let r = record(json!({"hostname": "c"}));
        assert_eq!(r.identity().as_deref(), Some("c"));
    }

    #[test]
    fn identity_skips_falsy_values() {
        let r = record(json!({"ip": "", "host": null, "hostname": "web-1"}));
        assert_eq!(r.display_id(), "web-1");
        let r = record(json!({"ip": 0, "host": false}));
        assert_eq!(r.display_id(), "Unknown");
    }

    #[test]
    fn non_string_identity_is_rendered() {
        let r = record(json!({"ip": 167772161}));
        assert_eq!(r.display_id(), "167772161");
    }

    #[test]
    fn service_count_prefers_services() {
        let r = record(json!({"services": [{"port": 22}, {"port": 80}], "ports": [1, 2, 3]}));
        assert_eq!(r.service_count(), 2);
        let r = record(json!({"ports": [1, 2, 3]}));
        assert_eq!(r.service_count(), 3);
        let r = record(json!({"ip": "1.1.1.1"}));
        assert_eq!(r.service_count(), 0);
    }

    #[test]
    fn accepts_wrapped_document() {
        let hosts = parse_host_document(r#"{"hosts":[{"ip":"1.1.1.1"}]}"#).unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].display_id(), "1.1.1.1");
    }

    #[test]
    fn accepts_bare_array_including_empty() {
        let hosts = parse_host_document(r#"[{"host":"a"},{"hostname":"b"}]"#).unwrap();
        assert_eq!(hosts.len(), 2);
        assert!(parse_host_document("[]").unwrap().is_empty());
    }

    #[test]
    fn rejects_other_shapes() {
        assert!(matches!(parse_host_document(r#"{"items":[]}"#), Err(DocumentError::UnexpectedShape)));
        assert!(matches!(parse_host_document(r#"{"hosts":{}}"#), Err(DocumentError::UnexpectedShape)));
        assert!(matches!(parse_host_document("42"), Err(DocumentError::UnexpectedShape)));
        assert!(matches!(parse_host_document(r#"[{"ip":"a"}, 3]"#), Err(DocumentError::NotAnObject(1))));
        assert!(matches!(parse_host_document("{not json"), Err(DocumentError::Malformed(_))));
    }

    #[test]
    fn unknown_fields_round_trip_in_order() {
        let text = r#"{"zeta":1,"ip":"10.0.0.1","alpha":{"nested":[1,2]}}"#;
        let r: HostRecord = serde_json::from_str(text).unwrap();
        assert_eq!(serde_json::to_string(&r).unwrap(), text);
    }
}
