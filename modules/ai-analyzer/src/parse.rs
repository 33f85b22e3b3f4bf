use serde_json::Value;
use summarizer_core::HostSummary;

/// Strip markdown fences and keep the outermost `{...}` span.
pub fn clean_json_response(text: &str) -> &str {
    let mut text = text.trim();
    for fence in ["```json", "```"] {
        if let Some(rest) = text.strip_prefix(fence) {
            text = rest;
        }
        if let Some(rest) = text.strip_suffix("```") {
            text = rest;
        }
    }
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start <= end {
            text = &text[start..=end];
        }
    }
    text.trim()
}

/// Parse a completion into a summary, forcing `host_id` to the requested host.
pub fn parse_summary(content: &str, host_id: &str) -> Result<HostSummary, serde_json::Error> {
    let mut value: Value = serde_json::from_str(clean_json_response(content))?;
    if let Value::Object(obj) = &mut value {
        obj.insert("host_id".to_string(), Value::String(host_id.to_string()));
    }
    serde_json::from_value(value)
}
