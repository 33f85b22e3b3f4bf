//! Deterministic rule-based host analysis used when no completion API is configured.

use serde_json::Value;
use summarizer_core::{HostRecord, HostSummary, KeyService, Risk, Severity};

const DATABASE_PORTS: &[u64] = &[3306, 5432, 27017];
const MAX_KEY_SERVICES: usize = 4;
const MAX_RECOMMENDATIONS: usize = 6;

/// Host identity as the service reports it (`"unknown"` when absent).
pub fn host_id(host: &HostRecord) -> String {
    host.identity().unwrap_or_else(|| "unknown".to_string())
}

/// Ports exposed by a host together with its service entries.
///
/// Ports come from `services[].port` when `services` is an array, otherwise
/// from the `ports` array. Service entries are only returned in the first case.
pub fn extract_services_and_ports(host: &HostRecord) -> (Vec<u64>, Vec<&Value>) {
    if let Some(services) = host.services() {
        let ports = services
            .iter()
            .filter_map(|svc| svc.get("port").and_then(Value::as_u64))
            .filter(|p| *p != 0)
            .collect();
        return (ports, services.iter().collect());
    }
    if let Some(ports) = host.ports() {
        return (ports.iter().filter_map(Value::as_u64).collect(), Vec::new());
    }
    (Vec::new(), Vec::new())
}

fn key_service(svc: &Value) -> KeyService {
    let port = svc.get("port").and_then(Value::as_i64);
    let protocol = svc.get("protocol").and_then(Value::as_str).unwrap_or("unknown");
    let mut finding = format!("{} service detected", protocol);
    if let Some(first) = svc.get("software").and_then(Value::as_array).and_then(|s| s.first()) {
        let product = first.get("product").and_then(Value::as_str).unwrap_or("");
        let version = first.get("version").and_then(Value::as_str).unwrap_or("");
        if !product.is_empty() && !version.is_empty() {
            finding = format!("{} {} - requires security assessment for known CVEs", product, version);
        }
    }
    KeyService { port, name: Some(protocol.to_uppercase()), finding: Some(finding) }
}

fn vulnerability_count(services: &[&Value]) -> usize {
    services
        .iter()
        .filter_map(|svc| svc.get("vulnerabilities").and_then(Value::as_array))
        .map(Vec::len)
        .sum()
}

pub fn analyze(host: &HostRecord) -> HostSummary {
    let id = host_id(host);
    let (ports, services) = extract_services_and_ports(host);
    let has_port = |p: u64| ports.contains(&p);
    let exposes_database = ports.iter().any(|p| DATABASE_PORTS.contains(p));

    let key_services = services.iter().take(MAX_KEY_SERVICES).map(|s| key_service(s)).collect();

    let mut risks = Vec::new();
    if exposes_database {
        risks.push(Risk::new(
            Severity::Critical,
            "Database service exposed to internet",
            "Database ports accessible from external networks",
        ));
    }
    if has_port(22) {
        risks.push(Risk::new(
            Severity::Medium,
            "SSH service internet exposure",
            "SSH port 22 accessible from external networks",
        ));
    }
    if has_port(80) {
        risks.push(Risk::new(
            Severity::Medium,
            "Unencrypted HTTP traffic vulnerability",
            "HTTP port 80 serves unencrypted content",
        ));
    }
    let vulns = vulnerability_count(&services);
    if vulns > 0 {
        let severity = if vulns > 5 {
            Severity::Critical
        } else if vulns > 2 {
            Severity::High
        } else {
            Severity::Medium
        };
        risks.push(Risk::new(
            severity,
            "Known security vulnerabilities identified",
            format!("{} CVE entries found in running services", vulns),
        ));
    }
    if risks.is_empty() {
        risks.push(Risk::new(
            Severity::Low,
            "Network services require security assessment",
            "Standard network services detected",
        ));
    }

    let mut recommendations = Vec::new();
    if risks.iter().any(|r| r.severity == Severity::Critical) {
        recommendations.push("URGENT: Address critical security risks immediately".to_string());
    }
    if has_port(22) {
        recommendations.push("Configure SSH key-based authentication and disable password login".to_string());
    }
    if has_port(80) {
        recommendations.push("Implement HTTPS with proper SSL/TLS configuration".to_string());
    }
    if exposes_database {
        recommendations.push("Restrict database access to internal networks only".to_string());
    }
    recommendations.extend(
        [
            "Implement network segmentation and firewall rules",
            "Enable security logging and monitoring",
            "Establish regular vulnerability scanning",
        ]
        .map(String::from),
    );
    recommendations.truncate(MAX_RECOMMENDATIONS);

    let exposed = if services.is_empty() { ports.len() } else { services.len() };
    HostSummary {
        overview: format!(
            "Network host {} with {} exposed services requiring security assessment",
            id, exposed
        ),
        host_id: id,
        key_services,
        risks,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn host(v: Value) -> HostRecord {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn baseline_host_gets_low_risk() {
        let s = analyze(&host(json!({"ip": "10.0.0.5", "ports": [443]})));
        assert_eq!(s.host_id, "10.0.0.5");
        assert_eq!(s.risks.len(), 1);
        assert_eq!(s.risks[0].severity, Severity::Low);
        assert_eq!(s.recommendations.len(), 3);
        assert_eq!(s.overview, "Network host 10.0.0.5 with 1 exposed services requiring security assessment");
    }

    #[test]
    fn exposed_database_is_critical_and_urgent() {
        let s = analyze(&host(json!({"ip": "10.0.0.6", "ports": [22, 80, 3306]})));
        let sev: Vec<_> = s.risks.iter().map(|r| r.severity).collect();
        assert_eq!(sev, vec![Severity::Critical, Severity::Medium, Severity::Medium]);
        assert!(s.recommendations[0].starts_with("URGENT"));
        assert_eq!(s.recommendations.len(), MAX_RECOMMENDATIONS);
        assert_eq!(s.recommendations[3], "Restrict database access to internal networks only");
    }

    #[test]
    fn key_services_use_software_and_cap_at_four() {
        let s = analyze(&host(json!({
            "host": "web.example",
            "services": [
                {"port": 443, "protocol": "https", "software": [{"product": "nginx", "version": "1.18.0"}]},
                {"port": 8080, "protocol": "http"},
                {"port": 25},
                {"port": 53, "protocol": "dns"},
                {"port": 123, "protocol": "ntp"},
            ]
        })));
        assert_eq!(s.key_services.len(), 4);
        assert_eq!(s.key_services[0].name.as_deref(), Some("HTTPS"));
        assert_eq!(
            s.key_services[0].finding.as_deref(),
            Some("nginx 1.18.0 - requires security assessment for known CVEs")
        );
        assert_eq!(s.key_services[2].name.as_deref(), Some("UNKNOWN"));
        assert!(s.overview.contains("with 5 exposed services"));
    }

    #[test]
    fn vulnerability_count_sets_severity() {
        let svc = |n: usize| {
            let vulns: Vec<Value> = vec![json!({"id": "CVE"}); n];
            json!({"port": 8443, "vulnerabilities": vulns})
        };
        let high = analyze(&host(json!({"ip": "a", "services": [svc(2), svc(1)]})));
        assert_eq!(high.risks[0].severity, Severity::High);
        assert_eq!(high.risks[0].evidence.as_deref(), Some("3 CVE entries found in running services"));
        let crit = analyze(&host(json!({"ip": "a", "services": [svc(6)]})));
        assert_eq!(crit.risks[0].severity, Severity::Critical);
        let med = analyze(&host(json!({"ip": "a", "services": [svc(1)]})));
        assert_eq!(med.risks[0].severity, Severity::Medium);
    }

    #[test]
    fn missing_identity_reports_unknown() {
        let s = analyze(&host(json!({"services": []})));
        assert_eq!(s.host_id, "unknown");
        assert!(s.key_services.is_empty());
    }
}
