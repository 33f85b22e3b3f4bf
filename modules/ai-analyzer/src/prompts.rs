//! Prompt package for host security analysis.

use summarizer_core::HostRecord;

use crate::chat::Prompt;

const SYSTEM_PROMPT: &str = "You are a senior cybersecurity analyst with over fifteen years of experience in network security, penetration testing and threat assessment. You analyze host data produced by internet-wide scanners such as Censys, Shodan and Nmap.

Your expertise covers:
- identifying network services and assessing their vulnerabilities
- prioritizing risk by CVSS score and exploit availability
- writing remediation advice that follows industry practice
- threat modeling and attack vector analysis

Your analysis is precise, evidence-based, actionable, ordered by business impact and aligned with NIST, OWASP and CIS guidance.

For every host you:
1. Examine all services, ports and software versions
2. Identify vulnerabilities and misconfigurations
3. Assess risk from exploitability and impact
4. Give specific remediation steps
5. Consider the overall security posture

Always answer with valid JSON matching the requested schema. Be specific; do not give generic advice.";

const FEW_SHOT_EXAMPLES: &str = r#"Examples of high-quality analysis:

EXAMPLE 1 - Web server
Input: {"ip": "203.0.113.1", "services": [{"port": 80, "protocol": "HTTP", "banner": "Apache/2.4.41"}, {"port": 443, "protocol": "HTTPS", "software": [{"product": "Apache", "version": "2.4.41"}]}]}

Output: {
  "host_id": "203.0.113.1",
  "overview": "Apache web server exposing HTTP and HTTPS; version-specific vulnerabilities need attention.",
  "key_services": [
    {"port": 80, "name": "HTTP", "finding": "Unencrypted web traffic, no HTTPS redirect"},
    {"port": 443, "name": "HTTPS", "finding": "Apache 2.4.41 has known CVEs and should be updated"}
  ],
  "risks": [
    {"risk": "Unencrypted HTTP traffic exposure", "severity": "medium", "evidence": "Port 80 serves content without encryption"},
    {"risk": "Outdated Apache version", "severity": "high", "evidence": "Apache 2.4.41 is affected by multiple published CVEs"}
  ],
  "recommendations": [
    "Redirect HTTP to HTTPS with a 301 on port 80",
    "Update Apache to the latest stable release",
    "Set HSTS, CSP and X-Frame-Options headers"
  ]
}

EXAMPLE 2 - Database server
Input: {"ip": "203.0.113.2", "services": [{"port": 3306, "protocol": "MySQL", "banner": "MySQL 5.7.25"}]}

Output: {
  "host_id": "203.0.113.2",
  "overview": "MySQL server reachable from the internet; critical exposure requiring immediate remediation.",
  "key_services": [
    {"port": 3306, "name": "MySQL", "finding": "MySQL 5.7.25 is end-of-life and internet-exposed"}
  ],
  "risks": [
    {"risk": "Internet-exposed database server", "severity": "critical", "evidence": "Port 3306 accepts external connections"},
    {"risk": "End-of-life MySQL version", "severity": "high", "evidence": "MySQL 5.7 no longer receives security updates"}
  ],
  "recommendations": [
    "IMMEDIATE: restrict port 3306 to internal networks with firewall rules",
    "Upgrade to a supported MySQL 8.x release",
    "Enable audit logging and monitoring for database access"
  ]
}"#;

const RESPONSE_SCHEMA: &str = r#"{
  "host_id": "string (IP address or hostname)",
  "overview": "string (2-3 sentences on the overall security posture)",
  "key_services": [
    {"port": number, "name": "string", "finding": "string (analysis of this service)"}
  ],
  "risks": [
    {"risk": "string", "severity": "low|medium|high|critical", "evidence": "string"}
  ],
  "recommendations": ["string (specific, actionable step)"]
}"#;

/// Guidance scaled to how many services the host exposes.
pub fn complexity_guidance(service_count: usize) -> &'static str {
    if service_count > 10 {
        "This host exposes many services. Prioritize the most critical risks and focus on the top five concerns."
    } else if service_count > 5 {
        "This host has moderate complexity. Cover every service but group similar risks together."
    } else {
        "This host exposes few services. Analyze each service and its attack vectors in detail."
    }
}

pub fn analysis_prompt(host: &HostRecord) -> String {
    let host_json = serde_json::to_string_pretty(host).unwrap_or_else(|_| "{}".to_string());
    format!(
        "Analyze this network host and provide a security assessment.

HOST DATA:
{host_json}

INSTRUCTIONS:
{guidance}

Reason step by step:
1. IDENTIFY the services and software versions that are running.
2. RESEARCH known vulnerabilities for those versions.
3. ASSESS the risk level and exploitability of each issue.
4. PRIORITIZE what needs immediate attention versus long-term planning.
5. RECOMMEND specific, actionable steps.

Focus on vulnerable software versions, misconfigurations, network exposure and access control.
Give evidence for every risk and tailor every recommendation to this host.

Respond with valid JSON only, matching this schema:
{schema}

Return only the JSON object, without markdown formatting or extra text.",
        host_json = host_json,
        guidance = complexity_guidance(host.service_count()),
        schema = RESPONSE_SCHEMA,
    )
}

pub fn build_prompt(host: &HostRecord) -> Prompt {
    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user: format!("{}\n\nNow analyze this host:\n\n{}", FEW_SHOT_EXAMPLES, analysis_prompt(host)),
    }
}
