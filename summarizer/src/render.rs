use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use summarizer_client::Session;
use summarizer_core::{HostRecord, HostSummary};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| String::new())
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    generated_at: String,
    items: &'a [HostSummary],
}

pub fn json_document(items: &[HostSummary]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ExportDocument { generated_at: now_rfc3339(), items })?)
}

/// One row per risk; hosts without risks still get a row.
pub fn write_csv<W: Write>(w: W, items: &[HostSummary]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(w);
    wtr.write_record(["host_id", "overview", "severity", "risk", "evidence", "recommendations"])?;
    for s in items {
        let recs = s.recommendations.join("|");
        if s.risks.is_empty() {
            wtr.write_record([s.host_id.as_str(), s.overview.as_str(), "", "", "", recs.as_str()])?;
        }
        for r in &s.risks {
            wtr.write_record([
                s.host_id.as_str(),
                s.overview.as_str(),
                r.severity.as_str(),
                r.risk.as_str(),
                r.evidence.as_deref().unwrap_or_default(),
                recs.as_str(),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Write results to `path`: CSV when asked for (or by extension), JSON otherwise.
pub fn export(path: &Path, items: &[HostSummary], csv: bool) -> Result<()> {
    let as_csv = csv || path.extension().is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    let file = std::fs::File::create(path)?;
    if as_csv {
        write_csv(file, items)
    } else {
        let mut w = std::io::BufWriter::new(file);
        writeln!(w, "{}", json_document(items)?)?;
        w.flush()?;
        Ok(())
    }
}

pub fn host_line(index: usize, host: &HostRecord, selected: bool, summary: Option<&HostSummary>) -> String {
    let mark = if selected { "x" } else { " " };
    let mut line = format!("[{mark}] {index:>3}  {:<18} {} services", host.display_id(), host.service_count());
    if let Some(sev) = summary.and_then(HostSummary::highest_severity) {
        line.push_str(&format!("  {sev}"));
    }
    line
}

pub fn summary_text(s: &HostSummary) -> String {
    let mut out = format!("== {} ==\n{}\n", s.host_id, s.overview);
    if !s.key_services.is_empty() {
        out.push_str("services:\n");
        for k in &s.key_services {
            let port = k.port.map(|p| p.to_string()).unwrap_or_else(|| "?".into());
            let name = k.name.as_deref().unwrap_or("UNKNOWN");
            match &k.finding {
                Some(f) => out.push_str(&format!("  {port}/{name}: {f}\n")),
                None => out.push_str(&format!("  {port}/{name}\n")),
            }
        }
    }
    if !s.risks.is_empty() {
        out.push_str("risks:\n");
        for r in &s.risks {
            out.push_str(&format!("  [{}] {}", r.severity, r.risk));
            if let Some(e) = &r.evidence {
                out.push_str(&format!(" ({e})"));
            }
            out.push('\n');
        }
    }
    if !s.recommendations.is_empty() {
        out.push_str("recommendations:\n");
        for (i, rec) in s.recommendations.iter().enumerate() {
            out.push_str(&format!("  {}. {rec}\n", i + 1));
        }
    }
    out
}

pub fn status_line(session: &Session) -> String {
    format!(
        "{:?}: {} hosts, {} selected, {} results{}",
        session.phase(),
        session.hosts().len(),
        session.selection().len(),
        session.results().len(),
        session.notice().map(|n| format!(" | {}", n.message())).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summary() -> HostSummary {
        serde_json::from_value(json!({
            "host_id": "10.0.0.5",
            "overview": "Network host 10.0.0.5",
            "key_services": [{ "port": 22, "name": "SSH", "finding": "ssh service detected" }],
            "risks": [
                { "severity": "critical", "risk": "Database exposed", "evidence": "Port 5432 open" },
                { "severity": "medium", "risk": "SSH exposed" }
            ],
            "recommendations": ["URGENT: patch", "Restrict SSH"]
        }))
        .unwrap()
    }

    #[test]
    fn csv_has_a_row_per_risk() {
        let bare: HostSummary = serde_json::from_value(json!({ "host_id": "h", "overview": "o" })).unwrap();
        let mut buf = Vec::new();
        write_csv(&mut buf, &[summary(), bare]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("critical") && lines[1].contains("Port 5432 open"));
        assert!(lines[3].starts_with("h,o,,,,"));
    }

    #[test]
    fn json_export_wraps_items() {
        let doc: serde_json::Value = serde_json::from_str(&json_document(&[summary()]).unwrap()).unwrap();
        assert_eq!(doc["items"][0]["host_id"], "10.0.0.5");
        assert_eq!(doc["items"][0]["risks"][0]["severity"], "critical");
        assert!(OffsetDateTime::parse(doc["generated_at"].as_str().unwrap(), &Rfc3339).is_ok());
    }

    #[test]
    fn text_rendering() {
        let text = summary_text(&summary());
        assert!(text.contains("== 10.0.0.5 =="));
        assert!(text.contains("22/SSH: ssh service detected"));
        assert!(text.contains("[CRITICAL] Database exposed (Port 5432 open)"));
        assert!(text.contains("2. Restrict SSH"));

        let host: HostRecord = serde_json::from_value(json!({ "ip": "10.0.0.5", "ports": [22, 5432] })).unwrap();
        let line = host_line(0, &host, true, Some(&summary()));
        assert!(line.starts_with("[x]"));
        assert!(line.contains("2 services"));
        assert!(line.ends_with("CRITICAL"));
    }
}
