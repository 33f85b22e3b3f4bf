//! Getting host lists into the client: the sample dataset and user uploads.

use std::path::{Path, PathBuf};

use summarizer_core::{parse_host_document, HostRecord};
use tracing::debug;
use url::Url;

use crate::api::ApiClient;
use crate::error::ClientError;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Best-effort content type for a file, from its extension.
pub fn content_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "json" => JSON_CONTENT_TYPE,
        "txt" | "log" => "text/plain",
        "csv" => "text/csv",
        "xml" => "application/xml",
        "yaml" | "yml" => "application/yaml",
        "html" | "htm" => "text/html",
        _ => "application/octet-stream",
    }
}

/// `application/json`, `text/json` and any `+json` type, parameters ignored.
pub fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    essence == JSON_CONTENT_TYPE || essence == "text/json" || essence.ends_with("+json")
}

/// A file handed to the client for loading.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Upload { name: name.into(), content_type: content_type.into(), bytes }
    }

    pub fn check_type(&self) -> Result<(), ClientError> {
        if is_json_content_type(&self.content_type) {
            Ok(())
        } else {
            Err(ClientError::NotJson { content_type: self.content_type.clone() })
        }
    }

    /// Decode the upload into a non-empty host list.
    pub fn parse(&self) -> Result<Vec<HostRecord>, ClientError> {
        self.check_type()?;
        let text = std::str::from_utf8(&self.bytes)
            .map_err(|e| ClientError::FileRead(format!("{}: not UTF-8 text ({e})", self.name)))?;
        let hosts = parse_host_document(text)?;
        if hosts.is_empty() {
            return Err(ClientError::NoHostsInFile);
        }
        debug!(file = %self.name, hosts = hosts.len(), "parsed upload");
        Ok(hosts)
    }
}

/// Read a file from disk as an upload. A non-JSON type is refused before reading.
pub async fn read_upload(path: &Path, content_type: Option<&str>) -> Result<Upload, ClientError> {
    let content_type = content_type.unwrap_or_else(|| content_type_for_path(path));
    if !is_json_content_type(content_type) {
        return Err(ClientError::NotJson { content_type: content_type.to_string() });
    }
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ClientError::FileRead(format!("{}: {e}", path.display())))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Upload::new(name, content_type, bytes))
}

/// Where the sample dataset lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleSource {
    Url(Url),
    File(PathBuf),
}

impl SampleSource {
    /// `http(s)://...` is fetched, anything else is treated as a path.
    pub fn parse(location: &str) -> Self {
        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => SampleSource::Url(url),
            _ => SampleSource::File(PathBuf::from(location)),
        }
    }
}

impl std::fmt::Display for SampleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleSource::Url(url) => write!(f, "{url}"),
            SampleSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Load the sample dataset. Unlike uploads, an empty list is accepted.
pub async fn load_sample(api: &ApiClient, source: &SampleSource) -> Result<Vec<HostRecord>, ClientError> {
    let hosts = match source {
        SampleSource::Url(url) => api.fetch_hosts(url).await?,
        SampleSource::File(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| ClientError::FileRead(format!("{}: {e}", path.display())))?;
            parse_host_document(&text)?
        }
    };
    debug!(source = %source, hosts = hosts.len(), "loaded sample dataset");
    Ok(hosts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_upload(body: &str) -> Upload {
        Upload::new("hosts.json", JSON_CONTENT_TYPE, body.as_bytes().to_vec())
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type_for_path(Path::new("a/B.JSON")), JSON_CONTENT_TYPE);
        assert_eq!(content_type_for_path(Path::new("notes.txt")), "text/plain");
        assert_eq!(content_type_for_path(Path::new("noext")), "application/octet-stream");
        assert!(is_json_content_type("application/json; charset=utf-8"));
        assert!(is_json_content_type("application/vnd.hosts+json"));
        assert!(!is_json_content_type("text/plain"));
    }

    #[test]
    fn wrapped_upload_with_one_host() {
        let hosts = json_upload(r#"{"hosts":[{"ip":"1.1.1.1"}]}"#).parse().unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].display_id(), "1.1.1.1");
    }

    #[test]
    fn empty_upload_is_an_error() {
        let err = json_upload("[]").parse().unwrap_err();
        assert!(matches!(err, ClientError::NoHostsInFile));
        assert!(err.to_string().to_lowercase().contains("no hosts found"));
    }

    #[test]
    fn upload_errors_are_distinct() {
        assert!(matches!(json_upload("{oops").parse(), Err(ClientError::InvalidJson(_))));
        assert!(matches!(json_upload(r#"{"items":[]}"#).parse(), Err(ClientError::Shape(_))));
        let bad_utf8 = Upload::new("x.json", JSON_CONTENT_TYPE, vec![0xff, 0xfe]);
        assert!(matches!(bad_utf8.parse(), Err(ClientError::FileRead(_))));
        let text = Upload::new("x.txt", "text/plain", b"[]".to_vec());
        assert!(matches!(text.parse(), Err(ClientError::NotJson { .. })));
    }

    #[tokio::test]
    async fn non_json_file_is_refused_before_reading() {
        let err = read_upload(Path::new("/definitely/missing.csv"), None).await.unwrap_err();
        assert!(matches!(err, ClientError::NotJson { .. }));
        let err = read_upload(Path::new("/definitely/missing.json"), None).await.unwrap_err();
        assert!(matches!(err, ClientError::FileRead(_)));
    }

    #[tokio::test]
    async fn sample_file_may_be_empty() {
        let path = std::env::temp_dir().join(format!("summarizer-sample-{}.json", std::process::id()));
        tokio::fs::write(&path, "[]").await.unwrap();
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        let hosts = load_sample(&api, &SampleSource::File(path.clone())).await.unwrap();
        assert!(hosts.is_empty());
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[test]
    fn sample_source_parsing() {
        assert!(matches!(SampleSource::parse("http://localhost:8000/hosts_dataset.json"), SampleSource::Url(_)));
        assert!(matches!(SampleSource::parse("data/hosts.json"), SampleSource::File(_)));
        assert!(matches!(SampleSource::parse("C:/data/hosts.json"), SampleSource::File(_)));
    }
}
