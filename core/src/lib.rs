//! Core types shared by the summarizer service, analyzers and client.

pub mod host;
pub mod ratelimiter;
pub mod summary;
pub mod wire;

pub use host::{parse_host_document, DocumentError, HostRecord};
pub use summary::{HostSummary, KeyService, Risk, Severity};
pub use wire::{ErrorBody, HealthResponse, Mode, SummarizeRequest, SummarizeResponse};

pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!version().is_empty());
    }
}
