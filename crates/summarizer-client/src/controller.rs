use std::path::Path;

use tracing::info;

use crate::acquire::{self, SampleSource};
use crate::api::ApiClient;
use crate::error::ClientError;
use crate::state::{Completion, Session};

/// Drives a [`Session`] against the service, one operation at a time.
#[derive(Debug)]
pub struct Controller {
    api: ApiClient,
    sample: SampleSource,
    session: Session,
}

impl Controller {
    pub fn new(api: ApiClient, sample: SampleSource) -> Self {
        Controller { api, sample, session: Session::new() }
    }

    /// Use the dataset the service itself publishes.
    pub fn with_service_sample(api: ApiClient) -> Result<Self, ClientError> {
        let sample = SampleSource::Url(api.default_sample_url()?);
        Ok(Self::new(api, sample))
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn sample_source(&self) -> &SampleSource {
        &self.sample
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub async fn load_sample(&mut self) -> Result<usize, ClientError> {
        let outcome = acquire::load_sample(&self.api, &self.sample).await;
        let n = self.session.load(outcome)?;
        info!(source = %self.sample, hosts = n, "sample loaded");
        Ok(n)
    }

    pub async fn upload(&mut self, path: &Path, content_type: Option<&str>) -> Result<usize, ClientError> {
        let outcome = match acquire::read_upload(path, content_type).await {
            Ok(upload) => upload.parse(),
            Err(e) => Err(e),
        };
        let n = self.session.load(outcome)?;
        info!(file = %path.display(), hosts = n, "upload loaded");
        Ok(n)
    }

    /// Send the current selection and wait for the answer.
    pub async fn analyze(&mut self) -> Result<Completion, ClientError> {
        let dispatch = self.session.begin_analysis()?;
        let outcome = self.api.summarize(&dispatch.hosts).await;
        self.session.complete_analysis(dispatch.ticket, outcome)
    }
}
