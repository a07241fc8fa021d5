//! Network calls to the analysis service: resume upload and optimized document export.
//!
//! [`TransferClient`] wraps a [`Transport`] and puts every call under a deadline and a
//! cancellation token. The transport only knows how to talk to the service; it never
//! sees timers. Each invocation makes exactly one attempt.

mod deadline;
mod http;
pub mod wire;

pub use deadline::run_with_deadline;
pub use http::{FILE_FIELD, HttpTransport, JOB_ROLE_FIELD};

use crate::config::ServiceConfig;
use crate::error::{Operation, OutcomeError, Result};
use crate::types::{AnalysisFeedback, MediaType, ResumeFile};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A validated upload: the file, its resolved media type and the job role
#[derive(Clone, Debug)]
pub struct UploadRequest {
    /// Resume document
    pub file: ResumeFile,
    /// Media type confirmed by the validator
    pub media_type: MediaType,
    /// Target job role
    pub job_role: String,
}

/// Optimized document as returned by the export endpoint
#[derive(Clone, Debug)]
pub struct Artifact {
    /// Document bytes
    pub content: Bytes,
    /// Content-Type header, if any
    pub content_type: Option<String>,
    /// File name to save under
    pub file_name: String,
}

/// Raw access to the analysis service
///
/// Implementations classify completed responses and transport faults into
/// [`OutcomeError`]s but do not enforce deadlines.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Upload a resume and return the parsed analysis
    async fn upload(&self, request: &UploadRequest) -> std::result::Result<AnalysisFeedback, OutcomeError>;

    /// Retrieve the optimized document behind an artifact reference
    async fn fetch(&self, reference: &str) -> std::result::Result<Artifact, OutcomeError>;
}

/// Deadline-bound client for the analysis service
#[derive(Clone)]
pub struct TransferClient {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for TransferClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferClient").finish_non_exhaustive()
    }
}

impl TransferClient {
    /// Create a client over any transport
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Create a client over HTTP
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn http(service: &ServiceConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new(service)?)))
    }

    /// Upload a resume for analysis
    ///
    /// Resolves to [`ErrorKind::NetworkTimeout`](crate::error::ErrorKind) if the
    /// deadline elapses first; the in-flight request is dropped in that case.
    pub async fn submit(
        &self,
        request: UploadRequest,
        deadline: Duration,
        cancel: &CancellationToken,
    ) -> std::result::Result<AnalysisFeedback, OutcomeError> {
        let started = std::time::Instant::now();
        let result = run_with_deadline(
            Operation::Upload,
            deadline,
            cancel,
            self.transport.upload(&request),
        )
        .await;

        match &result {
            Ok(feedback) => tracing::info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                score = feedback.overall_score,
                "resume analysis received"
            ),
            Err(e) => tracing::warn!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                kind = %e.kind,
                error = %e,
                "resume upload failed"
            ),
        }
        result
    }

    /// Retrieve the optimized document behind `reference`
    pub async fn fetch_artifact(
        &self,
        reference: &str,
        deadline: Duration,
        cancel: &CancellationToken,
    ) -> std::result::Result<Artifact, OutcomeError> {
        let result = run_with_deadline(
            Operation::Export,
            deadline,
            cancel,
            self.transport.fetch(reference),
        )
        .await;

        if let Err(e) = &result {
            tracing::warn!(reference = %reference, kind = %e.kind, error = %e, "artifact fetch failed");
        }
        result
    }
}
