//! reqwest-backed transport for the analysis service.

use super::wire;
use super::{Artifact, Transport, UploadRequest};
use crate::config::ServiceConfig;
use crate::error::{ErrorKind, Operation, OutcomeError, Result};
use crate::types::AnalysisFeedback;
use crate::utils::artifact_file_name;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};

/// Multipart field carrying the resume
pub const FILE_FIELD: &str = "file";
/// Multipart field carrying the job role
pub const JOB_ROLE_FIELD: &str = "job_category";

/// HTTP transport
///
/// Holds one connection pool for both operations. No request-level timeout is set
/// on the client; deadlines are enforced by [`TransferClient`](super::TransferClient)
/// so that a timed-out call is dropped rather than left running.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    service: ServiceConfig,
}

impl HttpTransport {
    /// Create a transport for the configured service
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(service: &ServiceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(service.connect_timeout)
            .user_agent(service.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            service: service.clone(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn upload(&self, request: &UploadRequest) -> std::result::Result<AnalysisFeedback, OutcomeError> {
        let url = self.service.upload_url();

        let part = Part::bytes(request.file.content.to_vec())
            .file_name(request.file.name.clone())
            .mime_str(request.media_type.mime())
            .map_err(|e| classify_transport_error(Operation::Upload, &e))?;
        let form = Form::new()
            .part(FILE_FIELD, part)
            .text(JOB_ROLE_FIELD, request.job_role.trim().to_string());

        tracing::debug!(
            url = %url,
            file = %request.file.name,
            media_type = %request.media_type,
            size_bytes = request.file.len(),
            "uploading resume"
        );

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| classify_transport_error(Operation::Upload, &e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| classify_transport_error(Operation::Upload, &e))?;

        tracing::debug!(status = %status, body_bytes = body.len(), "upload response received");

        wire::parse_upload_response(status.as_u16(), &body)
    }

    async fn fetch(&self, reference: &str) -> std::result::Result<Artifact, OutcomeError> {
        let url = self.service.artifact_url(reference);
        tracing::debug!(url = %url, "fetching optimized resume");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| classify_transport_error(Operation::Export, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(wire::server_failure(Operation::Export, status.as_u16(), &body));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let file_name = artifact_file_name(response.headers(), &url);

        let content = response
            .bytes()
            .await
            .map_err(|e| classify_transport_error(Operation::Export, &e))?;

        Ok(Artifact {
            content,
            content_type,
            file_name,
        })
    }
}

/// Map a reqwest failure to an outcome, keeping the error chain as detail
pub(crate) fn classify_transport_error(operation: Operation, err: &reqwest::Error) -> OutcomeError {
    let detail = error_chain(err);
    let (kind, message) = classify_fault(
        operation,
        FaultFlags {
            connect: err.is_connect(),
            timeout: err.is_timeout(),
            body: err.is_decode() || err.is_body(),
        },
    );

    tracing::warn!(operation = %operation, kind = %kind, error = %detail, "transport fault");

    OutcomeError::new(kind, message)
        .with_operation(operation)
        .with_detail(detail)
}

#[derive(Clone, Copy, Debug, Default)]
struct FaultFlags {
    connect: bool,
    timeout: bool,
    body: bool,
}

// A connect timeout sets both `connect` and `timeout`; the host was never reached
fn classify_fault(operation: Operation, flags: FaultFlags) -> (ErrorKind, String) {
    if flags.connect {
        (
            ErrorKind::UnknownError,
            "could not reach the analysis service".to_string(),
        )
    } else if flags.timeout {
        (ErrorKind::NetworkTimeout, format!("{} timed out", operation))
    } else if flags.body {
        (
            ErrorKind::UnknownError,
            format!("{} response was interrupted", operation),
        )
    } else {
        (ErrorKind::UnknownError, format!("{} request failed", operation))
    }
}

/// Join an error with its sources, skipping causes already quoted by an outer message
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}
