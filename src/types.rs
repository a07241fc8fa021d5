//! Core types for resume-optimizer

use crate::error::OutcomeError;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Document formats the analysis service accepts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Portable Document Format
    Pdf,
    /// Legacy Word binary document
    Doc,
    /// Office Open XML Word document
    Docx,
}

impl MediaType {
    /// IANA media type
    pub fn mime(&self) -> &'static str {
        match self {
            MediaType::Pdf => "application/pdf",
            MediaType::Doc => "application/msword",
            MediaType::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Conventional file extension (without dot)
    pub fn extension(&self) -> &'static str {
        match self {
            MediaType::Pdf => "pdf",
            MediaType::Doc => "doc",
            MediaType::Docx => "docx",
        }
    }

    /// Parse a declared media type, ignoring case and parameters
    ///
    /// Returns None for anything outside the supported set.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "application/pdf" | "application/x-pdf" => Some(MediaType::Pdf),
            "application/msword" => Some(MediaType::Doc),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(MediaType::Docx)
            }
            _ => None,
        }
    }

    /// Map a file extension to a media type
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(MediaType::Pdf),
            "doc" => Some(MediaType::Doc),
            "docx" => Some(MediaType::Docx),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// A selected resume document
///
/// `declared_type` is whatever the picker or drop source claimed; it is not
/// trusted until the validator has checked it against the content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResumeFile {
    /// File name as shown to the user and sent to the service
    pub name: String,
    /// Declared media type, if the source provided one
    pub declared_type: Option<String>,
    /// File content
    pub content: Bytes,
}

impl ResumeFile {
    /// Create a file without a declared media type
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            declared_type: None,
            content: content.into(),
        }
    }

    /// Set the declared media type
    pub fn with_declared_type(mut self, mime: impl Into<String>) -> Self {
        self.declared_type = Some(mime.into());
        self
    }

    /// Size in bytes
    pub fn len(&self) -> u64 {
        self.content.len() as u64
    }

    /// True for a zero-byte file
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// What the user has entered so far: a file (if any) and the target job role
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubmissionInput {
    /// Selected resume, None until the user picks or drops one
    pub file: Option<ResumeFile>,
    /// Target job role, free text
    pub job_role: String,
}

impl SubmissionInput {
    /// Create an input with a file and job role
    pub fn new(file: ResumeFile, job_role: impl Into<String>) -> Self {
        Self {
            file: Some(file),
            job_role: job_role.into(),
        }
    }
}

/// Structured analysis of a resume, as returned by the service
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFeedback {
    /// Overall score, 0 to 10
    pub overall_score: f64,
    /// What the resume does well
    pub strengths: Vec<String>,
    /// Areas for improvement
    pub improvements: Vec<String>,
    /// Concrete edits, may be empty
    #[serde(default)]
    pub actionable_changes: Vec<String>,
    /// Opaque locator of the optimized document
    pub artifact_reference: String,
    /// Status message the service attached to the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_message: Option<String>,
}

/// Workflow lifecycle state
///
/// Presentation code is expected to match on this exhaustively.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WorkflowState {
    /// Waiting for input
    #[default]
    Idle,
    /// Checking input before submission
    Validating,
    /// Upload in flight
    Submitting {
        /// When the upload started
        started_at: DateTime<Utc>,
    },
    /// Analysis received
    Success {
        /// Feedback to display
        feedback: AnalysisFeedback,
    },
    /// Validation or upload failed
    Failed {
        /// What went wrong
        error: OutcomeError,
    },
}

impl WorkflowState {
    /// Discriminant without payload
    pub fn kind(&self) -> StateKind {
        match self {
            WorkflowState::Idle => StateKind::Idle,
            WorkflowState::Validating => StateKind::Validating,
            WorkflowState::Submitting { .. } => StateKind::Submitting,
            WorkflowState::Success { .. } => StateKind::Success,
            WorkflowState::Failed { .. } => StateKind::Failed,
        }
    }

    /// True while the "processing" indicator should be shown
    pub fn is_processing(&self) -> bool {
        matches!(
            self,
            WorkflowState::Validating | WorkflowState::Submitting { .. }
        )
    }

    /// Feedback, when in the success state
    pub fn feedback(&self) -> Option<&AnalysisFeedback> {
        match self {
            WorkflowState::Success { feedback } => Some(feedback),
            _ => None,
        }
    }

    /// Error, when in the failed state
    pub fn error(&self) -> Option<&OutcomeError> {
        match self {
            WorkflowState::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// Workflow state discriminant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    /// See [`WorkflowState::Idle`]
    Idle,
    /// See [`WorkflowState::Validating`]
    Validating,
    /// See [`WorkflowState::Submitting`]
    Submitting,
    /// See [`WorkflowState::Success`]
    Success,
    /// See [`WorkflowState::Failed`]
    Failed,
}

/// State change notification for optional observers (telemetry)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// State before the change
    pub from: StateKind,
    /// State after the change
    pub to: StateKind,
    /// When the change happened
    pub at: DateTime<Utc>,
}

/// Why a submit command was not acted on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// A submission is already validating or in flight
    InFlight,
    /// The session has ended
    SessionClosed,
}

/// Result of a submit command
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// The submission ran to a terminal state (success or failed)
    Finished(WorkflowState),
    /// The command was ignored; state is unchanged
    Rejected(RejectReason),
}

/// A saved optimized document
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReceipt {
    /// Artifact reference the document was fetched from
    pub reference: String,
    /// Where the document was written
    pub path: PathBuf,
    /// Number of bytes written
    pub size_bytes: u64,
    /// Content type reported by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Export lifecycle state, independent of [`WorkflowState`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ExportState {
    /// No export attempted yet
    #[default]
    Idle,
    /// Download in flight
    InFlight {
        /// Artifact being fetched
        reference: String,
        /// When the download started
        started_at: DateTime<Utc>,
    },
    /// Document saved
    Done {
        /// Where it went
        receipt: ExportReceipt,
    },
    /// Download or save failed
    Failed {
        /// What went wrong
        error: OutcomeError,
    },
}
