//! # resume-optimizer
//!
//! Client library for an AI resume analysis service.
//!
//! A user picks a resume (PDF, DOC or DOCX) and names a target job role. The
//! [`UploadWorkflow`] validates the input locally, uploads it under a deadline and
//! exposes the analysis (score, strengths, improvements, actionable changes) once
//! the service answers. The [`ExportLauncher`] then downloads the optimized
//! document the service produced.
//!
//! ## Design Philosophy
//!
//! - **Validate before the network** - nothing leaves the machine until the input passes
//! - **One attempt, bounded** - every call has a deadline and a cancellation token; no retries
//! - **Library-first** - no UI; presentation code observes state through `watch` and `broadcast`
//!
//! ## Quick Start
//!
//! ```no_run
//! use resume_optimizer::{Config, ExportLauncher, SubmissionInput, UploadWorkflow, WorkflowState};
//! use resume_optimizer::ingest::read_resume;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let workflow = UploadWorkflow::new(&config)?;
//!
//!     // Watch transitions
//!     let mut transitions = workflow.subscribe_transitions();
//!     tokio::spawn(async move {
//!         while let Ok(t) = transitions.recv().await {
//!             println!("{:?} -> {:?}", t.from, t.to);
//!         }
//!     });
//!
//!     let file = read_resume("resume.pdf").await?;
//!     workflow.submit(SubmissionInput::new(file, "Backend Engineer")).await;
//!
//!     if let WorkflowState::Success { feedback } = workflow.snapshot() {
//!         println!("score: {}/10", feedback.overall_score);
//!         let receipt = ExportLauncher::new(&config)?.launch_for(&workflow).await?;
//!         println!("saved to {}", receipt.path.display());
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Optimized resume export
pub mod export;
/// Reading picked and dropped files
pub mod ingest;
/// Local preview copies
pub mod preview;
/// Network calls with deadlines
pub mod transfer;
/// Core types and states
pub mod types;
/// Utility functions
pub mod utils;
/// Input validation
pub mod validation;
/// Upload workflow state machine
pub mod workflow;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod test_helpers;

// Re-export commonly used types
pub use config::{Config, DeadlineConfig, ExportConfig, FileCollisionAction, ServiceConfig};
pub use error::{Error, ErrorKind, IsRetryable, Operation, OutcomeError, Result};
pub use export::{ArtifactSink, ExportLauncher, SaveToDirectory};
pub use transfer::{Artifact, HttpTransport, TransferClient, Transport, UploadRequest};
pub use types::{
    AnalysisFeedback, ExportReceipt, ExportState, MediaType, RejectReason, ResumeFile, StateKind,
    SubmissionInput, SubmitOutcome, Transition, WorkflowState,
};
pub use validation::InputValidator;
pub use workflow::UploadWorkflow;

/// Submit with graceful signal handling.
///
/// If a termination signal arrives while the upload is in flight, the workflow
/// session is ended and the submission resolves to `Failed` instead of being
/// abandoned mid-request.
///
/// - **Unix:** listens for SIGTERM and SIGINT, falling back to Ctrl+C if they cannot be registered.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use resume_optimizer::{Config, SubmissionInput, UploadWorkflow, run_with_shutdown};
/// use resume_optimizer::ingest::read_resume;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let workflow = UploadWorkflow::new(&Config::default())?;
///     let file = read_resume("resume.pdf").await?;
///
///     let outcome = run_with_shutdown(&workflow, SubmissionInput::new(file, "Designer")).await;
///     println!("{:?}", outcome);
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(workflow: &UploadWorkflow, input: SubmissionInput) -> SubmitOutcome {
    submit_until(workflow, input, wait_for_signal()).await
}

/// Submit, ending the session if `shutdown` completes first
async fn submit_until<S>(workflow: &UploadWorkflow, input: SubmissionInput, shutdown: S) -> SubmitOutcome
where
    S: std::future::Future<Output = ()>,
{
    let submission = workflow.submit(input);
    tokio::pin!(submission);

    tokio::select! {
        outcome = &mut submission => outcome,
        _ = shutdown => {
            tracing::info!("shutdown requested, ending session");
            workflow.end_session();
            submission.await
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut term), Ok(mut int)) => {
            let name = tokio::select! {
                _ = term.recv() => "SIGTERM",
                _ = int.recv() => "SIGINT",
            };
            tracing::info!(signal = name, "termination signal received");
        }
        (term, int) => {
            let e = term.err().or(int.err());
            tracing::warn!(error = ?e, "signal handlers unavailable, waiting for Ctrl+C");
            ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    ctrl_c().await;
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Ctrl+C received"),
        Err(e) => {
            tracing::error!(error = %e, "cannot listen for Ctrl+C");
            // Without a signal source shutdown never fires
            std::future::pending::<()>().await;
        }
    }
}
