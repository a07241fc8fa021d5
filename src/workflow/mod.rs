//! Upload workflow state machine.
//!
//! ```text
//!            submit (valid)                 ok
//!   Idle ──► Validating ──► Submitting ────────► Success
//!    ▲           │               │                  │
//!    │           │ invalid       │ error/timeout    │ submit
//!    │           ▼               ▼                  ▼
//!    │         Failed ◄──────── Failed          Submitting
//!    │           │
//!    └───────────┴── select_file (from Success or Failed)
//! ```
//!
//! The state lives in a single `watch` channel. Every change goes through
//! [`UploadWorkflow::transition`], which checks and replaces the value in one step,
//! so two overlapping commands can never both claim the submission slot.

use crate::config::Config;
use crate::error::{Error, Operation, OutcomeError, Result};
use crate::preview::PreviewStore;
use crate::transfer::{TransferClient, UploadRequest};
use crate::types::{
    RejectReason, ResumeFile, SubmissionInput, SubmitOutcome, Transition, WorkflowState,
};
use crate::validation::{InputValidator, NO_FILE_SELECTED};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

/// Capacity of the transition broadcast channel
const TRANSITION_CHANNEL_CAPACITY: usize = 64;

/// What the user has entered, kept across failures for resubmission
#[derive(Debug, Default)]
struct Draft {
    input: SubmissionInput,
    previews: Option<PreviewStore>,
}

/// Owns one workflow session: the current input, the lifecycle state and the
/// in-flight upload, if any.
///
/// # Example
///
/// ```no_run
/// use resume_optimizer::{Config, SubmissionInput, UploadWorkflow, WorkflowState};
/// use resume_optimizer::ingest::read_resume;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let workflow = UploadWorkflow::new(&Config::default())?;
/// let file = read_resume("resume.pdf").await?;
/// workflow.submit(SubmissionInput::new(file, "Backend Engineer")).await;
///
/// match workflow.snapshot() {
///     WorkflowState::Success { feedback } => println!("score {}", feedback.overall_score),
///     WorkflowState::Failed { error } => eprintln!("{}", error),
///     WorkflowState::Idle | WorkflowState::Validating | WorkflowState::Submitting { .. } => {}
/// }
/// # Ok(())
/// # }
/// ```
pub struct UploadWorkflow {
    client: TransferClient,
    validator: InputValidator,
    upload_deadline: Duration,
    state_tx: watch::Sender<WorkflowState>,
    transition_tx: broadcast::Sender<Transition>,
    draft: Mutex<Draft>,
    session: CancellationToken,
}

impl std::fmt::Debug for UploadWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadWorkflow")
            .field("state", &*self.state_tx.borrow())
            .field("upload_deadline", &self.upload_deadline)
            .field("closed", &self.session.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl UploadWorkflow {
    /// Create a workflow talking to the configured service over HTTP
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_client(TransferClient::http(&config.service)?, config))
    }

    /// Create a workflow over an existing client
    pub fn with_client(client: TransferClient, config: &Config) -> Self {
        let (state_tx, _) = watch::channel(WorkflowState::Idle);
        let (transition_tx, _) = broadcast::channel(TRANSITION_CHANNEL_CAPACITY);
        Self {
            client,
            validator: InputValidator::new(&config.validation),
            upload_deadline: config.deadlines.upload,
            state_tx,
            transition_tx,
            draft: Mutex::new(Draft::default()),
            session: CancellationToken::new(),
        }
    }

    /// Keep a local preview copy of each selected file
    ///
    /// `dir` of None uses the system temp directory.
    pub fn with_previews(self, dir: Option<PathBuf>) -> Self {
        self.lock_draft().previews = Some(match dir {
            Some(dir) => PreviewStore::in_dir(dir),
            None => PreviewStore::new(),
        });
        self
    }

    /// Current state
    pub fn snapshot(&self) -> WorkflowState {
        self.state_tx.borrow().clone()
    }

    /// Observe state replacements
    pub fn watch(&self) -> watch::Receiver<WorkflowState> {
        self.state_tx.subscribe()
    }

    /// Subscribe to transition notifications
    ///
    /// The workflow does not depend on anyone listening.
    pub fn subscribe_transitions(&self) -> broadcast::Receiver<Transition> {
        self.transition_tx.subscribe()
    }

    /// True while validating or uploading
    pub fn is_processing(&self) -> bool {
        self.state_tx.borrow().is_processing()
    }

    /// Input as currently entered
    pub fn draft(&self) -> SubmissionInput {
        self.lock_draft().input.clone()
    }

    /// Eager validation of the current input, for inline hints
    ///
    /// Never changes state and never blocks editing.
    pub fn draft_problem(&self) -> Option<OutcomeError> {
        self.validator.validate(&self.lock_draft().input).err()
    }

    /// Path of the preview copy of the selected file, when previews are enabled
    pub fn preview_path(&self) -> Option<PathBuf> {
        self.lock_draft()
            .previews
            .as_ref()
            .and_then(|p| p.current())
            .map(|p| p.to_path_buf())
    }

    /// Artifact reference of the current analysis, if any
    pub fn artifact_reference(&self) -> Option<String> {
        self.state_tx
            .borrow()
            .feedback()
            .map(|f| f.artifact_reference.clone())
    }

    /// Replace the selected file
    ///
    /// Clears a previous result: `Success` and `Failed` go back to `Idle`. While a
    /// submission is in flight only the draft changes; the in-flight result still
    /// lands.
    pub fn select_file(&self, file: ResumeFile) -> Result<()> {
        if self.session.is_cancelled() {
            return Err(Error::SessionClosed);
        }

        {
            let mut draft = self.lock_draft();
            if let Some(previews) = draft.previews.as_mut() {
                if let Err(e) = previews.stage(&file) {
                    tracing::warn!(file = %file.name, error = %e, "could not stage preview");
                }
            }
            draft.input.file = Some(file);
        }

        self.transition(|state| match state {
            WorkflowState::Success { .. } | WorkflowState::Failed { .. } => {
                Some(WorkflowState::Idle)
            }
            WorkflowState::Idle | WorkflowState::Validating | WorkflowState::Submitting { .. } => {
                None
            }
        });
        Ok(())
    }

    /// Replace the job role
    pub fn set_job_role(&self, job_role: impl Into<String>) -> Result<()> {
        if self.session.is_cancelled() {
            return Err(Error::SessionClosed);
        }
        self.lock_draft().input.job_role = job_role.into();
        Ok(())
    }

    /// Submit `input`, replacing the draft
    ///
    /// Rejected without any change while another submission is validating or in
    /// flight, or after [`end_session`](Self::end_session).
    pub async fn submit(&self, input: SubmissionInput) -> SubmitOutcome {
        self.run_submission(Some(input)).await
    }

    /// Submit the current draft again
    pub async fn resubmit(&self) -> SubmitOutcome {
        self.run_submission(None).await
    }

    /// End the session
    ///
    /// Cancels an in-flight upload (which then lands in `Failed`), deletes the
    /// preview copy and rejects later commands. Calling it again is a no-op.
    pub fn end_session(&self) {
        if self.session.is_cancelled() {
            return;
        }
        self.session.cancel();
        if let Some(previews) = self.lock_draft().previews.as_mut() {
            previews.release();
        }
        tracing::info!("workflow session ended");
    }

    async fn run_submission(&self, input: Option<SubmissionInput>) -> SubmitOutcome {
        if self.session.is_cancelled() {
            return SubmitOutcome::Rejected(RejectReason::SessionClosed);
        }

        let claimed = self.transition(|state| {
            if state.is_processing() {
                None
            } else {
                Some(WorkflowState::Validating)
            }
        });
        if !claimed {
            tracing::debug!("submit rejected: submission already in flight");
            return SubmitOutcome::Rejected(RejectReason::InFlight);
        }

        let input = {
            let mut draft = self.lock_draft();
            if let Some(input) = input {
                draft.input = input;
            }
            draft.input.clone()
        };

        let media_type = match self.validator.validate(&input) {
            Ok(media_type) => media_type,
            Err(error) => return self.finish(WorkflowState::Failed { error }),
        };
        let Some(file) = input.file else {
            return self.finish(WorkflowState::Failed {
                error: OutcomeError::validation(NO_FILE_SELECTED),
            });
        };
        let request = UploadRequest {
            file,
            media_type,
            job_role: input.job_role,
        };

        self.transition(|_| {
            Some(WorkflowState::Submitting {
                started_at: Utc::now(),
            })
        });

        let mut guard = SubmittingGuard {
            workflow: self,
            armed: true,
        };
        let result = self
            .client
            .submit(request, self.upload_deadline, &self.session)
            .await;
        guard.armed = false;

        let next = match result {
            Ok(feedback) => WorkflowState::Success { feedback },
            Err(error) => WorkflowState::Failed { error },
        };
        self.finish(next)
    }

    fn finish(&self, next: WorkflowState) -> SubmitOutcome {
        self.transition(|_| Some(next));
        SubmitOutcome::Finished(self.snapshot())
    }

    /// Apply a state change atomically
    ///
    /// `decide` sees the current state and returns the replacement, or None to
    /// leave it untouched. Returns whether the state changed.
    fn transition<F>(&self, decide: F) -> bool
    where
        F: FnOnce(&WorkflowState) -> Option<WorkflowState>,
    {
        let mut change = None;
        let modified = self.state_tx.send_if_modified(|state| match decide(state) {
            Some(next) => {
                let from = state.kind();
                *state = next;
                change = Some((from, state.kind()));
                true
            }
            None => false,
        });

        if let Some((from, to)) = change {
            tracing::info!(from = ?from, to = ?to, "workflow transition");
            // No subscribers is fine
            self.transition_tx
                .send(Transition {
                    from,
                    to,
                    at: Utc::now(),
                })
                .ok();
        }
        modified
    }

    fn lock_draft(&self) -> MutexGuard<'_, Draft> {
        self.draft.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for UploadWorkflow {
    fn drop(&mut self) {
        self.session.cancel();
    }
}

/// Moves an abandoned submission out of `Submitting`
///
/// If the future driving [`UploadWorkflow::submit`] is dropped mid-upload, the
/// request is gone but nothing would ever clear the processing state.
struct SubmittingGuard<'a> {
    workflow: &'a UploadWorkflow,
    armed: bool,
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::warn!("submission abandoned while in flight");
        self.workflow.transition(|state| match state {
            WorkflowState::Submitting { .. } => Some(WorkflowState::Failed {
                error: OutcomeError::unknown(Operation::Upload, "submission abandoned"),
            }),
            WorkflowState::Idle
            | WorkflowState::Validating
            | WorkflowState::Success { .. }
            | WorkflowState::Failed { .. } => None,
        });
    }
}
