//! Export of the optimized resume.
//!
//! An export fetches the document behind the artifact reference of a successful
//! analysis and hands it to an [`ArtifactSink`]. Its lifecycle is tracked in its
//! own [`ExportState`]; a failed export never touches the workflow's `Success`
//! state, so the feedback stays visible next to the export error.

use crate::config::{Config, ExportConfig, FileCollisionAction};
use crate::error::{Operation, OutcomeError, Result};
use crate::transfer::{Artifact, TransferClient};
use crate::types::{ExportReceipt, ExportState};
use crate::utils::get_unique_path;
use crate::workflow::UploadWorkflow;
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Message when there is nothing to export
pub const NO_ARTIFACT: &str = "no optimized resume available";
/// Message when an export is requested while another one runs
pub const EXPORT_IN_PROGRESS: &str = "export already in progress";

/// Destination of a fetched document
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Store the document and return where it went
    async fn deliver(&self, artifact: &Artifact) -> Result<PathBuf>;
}

/// Saves documents into a directory
#[derive(Clone, Debug)]
pub struct SaveToDirectory {
    dir: PathBuf,
    collision: FileCollisionAction,
}

impl SaveToDirectory {
    /// Save into `dir`, resolving name clashes with `collision`
    pub fn new(dir: impl Into<PathBuf>, collision: FileCollisionAction) -> Self {
        Self {
            dir: dir.into(),
            collision,
        }
    }

    /// Sink for the configured download directory
    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(config.download_dir.clone(), config.file_collision)
    }
}

#[async_trait]
impl ArtifactSink for SaveToDirectory {
    async fn deliver(&self, artifact: &Artifact) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = get_unique_path(&self.dir.join(&artifact.file_name), self.collision)?;
        tokio::fs::write(&path, &artifact.content).await?;
        Ok(path)
    }
}

/// Fetches and saves the optimized resume, one export at a time
pub struct ExportLauncher {
    client: TransferClient,
    deadline: Duration,
    sink: Arc<dyn ArtifactSink>,
    state_tx: watch::Sender<ExportState>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for ExportLauncher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportLauncher")
            .field("state", &*self.state_tx.borrow())
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl ExportLauncher {
    /// Create a launcher talking to the configured service over HTTP
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_client(TransferClient::http(&config.service)?, config))
    }

    /// Create a launcher over an existing client, saving into the download directory
    pub fn with_client(client: TransferClient, config: &Config) -> Self {
        let (state_tx, _) = watch::channel(ExportState::Idle);
        Self {
            client,
            deadline: config.deadlines.export,
            sink: Arc::new(SaveToDirectory::from_config(&config.export)),
            state_tx,
            cancel: CancellationToken::new(),
        }
    }

    /// Deliver documents somewhere other than the download directory
    pub fn with_sink(mut self, sink: Arc<dyn ArtifactSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Current export state
    pub fn snapshot(&self) -> ExportState {
        self.state_tx.borrow().clone()
    }

    /// Observe export state replacements
    pub fn watch(&self) -> watch::Receiver<ExportState> {
        self.state_tx.subscribe()
    }

    /// Export the optimized resume of the workflow's current analysis
    ///
    /// Fails with a validation error if the workflow is not in `Success`.
    pub async fn launch_for(
        &self,
        workflow: &UploadWorkflow,
    ) -> std::result::Result<ExportReceipt, OutcomeError> {
        let reference = workflow.artifact_reference().unwrap_or_default();
        self.launch(&reference).await
    }

    /// Fetch the document behind `reference` and save it
    ///
    /// Makes exactly one attempt. A second launch while one is in flight is
    /// rejected without network activity and leaves the state alone.
    pub async fn launch(&self, reference: &str) -> std::result::Result<ExportReceipt, OutcomeError> {
        let reference = reference.trim();

        if reference.is_empty() {
            let error = OutcomeError::validation(NO_ARTIFACT).with_operation(Operation::Export);
            self.state_tx.send_if_modified(|state| match state {
                ExportState::InFlight { .. } => false,
                ExportState::Idle | ExportState::Done { .. } | ExportState::Failed { .. } => {
                    *state = ExportState::Failed {
                        error: error.clone(),
                    };
                    true
                }
            });
            return Err(error);
        }

        let claimed = self.state_tx.send_if_modified(|state| match state {
            ExportState::InFlight { .. } => false,
            ExportState::Idle | ExportState::Done { .. } | ExportState::Failed { .. } => {
                *state = ExportState::InFlight {
                    reference: reference.to_string(),
                    started_at: Utc::now(),
                };
                true
            }
        });
        if !claimed {
            tracing::debug!(reference = %reference, "export rejected: already in flight");
            return Err(OutcomeError::validation(EXPORT_IN_PROGRESS).with_operation(Operation::Export));
        }

        tracing::debug!(reference = %reference, "export started");
        let mut guard = InFlightGuard {
            state_tx: &self.state_tx,
            armed: true,
        };
        let result = self.fetch_and_save(reference).await;
        guard.armed = false;

        match &result {
            Ok(receipt) => {
                tracing::info!(
                    reference = %reference,
                    path = %receipt.path.display(),
                    size_bytes = receipt.size_bytes,
                    "optimized resume saved"
                );
                self.state_tx.send_replace(ExportState::Done {
                    receipt: receipt.clone(),
                });
            }
            Err(error) => {
                tracing::warn!(reference = %reference, kind = %error.kind, error = %error, "export failed");
                self.state_tx.send_replace(ExportState::Failed {
                    error: error.clone(),
                });
            }
        }
        result
    }

    /// Cancel any in-flight export; later launches fail immediately
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    async fn fetch_and_save(
        &self,
        reference: &str,
    ) -> std::result::Result<ExportReceipt, OutcomeError> {
        let artifact = self
            .client
            .fetch_artifact(reference, self.deadline, &self.cancel)
            .await?;

        let path = self.sink.deliver(&artifact).await.map_err(|e| {
            OutcomeError::unknown(Operation::Export, "could not save the optimized resume")
                .with_detail(e.to_string())
        })?;

        Ok(ExportReceipt {
            reference: reference.to_string(),
            path,
            size_bytes: artifact.content.len() as u64,
            content_type: artifact.content_type,
        })
    }
}

impl Drop for ExportLauncher {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Moves an abandoned export out of `InFlight`
struct InFlightGuard<'a> {
    state_tx: &'a watch::Sender<ExportState>,
    armed: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::warn!("export abandoned while in flight");
        self.state_tx.send_if_modified(|state| match state {
            ExportState::InFlight { .. } => {
                *state = ExportState::Failed {
                    error: OutcomeError::unknown(Operation::Export, "export abandoned"),
                };
                true
            }
            ExportState::Idle | ExportState::Done { .. } | ExportState::Failed { .. } => false,
        });
    }
}
