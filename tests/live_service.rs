//! End-to-end tests against a running analysis service
//!
//! These tests upload a real resume and are feature-gated behind `live-tests`.
//! All tests are also marked #[ignore]; cold starts can take minutes.
//!
//! # Running the tests
//!
//! ```bash
//! RESUME_SAMPLE_PATH=./resume.pdf \
//!     cargo test --features live-tests --test live_service -- --ignored --nocapture
//! ```
//!
//! # Environment variables
//!
//! - `RESUME_SAMPLE_PATH` - Resume to upload (required)
//! - `RESUME_SERVICE_URL` - Service base URL (optional, defaults to the hosted service)

#![cfg(feature = "live-tests")]

mod common;

use common::create_test_client_with;
use resume_optimizer::ingest::read_resume;
use resume_optimizer::{ServiceConfig, SubmissionInput, SubmitOutcome, WorkflowState};

fn service_url() -> String {
    std::env::var("RESUME_SERVICE_URL").unwrap_or_else(|_| ServiceConfig::default().base_url)
}

#[tokio::test]
#[ignore]
async fn test_live_analysis_and_export() {
    let Ok(sample) = std::env::var("RESUME_SAMPLE_PATH") else {
        eprintln!("Skipping: RESUME_SAMPLE_PATH not set");
        return;
    };

    let (workflow, launcher, _temp_dir) = create_test_client_with(&service_url(), |_| {});
    let file = read_resume(&sample).await.expect("Failed to read sample resume");

    let outcome = workflow
        .submit(SubmissionInput::new(file, "Software Engineer"))
        .await;

    match outcome {
        SubmitOutcome::Finished(WorkflowState::Success { feedback }) => {
            println!("score: {}", feedback.overall_score);
            assert!((0.0..=10.0).contains(&feedback.overall_score));
            let receipt = launcher
                .launch_for(&workflow)
                .await
                .expect("Export should succeed after a successful analysis");
            println!("saved {} bytes to {}", receipt.size_bytes, receipt.path.display());
            assert!(receipt.size_bytes > 0);
        }
        SubmitOutcome::Finished(WorkflowState::Failed { error }) => {
            // A cold service is an expected outcome, not a client bug
            eprintln!("service failed: {} ({:?})", error, error.detail);
        }
        other => panic!("Unexpected outcome: {:?}", other),
    }
}
