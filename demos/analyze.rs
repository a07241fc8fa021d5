//! Analyze a resume from the command line
//!
//! This example demonstrates the core flow of resume-optimizer:
//! - Loading configuration (optionally from a TOML file)
//! - Subscribing to workflow transitions
//! - Submitting a resume with graceful Ctrl+C handling
//! - Exporting the optimized document
//!
//! ```bash
//! RUST_LOG=resume_optimizer=debug cargo run --example analyze -- resume.pdf "Backend Engineer"
//! ```
//!
//! Set `RESUME_OPTIMIZER_CONFIG` to a TOML file to override the defaults.

use resume_optimizer::ingest::read_resume;
use resume_optimizer::{
    Config, ExportLauncher, IsRetryable, SubmissionInput, SubmitOutcome, UploadWorkflow,
    WorkflowState, run_with_shutdown,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("resume_optimizer=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(path), Some(job_role)) = (args.next(), args.next()) else {
        eprintln!("usage: analyze <resume.pdf|.doc|.docx> <job role>");
        std::process::exit(2);
    };

    let config = match std::env::var("RESUME_OPTIMIZER_CONFIG") {
        Ok(config_path) => Config::load(config_path)?,
        Err(_) => Config::default(),
    };

    let workflow = UploadWorkflow::new(&config)?;

    let mut transitions = workflow.subscribe_transitions();
    tokio::spawn(async move {
        while let Ok(t) = transitions.recv().await {
            println!("  {:?} -> {:?}", t.from, t.to);
        }
    });

    workflow.select_file(read_resume(&path).await?)?;
    workflow.set_job_role(job_role)?;
    if let Some(problem) = workflow.draft_problem() {
        eprintln!("✗ {}", problem);
        std::process::exit(1);
    }

    println!("Uploading {} ...", path);
    let input = workflow.draft();
    match run_with_shutdown(&workflow, input).await {
        SubmitOutcome::Finished(WorkflowState::Success { feedback }) => {
            println!("\n✓ Overall score: {}/10", feedback.overall_score);
            println!("\nStrengths:");
            for s in &feedback.strengths {
                println!("  • {}", s);
            }
            println!("\nImprovements:");
            for s in &feedback.improvements {
                println!("  • {}", s);
            }
            if !feedback.actionable_changes.is_empty() {
                println!("\nActionable changes:");
                for s in &feedback.actionable_changes {
                    println!("  • {}", s);
                }
            }

            let launcher = ExportLauncher::new(&config)?;
            match launcher.launch_for(&workflow).await {
                Ok(receipt) => println!("\n✓ Optimized resume saved to {}", receipt.path.display()),
                Err(e) => eprintln!("\n✗ Export failed: {}", e),
            }
        }
        SubmitOutcome::Finished(WorkflowState::Failed { error }) => {
            eprintln!("\n✗ {} [{}]", error, error.kind.code());
            if let Some(detail) = &error.detail {
                eprintln!("  {}", detail);
            }
            if error.is_retryable() {
                eprintln!("  Running the command again may succeed.");
            }
        }
        other => eprintln!("\n✗ Unexpected outcome: {:?}", other),
    }

    workflow.end_session();
    Ok(())
}
