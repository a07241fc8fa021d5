//! Custom test assertions for workflow outcomes

use resume_optimizer::{
    AnalysisFeedback, ErrorKind, OutcomeError, SubmitOutcome, WorkflowState,
};

/// Unwrap a finished submission into its feedback, panicking on anything else
pub fn expect_success(outcome: SubmitOutcome) -> AnalysisFeedback {
    match outcome {
        SubmitOutcome::Finished(WorkflowState::Success { feedback }) => feedback,
        other => panic!("Expected Success, got {:?}", other),
    }
}

/// Unwrap a finished submission into its error and check the kind
pub fn expect_failure(outcome: SubmitOutcome, kind: ErrorKind) -> OutcomeError {
    match outcome {
        SubmitOutcome::Finished(WorkflowState::Failed { error }) => {
            assert_eq!(error.kind, kind, "unexpected error: {:?}", error);
            error
        }
        other => panic!("Expected Failed({}), got {:?}", kind, other),
    }
}
