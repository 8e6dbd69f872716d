pub mod grading_flow;
pub mod submission_ctx;

pub use grading_flow::{Collaborators, GradingFlow, SubmissionOutcome};
pub use submission_ctx::SubmissionCtx;
