//! Submission use cases.
//!
//! This module exposes the submission orchestrator and the two capabilities
//! it drives: payload assembly and post-success cleanup.

mod assembler;
mod cleanup;
mod context;
pub mod orchestrator;

pub use assembler::{AssembleError, SubmissionAssembler};
pub use cleanup::{CleanupCoordinator, CleanupFailure, CleanupReport, CleanupTarget};
pub use orchestrator::{SubmissionError, SubmissionOrchestrator};
