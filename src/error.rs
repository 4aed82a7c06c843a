//! Error taxonomy for the analysis pipeline.
//!
//! Batch-level failures abort a request; item-level failures are contained by
//! the synthesizer. An empty corpus or an empty match is not an error.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The sentiment classifier failed for the whole batch.
    #[error("sentiment adapter failed: {0}")]
    AdapterFailure(String),

    /// One item's downstream computation failed; the item is skipped.
    #[error("item {index} could not be processed: {reason}")]
    ItemProcessing { index: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
