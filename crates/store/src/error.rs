use thiserror::Error;

/// Errors reported by shard store backends.
///
/// None of these abort a lookup; callers treat every variant as a skipped
/// shard.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),
    #[error("shard unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        StoreError::Backend(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        StoreError::Unavailable(msg.into())
    }
}
