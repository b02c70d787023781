use thiserror::Error;

/// Errors that can occur while deriving candidate keys.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid candidate hash {value:?}: {reason}")]
    InvalidHash { value: String, reason: &'static str },
    #[error("invalid shard id {value:?}: {reason}")]
    InvalidShard { value: String, reason: &'static str },
}
