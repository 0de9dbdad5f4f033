use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngagementError {
    /// Malformed event data — the caller's bug, not retried.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
