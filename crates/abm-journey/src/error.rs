use thiserror::Error;

#[derive(Debug, Error)]
pub enum JourneyError {
    /// Malformed input — the caller's bug, not retried. A bundle with zero
    /// evidence cannot be classified; the caller falls back to a
    /// default/unknown stage rather than the classifier guessing.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
