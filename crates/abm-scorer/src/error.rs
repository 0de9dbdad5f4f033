use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScorerError {
    /// Malformed input — the caller's bug, not retried. Absence of a match
    /// is never this error; it scores zero or neutral instead.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
