//! Journey stage classification for ABM personalization.
//!
//! Infers a buyer's position in the five-stage journey from a point-in-time
//! signal bundle, detects progression anomalies (stalls, engagement decline,
//! timeline reversals) against the assessment history, and predicts the
//! likelihood of a forward transition. Classification and anomaly detection
//! are separately callable, pure operations.

pub mod anomaly;
pub mod classify;
pub mod error;
pub mod indicators;

pub use classify::StageClassifier;
pub use error::JourneyError;
