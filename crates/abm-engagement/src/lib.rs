//! Engagement analytics for ABM contacts.
//!
//! Turns raw engagement events into a composite 0–100 score (recency,
//! frequency, quality, diversity, progression), a trend direction, and an
//! engagement velocity — the interactions-per-day figure the journey
//! classifier consumes through `SignalBundle`.

pub mod error;
pub mod score;
pub mod types;
pub mod velocity;

pub use error::EngagementError;
pub use score::score_contact;
pub use types::{EngagementEvent, EngagementEventKind, EngagementSummary, ScoreBreakdown, Trend};
pub use velocity::engagement_velocity;
