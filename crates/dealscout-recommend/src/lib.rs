pub mod policy;
pub mod report;

pub use policy::{ScoreBreakdown, ScorePolicy};
pub use report::recommendation_report;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecommendError {
    /// `recommend` was called with no candidates; callers must hand in at
    /// least one record.
    #[error("cannot recommend from an empty candidate list")]
    EmptyCandidates,
}
