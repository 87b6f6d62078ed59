//! Scoring module
//!
//! Trending score formula and the scorer that gathers inputs and persists
//! results through an [`EngagementRepository`](crate::repository::EngagementRepository).

pub mod factors;
pub mod formula;
mod scorer;

pub use formula::{compute, ScoreBreakdown};
pub use scorer::{EntityFailure, RecomputeReport, ScorerConfig, TrendingScorer};
