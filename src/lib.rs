//! Marketplace Trending Library
//!
//! Trending score computation for events, sub-events and products, plus the
//! HTTP surface and scheduler that drive it.

pub mod api;
pub mod domain;
pub mod jobs;
pub mod repository;
pub mod scoring;

pub mod config;
pub mod db;
mod error;
pub mod telemetry;

pub use config::Config;
pub use domain::{EngagementCounters, EngagementSnapshot, EntityKind, RankedEntity, ScoreError};
pub use error::{AppError, AppResult};
pub use repository::{EngagementRepository, InMemoryEngagementRepository, PgEngagementRepository};
pub use scoring::{RecomputeReport, ScorerConfig, TrendingScorer};
