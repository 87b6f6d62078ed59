//! Engagement repository
//!
//! Data-access seam between the scorer and storage. The scorer only ever
//! sees [`EngagementSnapshot`]s, regardless of how each kind's counters are
//! fetched.

mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{EngagementCounters, EngagementSnapshot, EntityKind, RankedEntity};

pub use memory::{Fault, InMemoryEngagementRepository};
pub use postgres::PgEngagementRepository;

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Query failed: {0}")]
    Query(String),
}

/// Read and write access to everything the trending scorer needs
#[async_trait]
pub trait EngagementRepository: Send + Sync {
    /// Direct counters of an event (own rsvps, media and tagged products)
    async fn event_engagement(
        &self,
        id: Uuid,
    ) -> Result<Option<EngagementSnapshot>, RepositoryError>;

    /// Rsvps, media and product engagement summed over an event's sub-events
    async fn sub_event_rollup(&self, event_id: Uuid)
        -> Result<EngagementCounters, RepositoryError>;

    async fn sub_event_engagement(
        &self,
        id: Uuid,
    ) -> Result<Option<EngagementSnapshot>, RepositoryError>;

    async fn product_engagement(
        &self,
        id: Uuid,
    ) -> Result<Option<EngagementSnapshot>, RepositoryError>;

    /// Every id of the given kind
    async fn list_ids(&self, kind: EntityKind) -> Result<Vec<Uuid>, RepositoryError>;

    /// Overwrite the stored score. Returns false when no row matched.
    async fn store_score(
        &self,
        kind: EntityKind,
        id: Uuid,
        score: i64,
    ) -> Result<bool, RepositoryError>;

    /// Highest stored scores first, ties by id, only scores > 0
    async fn top_scored(
        &self,
        kind: EntityKind,
        limit: usize,
    ) -> Result<Vec<RankedEntity>, RepositoryError>;
}
