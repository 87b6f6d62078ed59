//! Trending Scorer
//!
//! Gathers engagement snapshots, runs the formula and persists the result.
//! Single-entity entry points never fail: errors are logged and read as a
//! score of 0. The `try_*`/`recompute_one` variants keep the tagged result.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::domain::{EngagementSnapshot, EntityKind, RankedEntity, ScoreError};
use crate::repository::{EngagementRepository, RepositoryError};

use super::formula::{self, ScoreBreakdown};

/// Error code recorded when an entity's scoring task panicked or was lost
const TASK_FAILED: &str = "task_failed";

/// Scorer tuning
#[derive(Debug, Clone)]
pub struct ScorerConfig {
    /// Entities scored in parallel during a batch (minimum 1)
    pub max_concurrency: usize,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self { max_concurrency: 8 }
    }
}

/// One entity that could not be scored or persisted in a batch
#[derive(Debug, Clone, Serialize)]
pub struct EntityFailure {
    pub id: Uuid,
    pub error_code: String,
    pub error: String,
}

impl EntityFailure {
    fn new(id: Uuid, error_code: &str, error: impl ToString) -> Self {
        Self {
            id,
            error_code: error_code.to_string(),
            error: error.to_string(),
        }
    }
}

/// Outcome of a `recompute_all` batch
#[derive(Debug, Clone, Serialize)]
pub struct RecomputeReport {
    pub kind: EntityKind,
    pub attempted: usize,
    pub scored: usize,
    pub failures: Vec<EntityFailure>,
    /// Set when the entity list itself could not be loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enumeration_error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl RecomputeReport {
    fn new(kind: EntityKind, started_at: DateTime<Utc>) -> Self {
        Self {
            kind,
            attempted: 0,
            scored: 0,
            failures: Vec::new(),
            enumeration_error: None,
            started_at,
            completed_at: started_at,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.enumeration_error.is_none()
    }
}

/// Computes and persists trending scores through an injected repository
#[derive(Clone)]
pub struct TrendingScorer {
    repository: Arc<dyn EngagementRepository>,
    config: ScorerConfig,
}

impl TrendingScorer {
    pub fn new(repository: Arc<dyn EngagementRepository>) -> Self {
        Self::with_config(repository, ScorerConfig::default())
    }

    pub fn with_config(repository: Arc<dyn EngagementRepository>, config: ScorerConfig) -> Self {
        Self { repository, config }
    }

    // =========================================================================
    // Gathering
    // =========================================================================

    /// Load the snapshot for one entity; event counters include their
    /// sub-events' rsvps, media and product engagement.
    pub async fn gather(
        &self,
        kind: EntityKind,
        id: Uuid,
    ) -> Result<EngagementSnapshot, ScoreError> {
        let aggregation = |e: RepositoryError| ScoreError::Aggregation(e.to_string());

        let snapshot = match kind {
            EntityKind::Event => self.repository.event_engagement(id).await,
            EntityKind::SubEvent => self.repository.sub_event_engagement(id).await,
            EntityKind::Product => self.repository.product_engagement(id).await,
        }
        .map_err(aggregation)?
        .ok_or_else(|| ScoreError::not_found(kind, id))?;

        if kind != EntityKind::Event {
            return Ok(snapshot);
        }

        let rollup = self
            .repository
            .sub_event_rollup(id)
            .await
            .map_err(aggregation)?;
        Ok(EngagementSnapshot {
            counters: snapshot.counters.with_rollup(rollup),
            ..snapshot
        })
    }

    // =========================================================================
    // Single-entity scoring
    // =========================================================================

    /// Compute a score without persisting it
    pub async fn try_score(
        &self,
        kind: EntityKind,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<ScoreBreakdown, ScoreError> {
        let snapshot = self.gather(kind, id).await?;
        Ok(formula::compute(kind, &snapshot, now))
    }

    /// Score for any kind, 0 on failure
    pub async fn score_at(&self, kind: EntityKind, id: Uuid, now: DateTime<Utc>) -> i64 {
        match self.try_score(kind, id, now).await {
            Ok(breakdown) => breakdown.score,
            Err(e) => {
                tracing::warn!(
                    kind = %kind,
                    entity_id = %id,
                    error = %e,
                    "Trending score unavailable"
                );
                0
            }
        }
    }

    pub async fn score_event(&self, id: Uuid) -> i64 {
        self.score_at(EntityKind::Event, id, Utc::now()).await
    }

    pub async fn score_sub_event(&self, id: Uuid) -> i64 {
        self.score_at(EntityKind::SubEvent, id, Utc::now()).await
    }

    pub async fn score_product(&self, id: Uuid) -> i64 {
        self.score_at(EntityKind::Product, id, Utc::now()).await
    }

    /// Gather, compute, then persist. Nothing is written unless the
    /// computation succeeds; a missing row is reported as NotFound.
    pub async fn recompute_one(
        &self,
        kind: EntityKind,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<i64, ScoreError> {
        let score = self.try_score(kind, id, now).await?.score;

        let stored = self
            .repository
            .store_score(kind, id, score)
            .await
            .map_err(|e| ScoreError::Persistence(e.to_string()))?;

        if !stored {
            // deleted between gather and write
            return Err(ScoreError::not_found(kind, id));
        }

        tracing::debug!(kind = %kind, entity_id = %id, score = score, "Stored trending score");
        Ok(score)
    }

    // =========================================================================
    // Batch
    // =========================================================================

    /// Score and persist every entity of `kind`
    pub async fn recompute_all(&self, kind: EntityKind) -> RecomputeReport {
        self.recompute_all_at(kind, Utc::now()).await
    }

    /// Batch recompute with a fixed clock. Each entity is independent: a
    /// failure (including a panic) is logged, recorded against its id and
    /// skipped.
    pub async fn recompute_all_at(&self, kind: EntityKind, now: DateTime<Utc>) -> RecomputeReport {
        let mut report = RecomputeReport::new(kind, Utc::now());

        let ids = match self.repository.list_ids(kind).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::error!(
                    kind = %kind,
                    error = %e,
                    "Failed to enumerate entities for recompute"
                );
                report.enumeration_error = Some(e.to_string());
                report.completed_at = Utc::now();
                return report;
            }
        };

        report.attempted = ids.len();
        tracing::info!(kind = %kind, entities = ids.len(), "Recomputing trending scores");

        let permits = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut pending: HashSet<Uuid> = ids.iter().copied().collect();
        let mut tasks = JoinSet::new();

        for id in ids {
            let scorer = self.clone();
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                // own task per entity so a panic is caught with its id
                let scored =
                    tokio::spawn(async move { scorer.recompute_one(kind, id, now).await }).await;
                (id, scored)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (id, scored) = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(kind = %kind, error = %e, "Recompute task failed");
                    continue;
                }
            };
            pending.remove(&id);

            match scored {
                Ok(Ok(_)) => report.scored += 1,
                Ok(Err(e)) => {
                    tracing::warn!(
                        kind = %kind,
                        entity_id = %id,
                        error = %e,
                        "Skipping entity in recompute"
                    );
                    report.failures.push(EntityFailure::new(id, e.code(), &e));
                }
                Err(e) => {
                    tracing::error!(
                        kind = %kind,
                        entity_id = %id,
                        error = %e,
                        "Recompute task panicked"
                    );
                    report.failures.push(EntityFailure::new(id, TASK_FAILED, &e));
                }
            }
        }

        for id in pending {
            report.failures.push(EntityFailure::new(
                id,
                TASK_FAILED,
                "scoring task did not complete",
            ));
        }

        report.failures.sort_by_key(|f| f.id);
        report.completed_at = Utc::now();

        tracing::info!(
            kind = %kind,
            scored = report.scored,
            failed = report.failures.len(),
            "Trending recompute finished"
        );

        report
    }

    // =========================================================================
    // Ranking
    // =========================================================================

    /// Tagged top-N read
    pub async fn try_top_n(
        &self,
        kind: EntityKind,
        n: usize,
    ) -> Result<Vec<RankedEntity>, ScoreError> {
        if n == 0 {
            return Ok(Vec::new());
        }
        self.repository
            .top_scored(kind, n)
            .await
            .map_err(|e| ScoreError::Aggregation(e.to_string()))
    }

    /// The `n` highest stored scores, strictly positive, ties by id.
    /// Failures are logged and yield an empty list.
    pub async fn top_n(&self, kind: EntityKind, n: usize) -> Vec<RankedEntity> {
        match self.try_top_n(kind, n).await {
            Ok(ranked) => ranked,
            Err(e) => {
                tracing::error!(
                    kind = %kind,
                    limit = n,
                    error = %e,
                    "Top-N trending query failed"
                );
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for TrendingScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrendingScorer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
