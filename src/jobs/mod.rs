//! Scheduled Jobs
//!
//! Periodic trending-score recomputation. The scheduler only triggers
//! `recompute_all`; it holds no state of its own, so aborting it between
//! ticks (or mid-batch) leaves every stored score valid.

use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use crate::domain::EntityKind;
use crate::scoring::{RecomputeReport, TrendingScorer};

/// Configuration for job scheduler
#[derive(Debug, Clone)]
pub struct JobSchedulerConfig {
    /// Interval between trending recomputes (default: 1 hour)
    pub recompute_interval: Duration,
    /// Kinds recomputed on every tick, in order
    pub kinds: Vec<EntityKind>,
}

impl Default for JobSchedulerConfig {
    fn default() -> Self {
        Self {
            recompute_interval: Duration::from_secs(3600),
            kinds: EntityKind::ALL.to_vec(),
        }
    }
}

/// Job Scheduler - recomputes trending scores on an interval
pub struct JobScheduler {
    scorer: TrendingScorer,
    config: JobSchedulerConfig,
}

impl JobScheduler {
    /// Create a new job scheduler
    pub fn new(scorer: TrendingScorer) -> Self {
        Self {
            scorer,
            config: JobSchedulerConfig::default(),
        }
    }

    /// Create with custom configuration
    pub fn with_config(scorer: TrendingScorer, config: JobSchedulerConfig) -> Self {
        Self { scorer, config }
    }

    /// Start the job scheduler in the background
    /// Returns a handle that can be used to abort the scheduler
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Run the scheduler loop
    async fn run(&self) {
        tracing::info!(
            interval_secs = self.config.recompute_interval.as_secs(),
            "Job scheduler started"
        );

        let mut recompute_interval = interval(self.config.recompute_interval);
        // a slow batch should not trigger a burst of catch-up runs
        recompute_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            recompute_interval.tick().await;
            for report in self.run_all_once().await {
                if let Some(e) = JobError::from_report(&report) {
                    tracing::error!(error = %e, "Trending recompute failed");
                }
            }
        }
    }

    /// Run every configured recompute once (for manual trigger or testing)
    pub async fn run_all_once(&self) -> Vec<RecomputeReport> {
        let mut reports = Vec::with_capacity(self.config.kinds.len());
        for kind in &self.config.kinds {
            reports.push(self.scorer.recompute_all(*kind).await);
        }
        reports
    }
}

/// Job execution errors
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Recompute of {kind} failed: {reason}")]
    Recompute { kind: EntityKind, reason: String },
}

impl JobError {
    /// Turn a report whose entity list could not be loaded into an error
    pub fn from_report(report: &RecomputeReport) -> Option<Self> {
        report.enumeration_error.as_ref().map(|reason| JobError::Recompute {
            kind: report.kind,
            reason: reason.clone(),
        })
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EngagementCounters, EngagementSnapshot};
    use crate::repository::InMemoryEngagementRepository;
    use chrono::Utc;
    use std::sync::Arc;
    use uuid::Uuid;

    #[test]
    fn test_job_scheduler_config_default() {
        let config = JobSchedulerConfig::default();
        assert_eq!(config.recompute_interval, Duration::from_secs(3600));
        assert_eq!(config.kinds, EntityKind::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_run_all_once_covers_configured_kinds() {
        let repo = Arc::new(InMemoryEngagementRepository::new());
        let event_id = Uuid::new_v4();
        let product_id = Uuid::new_v4();
        repo.insert_event(
            event_id,
            EngagementSnapshot::scheduled(Utc::now(), None, EngagementCounters::new(100, 0, 0, 0)),
        );
        repo.insert_product(product_id, EngagementSnapshot::product(Utc::now(), 100, 0));

        let scheduler = JobScheduler::with_config(
            TrendingScorer::new(repo.clone()),
            JobSchedulerConfig {
                recompute_interval: Duration::from_secs(60),
                kinds: vec![EntityKind::Event],
            },
        );

        let reports = scheduler.run_all_once().await;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].kind, EntityKind::Event);
        assert_eq!(reports[0].scored, 1);
        assert_eq!(repo.score_of(EntityKind::Event, event_id), Some(10));
        // not configured, untouched
        assert_eq!(repo.score_of(EntityKind::Product, product_id), Some(0));
    }

    #[tokio::test]
    async fn test_scheduler_can_be_aborted() {
        let repo = Arc::new(InMemoryEngagementRepository::new());
        let handle = JobScheduler::new(TrendingScorer::new(repo)).start();
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
    }

    #[test]
    fn test_job_error_from_clean_report() {
        let report = RecomputeReport {
            kind: EntityKind::Product,
            attempted: 0,
            scored: 0,
            failures: Vec::new(),
            enumeration_error: None,
            started_at: Utc::now(),
            completed_at: Utc::now(),
        };
        assert!(JobError::from_report(&report).is_none());
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_job_error_when_listing_fails() {
        let repo = Arc::new(InMemoryEngagementRepository::new());
        repo.inject_kind_fault(EntityKind::SubEvent);
        let scheduler = JobScheduler::with_config(
            TrendingScorer::new(repo),
            JobSchedulerConfig {
                recompute_interval: Duration::from_secs(60),
                kinds: vec![EntityKind::SubEvent, EntityKind::Product],
            },
        );

        let reports = scheduler.run_all_once().await;
        assert_eq!(reports.len(), 2);

        let err = JobError::from_report(&reports[0]).expect("sub_event listing should fail");
        assert!(err.to_string().starts_with("Recompute of sub_event failed"));
        assert!(JobError::from_report(&reports[1]).is_none());
    }
}
