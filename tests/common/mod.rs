//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use marketplace_trending::api::{self, AppState};
use marketplace_trending::{
    EngagementCounters, EngagementSnapshot, InMemoryEngagementRepository, TrendingScorer,
};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Executor;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

const MIGRATION: &str = include_str!("../../migrations/001_trending.sql");

/// Database tests truncate shared tables, so they run one at a time
static DB_LOCK: Mutex<()> = Mutex::const_new(());

/// Connect to `DATABASE_URL`, apply the schema and empty every table.
/// Returns None (and the test is skipped) when no database is configured.
pub async fn setup_test_db() -> Option<(PgPool, MutexGuard<'static, ()>)> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };

    let guard = DB_LOCK.lock().await;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    pool.execute(MIGRATION)
        .await
        .expect("Failed to apply migration");

    // Clean up DB for fresh state
    sqlx::query("TRUNCATE TABLE product_tags, media, rsvps, sub_events, events, products CASCADE")
        .execute(&pool)
        .await
        .expect("Failed to clean up DB");

    Some((pool, guard))
}

/// Fixed clock used by batch tests
pub fn fixed_now() -> DateTime<Utc> {
    "2026-06-15T10:00:00Z".parse().unwrap()
}

/// Ids of the entities seeded by [`seed_marketplace`]
pub struct Seeded {
    pub festival: Uuid,
    pub workshop: Uuid,
    pub quiet_event: Uuid,
    pub sofa: Uuid,
    pub lamp: Uuid,
}

/// Fresh repository and scorer with nothing in them
pub fn setup_scorer() -> (Arc<InMemoryEngagementRepository>, TrendingScorer) {
    let repo = Arc::new(InMemoryEngagementRepository::new());
    let scorer = TrendingScorer::new(repo.clone());
    (repo, scorer)
}

/// A small marketplace: one busy festival with a workshop, one dead event
/// and two products.
pub fn seed_marketplace(repo: &InMemoryEngagementRepository, now: DateTime<Utc>) -> Seeded {
    let seeded = Seeded {
        festival: Uuid::new_v4(),
        workshop: Uuid::new_v4(),
        quiet_event: Uuid::new_v4(),
        sofa: Uuid::new_v4(),
        lamp: Uuid::new_v4(),
    };

    repo.insert_event(
        seeded.festival,
        EngagementSnapshot::scheduled(
            now - Duration::days(2),
            Some(now + Duration::days(3)),
            EngagementCounters::new(100, 10, 2, 0),
        )
        .featured(true),
    );
    repo.insert_sub_event(
        seeded.workshop,
        seeded.festival,
        EngagementSnapshot::scheduled(
            now - Duration::days(1),
            Some(now + Duration::days(10)),
            EngagementCounters::new(40, 0, 0, 0),
        ),
    );
    repo.insert_event(
        seeded.quiet_event,
        EngagementSnapshot::scheduled(
            now - Duration::days(200),
            Some(now - Duration::days(100)),
            EngagementCounters::default(),
        ),
    );
    repo.insert_product(
        seeded.sofa,
        EngagementSnapshot::product(now - Duration::days(5), 300, 60),
    );
    repo.insert_product(
        seeded.lamp,
        EngagementSnapshot::product(now - Duration::days(90), 10, 0),
    );

    seeded
}

/// Router wired to an in-memory scorer, as the server wires it to Postgres
pub fn test_app(scorer: TrendingScorer) -> axum::Router {
    api::create_router().with_state(AppState::new(scorer))
}
