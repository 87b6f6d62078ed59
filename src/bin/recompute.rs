//! One-shot trending recompute
//!
//! Run with: cargo run --bin recompute --release -- --kind all
//! Intended for cron or manual triggers.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use marketplace_trending::{
    telemetry, EntityKind, PgEngagementRepository, ScorerConfig, TrendingScorer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing(false);

    let args: Vec<String> = std::env::args().collect();
    let flag = |name: &str| {
        args.iter()
            .position(|a| a == name)
            .and_then(|i| args.get(i + 1))
            .cloned()
    };

    let kinds: Vec<EntityKind> = match flag("--kind").as_deref() {
        None | Some("all") => EntityKind::ALL.to_vec(),
        Some(raw) => vec![raw.parse()?],
    };
    let max_concurrency: usize = flag("--concurrency")
        .map(|s| s.parse::<usize>())
        .transpose()?
        .unwrap_or(ScorerConfig::default().max_concurrency);

    let database_url = std::env::var("DATABASE_URL")?;
    let pool = PgPoolOptions::new()
        .max_connections(max_concurrency.max(1) as u32 + 1)
        .connect(&database_url)
        .await?;

    let scorer = TrendingScorer::with_config(
        Arc::new(PgEngagementRepository::new(pool.clone())),
        ScorerConfig { max_concurrency },
    );

    let mut had_errors = false;
    for kind in kinds {
        let report = scorer.recompute_all(kind).await;
        let elapsed = report.completed_at - report.started_at;

        println!(
            "{:<10} attempted={} scored={} failed={} time={}ms",
            kind.as_str(),
            report.attempted,
            report.scored,
            report.failures.len(),
            elapsed.num_milliseconds()
        );
        if let Some(e) = &report.enumeration_error {
            println!("  could not list entities: {}", e);
        }
        for failure in &report.failures {
            println!("  {} {}: {}", failure.id, failure.error_code, failure.error);
        }

        had_errors |= !report.is_clean();
    }

    pool.close().await;

    if had_errors {
        anyhow::bail!("recompute finished with failures");
    }
    Ok(())
}
