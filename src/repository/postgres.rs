//! Postgres engagement repository
//!
//! Aggregate SQL over `events`, `sub_events`, `products`, `rsvps`, `media`
//! and `product_tags` (see `migrations/001_trending.sql`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{EngagementCounters, EngagementSnapshot, EntityKind, RankedEntity};

use super::{EngagementRepository, RepositoryError};

/// Row shape shared by the event and sub-event aggregate queries
type ScheduledRow = (DateTime<Utc>, Option<DateTime<Utc>>, bool, bool, i64, i64, i64, i64);

/// Postgres-backed [`EngagementRepository`]
#[derive(Debug, Clone)]
pub struct PgEngagementRepository {
    pool: PgPool,
}

impl PgEngagementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Counts come back as BIGINT; negatives can only mean corrupt data
fn count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn scheduled_snapshot(row: ScheduledRow) -> EngagementSnapshot {
    let (created_at, starts_at, is_featured, is_boosted, views, rsvps, media, products) = row;
    EngagementSnapshot::scheduled(
        created_at,
        starts_at,
        EngagementCounters::new(count(views), count(rsvps), count(media), count(products)),
    )
    .featured(is_featured)
    .boosted(is_boosted)
}

#[async_trait]
impl EngagementRepository for PgEngagementRepository {
    async fn event_engagement(
        &self,
        id: Uuid,
    ) -> Result<Option<EngagementSnapshot>, RepositoryError> {
        let row: Option<ScheduledRow> = sqlx::query_as(
            r#"
            SELECT
                e.created_at,
                e.start_date,
                e.is_featured,
                e.is_boosted,
                e.view_count,
                (SELECT COUNT(*) FROM rsvps r WHERE r.event_id = e.id) AS rsvps,
                (SELECT COUNT(*) FROM media m WHERE m.event_id = e.id) AS media,
                (
                    SELECT COALESCE(SUM(p.scan_count + p.like_count + p.save_count), 0)::BIGINT
                    FROM product_tags t
                    JOIN products p ON p.id = t.product_id
                    WHERE t.event_id = e.id
                ) AS product_engagement
            FROM events e
            WHERE e.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(scheduled_snapshot))
    }

    async fn sub_event_rollup(
        &self,
        event_id: Uuid,
    ) -> Result<EngagementCounters, RepositoryError> {
        let (rsvps, media, products): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (
                    SELECT COUNT(*) FROM rsvps r
                    JOIN sub_events s ON s.id = r.sub_event_id
                    WHERE s.event_id = $1
                ) AS rsvps,
                (
                    SELECT COUNT(*) FROM media m
                    JOIN sub_events s ON s.id = m.sub_event_id
                    WHERE s.event_id = $1
                ) AS media,
                (
                    SELECT COALESCE(SUM(p.scan_count + p.like_count + p.save_count), 0)::BIGINT
                    FROM product_tags t
                    JOIN sub_events s ON s.id = t.sub_event_id
                    JOIN products p ON p.id = t.product_id
                    WHERE s.event_id = $1
                ) AS product_engagement
            "#,
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(EngagementCounters::new(0, count(rsvps), count(media), count(products)))
    }

    async fn sub_event_engagement(
        &self,
        id: Uuid,
    ) -> Result<Option<EngagementSnapshot>, RepositoryError> {
        let row: Option<ScheduledRow> = sqlx::query_as(
            r#"
            SELECT
                s.created_at,
                s.start_date,
                s.is_featured,
                s.is_boosted,
                s.view_count,
                (SELECT COUNT(*) FROM rsvps r WHERE r.sub_event_id = s.id) AS rsvps,
                (SELECT COUNT(*) FROM media m WHERE m.sub_event_id = s.id) AS media,
                (
                    SELECT COALESCE(SUM(p.scan_count + p.like_count + p.save_count), 0)::BIGINT
                    FROM product_tags t
                    JOIN products p ON p.id = t.product_id
                    WHERE t.sub_event_id = s.id
                ) AS product_engagement
            FROM sub_events s
            WHERE s.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(scheduled_snapshot))
    }

    async fn product_engagement(
        &self,
        id: Uuid,
    ) -> Result<Option<EngagementSnapshot>, RepositoryError> {
        let row: Option<(DateTime<Utc>, i64, i64)> = sqlx::query_as(
            r#"
            SELECT created_at, view_count, (scan_count + like_count + save_count)::BIGINT
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(created_at, views, engagement)| {
            EngagementSnapshot::product(created_at, count(views), count(engagement))
        }))
    }

    async fn list_ids(&self, kind: EntityKind) -> Result<Vec<Uuid>, RepositoryError> {
        // table names come from a closed enum, never from input
        let sql = format!("SELECT id FROM {} ORDER BY id", kind.table_name());
        let ids: Vec<Uuid> = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;
        Ok(ids)
    }

    async fn store_score(
        &self,
        kind: EntityKind,
        id: Uuid,
        score: i64,
    ) -> Result<bool, RepositoryError> {
        let sql = format!(
            "UPDATE {} SET trending_score = $2 WHERE id = $1",
            kind.table_name()
        );
        let rows_affected = sqlx::query(&sql)
            .bind(id)
            .bind(score.max(0))
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn top_scored(
        &self,
        kind: EntityKind,
        limit: usize,
    ) -> Result<Vec<RankedEntity>, RepositoryError> {
        let limit = i64::try_from(limit)
            .map_err(|_| RepositoryError::Query("limit too large".into()))?;
        let sql = format!(
            r#"
            SELECT id, trending_score
            FROM {}
            WHERE trending_score > 0
            ORDER BY trending_score DESC, id ASC
            LIMIT $1
            "#,
            kind.table_name()
        );
        let rows: Vec<(Uuid, i64)> = sqlx::query_as(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, trending_score)| RankedEntity { kind, id, trending_score })
            .collect())
    }
}
