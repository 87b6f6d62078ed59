//! Database module
//!
//! Connection and schema checks. The schema itself lives in
//! `migrations/001_trending.sql`.

use sqlx::PgPool;

/// Tables the trending repository reads or writes
pub const REQUIRED_TABLES: &[&str] = &[
    "events",
    "sub_events",
    "products",
    "rsvps",
    "media",
    "product_tags",
];

/// Verify database connectivity
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Check if required tables and the `trending_score` columns exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    for table in REQUIRED_TABLES {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    for table in ["events", "sub_events", "products"] {
        let has_score: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.columns
                WHERE table_schema = 'public' AND table_name = $1 AND column_name = 'trending_score'
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !has_score {
            tracing::error!("Table '{}' is missing the trending_score column", table);
            return Ok(false);
        }
    }

    Ok(true)
}
