//! API Routes
//!
//! HTTP endpoint definitions for trending reads and recompute triggers.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{EntityKind, RankedEntity};
use crate::error::{AppError, AppResult};
use crate::scoring::{RecomputeReport, ScoreBreakdown, TrendingScorer};

/// Largest `limit` accepted by the top-N endpoint
pub const MAX_TOP_N: usize = 100;

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    pub scorer: TrendingScorer,
}

impl AppState {
    pub fn new(scorer: TrendingScorer) -> Self {
        Self { scorer }
    }
}

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TopResponse {
    pub kind: EntityKind,
    pub entities: Vec<RankedEntity>,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub kind: EntityKind,
    pub id: Uuid,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoredScoreResponse {
    pub kind: EntityKind,
    pub id: Uuid,
    pub trending_score: i64,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/trending/:kind", get(top_trending))
        .route("/trending/:kind/:id", get(live_score))
        .route("/admin/trending/:kind/recompute", post(recompute_kind))
        .route("/admin/trending/:kind/:id/recompute", post(recompute_entity))
}

// =========================================================================
// GET /trending/:kind
// =========================================================================

/// Highest stored scores for a kind
async fn top_trending(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<TopQuery>,
) -> AppResult<Json<TopResponse>> {
    let kind: EntityKind = kind.parse()?;

    if query.limit > MAX_TOP_N {
        return Err(AppError::InvalidRequest(format!(
            "limit must be at most {}",
            MAX_TOP_N
        )));
    }

    let entities = state.scorer.try_top_n(kind, query.limit).await?;

    Ok(Json(TopResponse { kind, entities }))
}

// =========================================================================
// GET /trending/:kind/:id
// =========================================================================

/// Compute a live score with its breakdown, without persisting it
async fn live_score(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> AppResult<Json<ScoreResponse>> {
    let kind: EntityKind = kind.parse()?;
    let breakdown = state.scorer.try_score(kind, id, Utc::now()).await?;

    Ok(Json(ScoreResponse { kind, id, breakdown }))
}

// =========================================================================
// POST /admin/trending/:kind/recompute
// =========================================================================

/// Recompute and persist every entity of a kind
async fn recompute_kind(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> AppResult<Json<RecomputeReport>> {
    let kind: EntityKind = kind.parse()?;
    let report = state.scorer.recompute_all(kind).await;

    if let Some(e) = &report.enumeration_error {
        return Err(AppError::Internal(format!("could not list {}: {}", kind, e)));
    }

    Ok(Json(report))
}

// =========================================================================
// POST /admin/trending/:kind/:id/recompute
// =========================================================================

/// Recompute and persist a single entity
async fn recompute_entity(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> AppResult<Json<StoredScoreResponse>> {
    let kind: EntityKind = kind.parse()?;
    let trending_score = state.scorer.recompute_one(kind, id, Utc::now()).await?;

    Ok(Json(StoredScoreResponse {
        kind,
        id,
        trending_score,
    }))
}
