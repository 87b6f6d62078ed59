//! Scoring Error Types
//!
//! Failure taxonomy for a single entity's score computation.

use thiserror::Error;
use uuid::Uuid;

use super::EntityKind;

/// Why a score could not be computed or stored.
///
/// Single-entity callers degrade every variant to a score of 0; the tagged
/// form lets tests and the API tell "legitimately zero" from "failed".
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoreError {
    /// Entity id does not resolve to a record
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: Uuid },

    /// An aggregate/count query failed
    #[error("Aggregation failed: {0}")]
    Aggregation(String),

    /// Writing the computed score back failed
    #[error("Persisting score failed: {0}")]
    Persistence(String),
}

impl ScoreError {
    pub fn not_found(kind: EntityKind, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Short machine-readable code, used in reports and API bodies
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Aggregation(_) => "aggregation_failure",
            Self::Persistence(_) => "persistence_failure",
        }
    }
}
