//! Domain module
//!
//! Core types shared by the scorer, repositories and API.

pub mod engagement;
pub mod error;
pub mod kind;

pub use engagement::{EngagementCounters, EngagementSnapshot, RankedEntity};
pub use error::ScoreError;
pub use kind::{EntityKind, UnknownEntityKind};
