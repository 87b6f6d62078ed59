//! Engagement snapshot
//!
//! Aggregate counters gathered fresh at scoring time. Snapshots are never
//! persisted; only the resulting score is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Add;
use uuid::Uuid;

use super::EntityKind;

/// Raw engagement counters for a single entity.
///
/// `product_engagement` is scans + likes + saves of the associated products,
/// combined before weighting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementCounters {
    pub views: u64,
    pub rsvps: u64,
    pub media: u64,
    pub product_engagement: u64,
}

impl EngagementCounters {
    pub fn new(views: u64, rsvps: u64, media: u64, product_engagement: u64) -> Self {
        Self {
            views,
            rsvps,
            media,
            product_engagement,
        }
    }

    /// Interactions counted towards the engagement rate
    pub fn interactions(&self) -> u64 {
        self.rsvps.saturating_add(self.media)
    }

    /// Fold child sub-event totals into a parent event.
    ///
    /// Views stay with the parent; only rsvps, media and product engagement
    /// roll up.
    pub fn with_rollup(self, children: EngagementCounters) -> Self {
        Self {
            views: self.views,
            rsvps: self.rsvps.saturating_add(children.rsvps),
            media: self.media.saturating_add(children.media),
            product_engagement: self
                .product_engagement
                .saturating_add(children.product_engagement),
        }
    }
}

impl Add for EngagementCounters {
    type Output = EngagementCounters;

    fn add(self, other: EngagementCounters) -> EngagementCounters {
        EngagementCounters {
            views: self.views.saturating_add(other.views),
            rsvps: self.rsvps.saturating_add(other.rsvps),
            media: self.media.saturating_add(other.media),
            product_engagement: self
                .product_engagement
                .saturating_add(other.product_engagement),
        }
    }
}

/// Everything the formula needs to know about one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementSnapshot {
    pub created_at: DateTime<Utc>,
    /// Start time (events and sub-events only)
    pub starts_at: Option<DateTime<Utc>>,
    pub is_featured: bool,
    pub is_boosted: bool,
    pub counters: EngagementCounters,
}

impl EngagementSnapshot {
    /// Snapshot for a product: no start date, no flags, no rsvps or media
    pub fn product(created_at: DateTime<Utc>, views: u64, product_engagement: u64) -> Self {
        Self {
            created_at,
            starts_at: None,
            is_featured: false,
            is_boosted: false,
            counters: EngagementCounters::new(views, 0, 0, product_engagement),
        }
    }

    /// Snapshot for an event or sub-event
    pub fn scheduled(
        created_at: DateTime<Utc>,
        starts_at: Option<DateTime<Utc>>,
        counters: EngagementCounters,
    ) -> Self {
        Self {
            created_at,
            starts_at,
            is_featured: false,
            is_boosted: false,
            counters,
        }
    }

    pub fn featured(mut self, is_featured: bool) -> Self {
        self.is_featured = is_featured;
        self
    }

    pub fn boosted(mut self, is_boosted: bool) -> Self {
        self.is_boosted = is_boosted;
        self
    }
}

/// An entity as returned by top-N reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntity {
    pub kind: EntityKind,
    pub id: Uuid,
    pub trending_score: i64,
}
