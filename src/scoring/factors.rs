//! Trending factors
//!
//! Weights and boosts applied by the trending formula.

/// Weight per view
pub const VIEW_WEIGHT: f64 = 0.1;

/// Weight per RSVP
pub const RSVP_WEIGHT: f64 = 2.0;

/// Weight per media upload
pub const MEDIA_WEIGHT: f64 = 1.5;

/// Weight per combined product scan/like/save
pub const PRODUCT_ENGAGEMENT_WEIGHT: f64 = 0.5;

/// Multiplicative decay per day since creation
pub const DAILY_DECAY: f64 = 0.95;

/// Events starting within this many days get a recency boost
pub const EVENT_RECENCY_WINDOW_DAYS: f64 = 7.0;

/// Boost per day remaining inside the event window
pub const EVENT_RECENCY_PER_DAY: f64 = 5.0;

/// Products created within this many days get a recency boost
pub const PRODUCT_RECENCY_WINDOW_DAYS: f64 = 30.0;

/// Boost per day remaining inside the product window
pub const PRODUCT_RECENCY_PER_DAY: f64 = 0.5;

pub const FEATURED_BOOST: f64 = 50.0;

pub const BOOSTED_BOOST: f64 = 30.0;

/// Engagement rate must be strictly above this for the multiplier to apply
pub const ENGAGEMENT_RATE_THRESHOLD: f64 = 0.1;

pub const ENGAGEMENT_MULTIPLIER: f64 = 2.0;
