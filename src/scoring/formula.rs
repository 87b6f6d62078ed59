//! Trending formula
//!
//! Pure, stateless score computation over an [`EngagementSnapshot`].
//! Nothing here touches the database or the clock; `now` is always passed in.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{EngagementSnapshot, EntityKind};

use super::factors::*;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Every intermediate value of one score computation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub time_decay: f64,
    pub decayed: f64,
    pub recency_boost: f64,
    pub featured_boost: f64,
    pub boosted_boost: f64,
    pub engagement_rate: f64,
    /// Sum of the decayed base and all boosts, before the engagement multiplier
    pub subtotal: f64,
    pub multiplier: f64,
    pub total: f64,
    pub score: i64,
}

/// Fractional days from `from` to `to` (negative when `to` is earlier)
pub fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// `0.95 ^ days`, with days clamped at zero so the factor stays in (0, 1]
pub fn time_decay(days_since_created: f64) -> f64 {
    DAILY_DECAY.powf(days_since_created.max(0.0))
}

/// Boost for an event starting between 0 and 7 days from now (inclusive)
pub fn event_recency_boost(days_until_start: f64) -> f64 {
    if (0.0..=EVENT_RECENCY_WINDOW_DAYS).contains(&days_until_start) {
        (EVENT_RECENCY_WINDOW_DAYS - days_until_start) * EVENT_RECENCY_PER_DAY
    } else {
        0.0
    }
}

/// Boost for a product created within the last 30 days
pub fn product_recency_boost(days_since_created: f64) -> f64 {
    let days = days_since_created.max(0.0);
    if days <= PRODUCT_RECENCY_WINDOW_DAYS {
        (PRODUCT_RECENCY_WINDOW_DAYS - days) * PRODUCT_RECENCY_PER_DAY
    } else {
        0.0
    }
}

/// Interactions per view; zero views means zero rate
pub fn engagement_rate(interactions: u64, views: u64) -> f64 {
    if views == 0 {
        0.0
    } else {
        interactions as f64 / views as f64
    }
}

/// Round half up and clamp to a non-negative integer
pub fn round_score(total: f64) -> i64 {
    if !total.is_finite() || total <= 0.0 {
        return 0;
    }
    (total + 0.5).floor() as i64
}

/// Compute the trending score of one entity.
///
/// Event counters must already include the sub-event rollup.
pub fn compute(
    kind: EntityKind,
    snapshot: &EngagementSnapshot,
    now: DateTime<Utc>,
) -> ScoreBreakdown {
    let c = snapshot.counters;
    let days_since_created = days_between(snapshot.created_at, now);

    let base = c.views as f64 * VIEW_WEIGHT
        + c.rsvps as f64 * RSVP_WEIGHT
        + c.media as f64 * MEDIA_WEIGHT
        + c.product_engagement as f64 * PRODUCT_ENGAGEMENT_WEIGHT;

    let decay = time_decay(days_since_created);
    let decayed = base * decay;

    let (recency_boost, featured_boost, boosted_boost) = if kind.is_scheduled() {
        let recency = snapshot
            .starts_at
            .map(|start| event_recency_boost(days_between(now, start)))
            .unwrap_or(0.0);
        let featured = if snapshot.is_featured { FEATURED_BOOST } else { 0.0 };
        let boosted = if snapshot.is_boosted { BOOSTED_BOOST } else { 0.0 };
        (recency, featured, boosted)
    } else {
        (product_recency_boost(days_since_created), 0.0, 0.0)
    };

    let rate = engagement_rate(c.interactions(), c.views);
    let subtotal = decayed + recency_boost + featured_boost + boosted_boost;
    let multiplier = if rate > ENGAGEMENT_RATE_THRESHOLD {
        ENGAGEMENT_MULTIPLIER
    } else {
        1.0
    };
    let total = subtotal * multiplier;

    ScoreBreakdown {
        base,
        time_decay: decay,
        decayed,
        recency_boost,
        featured_boost,
        boosted_boost,
        engagement_rate: rate,
        subtotal,
        multiplier,
        total,
        score: round_score(total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EngagementCounters;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        "2026-03-01T12:00:00Z".parse().unwrap()
    }

    fn event(
        counters: EngagementCounters,
        age_days: i64,
        starts_in_days: i64,
    ) -> EngagementSnapshot {
        EngagementSnapshot::scheduled(
            now() - Duration::days(age_days),
            Some(now() + Duration::days(starts_in_days)),
            counters,
        )
    }

    #[test]
    fn test_end_to_end_example() {
        let snap = event(EngagementCounters::new(100, 10, 2, 0), 2, 3).featured(true);
        let b = compute(EntityKind::Event, &snap, now());

        assert!((b.base - 33.0).abs() < 1e-9);
        assert!((b.time_decay - 0.9025).abs() < 1e-9);
        assert!((b.recency_boost - 20.0).abs() < 1e-9);
        assert_eq!(b.featured_boost, 50.0);
        assert!((b.engagement_rate - 0.12).abs() < 1e-9);
        assert_eq!(b.multiplier, 2.0);
        assert!((b.total - 199.565).abs() < 1e-6);
        assert_eq!(b.score, 200);
    }

    #[test]
    fn test_zero_input_scores_zero() {
        let far_past = event(EngagementCounters::default(), 10, -30);
        let far_future = event(EngagementCounters::default(), 10, 60);
        let no_start = EngagementSnapshot::scheduled(now(), None, EngagementCounters::default());

        assert_eq!(compute(EntityKind::Event, &far_past, now()).score, 0);
        assert_eq!(compute(EntityKind::SubEvent, &far_future, now()).score, 0);
        assert_eq!(compute(EntityKind::Event, &no_start, now()).score, 0);
    }

    #[test]
    fn test_time_decay_strictly_decreasing() {
        let counters = EngagementCounters::new(1000, 0, 0, 0);
        let mut previous = f64::MAX;
        for age in 0..60 {
            let snap = event(counters, age, -1);
            let total = compute(EntityKind::Event, &snap, now()).total;
            assert!(total < previous, "age {} did not decrease", age);
            previous = total;
        }
        assert!(time_decay(10_000.0) > 0.0);
        assert_eq!(time_decay(0.0), 1.0);
    }

    #[test]
    fn test_future_creation_does_not_amplify() {
        assert_eq!(time_decay(-3.0), 1.0);
    }

    #[test]
    fn test_event_recency_boundaries() {
        assert_eq!(event_recency_boost(7.0), 0.0);
        assert_eq!(event_recency_boost(0.0), 35.0);
        assert_eq!(event_recency_boost(-0.01), 0.0);
        assert_eq!(event_recency_boost(7.5), 0.0);
        assert!((event_recency_boost(3.0) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_product_recency_boundaries() {
        assert_eq!(product_recency_boost(0.0), 15.0);
        assert_eq!(product_recency_boost(30.0), 0.0);
        assert_eq!(product_recency_boost(31.0), 0.0);
        assert!((product_recency_boost(10.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_featured_adds_fifty_before_multiplier() {
        // rate = 0 / 100, no multiplier
        let plain = event(EngagementCounters::new(100, 0, 0, 0), 1, 20);
        let a = compute(EntityKind::Event, &plain, now());
        let b = compute(EntityKind::Event, &plain.clone().featured(true), now());
        assert!((b.subtotal - a.subtotal - 50.0).abs() < 1e-9);
        assert!((b.total - a.total - 50.0).abs() < 1e-9);

        // rate = 20 / 100, multiplier applies
        let engaged = event(EngagementCounters::new(100, 20, 0, 0), 1, 20);
        let a = compute(EntityKind::Event, &engaged, now());
        let b = compute(EntityKind::Event, &engaged.clone().featured(true), now());
        assert!((b.subtotal - a.subtotal - 50.0).abs() < 1e-9);
        assert!((b.total - a.total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_boosted_flag() {
        let snap = event(EngagementCounters::default(), 0, 30).boosted(true);
        let b = compute(EntityKind::SubEvent, &snap, now());
        assert_eq!(b.boosted_boost, 30.0);
        assert_eq!(b.score, 30);
    }

    #[test]
    fn test_views_monotonic_around_rate_threshold() {
        // 5 rsvps: rate > 0.1 while views < 50
        let score_at = |views: u64| {
            let snap = event(EngagementCounters::new(views, 5, 0, 0), 0, -1);
            compute(EntityKind::Event, &snap, now()).total
        };

        for views in 1..49 {
            assert!(score_at(views + 1) >= score_at(views));
        }
        // crossing the threshold drops the multiplier
        assert!(score_at(50) < score_at(49));
        for views in 50..200 {
            assert!(score_at(views + 1) >= score_at(views));
        }
    }

    #[test]
    fn test_rate_at_threshold_is_not_multiplied() {
        let snap = event(EngagementCounters::new(100, 10, 0, 0), 0, -1);
        let b = compute(EntityKind::Event, &snap, now());
        assert!((b.engagement_rate - 0.1).abs() < 1e-12);
        assert_eq!(b.multiplier, 1.0);
    }

    #[test]
    fn test_zero_views_guard() {
        assert_eq!(engagement_rate(10, 0), 0.0);
        let snap = event(EngagementCounters::new(0, 10, 0, 0), 0, -1);
        let b = compute(EntityKind::Event, &snap, now());
        assert_eq!(b.multiplier, 1.0);
        assert_eq!(b.score, 20);
    }

    #[test]
    fn test_product_ignores_flags_and_start() {
        let mut snap = EngagementSnapshot::product(now() - Duration::days(40), 100, 20);
        snap.is_featured = true;
        snap.is_boosted = true;
        snap.starts_at = Some(now());

        let b = compute(EntityKind::Product, &snap, now());
        assert_eq!(b.featured_boost, 0.0);
        assert_eq!(b.boosted_boost, 0.0);
        assert_eq!(b.recency_boost, 0.0);
        assert_eq!(b.multiplier, 1.0);
        // (100 * 0.1 + 20 * 0.5) * 0.95^40
        let expected = 20.0 * 0.95f64.powi(40);
        assert!((b.total - expected).abs() < 1e-9);
    }

    #[test]
    fn test_new_product_gets_recency_boost() {
        let snap = EngagementSnapshot::product(now(), 0, 0);
        assert_eq!(compute(EntityKind::Product, &snap, now()).score, 15);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_score(0.5), 1);
        assert_eq!(round_score(0.49), 0);
        assert_eq!(round_score(2.5), 3);
        assert_eq!(round_score(-4.0), 0);
        assert_eq!(round_score(f64::NAN), 0);
    }
}
