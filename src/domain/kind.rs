//! Entity kind
//!
//! The three kinds of marketplace records that carry a trending score.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of scoreable entity.
///
/// Rendered as `event`, `sub_event` or `product` in paths, JSON and CLI args.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Event,
    SubEvent,
    Product,
}

/// Error returned when parsing an unknown kind string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown entity kind: {0}")]
pub struct UnknownEntityKind(pub String);

impl EntityKind {
    /// Every kind, in the order batch jobs process them
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Event,
        EntityKind::SubEvent,
        EntityKind::Product,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Event => "event",
            EntityKind::SubEvent => "sub_event",
            EntityKind::Product => "product",
        }
    }

    /// Table holding the `trending_score` column for this kind
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Event => "events",
            EntityKind::SubEvent => "sub_events",
            EntityKind::Product => "products",
        }
    }

    /// Events and sub-events have a start date and featured/boosted flags
    pub fn is_scheduled(&self) -> bool {
        matches!(self, EntityKind::Event | EntityKind::SubEvent)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "event" => Ok(EntityKind::Event),
            "sub_event" => Ok(EntityKind::SubEvent),
            "product" => Ok(EntityKind::Product),
            other => Err(UnknownEntityKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kinds() {
        assert_eq!("event".parse::<EntityKind>().unwrap(), EntityKind::Event);
        assert_eq!("sub_event".parse::<EntityKind>().unwrap(), EntityKind::SubEvent);
        assert_eq!("product".parse::<EntityKind>().unwrap(), EntityKind::Product);
    }

    #[test]
    fn test_only_documented_names_parse() {
        for alias in ["events", "Products", "subevent", "sub-event", "sub_events", " event"] {
            assert!(alias.parse::<EntityKind>().is_err(), "{} should be rejected", alias);
        }
    }

    #[test]
    fn test_parse_unknown_kind() {
        let err = "festival".parse::<EntityKind>().unwrap_err();
        assert_eq!(err, UnknownEntityKind("festival".to_string()));
        assert!(err.to_string().contains("festival"));
    }

    #[test]
    fn test_display_matches_serde() {
        for kind in EntityKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
    }

    #[test]
    fn test_only_events_are_scheduled() {
        assert!(EntityKind::Event.is_scheduled());
        assert!(EntityKind::SubEvent.is_scheduled());
        assert!(!EntityKind::Product.is_scheduled());
    }
}
