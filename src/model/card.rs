//! Itinerary cards
//!
//! A card is one structural unit of a trip itinerary: a flight leg, the
//! accommodation, a single day, or the budget summary. The varying part is
//! a tagged union keyed by `type`, so "which fields apply to this card" is
//! answered by the type system. Each variant owns its field whitelist —
//! the sole source of truth consulted by the sanitizer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::activity::TimelineEntry;

/// Well-known id of the single departure flight card.
pub const DEPARTURE_CARD_ID: &str = "departure-flight";
/// Well-known id of the single return flight card.
pub const RETURN_CARD_ID: &str = "return-flight";

/// Whitelisted free-form fields, keyed by field name. Values are strings
/// exactly as exchanged with clients.
pub type FieldMap = BTreeMap<String, String>;

/// IATA-like airport codes for a flight card, uppercased on derivation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airports {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightBody {
    #[serde(default)]
    pub airports: Airports,
    #[serde(default)]
    pub fields: FieldMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StayBody {
    #[serde(default)]
    pub fields: FieldMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayBody {
    #[serde(default)]
    pub fields: FieldMap,
    /// Ordered same-day chronological sequence of activities.
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
}

/// The type-specific part of a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CardBody {
    Departure(FlightBody),
    Return(FlightBody),
    Accommodation(StayBody),
    Day(DayBody),
    Budget,
}

/// Discriminant of [`CardBody`], used wherever only the kind matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardKind {
    Departure,
    Return,
    Accommodation,
    Day,
    Budget,
}

impl CardKind {
    /// Keys accepted into this kind's `fields` map. `title` and `notes`
    /// are additionally accepted for every kind and routed to the card
    /// attributes of the same name.
    pub fn allowed_fields(self) -> &'static [&'static str] {
        match self {
            Self::Departure | Self::Return => &[
                "homeAirport",
                "arrivalAirport",
                "airline",
                "flightNumber",
                "departureDate",
                "departureTime",
                "price",
                "bookingLink",
            ],
            Self::Accommodation => &[
                "accommodationType",
                "price",
                "lengthOfStay",
                "breakfastIncluded",
                "address",
                "checkIn",
                "checkOut",
                "bookingLink",
            ],
            Self::Day => &["city", "date", "dailyCost", "highlightAttraction"],
            Self::Budget => &[],
        }
    }

    /// Keys routed to card attributes rather than the `fields` map.
    pub fn common_fields(self) -> &'static [&'static str] {
        &["title", "notes"]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Departure => "departure",
            Self::Return => "return",
            Self::Accommodation => "accommodation",
            Self::Day => "day",
            Self::Budget => "budget",
        }
    }
}

/// One structural unit of a trip itinerary.
///
/// `id` is unique within the itinerary and stable across edits — it is the
/// key for reordering and template merging. Display attributes (`subtitle`,
/// `price_label`, `summary`) are derived, non-authoritative projections of
/// `fields` recomputed by the card mutator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub price_label: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub notes: String,
    #[serde(flatten)]
    pub body: CardBody,
}

impl Card {
    pub fn departure() -> Self {
        Self {
            id: DEPARTURE_CARD_ID.to_string(),
            title: "Departure flight".to_string(),
            subtitle: String::new(),
            price_label: String::new(),
            summary: String::new(),
            notes: String::new(),
            body: CardBody::Departure(FlightBody::default()),
        }
    }

    pub fn return_flight() -> Self {
        Self {
            id: RETURN_CARD_ID.to_string(),
            title: "Return flight".to_string(),
            subtitle: String::new(),
            price_label: String::new(),
            summary: String::new(),
            notes: String::new(),
            body: CardBody::Return(FlightBody::default()),
        }
    }

    pub fn accommodation() -> Self {
        Self {
            id: "accommodation".to_string(),
            title: "Accommodation".to_string(),
            subtitle: "Awaiting selection".to_string(),
            price_label: String::new(),
            summary: String::new(),
            notes: String::new(),
            body: CardBody::Accommodation(StayBody::default()),
        }
    }

    /// A new day card with a fresh unique id.
    pub fn day(title: impl Into<String>) -> Self {
        Self {
            id: format!("day-{}", Uuid::new_v4()),
            title: title.into(),
            subtitle: String::new(),
            price_label: String::new(),
            summary: String::new(),
            notes: String::new(),
            body: CardBody::Day(DayBody::default()),
        }
    }

    pub fn budget() -> Self {
        Self {
            id: "budget".to_string(),
            title: "Budget".to_string(),
            subtitle: String::new(),
            price_label: String::new(),
            summary: String::new(),
            notes: String::new(),
            body: CardBody::Budget,
        }
    }

    pub fn kind(&self) -> CardKind {
        match self.body {
            CardBody::Departure(_) => CardKind::Departure,
            CardBody::Return(_) => CardKind::Return,
            CardBody::Accommodation(_) => CardKind::Accommodation,
            CardBody::Day(_) => CardKind::Day,
            CardBody::Budget => CardKind::Budget,
        }
    }

    pub fn is_day(&self) -> bool {
        matches!(self.body, CardBody::Day(_))
    }

    /// The card's field map, if the kind carries one.
    pub fn fields(&self) -> Option<&FieldMap> {
        match &self.body {
            CardBody::Departure(b) | CardBody::Return(b) => Some(&b.fields),
            CardBody::Accommodation(b) => Some(&b.fields),
            CardBody::Day(b) => Some(&b.fields),
            CardBody::Budget => None,
        }
    }

    pub fn fields_mut(&mut self) -> Option<&mut FieldMap> {
        match &mut self.body {
            CardBody::Departure(b) | CardBody::Return(b) => Some(&mut b.fields),
            CardBody::Accommodation(b) => Some(&mut b.fields),
            CardBody::Day(b) => Some(&mut b.fields),
            CardBody::Budget => None,
        }
    }

    /// Convenience accessor: a named field, blank when absent or when the
    /// kind has no fields at all.
    pub fn field(&self, key: &str) -> &str {
        self.fields()
            .and_then(|f| f.get(key))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn timeline(&self) -> Option<&[TimelineEntry]> {
        match &self.body {
            CardBody::Day(b) => Some(&b.timeline),
            _ => None,
        }
    }

    pub fn timeline_mut(&mut self) -> Option<&mut Vec<TimelineEntry>> {
        match &mut self.body {
            CardBody::Day(b) => Some(&mut b.timeline),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_serialization() {
        let card = Card::day("Day 1");
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["type"], "day");
        assert_eq!(json["timeline"], serde_json::json!([]));
        assert_eq!(json["priceLabel"], "");

        let budget = serde_json::to_value(Card::budget()).unwrap();
        assert_eq!(budget["type"], "budget");
        assert!(budget.get("fields").is_none());
    }

    #[test]
    fn test_deserialize_by_tag() {
        let card: Card = serde_json::from_value(serde_json::json!({
            "id": "departure-flight",
            "title": "Departure flight",
            "type": "departure",
            "airports": {"from": "LHR", "to": "FCO"},
            "fields": {"price": "120"}
        }))
        .unwrap();
        assert_eq!(card.kind(), CardKind::Departure);
        assert_eq!(card.field("price"), "120");
        match card.body {
            CardBody::Departure(ref b) => assert_eq!(b.airports.from, "LHR"),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_whitelists_are_kind_specific() {
        assert!(CardKind::Day.allowed_fields().contains(&"city"));
        assert!(!CardKind::Day.allowed_fields().contains(&"price"));
        assert!(CardKind::Departure.allowed_fields().contains(&"bookingLink"));
        assert!(CardKind::Budget.allowed_fields().is_empty());
    }

    #[test]
    fn test_budget_has_no_field_map() {
        let mut card = Card::budget();
        assert!(card.fields().is_none());
        assert!(card.fields_mut().is_none());
        assert_eq!(card.field("anything"), "");
    }

    #[test]
    fn test_day_ids_are_unique() {
        assert_ne!(Card::day("Day 1").id, Card::day("Day 1").id);
    }
}
