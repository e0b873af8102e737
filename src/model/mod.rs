//! Itinerary data model
//!
//! Cards and timeline entries are discriminated unions keyed by `type`;
//! each variant owns its field schema. Documents serialize camelCase to
//! match the JSON the web clients exchange.

pub mod activity;
pub mod card;
pub mod itinerary;
pub mod trip;

pub use activity::{
    fresh_entry_id, is_travel_mode, ActivityType, EntryFields, TimelineEntry, TRAVEL_MODES,
};
pub use card::{
    Airports, Card, CardBody, CardKind, DayBody, FieldMap, FlightBody, StayBody,
    DEPARTURE_CARD_ID, RETURN_CARD_ID,
};
pub use itinerary::Itinerary;
pub use trip::{Trip, TripTemplate};
