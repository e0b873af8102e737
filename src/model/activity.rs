//! Timeline entry types
//!
//! A timeline entry is one scheduled (or pool-resident) activity within a
//! day card. Entries are tagged by [`ActivityType`] and carry a fixed,
//! typed field set — the field allow-list is the struct definition itself,
//! not a free-floating string array.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Activity taxonomy for timeline entries.
///
/// This is the unified set: every type the interactive builder palette
/// offers is recognized by the sanitizer. Anything outside this set is
/// dropped on save (legacy payloads) with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Attraction,
    Museum,
    Park,
    Beach,
    Church,
    Shopping,
    Photo,
    Rest,
    Food,
    Coffee,
    Accommodation,
    Flight,
    Transport,
}

impl ActivityType {
    pub const ALL: [ActivityType; 13] = [
        Self::Attraction,
        Self::Museum,
        Self::Park,
        Self::Beach,
        Self::Church,
        Self::Shopping,
        Self::Photo,
        Self::Rest,
        Self::Food,
        Self::Coffee,
        Self::Accommodation,
        Self::Flight,
        Self::Transport,
    ];

    /// Parse a client-supplied type tag. Unrecognized tags yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "attraction" => Some(Self::Attraction),
            "museum" => Some(Self::Museum),
            "park" => Some(Self::Park),
            "beach" => Some(Self::Beach),
            "church" => Some(Self::Church),
            "shopping" => Some(Self::Shopping),
            "photo" => Some(Self::Photo),
            "rest" => Some(Self::Rest),
            "food" => Some(Self::Food),
            "coffee" => Some(Self::Coffee),
            "accommodation" => Some(Self::Accommodation),
            "flight" => Some(Self::Flight),
            "transport" => Some(Self::Transport),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attraction => "attraction",
            Self::Museum => "museum",
            Self::Park => "park",
            Self::Beach => "beach",
            Self::Church => "church",
            Self::Shopping => "shopping",
            Self::Photo => "photo",
            Self::Rest => "rest",
            Self::Food => "food",
            Self::Coffee => "coffee",
            Self::Accommodation => "accommodation",
            Self::Flight => "flight",
            Self::Transport => "transport",
        }
    }

    /// Default duration in minutes applied when an entry of this type is
    /// created (or re-typed while queued in the unassigned pool).
    pub fn default_duration_minutes(&self) -> Option<u32> {
        match self {
            Self::Attraction => Some(45),
            Self::Rest => Some(90),
            Self::Food => Some(90),
            Self::Photo => Some(10),
            _ => None,
        }
    }
}

/// Modes of travel from an entry to the *next* entry in its timeline.
/// The empty string means "no travel leg recorded".
pub const TRAVEL_MODES: [&str; 4] = ["walk", "tube", "taxi", "car"];

/// Whether a raw string names a recognized travel mode.
pub fn is_travel_mode(raw: &str) -> bool {
    TRAVEL_MODES.contains(&raw)
}

/// The fixed field set carried by every timeline entry. All values are
/// strings exactly as exchanged with clients; blank means unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntryFields {
    pub title: String,
    /// Start time, `HH:MM` 24h. Derived for downstream entries.
    pub time: String,
    /// Duration in whole minutes.
    pub duration: String,
    pub price: String,
    pub link: String,
    pub description: String,
    /// How to reach the next entry: `"" | walk | tube | taxi | car`.
    pub travel_mode: String,
    /// Travel minutes to the next entry.
    pub travel_duration: String,
}

/// One activity in a day timeline or the unassigned pool. Identity (`id`)
/// is stable across moves between timelines and the pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub activity: ActivityType,
    #[serde(default)]
    pub fields: EntryFields,
}

impl TimelineEntry {
    /// Create a fresh entry of the given type with a generated id and the
    /// type's default duration (when it has one).
    pub fn new(activity: ActivityType) -> Self {
        let mut fields = EntryFields::default();
        if let Some(minutes) = activity.default_duration_minutes() {
            fields.duration = minutes.to_string();
        }
        Self {
            id: fresh_entry_id(),
            activity,
            fields,
        }
    }
}

/// Generate a unique entry id.
pub fn fresh_entry_id() -> String {
    format!("entry-{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for ty in ActivityType::ALL {
            assert_eq!(ActivityType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(ActivityType::parse("segway-tour"), None);
        assert_eq!(ActivityType::parse(""), None);
    }

    #[test]
    fn test_serde_uses_lowercase_tag() {
        let entry = TimelineEntry::new(ActivityType::Food);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "food");
        assert_eq!(json["fields"]["duration"], "90");
        assert_eq!(json["fields"]["travelMode"], "");
    }

    #[test]
    fn test_default_durations() {
        assert_eq!(ActivityType::Attraction.default_duration_minutes(), Some(45));
        assert_eq!(ActivityType::Rest.default_duration_minutes(), Some(90));
        assert_eq!(ActivityType::Food.default_duration_minutes(), Some(90));
        assert_eq!(ActivityType::Photo.default_duration_minutes(), Some(10));
        assert_eq!(ActivityType::Museum.default_duration_minutes(), None);
    }

    #[test]
    fn test_new_entries_get_unique_ids() {
        let a = TimelineEntry::new(ActivityType::Park);
        let b = TimelineEntry::new(ActivityType::Park);
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("entry-"));
    }

    #[test]
    fn test_travel_mode_set() {
        assert!(is_travel_mode("walk"));
        assert!(is_travel_mode("tube"));
        assert!(!is_travel_mode(""));
        assert!(!is_travel_mode("rocket"));
    }
}
