//! Sanitization of untrusted client input
//!
//! This module is the sole boundary between externally supplied JSON and
//! the mutable card/entry state. Both sanitizers narrow silently and never
//! fail: unknown keys and unrecognized entry types are dropped, wrong-typed
//! values are defaulted. Partial or legacy client payloads must not
//! hard-fail an edit request.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::model::{
    fresh_entry_id, is_travel_mode, ActivityType, CardKind, EntryFields, FieldMap, TimelineEntry,
};

/// Raw JSON object as submitted by a client.
pub type RawFields = Map<String, Value>;

/// Whitelist and normalize a free-form field update for a card of the
/// given kind.
///
/// Keys outside the kind's whitelist (plus the common `title`/`notes`
/// keys) are dropped. Accepted string values are trimmed, `null` becomes
/// the empty string, and any other JSON value passes through as its JSON
/// rendering. An input with no valid keys yields an empty map.
pub fn normalize_fields(kind: CardKind, raw: &RawFields) -> FieldMap {
    let mut out = FieldMap::new();
    for (key, value) in raw {
        let accepted = kind.allowed_fields().contains(&key.as_str())
            || kind.common_fields().contains(&key.as_str());
        if !accepted {
            debug!(key = %key, kind = kind.as_str(), "dropping non-whitelisted field");
            continue;
        }
        out.insert(key.clone(), normalize_value(value));
    }
    out
}

fn normalize_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Validate and normalize a submitted list of timeline entries.
///
/// Elements that are not objects, or whose `type` is outside the
/// recognized activity taxonomy, are dropped — with a warning, so the data
/// loss is visible rather than silent. Retained elements keep a provided
/// non-blank id (else one is generated) and have their fields rebuilt
/// strictly from the entry field set, defaulting absent or non-string
/// values to `""`. Input order is preserved.
///
/// This is also the idempotent normalizer applied on every
/// read-modify-write cycle: sanitizing an already-sanitized list yields a
/// structurally identical list.
pub fn sanitize_timeline(raw: &[Value]) -> Vec<TimelineEntry> {
    let mut out = Vec::with_capacity(raw.len());
    for value in raw {
        let Some(obj) = value.as_object() else {
            warn!("dropping non-object timeline entry");
            continue;
        };
        let type_tag = obj.get("type").and_then(Value::as_str).unwrap_or("");
        let Some(activity) = ActivityType::parse(type_tag) else {
            warn!(entry_type = %type_tag, "dropping timeline entry with unrecognized type");
            continue;
        };
        let id = match obj.get("id").and_then(Value::as_str) {
            Some(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => fresh_entry_id(),
        };
        let fields = entry_fields_from_raw(obj.get("fields").and_then(Value::as_object));
        out.push(TimelineEntry {
            id,
            activity,
            fields,
        });
    }
    out
}

/// Re-run timeline sanitization over already-typed entries. Used where a
/// stored list (for example a template's) crosses back into a trip.
pub fn resanitize(entries: &[TimelineEntry]) -> Vec<TimelineEntry> {
    let raw: Vec<Value> = entries
        .iter()
        .map(|e| serde_json::to_value(e).unwrap_or(Value::Null))
        .collect();
    sanitize_timeline(&raw)
}

fn entry_fields_from_raw(raw: Option<&RawFields>) -> EntryFields {
    let mut fields = EntryFields {
        title: raw_string(raw, "title"),
        time: raw_string(raw, "time"),
        duration: raw_string(raw, "duration"),
        price: raw_string(raw, "price"),
        link: raw_string(raw, "link"),
        description: raw_string(raw, "description"),
        travel_mode: raw_string(raw, "travelMode"),
        travel_duration: raw_string(raw, "travelDuration"),
    };
    if !fields.travel_mode.is_empty() && !is_travel_mode(&fields.travel_mode) {
        debug!(mode = %fields.travel_mode, "clearing unrecognized travel mode");
        fields.travel_mode.clear();
    }
    fields
}

/// Apply a partial field update to a single timeline entry.
///
/// Same narrowing rules as the card field sanitizer: only keys from the
/// entry field set are honored, strings are trimmed, `null` clears, other
/// JSON values pass through as their rendering, and an unrecognized travel
/// mode clears the field. Unknown keys are dropped silently.
pub fn apply_entry_field_updates(fields: &mut EntryFields, raw: &RawFields) {
    for (key, value) in raw {
        let normalized = normalize_value(value);
        match key.as_str() {
            "title" => fields.title = normalized,
            "time" => fields.time = normalized,
            "duration" => fields.duration = normalized,
            "price" => fields.price = normalized,
            "link" => fields.link = normalized,
            "description" => fields.description = normalized,
            "travelMode" => {
                fields.travel_mode = if is_travel_mode(&normalized) {
                    normalized
                } else {
                    String::new()
                };
            }
            "travelDuration" => fields.travel_duration = normalized,
            _ => debug!(key = %key, "dropping non-whitelisted entry field"),
        }
    }
}

fn raw_string(raw: Option<&RawFields>, key: &str) -> String {
    raw.and_then(|m| m.get(key))
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}
