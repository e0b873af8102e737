//! Card mutation
//!
//! Applies whitelisted field updates to a card and recomputes the derived
//! display attributes (`subtitle`, `price_label`, `summary`, airport codes)
//! for the card's kind. The derivations are projections of `fields` — they
//! are recomputed on every accepted update and never treated as
//! authoritative input.

use tracing::debug;

use crate::model::{Card, CardBody};
use crate::sanitize::{normalize_fields, RawFields};

/// Apply a raw field update to a card, returning the updated card.
///
/// The update is whitelisted and normalized first; `title` and `notes` are
/// routed to the card attributes, everything else merges into `fields`.
/// An update that normalizes to nothing still returns a fresh copy with
/// the display attributes untouched.
pub fn apply_field_updates(card: &Card, raw: &RawFields) -> Card {
    let mut updated = card.clone();
    let mut normalized = normalize_fields(card.kind(), raw);
    if normalized.is_empty() {
        return updated;
    }
    debug!(card = %card.id, keys = normalized.len(), "applying field updates");

    if let Some(title) = normalized.remove("title") {
        updated.title = title;
    }
    if let Some(notes) = normalized.remove("notes") {
        updated.notes = notes;
    }
    if let Some(fields) = updated.fields_mut() {
        fields.append(&mut normalized);
    }

    refresh_display(&mut updated);
    updated
}

/// Recompute the derived display attributes from the card's merged fields.
fn refresh_display(card: &mut Card) {
    match &mut card.body {
        CardBody::Departure(body) | CardBody::Return(body) => {
            let home = body.fields.get("homeAirport").map(String::as_str).unwrap_or("");
            if !home.is_empty() {
                body.airports.from = home.to_uppercase();
            }
            let arrival = body
                .fields
                .get("arrivalAirport")
                .map(String::as_str)
                .unwrap_or("");
            if !arrival.is_empty() {
                body.airports.to = arrival.to_uppercase();
            }
            card.price_label = body.fields.get("price").cloned().unwrap_or_default();
            if !body.airports.from.is_empty() && !body.airports.to.is_empty() {
                card.summary = format!("{} → {}", body.airports.from, body.airports.to);
            }
        }
        CardBody::Accommodation(body) => {
            card.price_label = body.fields.get("price").cloned().unwrap_or_default();

            let kind = body
                .fields
                .get("accommodationType")
                .map(String::as_str)
                .unwrap_or("");
            if !kind.is_empty() {
                card.subtitle = capitalize(kind);
            } else if card.subtitle.is_empty() {
                card.subtitle = "Awaiting selection".to_string();
            }

            let mut parts: Vec<String> = Vec::new();
            if let Some(stay) = body.fields.get("lengthOfStay") {
                if !stay.is_empty() {
                    parts.push(stay.clone());
                }
            }
            if let Some(breakfast) = body.fields.get("breakfastIncluded") {
                if !breakfast.is_empty() {
                    parts.push(breakfast_phrase(breakfast).to_string());
                }
            }
            card.summary = parts.join(" · ");
        }
        CardBody::Day(body) => {
            card.price_label = body.fields.get("dailyCost").cloned().unwrap_or_default();
            if let Some(city) = body.fields.get("city") {
                if !city.is_empty() {
                    card.subtitle = city.clone();
                }
            }
            if let Some(highlight) = body.fields.get("highlightAttraction") {
                if !highlight.is_empty() {
                    card.summary = highlight.clone();
                }
            }
        }
        CardBody::Budget => {}
    }
}

fn breakfast_phrase(value: &str) -> &'static str {
    if value.eq_ignore_ascii_case("yes") || value.eq_ignore_ascii_case("true") {
        "Breakfast included"
    } else {
        "Breakfast not included"
    }
}

fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawFields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_flight_airport_derivation() {
        let card = Card::departure();
        let card = apply_field_updates(&card, &raw(json!({"homeAirport": "lhr"})));
        match &card.body {
            CardBody::Departure(b) => {
                assert_eq!(b.airports.from, "LHR");
                assert_eq!(b.airports.to, "");
            }
            _ => panic!("wrong variant"),
        }
        // Summary appears only once both codes are known.
        assert_eq!(card.summary, "");

        let card = apply_field_updates(&card, &raw(json!({"arrivalAirport": " fco "})));
        assert_eq!(card.summary, "LHR → FCO");

        // Blanking the field keeps the prior code.
        let card = apply_field_updates(&card, &raw(json!({"homeAirport": ""})));
        match &card.body {
            CardBody::Departure(b) => assert_eq!(b.airports.from, "LHR"),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_flight_price_label() {
        let card = apply_field_updates(&Card::return_flight(), &raw(json!({"price": "89.99"})));
        assert_eq!(card.price_label, "89.99");
    }

    #[test]
    fn test_accommodation_subtitle_chain() {
        let card = Card::accommodation();
        assert_eq!(card.subtitle, "Awaiting selection");

        let card = apply_field_updates(&card, &raw(json!({"accommodationType": "boutique hotel"})));
        assert_eq!(card.subtitle, "Boutique hotel");

        // Blank type keeps the prior subtitle.
        let card = apply_field_updates(&card, &raw(json!({"accommodationType": "", "price": "300"})));
        assert_eq!(card.subtitle, "Boutique hotel");
        assert_eq!(card.price_label, "300");
    }

    #[test]
    fn test_accommodation_summary_parts() {
        let card = Card::accommodation();
        let card = apply_field_updates(
            &card,
            &raw(json!({"lengthOfStay": "4 nights", "breakfastIncluded": "yes"})),
        );
        assert_eq!(card.summary, "4 nights · Breakfast included");

        let card = apply_field_updates(&card, &raw(json!({"breakfastIncluded": "no"})));
        assert_eq!(card.summary, "4 nights · Breakfast not included");

        let card = apply_field_updates(
            &card,
            &raw(json!({"lengthOfStay": "", "breakfastIncluded": ""})),
        );
        assert_eq!(card.summary, "");
    }

    #[test]
    fn test_day_derivations() {
        let card = Card::day("Day 1");
        let card = apply_field_updates(
            &card,
            &raw(json!({"city": "Rome", "dailyCost": "45", "highlightAttraction": "Pantheon"})),
        );
        assert_eq!(card.subtitle, "Rome");
        assert_eq!(card.price_label, "45");
        assert_eq!(card.summary, "Pantheon");

        // Blank highlight leaves the summary unchanged.
        let card = apply_field_updates(&card, &raw(json!({"highlightAttraction": ""})));
        assert_eq!(card.summary, "Pantheon");
    }

    #[test]
    fn test_empty_update_is_a_fresh_untouched_copy() {
        let mut card = Card::accommodation();
        // A field that would derive a label if recomputation ran.
        card.fields_mut()
            .unwrap()
            .insert("price".to_string(), "500".to_string());
        let updated = apply_field_updates(&card, &raw(json!({"unknownKey": "x"})));
        assert_eq!(updated, card);
        assert_eq!(updated.price_label, "");
    }

    #[test]
    fn test_title_and_notes_route_to_attributes() {
        let card = apply_field_updates(
            &Card::budget(),
            &raw(json!({"title": " Trip budget ", "notes": "estimate only"})),
        );
        assert_eq!(card.title, "Trip budget");
        assert_eq!(card.notes, "estimate only");
        assert!(card.fields().is_none());
    }
}
