//! Template-to-trip merge
//!
//! A template projects its day cards onto a trip's itinerary by positional
//! correspondence: the i-th selected template day overwrites the i-th trip
//! day. Trip day cards keep their own ids throughout, so reordering and
//! later edits stay stable. The unassigned pool is wholesale replaced, not
//! merged. The template itself is never mutated.

use tracing::info;

use crate::error::{ItineraryError, Result};
use crate::model::{Card, CardBody, DayBody, Itinerary};
use crate::sanitize::resanitize;

/// Overwrite the trip's leading day cards with the template's day cards,
/// optionally restricted to `selected_day_ids` (template ids, template
/// order preserved).
///
/// Fails without mutating anything when the template has no day cards,
/// when the selection matches none, or when the trip has no day cards to
/// receive them. Trip day cards beyond the template's count are left
/// untouched. Returns the number of days overwritten.
pub fn apply_template(
    trip: &mut Itinerary,
    template: &Itinerary,
    selected_day_ids: Option<&[String]>,
) -> Result<usize> {
    if template.day_cards().next().is_none() {
        return Err(ItineraryError::EmptyTemplate);
    }
    let selected: Vec<&Card> = template
        .day_cards()
        .filter(|card| match selected_day_ids {
            Some(ids) => ids.iter().any(|id| *id == card.id),
            None => true,
        })
        .collect();
    if selected.is_empty() {
        return Err(ItineraryError::EmptyTemplate);
    }
    let trip_positions = trip.day_positions();
    if trip_positions.is_empty() {
        return Err(ItineraryError::NoDayCards);
    }

    let count = selected.len().min(trip_positions.len());
    for (source, &position) in selected.iter().zip(trip_positions.iter()).take(count) {
        let CardBody::Day(body) = &source.body else {
            continue;
        };
        let (fields, timeline) = (body.fields.clone(), resanitize(&body.timeline));
        let target = &mut trip.cards[position];
        *target = Card {
            id: target.id.clone(),
            title: source.title.clone(),
            subtitle: source.subtitle.clone(),
            price_label: source.price_label.clone(),
            summary: source.summary.clone(),
            notes: source.notes.clone(),
            body: CardBody::Day(DayBody { fields, timeline }),
        };
    }

    trip.unassigned = resanitize(&template.unassigned);
    info!(days = count, "applied template to trip itinerary");
    Ok(count)
}
