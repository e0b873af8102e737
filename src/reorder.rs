//! Day and entry reordering
//!
//! Whole-day operations act on the itinerary's card list; entry operations
//! act on a day timeline or the unassigned pool. Entry identity is
//! preserved across every move — entries are moved, never copied.
//!
//! Cross-day moves deliberately skip time propagation in the destination:
//! an entry arriving from another day carries no chronological assumption
//! about its new timeline, so the destination chain is only recomputed
//! when it is edited in place.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{ItineraryError, Result};
use crate::model::{ActivityType, Card, Itinerary, TimelineEntry};
use crate::timing::{derive_next_time, propagate};

// ---------------------------------------------------------------------------
// Whole-day operations
// ---------------------------------------------------------------------------

/// Swap the day card with its previous neighbor in the overall card list.
/// Returns `false` (no-op) when the card is already first.
pub fn move_day_earlier(itinerary: &mut Itinerary, day_id: &str) -> Result<bool> {
    let position = day_position(itinerary, day_id)?;
    if position == 0 {
        return Ok(false);
    }
    itinerary.cards.swap(position - 1, position);
    Ok(true)
}

/// Swap the day card with its next neighbor in the overall card list.
/// Returns `false` (no-op) when the card is already last.
pub fn move_day_later(itinerary: &mut Itinerary, day_id: &str) -> Result<bool> {
    let position = day_position(itinerary, day_id)?;
    if position + 1 >= itinerary.cards.len() {
        return Ok(false);
    }
    itinerary.cards.swap(position, position + 1);
    Ok(true)
}

/// Exchange the entire content of two day cards — title, display
/// attributes, fields, timeline — while each position keeps its own id.
pub fn swap_days(itinerary: &mut Itinerary, first_id: &str, second_id: &str) -> Result<()> {
    let first = day_position(itinerary, first_id)?;
    let second = day_position(itinerary, second_id)?;
    if first == second {
        return Ok(());
    }
    itinerary.cards.swap(first, second);
    // Ids are positional anchors here: hand them back.
    itinerary.cards[first].id = first_id.to_string();
    itinerary.cards[second].id = second_id.to_string();
    Ok(())
}

/// Append a new day card with a fresh id and default content. Returns the
/// new id so the caller can focus it.
pub fn add_day(itinerary: &mut Itinerary) -> String {
    let number = itinerary.day_cards().count() + 1;
    let card = Card::day(format!("Day {number}"));
    let id = card.id.clone();
    itinerary.cards.push(card);
    debug!(day = %id, "appended day card");
    id
}

/// Reorder the card list to the submitted id sequence. The submitted set
/// must be an exact bijection with the current card ids; anything else is
/// rejected with the stored order unchanged.
pub fn reorder_cards(itinerary: &mut Itinerary, ordered_ids: &[String]) -> Result<()> {
    let submitted: HashSet<&str> = ordered_ids.iter().map(String::as_str).collect();
    if submitted.len() != ordered_ids.len() {
        return Err(ItineraryError::ReorderMismatch(
            "submitted order contains duplicate card ids".to_string(),
        ));
    }
    let current: HashSet<&str> = itinerary.cards.iter().map(|c| c.id.as_str()).collect();
    if submitted != current {
        let mut missing: Vec<&str> = current.difference(&submitted).copied().collect();
        let mut foreign: Vec<&str> = submitted.difference(&current).copied().collect();
        missing.sort_unstable();
        foreign.sort_unstable();
        let mut parts = Vec::new();
        if !missing.is_empty() {
            parts.push(format!("missing ids: {}", missing.join(", ")));
        }
        if !foreign.is_empty() {
            parts.push(format!("unknown ids: {}", foreign.join(", ")));
        }
        return Err(ItineraryError::ReorderMismatch(parts.join("; ")));
    }

    let mut by_id: HashMap<String, Card> = itinerary
        .cards
        .drain(..)
        .map(|c| (c.id.clone(), c))
        .collect();
    itinerary.cards = ordered_ids
        .iter()
        .filter_map(|id| by_id.remove(id))
        .collect();
    Ok(())
}

fn day_position(itinerary: &Itinerary, day_id: &str) -> Result<usize> {
    let position = itinerary
        .card_position(day_id)
        .ok_or_else(|| ItineraryError::UnknownCard(day_id.to_string()))?;
    if !itinerary.cards[position].is_day() {
        return Err(ItineraryError::NotADayCard(day_id.to_string()));
    }
    Ok(position)
}

// ---------------------------------------------------------------------------
// Entry operations within a timeline
// ---------------------------------------------------------------------------

/// Create a new entry of the chosen type and splice it into the timeline.
///
/// The entry gets the type's default duration and, when the entry before
/// the insertion point can be derived, inherits that derived start time.
/// Downstream times are then propagated from the insertion index. An index
/// past the end appends.
pub fn insert_entry(
    timeline: &mut Vec<TimelineEntry>,
    index: usize,
    activity: ActivityType,
) -> String {
    let index = index.min(timeline.len());
    let mut entry = TimelineEntry::new(activity);
    if index > 0 {
        if let Some(time) = derive_next_time(&timeline[index - 1]) {
            entry.fields.time = time;
        }
    }
    let id = entry.id.clone();
    timeline.insert(index, entry);
    propagate(timeline, index);
    id
}

/// Move an entry to a new position in the same timeline (drag reorder).
/// The target index is interpreted against the pre-removal list and
/// adjusted accordingly; propagation runs from the lower of the two
/// affected indices.
pub fn move_entry(timeline: &mut [TimelineEntry], from: usize, to: usize) -> Result<()> {
    let len = timeline.len();
    if from >= len {
        return Err(ItineraryError::EntryIndexOutOfBounds { index: from, len });
    }
    // Target index is given against the pre-removal list.
    let adjusted = if to > from { to - 1 } else { to };
    let target = adjusted.min(len - 1);
    if from == target {
        return Ok(());
    }
    if from < target {
        timeline[from..=target].rotate_left(1);
    } else {
        timeline[target..=from].rotate_right(1);
    }
    propagate(timeline, from.min(target));
    Ok(())
}

/// Move an entry from one day's timeline into another's, preserving its
/// identity. No time propagation runs in the destination.
pub fn move_entry_across_days(
    itinerary: &mut Itinerary,
    source_day_id: &str,
    entry_id: &str,
    destination_day_id: &str,
    destination_index: Option<usize>,
) -> Result<()> {
    day_position(itinerary, source_day_id)?;
    day_position(itinerary, destination_day_id)?;

    let entry = take_entry_from_day(itinerary, source_day_id, entry_id)?;
    let timeline = timeline_mut(itinerary, destination_day_id)?;
    let index = destination_index
        .unwrap_or(timeline.len())
        .min(timeline.len());
    timeline.insert(index, entry);
    Ok(())
}

/// Remove an entry outright from a day timeline (`Some(day_id)`) or from
/// the unassigned pool (`None`).
pub fn remove_entry(
    itinerary: &mut Itinerary,
    day_id: Option<&str>,
    entry_id: &str,
) -> Result<TimelineEntry> {
    match day_id {
        Some(day_id) => take_entry_from_day(itinerary, day_id, entry_id),
        None => take_entry_from_pool(itinerary, entry_id),
    }
}

// ---------------------------------------------------------------------------
// Unassigned pool
// ---------------------------------------------------------------------------

/// Move a pool entry into a day's timeline (appended at the end).
pub fn assign_from_pool(itinerary: &mut Itinerary, entry_id: &str, day_id: &str) -> Result<()> {
    day_position(itinerary, day_id)?;
    let entry = take_entry_from_pool(itinerary, entry_id)?;
    timeline_mut(itinerary, day_id)?.push(entry);
    Ok(())
}

/// Move a day timeline entry back into the unassigned pool.
pub fn return_to_pool(itinerary: &mut Itinerary, day_id: &str, entry_id: &str) -> Result<()> {
    let entry = take_entry_from_day(itinerary, day_id, entry_id)?;
    itinerary.unassigned.push(entry);
    Ok(())
}

/// Change the type of an entry queued in the pool. The default duration is
/// re-derived for the new type (cleared when it has none); every other
/// field is kept as-is.
pub fn retype_pool_entry(
    itinerary: &mut Itinerary,
    entry_id: &str,
    activity: ActivityType,
) -> Result<()> {
    let entry = itinerary
        .unassigned
        .iter_mut()
        .find(|e| e.id == entry_id)
        .ok_or_else(|| ItineraryError::UnknownEntry(entry_id.to_string()))?;
    entry.activity = activity;
    entry.fields.duration = activity
        .default_duration_minutes()
        .map(|m| m.to_string())
        .unwrap_or_default();
    Ok(())
}

fn timeline_mut<'a>(
    itinerary: &'a mut Itinerary,
    day_id: &str,
) -> Result<&'a mut Vec<TimelineEntry>> {
    itinerary
        .card_mut(day_id)
        .ok_or_else(|| ItineraryError::UnknownCard(day_id.to_string()))?
        .timeline_mut()
        .ok_or_else(|| ItineraryError::NotADayCard(day_id.to_string()))
}

fn take_entry_from_day(
    itinerary: &mut Itinerary,
    day_id: &str,
    entry_id: &str,
) -> Result<TimelineEntry> {
    let timeline = timeline_mut(itinerary, day_id)?;
    let position = timeline
        .iter()
        .position(|e| e.id == entry_id)
        .ok_or_else(|| ItineraryError::UnknownEntry(entry_id.to_string()))?;
    Ok(timeline.remove(position))
}

fn take_entry_from_pool(itinerary: &mut Itinerary, entry_id: &str) -> Result<TimelineEntry> {
    let position = itinerary
        .unassigned
        .iter()
        .position(|e| e.id == entry_id)
        .ok_or_else(|| ItineraryError::UnknownEntry(entry_id.to_string()))?;
    Ok(itinerary.unassigned.remove(position))
}
