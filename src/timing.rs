//! Time propagation and derived cost totals
//!
//! Each day timeline is a same-day chronological sequence: an entry's start
//! time is derived from its predecessor's start time, duration, and
//! optional travel leg. Propagation walks forward and stops entirely at
//! the first entry whose predecessor cannot be derived — a broken chain
//! never clears existing times.
//!
//! Cost totals are display-only derivations and are never persisted as
//! authoritative data.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::model::{Card, CardBody, Itinerary, TimelineEntry};

/// `HH:MM`, 24-hour clock. A single-digit hour is accepted on input;
/// formatting always zero-pads.
static CLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]?\d|2[0-3]):([0-5]\d)$").unwrap());

pub const MINUTES_PER_DAY: u32 = 1440;

/// Parse a clock string as minutes since midnight.
pub fn parse_clock(raw: &str) -> Option<u32> {
    let caps = CLOCK_RE.captures(raw.trim())?;
    let hours: u32 = caps[1].parse().ok()?;
    let minutes: u32 = caps[2].parse().ok()?;
    Some(hours * 60 + minutes)
}

/// Format minutes since midnight as `HH:MM`, wrapping past midnight.
pub fn format_clock(minutes: u32) -> String {
    let wrapped = minutes % MINUTES_PER_DAY;
    format!("{:02}:{:02}", wrapped / 60, wrapped % 60)
}

fn parse_minutes(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

/// When the *next* entry after this one starts: start time plus duration,
/// plus the travel leg when a travel mode is set and its duration parses.
/// `None` when the start time or duration is unparsable.
pub fn derive_next_time(entry: &TimelineEntry) -> Option<String> {
    let start = parse_clock(&entry.fields.time)?;
    let duration = parse_minutes(&entry.fields.duration)?;
    let mut total = start + duration;
    if !entry.fields.travel_mode.is_empty() {
        if let Some(travel) = parse_minutes(&entry.fields.travel_duration) {
            total += travel;
        }
    }
    Some(format_clock(total))
}

/// Recompute downstream start times after an edit at `from_index`.
///
/// Starting at `from_index + 1`, each entry's time is overwritten with the
/// derivation of the entry actually before it in the already-updated list.
/// The walk stops entirely at the first undefined derivation; entries from
/// that point on keep whatever times they had.
pub fn propagate(timeline: &mut [TimelineEntry], from_index: usize) {
    let mut index = from_index.saturating_add(1);
    while index < timeline.len() {
        match derive_next_time(&timeline[index - 1]) {
            Some(time) => timeline[index].fields.time = time,
            None => break,
        }
        index += 1;
    }
}

/// Parse a price field. Blank or non-numeric values count as zero by being
/// skipped from totals.
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed).ok()
}

/// Sum of parsed entry prices across one day's timeline.
pub fn day_total(timeline: &[TimelineEntry]) -> Decimal {
    timeline
        .iter()
        .filter_map(|e| parse_price(&e.fields.price))
        .sum()
}

/// Trip-wide display estimate: flight and accommodation prices, each day's
/// daily cost, and every scheduled entry's price. Pool entries are not yet
/// committed to the trip and are excluded.
pub fn trip_total(itinerary: &Itinerary) -> Decimal {
    itinerary.cards.iter().map(card_total).sum()
}

fn card_total(card: &Card) -> Decimal {
    match &card.body {
        CardBody::Departure(_) | CardBody::Return(_) | CardBody::Accommodation(_) => {
            parse_price(card.field("price")).unwrap_or_default()
        }
        CardBody::Day(body) => {
            parse_price(card.field("dailyCost")).unwrap_or_default() + day_total(&body.timeline)
        }
        CardBody::Budget => Decimal::ZERO,
    }
}
