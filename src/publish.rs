//! Publish gate state machine.
//!
//! A trip's itinerary is either in `draft` (operator-only) or `published`
//! (traveller-visible). Transitions are strictly validated — there is no
//! ad hoc boolean flip on the update path.
//!
//! ## State Machine
//!
//! ```text
//! Draft ──publish (guarded)──► Published
//!   ▲                             │
//!   └────────unpublish────────────┘
//! ```
//!
//! - `Draft → Published`: allowed only when the readiness guard passes;
//!   this edge (and only this edge) requests the traveller notification.
//! - `Published → Draft`: unconditional, e.g. after a template is
//!   re-applied.
//! - Re-publishing an already published trip succeeds without a
//!   notification.

use serde::{Deserialize, Serialize};

use crate::error::{ItineraryError, Result};
use crate::model::{Card, CardBody, Trip};

/// Publication state of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishState {
    Draft,
    Published,
}

/// Outcome of a permitted transition: the next state and whether the
/// traveller notification should be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishTransition {
    pub state: PublishState,
    pub notify: bool,
}

impl PublishState {
    pub fn of(trip: &Trip) -> Self {
        if trip.published {
            Self::Published
        } else {
            Self::Draft
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published)
    }

    /// Transition: `Draft → Published`, guarded by [`ReadinessReport`].
    ///
    /// Re-saving an already published trip is permitted but is not the
    /// draft→published edge, so it never requests a notification.
    pub fn publish(self, trip: &Trip) -> Result<PublishTransition> {
        match self {
            Self::Published => Ok(PublishTransition {
                state: Self::Published,
                notify: false,
            }),
            Self::Draft => {
                let report = ReadinessReport::of(trip);
                if report.is_ready() {
                    Ok(PublishTransition {
                        state: Self::Published,
                        notify: true,
                    })
                } else {
                    Err(ItineraryError::PublishBlocked(report.describe()))
                }
            }
        }
    }

    /// Transition: `Published → Draft` (or stay in draft). Unconditional.
    pub fn unpublish(self) -> PublishTransition {
        PublishTransition {
            state: Self::Draft,
            notify: false,
        }
    }
}

/// The readiness guard for publishing, evaluated over the whole trip.
///
/// Incomplete timeline entries are counted in aggregate — the operator
/// gets one count, not a per-entry listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadinessReport {
    pub missing_image: bool,
    /// Display names of flight cards lacking a booking link.
    pub flights_missing_booking_link: Vec<String>,
    pub accommodation_missing_booking_link: bool,
    /// Entries (day timelines and pool) missing a title or a time.
    pub incomplete_entries: usize,
}

impl ReadinessReport {
    pub fn of(trip: &Trip) -> Self {
        let mut report = Self {
            missing_image: trip.image_path.trim().is_empty(),
            ..Self::default()
        };
        let Some(itinerary) = &trip.itinerary else {
            return report;
        };
        for card in &itinerary.cards {
            match &card.body {
                CardBody::Departure(_) | CardBody::Return(_) => {
                    if card.field("bookingLink").is_empty() {
                        report
                            .flights_missing_booking_link
                            .push(flight_name(card).to_string());
                    }
                }
                CardBody::Accommodation(_) => {
                    if card.field("bookingLink").is_empty() {
                        report.accommodation_missing_booking_link = true;
                    }
                }
                CardBody::Day(body) => {
                    report.incomplete_entries += body
                        .timeline
                        .iter()
                        .filter(|e| e.fields.title.is_empty() || e.fields.time.is_empty())
                        .count();
                }
                CardBody::Budget => {}
            }
        }
        report.incomplete_entries += itinerary
            .unassigned
            .iter()
            .filter(|e| e.fields.title.is_empty() || e.fields.time.is_empty())
            .count();
        report
    }

    pub fn is_ready(&self) -> bool {
        !self.missing_image
            && self.flights_missing_booking_link.is_empty()
            && !self.accommodation_missing_booking_link
            && self.incomplete_entries == 0
    }

    /// One sentence enumerating every missing requirement.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.missing_image {
            parts.push("set a trip image".to_string());
        }
        let mut links: Vec<&str> = self
            .flights_missing_booking_link
            .iter()
            .map(String::as_str)
            .collect();
        if self.accommodation_missing_booking_link {
            links.push("accommodation");
        }
        match links.len() {
            0 => {}
            1 => parts.push(format!("add a booking link for {}", links[0])),
            _ => parts.push(format!("add booking links for {}", join_names(&links))),
        }
        if self.incomplete_entries > 0 {
            let plural = if self.incomplete_entries == 1 { "" } else { "s" };
            parts.push(format!(
                "add title and time for {} timeline item{plural}",
                self.incomplete_entries
            ));
        }
        parts.join("; ")
    }
}

fn flight_name(card: &Card) -> &'static str {
    match card.body {
        CardBody::Departure(_) => "departure flight",
        _ => "return flight",
    }
}

fn join_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => (*only).to_string(),
        [head @ .., last] => format!("{} and {last}", head.join(", ")),
    }
}
