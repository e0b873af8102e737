//! The itinerary document
//!
//! An itinerary is owned by exactly one trip or one template. Every edit
//! operation rewrites the whole document — there is no partial persistence.
//! The `revision` counter is the optimistic-concurrency token: it is bumped
//! on every successful write and lets the service reject stale submissions
//! instead of silently losing the last writer's changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::activity::TimelineEntry;
use super::card::{Card, CardBody};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub cards: Vec<Card>,
    /// Timeline entries not yet placed into any specific day.
    #[serde(default, rename = "unassignedActivities")]
    pub unassigned: Vec<TimelineEntry>,
}

impl Itinerary {
    /// An empty itinerary stamped with the current time.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            revision: 0,
            cards: Vec::new(),
            unassigned: Vec::new(),
        }
    }

    /// The standard card skeleton generated for a fresh trip: departure
    /// flight, accommodation, one card per day, return flight, budget.
    pub fn scaffold(num_days: usize) -> Self {
        let mut itinerary = Self::new();
        itinerary.cards.push(Card::departure());
        itinerary.cards.push(Card::accommodation());
        for day in 1..=num_days {
            itinerary.cards.push(Card::day(format!("Day {day}")));
        }
        itinerary.cards.push(Card::return_flight());
        itinerary.cards.push(Card::budget());
        itinerary
    }

    /// Mark the document as modified: bump the revision and refresh the
    /// update timestamp. Called once per successful edit operation.
    pub fn touch(&mut self) {
        self.revision += 1;
        self.updated_at = Utc::now();
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn card_mut(&mut self, id: &str) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == id)
    }

    pub fn card_position(&self, id: &str) -> Option<usize> {
        self.cards.iter().position(|c| c.id == id)
    }

    /// Positions of the day cards, in card-list order.
    pub fn day_positions(&self) -> Vec<usize> {
        self.cards
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_day())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn day_cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(|c| c.is_day())
    }

    pub fn budget_mut(&mut self) -> Option<&mut Card> {
        self.cards
            .iter_mut()
            .find(|c| matches!(c.body, CardBody::Budget))
    }
}

impl Default for Itinerary {
    fn default() -> Self {
        Self::new()
    }
}
