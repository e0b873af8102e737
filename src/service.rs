//! Trip editing service
//!
//! The operation contracts consumed by UI and admin callers. Every
//! operation is one synchronous read-modify-write against the document
//! store: load the trip, reject stale revisions, transform the itinerary
//! through the engine modules, write the whole document back. The email
//! collaborator is only consulted after a successful storage write.
//!
//! There is no in-process locking; the revision token is what protects
//! concurrent editors of the same document from silently overwriting each
//! other.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::cards::apply_field_updates;
use crate::error::{ItineraryError, Result};
use crate::merge;
use crate::model::{ActivityType, Itinerary, Trip, TripTemplate};
use crate::notify::Mailer;
use crate::publish::PublishState;
use crate::reorder;
use crate::sanitize::{apply_entry_field_updates, sanitize_timeline, RawFields};
use crate::store::DocumentStore;
use crate::timing::{propagate, trip_total};

pub struct TripService {
    store: Arc<dyn DocumentStore>,
    mailer: Arc<dyn Mailer>,
}

impl TripService {
    pub fn new(store: Arc<dyn DocumentStore>, mailer: Arc<dyn Mailer>) -> Self {
        Self { store, mailer }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn trip(&self, trip_id: &str) -> Result<Trip> {
        self.load_trip(trip_id).await
    }

    pub async fn list_trips(&self) -> Result<Vec<Trip>> {
        Ok(self.store.list_trips().await?)
    }

    pub async fn list_templates(&self) -> Result<Vec<TripTemplate>> {
        Ok(self.store.list_templates().await?)
    }

    // -----------------------------------------------------------------------
    // Itinerary lifecycle
    // -----------------------------------------------------------------------

    /// Generate the standard card skeleton on first use. Idempotent: an
    /// existing itinerary is returned as-is.
    pub async fn generate_itinerary(&self, trip_id: &str, num_days: usize) -> Result<Trip> {
        let mut trip = self.load_trip(trip_id).await?;
        if trip.itinerary.is_some() {
            return Ok(trip);
        }
        trip.itinerary = Some(Itinerary::scaffold(num_days));
        info!(trip = %trip_id, days = num_days, "generated itinerary skeleton");
        self.persist(&mut trip).await?;
        Ok(trip)
    }

    /// Capture the trip's itinerary as a reusable template.
    pub async fn save_as_template(&self, trip_id: &str, name: &str) -> Result<TripTemplate> {
        let trip = self.load_trip(trip_id).await?;
        let template = TripTemplate::from_trip(&trip, name)
            .ok_or_else(|| ItineraryError::MissingItinerary(trip_id.to_string()))?;
        self.store.put_template(&template).await?;
        info!(trip = %trip_id, template = %template.id, "captured trip as template");
        Ok(template)
    }

    // -----------------------------------------------------------------------
    // Card edits
    // -----------------------------------------------------------------------

    /// Update a card's whitelisted fields and recompute its display
    /// attributes.
    pub async fn update_card_fields(
        &self,
        trip_id: &str,
        card_id: &str,
        updates: RawFields,
        expected_revision: Option<u64>,
    ) -> Result<Trip> {
        self.edit(trip_id, expected_revision, |itinerary| {
            let card = itinerary
                .card_mut(card_id)
                .ok_or_else(|| ItineraryError::UnknownCard(card_id.to_string()))?;
            let updated = apply_field_updates(card, &updates);
            *card = updated;
            Ok(())
        })
        .await
    }

    /// Replace a day card's full timeline with sanitized entries.
    pub async fn replace_day_timeline(
        &self,
        trip_id: &str,
        card_id: &str,
        raw_entries: Vec<Value>,
        expected_revision: Option<u64>,
    ) -> Result<Trip> {
        self.edit(trip_id, expected_revision, |itinerary| {
            let card = itinerary
                .card_mut(card_id)
                .ok_or_else(|| ItineraryError::UnknownCard(card_id.to_string()))?;
            let timeline = card
                .timeline_mut()
                .ok_or_else(|| ItineraryError::NotADayCard(card_id.to_string()))?;
            *timeline = sanitize_timeline(&raw_entries);
            Ok(())
        })
        .await
    }

    /// Replace the unassigned pool with sanitized entries.
    pub async fn replace_unassigned(
        &self,
        trip_id: &str,
        raw_entries: Vec<Value>,
        expected_revision: Option<u64>,
    ) -> Result<Trip> {
        self.edit(trip_id, expected_revision, |itinerary| {
            itinerary.unassigned = sanitize_timeline(&raw_entries);
            Ok(())
        })
        .await
    }

    /// Update one timeline entry's fields and re-derive every downstream
    /// start time in its day.
    pub async fn update_entry_fields(
        &self,
        trip_id: &str,
        day_id: &str,
        entry_id: &str,
        updates: RawFields,
        expected_revision: Option<u64>,
    ) -> Result<Trip> {
        self.edit(trip_id, expected_revision, |itinerary| {
            let timeline = day_timeline_mut(itinerary, day_id)?;
            let index = timeline
                .iter()
                .position(|e| e.id == entry_id)
                .ok_or_else(|| ItineraryError::UnknownEntry(entry_id.to_string()))?;
            apply_entry_field_updates(&mut timeline[index].fields, &updates);
            propagate(timeline, index);
            Ok(())
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Reordering
    // -----------------------------------------------------------------------

    /// Reorder cards to the submitted permutation of existing card ids.
    pub async fn reorder_cards(
        &self,
        trip_id: &str,
        ordered_ids: Vec<String>,
        expected_revision: Option<u64>,
    ) -> Result<Trip> {
        self.edit(trip_id, expected_revision, |itinerary| {
            reorder::reorder_cards(itinerary, &ordered_ids)
        })
        .await
    }

    pub async fn add_day(
        &self,
        trip_id: &str,
        expected_revision: Option<u64>,
    ) -> Result<(Trip, String)> {
        let mut new_id = String::new();
        let trip = self
            .edit(trip_id, expected_revision, |itinerary| {
                new_id = reorder::add_day(itinerary);
                Ok(())
            })
            .await?;
        Ok((trip, new_id))
    }

    pub async fn move_day_earlier(
        &self,
        trip_id: &str,
        day_id: &str,
        expected_revision: Option<u64>,
    ) -> Result<Trip> {
        self.edit(trip_id, expected_revision, |itinerary| {
            reorder::move_day_earlier(itinerary, day_id).map(|_| ())
        })
        .await
    }

    pub async fn move_day_later(
        &self,
        trip_id: &str,
        day_id: &str,
        expected_revision: Option<u64>,
    ) -> Result<Trip> {
        self.edit(trip_id, expected_revision, |itinerary| {
            reorder::move_day_later(itinerary, day_id).map(|_| ())
        })
        .await
    }

    pub async fn swap_days(
        &self,
        trip_id: &str,
        first_day_id: &str,
        second_day_id: &str,
        expected_revision: Option<u64>,
    ) -> Result<Trip> {
        self.edit(trip_id, expected_revision, |itinerary| {
            reorder::swap_days(itinerary, first_day_id, second_day_id)
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Entry-level edits
    // -----------------------------------------------------------------------

    /// Insert a new entry of the given type into a day timeline.
    pub async fn insert_entry(
        &self,
        trip_id: &str,
        day_id: &str,
        index: usize,
        activity: &str,
        expected_revision: Option<u64>,
    ) -> Result<(Trip, String)> {
        let activity = parse_activity(activity)?;
        let mut new_id = String::new();
        let trip = self
            .edit(trip_id, expected_revision, |itinerary| {
                let timeline = day_timeline_mut(itinerary, day_id)?;
                new_id = reorder::insert_entry(timeline, index, activity);
                Ok(())
            })
            .await?;
        Ok((trip, new_id))
    }

    pub async fn move_entry_within_day(
        &self,
        trip_id: &str,
        day_id: &str,
        from: usize,
        to: usize,
        expected_revision: Option<u64>,
    ) -> Result<Trip> {
        self.edit(trip_id, expected_revision, |itinerary| {
            let timeline = day_timeline_mut(itinerary, day_id)?;
            reorder::move_entry(timeline, from, to)
        })
        .await
    }

    pub async fn move_entry_across_days(
        &self,
        trip_id: &str,
        source_day_id: &str,
        entry_id: &str,
        destination_day_id: &str,
        destination_index: Option<usize>,
        expected_revision: Option<u64>,
    ) -> Result<Trip> {
        self.edit(trip_id, expected_revision, |itinerary| {
            reorder::move_entry_across_days(
                itinerary,
                source_day_id,
                entry_id,
                destination_day_id,
                destination_index,
            )
        })
        .await
    }

    pub async fn assign_from_pool(
        &self,
        trip_id: &str,
        entry_id: &str,
        day_id: &str,
        expected_revision: Option<u64>,
    ) -> Result<Trip> {
        self.edit(trip_id, expected_revision, |itinerary| {
            reorder::assign_from_pool(itinerary, entry_id, day_id)
        })
        .await
    }

    pub async fn return_to_pool(
        &self,
        trip_id: &str,
        day_id: &str,
        entry_id: &str,
        expected_revision: Option<u64>,
    ) -> Result<Trip> {
        self.edit(trip_id, expected_revision, |itinerary| {
            reorder::return_to_pool(itinerary, day_id, entry_id)
        })
        .await
    }

    pub async fn retype_pool_entry(
        &self,
        trip_id: &str,
        entry_id: &str,
        activity: &str,
        expected_revision: Option<u64>,
    ) -> Result<Trip> {
        let activity = parse_activity(activity)?;
        self.edit(trip_id, expected_revision, |itinerary| {
            reorder::retype_pool_entry(itinerary, entry_id, activity)
        })
        .await
    }

    /// Remove an entry outright from a day (`Some(day_id)`) or the pool.
    pub async fn remove_entry(
        &self,
        trip_id: &str,
        day_id: Option<&str>,
        entry_id: &str,
        expected_revision: Option<u64>,
    ) -> Result<Trip> {
        self.edit(trip_id, expected_revision, |itinerary| {
            reorder::remove_entry(itinerary, day_id, entry_id).map(|_| ())
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Template application
    // -----------------------------------------------------------------------

    /// Project a template onto the trip. Writes only the trip's document;
    /// the template is read-only throughout. Re-requires publishing.
    pub async fn apply_template(
        &self,
        trip_id: &str,
        template_id: &str,
        selected_day_ids: Option<Vec<String>>,
        expected_revision: Option<u64>,
    ) -> Result<Trip> {
        let template = self
            .store
            .get_template(template_id)
            .await?
            .ok_or_else(|| ItineraryError::TemplateNotFound(template_id.to_string()))?;

        let mut trip = self.load_trip(trip_id).await?;
        let itinerary = trip
            .itinerary
            .as_mut()
            .ok_or_else(|| ItineraryError::MissingItinerary(trip_id.to_string()))?;
        check_revision(itinerary, expected_revision)?;
        merge::apply_template(itinerary, &template.itinerary, selected_day_ids.as_deref())?;
        trip.published = PublishState::of(&trip).unpublish().state.is_published();
        self.persist(&mut trip).await?;
        info!(trip = %trip_id, template = %template_id, "template applied, trip back in draft");
        Ok(trip)
    }

    // -----------------------------------------------------------------------
    // Publishing
    // -----------------------------------------------------------------------

    /// Request `published = true` (through the readiness guard) or
    /// `published = false` (unconditional).
    pub async fn set_published(&self, trip_id: &str, publish: bool) -> Result<Trip> {
        let mut trip = self.load_trip(trip_id).await?;
        let transition = if publish {
            PublishState::of(&trip).publish(&trip)?
        } else {
            PublishState::of(&trip).unpublish()
        };
        trip.published = transition.state.is_published();
        self.store.put_trip(&trip).await?;

        if transition.notify {
            info!(trip = %trip_id, "trip published");
            if let Err(error) = self.mailer.send_published(&trip).await {
                warn!(trip = %trip_id, %error, "publish notification failed");
            }
        }
        Ok(trip)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    async fn load_trip(&self, trip_id: &str) -> Result<Trip> {
        self.store
            .get_trip(trip_id)
            .await?
            .ok_or_else(|| ItineraryError::TripNotFound(trip_id.to_string()))
    }

    /// The shared read-modify-write cycle for itinerary edits.
    async fn edit<F>(
        &self,
        trip_id: &str,
        expected_revision: Option<u64>,
        mutate: F,
    ) -> Result<Trip>
    where
        F: FnOnce(&mut Itinerary) -> Result<()>,
    {
        let mut trip = self.load_trip(trip_id).await?;
        let itinerary = trip
            .itinerary
            .as_mut()
            .ok_or_else(|| ItineraryError::MissingItinerary(trip_id.to_string()))?;
        check_revision(itinerary, expected_revision)?;
        mutate(itinerary)?;
        self.persist(&mut trip).await?;
        Ok(trip)
    }

    /// Refresh derived summaries, stamp the revision, write the whole
    /// document back.
    async fn persist(&self, trip: &mut Trip) -> Result<()> {
        if let Some(itinerary) = trip.itinerary.as_mut() {
            let total = trip_total(itinerary);
            if let Some(budget) = itinerary.budget_mut() {
                budget.summary = format!("Estimated total: {total}");
            }
            itinerary.touch();
        }
        self.store.put_trip(trip).await?;
        Ok(())
    }
}

fn check_revision(itinerary: &Itinerary, expected: Option<u64>) -> Result<()> {
    match expected {
        Some(submitted) if submitted != itinerary.revision => Err(ItineraryError::StaleRevision {
            submitted,
            current: itinerary.revision,
        }),
        _ => Ok(()),
    }
}

fn parse_activity(raw: &str) -> Result<ActivityType> {
    ActivityType::parse(raw)
        .ok_or_else(|| ItineraryError::Malformed(format!("unrecognized activity type: {raw}")))
}

fn day_timeline_mut<'a>(
    itinerary: &'a mut Itinerary,
    day_id: &str,
) -> Result<&'a mut Vec<crate::model::TimelineEntry>> {
    itinerary
        .card_mut(day_id)
        .ok_or_else(|| ItineraryError::UnknownCard(day_id.to_string()))?
        .timeline_mut()
        .ok_or_else(|| ItineraryError::NotADayCard(day_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::LogMailer;
    use crate::store::InMemoryStore;

    async fn service_with_trip() -> TripService {
        let store = Arc::new(InMemoryStore::new());
        store.put_trip(&Trip::new("trip-1", "Rome")).await.unwrap();
        TripService::new(store, Arc::new(LogMailer::new(None)))
    }

    #[tokio::test]
    async fn test_generate_is_idempotent() {
        let service = service_with_trip().await;
        let first = service.generate_itinerary("trip-1", 3).await.unwrap();
        let second = service.generate_itinerary("trip-1", 7).await.unwrap();
        assert_eq!(first.itinerary, second.itinerary);
        assert_eq!(second.itinerary.unwrap().day_positions().len(), 3);
    }

    #[tokio::test]
    async fn test_edits_require_an_itinerary() {
        let service = service_with_trip().await;
        let err = service
            .reorder_cards("trip-1", vec![], None)
            .await
            .unwrap_err();
        assert!(matches!(err, ItineraryError::MissingItinerary(_)));
    }

    #[tokio::test]
    async fn test_stale_revision_is_rejected_without_mutation() {
        let service = service_with_trip().await;
        service.generate_itinerary("trip-1", 2).await.unwrap();
        let trip = service.trip("trip-1").await.unwrap();
        let current = trip.itinerary.as_ref().unwrap().revision;

        let err = service
            .add_day("trip-1", Some(current + 10))
            .await
            .unwrap_err();
        assert!(matches!(err, ItineraryError::StaleRevision { .. }));
        let after = service.trip("trip-1").await.unwrap();
        assert_eq!(after, trip);

        // The correct token goes through and advances the revision.
        let (after, _) = service.add_day("trip-1", Some(current)).await.unwrap();
        assert_eq!(after.itinerary.unwrap().revision, current + 1);
    }

    #[tokio::test]
    async fn test_unknown_activity_is_malformed() {
        let service = service_with_trip().await;
        service.generate_itinerary("trip-1", 1).await.unwrap();
        let day_id = service
            .trip("trip-1")
            .await
            .unwrap()
            .itinerary
            .unwrap()
            .day_cards()
            .next()
            .unwrap()
            .id
            .clone();
        let err = service
            .insert_entry("trip-1", &day_id, 0, "segway-tour", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ItineraryError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_budget_summary_tracks_totals() {
        let service = service_with_trip().await;
        service.generate_itinerary("trip-1", 1).await.unwrap();
        let updates = serde_json::json!({"price": "120"});
        let trip = service
            .update_card_fields(
                "trip-1",
                "departure-flight",
                updates.as_object().cloned().unwrap(),
                None,
            )
            .await
            .unwrap();
        let itinerary = trip.itinerary.unwrap();
        let budget = itinerary
            .cards
            .iter()
            .find(|c| c.id == "budget")
            .unwrap();
        assert_eq!(budget.summary, "Estimated total: 120");
    }
}
