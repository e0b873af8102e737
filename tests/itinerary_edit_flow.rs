//! E2E: itinerary editing through the service layer.
//!
//! Exercises the full read-modify-write path against the in-memory store:
//! sanitized field updates, timeline replacement, reorder validation, pool
//! moves, and optimistic-concurrency rejections.

use std::sync::Arc;

use serde_json::json;

use tripdesk::model::{ActivityType, Trip};
use tripdesk::notify::LogMailer;
use tripdesk::store::{DocumentStore, InMemoryStore};
use tripdesk::{ItineraryError, TripService};

async fn seeded_service(num_days: usize) -> (TripService, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    store.put_trip(&Trip::new("trip-1", "Rome")).await.unwrap();
    let service = TripService::new(store.clone(), Arc::new(LogMailer::new(None)));
    service.generate_itinerary("trip-1", num_days).await.unwrap();
    (service, store)
}

fn raw(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn flight_field_update_derives_and_persists() {
    let (service, store) = seeded_service(2).await;

    service
        .update_card_fields(
            "trip-1",
            "departure-flight",
            raw(json!({
                "homeAirport": "lhr",
                "arrivalAirport": "fco",
                "price": "120",
                "seatPreference": "window"
            })),
            None,
        )
        .await
        .unwrap();

    // Re-load from storage: the whole document was written back.
    let trip = store.get_trip("trip-1").await.unwrap().unwrap();
    let itinerary = trip.itinerary.unwrap();
    let card = itinerary.card("departure-flight").unwrap();
    assert_eq!(card.summary, "LHR → FCO");
    assert_eq!(card.price_label, "120");
    assert_eq!(card.field("seatPreference"), "");
}

#[tokio::test]
async fn timeline_replacement_passes_through_the_sanitizer() {
    let (service, _) = seeded_service(1).await;
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

    let trip = service
        .replace_day_timeline(
            "trip-1",
            &day_id,
            vec![
                json!({"type": "attraction", "fields": {"title": "Colosseum", "time": "09:00", "duration": "90"}}),
                json!({"type": "hot-air-balloon", "fields": {"title": "dropped"}}),
                json!({"type": "food", "fields": {"title": "Trattoria", "time": "12:00"}}),
            ],
            None,
        )
        .await
        .unwrap();

    let itinerary = trip.itinerary.unwrap();
    let timeline = itinerary.card(&day_id).unwrap().timeline().unwrap();
    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline[0].activity, ActivityType::Attraction);
    assert_eq!(timeline[1].activity, ActivityType::Food);
    assert!(timeline.iter().all(|e| !e.id.is_empty()));
}

#[tokio::test]
async fn reorder_rejects_bad_permutations_and_applies_good_ones() {
    let (service, store) = seeded_service(2).await;
    let original: Vec<String> = service
        .trip("trip-1")
        .await
        .unwrap()
        .itinerary
        .unwrap()
        .cards
        .iter()
        .map(|c| c.id.clone())
        .collect();

    // Missing an id.
    let err = service
        .reorder_cards("trip-1", original[1..].to_vec(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ItineraryError::ReorderMismatch(_)));

    // Foreign id.
    let mut with_foreign = original.clone();
    with_foreign[0] = "intruder".to_string();
    assert!(service
        .reorder_cards("trip-1", with_foreign, None)
        .await
        .is_err());

    // Stored order unchanged by the rejections.
    let stored: Vec<String> = store
        .get_trip("trip-1")
        .await
        .unwrap()
        .unwrap()
        .itinerary
        .unwrap()
        .cards
        .iter()
        .map(|c| c.id.clone())
        .collect();
    assert_eq!(stored, original);

    // Exact permutation goes through.
    let mut reversed = original.clone();
    reversed.reverse();
    let trip = service
        .reorder_cards("trip-1", reversed.clone(), None)
        .await
        .unwrap();
    let stored: Vec<String> = trip
        .itinerary
        .unwrap()
        .cards
        .iter()
        .map(|c| c.id.clone())
        .collect();
    assert_eq!(stored, reversed);
}

#[tokio::test]
async fn pool_to_day_move_preserves_identity() {
    let (service, _) = seeded_service(2).await;

    let trip = service
        .replace_unassigned(
            "trip-1",
            vec![json!({"id": "entry-x", "type": "beach", "fields": {"title": "Ostia"}})],
            None,
        )
        .await
        .unwrap();
    let day2_id = trip
        .itinerary
        .unwrap()
        .day_cards()
        .nth(1)
        .unwrap()
        .id
        .clone();

    let trip = service
        .assign_from_pool("trip-1", "entry-x", &day2_id, None)
        .await
        .unwrap();
    let itinerary = trip.itinerary.unwrap();
    assert!(itinerary.unassigned.is_empty());
    let timeline = itinerary.card(&day2_id).unwrap().timeline().unwrap();
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].id, "entry-x");
    assert_eq!(timeline[0].fields.title, "Ostia");

    // No duplication anywhere else in the document.
    let everywhere = itinerary
        .cards
        .iter()
        .filter_map(|c| c.timeline())
        .flatten()
        .filter(|e| e.id == "entry-x")
        .count();
    assert_eq!(everywhere, 1);
}

#[tokio::test]
async fn concurrent_editors_are_serialized_by_the_revision_token() {
    let (service, _) = seeded_service(1).await;
    let revision = service
        .trip("trip-1")
        .await
        .unwrap()
        .itinerary
        .unwrap()
        .revision;

    // Editor A wins the race.
    service
        .update_card_fields(
            "trip-1",
            "accommodation",
            raw(json!({"accommodationType": "hotel"})),
            Some(revision),
        )
        .await
        .unwrap();

    // Editor B, still holding the old revision, is rejected instead of
    // silently overwriting A's edit.
    let err = service
        .update_card_fields(
            "trip-1",
            "accommodation",
            raw(json!({"accommodationType": "hostel"})),
            Some(revision),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ItineraryError::StaleRevision { .. }));

    let trip = service.trip("trip-1").await.unwrap();
    let itinerary = trip.itinerary.unwrap();
    assert_eq!(itinerary.card("accommodation").unwrap().subtitle, "Hotel");
}

#[tokio::test]
async fn entry_edit_propagates_downstream_times() {
    let (service, _) = seeded_service(1).await;
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
    service
        .replace_day_timeline(
            "trip-1",
            &day_id,
            vec![
                json!({"id": "entry-a", "type": "attraction", "fields": {"title": "Colosseum", "time": "09:00", "duration": "60"}}),
                json!({"id": "entry-b", "type": "food", "fields": {"title": "Lunch", "duration": "30"}}),
                json!({"id": "entry-c", "type": "coffee", "fields": {"title": "Espresso"}}),
            ],
            None,
        )
        .await
        .unwrap();

    // Adding a walking leg to the first entry pushes everything after it.
    let trip = service
        .update_entry_fields(
            "trip-1",
            &day_id,
            "entry-a",
            raw(json!({"travelMode": "walk", "travelDuration": "15"})),
            None,
        )
        .await
        .unwrap();
    let itinerary = trip.itinerary.unwrap();
    let timeline = itinerary.card(&day_id).unwrap().timeline().unwrap();
    assert_eq!(timeline[1].fields.time, "10:15");
    assert_eq!(timeline[2].fields.time, "10:45");

    // Blanking the first duration breaks the chain; downstream times stay.
    let trip = service
        .update_entry_fields(
            "trip-1",
            &day_id,
            "entry-a",
            raw(json!({"duration": ""})),
            None,
        )
        .await
        .unwrap();
    let itinerary = trip.itinerary.unwrap();
    let timeline = itinerary.card(&day_id).unwrap().timeline().unwrap();
    assert_eq!(timeline[1].fields.time, "10:15");
    assert_eq!(timeline[2].fields.time, "10:45");
}

#[tokio::test]
async fn insert_and_move_entries_through_the_service() {
    let (service, _) = seeded_service(2).await;
    let trip = service.trip("trip-1").await.unwrap();
    let days: Vec<String> = trip
        .itinerary
        .unwrap()
        .day_cards()
        .map(|c| c.id.clone())
        .collect();

    service
        .replace_day_timeline(
            "trip-1",
            &days[0],
            vec![json!({"type": "attraction", "fields": {"title": "Colosseum", "time": "09:00", "duration": "60"}})],
            None,
        )
        .await
        .unwrap();

    let (trip, inserted_id) = service
        .insert_entry("trip-1", &days[0], 1, "food", None)
        .await
        .unwrap();
    let itinerary = trip.itinerary.unwrap();
    let timeline = itinerary.card(&days[0]).unwrap().timeline().unwrap();
    assert_eq!(timeline[1].id, inserted_id);
    // Inherits the derived time of its predecessor.
    assert_eq!(timeline[1].fields.time, "10:00");
    assert_eq!(timeline[1].fields.duration, "90");

    // Cross-day move leaves the destination chain untouched.
    let trip = service
        .move_entry_across_days("trip-1", &days[0], &inserted_id, &days[1], None, None)
        .await
        .unwrap();
    let itinerary = trip.itinerary.unwrap();
    assert_eq!(itinerary.card(&days[0]).unwrap().timeline().unwrap().len(), 1);
    let moved = &itinerary.card(&days[1]).unwrap().timeline().unwrap()[0];
    assert_eq!(moved.id, inserted_id);
    assert_eq!(moved.fields.time, "10:00");
}
