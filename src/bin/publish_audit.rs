//! Publish-readiness audit for a stored trip document.
//!
//! Reads a trip JSON file, prints the day-by-day cost breakdown and the
//! readiness report the publish gate would evaluate. Exits non-zero when
//! the trip would be rejected from publishing, so the check can gate
//! operator scripts.

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use tripdesk::model::Trip;
use tripdesk::publish::ReadinessReport;
use tripdesk::timing::{day_total, trip_total};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let Some(path) = std::env::args().nth(1) else {
        bail!("usage: publish_audit <trip.json>");
    };
    let raw = std::fs::read_to_string(&path).with_context(|| format!("cannot read {path}"))?;
    let trip: Trip =
        serde_json::from_str(&raw).with_context(|| format!("{path} is not a trip document"))?;

    println!("trip: {} ({})", trip.name, trip.id);
    println!("published: {}", trip.published);

    match &trip.itinerary {
        Some(itinerary) => {
            for card in itinerary.day_cards() {
                let timeline = card.timeline().unwrap_or_default();
                println!(
                    "  {}: {} activities, day total {}",
                    card.title,
                    timeline.len(),
                    day_total(timeline)
                );
            }
            println!("  unassigned pool: {} entries", itinerary.unassigned.len());
            println!("estimated total: {}", trip_total(itinerary));
        }
        None => println!("no itinerary generated yet"),
    }

    let report = ReadinessReport::of(&trip);
    if report.is_ready() {
        println!("ready to publish");
        Ok(())
    } else {
        bail!("not ready to publish: {}", report.describe());
    }
}
