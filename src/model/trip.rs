//! Trip and template documents
//!
//! Both are stored whole in the document store. A template is a trip's
//! itinerary detached from any specific trip; `source_trip_id` records
//! provenance when the template was captured from a real trip. A trip that
//! copies from a template holds no live reference afterwards.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::itinerary::Itinerary;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Traveller contact for the published notification. Blank disables it.
    #[serde(default)]
    pub contact_email: String,
    /// Cover image path as recorded by the image store. Only presence is
    /// ever consulted here.
    #[serde(default)]
    pub image_path: String,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub itinerary: Option<Itinerary>,
}

impl Trip {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            contact_email: String::new(),
            image_path: String::new(),
            published: false,
            itinerary: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripTemplate {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source_trip_id: Option<String>,
    pub itinerary: Itinerary,
}

impl TripTemplate {
    /// Capture a trip's itinerary as a reusable template (copy, not link).
    pub fn from_trip(trip: &Trip, name: impl Into<String>) -> Option<Self> {
        Some(Self {
            id: format!("template-{}", Uuid::new_v4()),
            name: name.into(),
            source_trip_id: Some(trip.id.clone()),
            itinerary: trip.itinerary.clone()?,
        })
    }
}
