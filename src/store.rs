//! Document storage collaborator
//!
//! Trips and templates are opaque whole documents to the store: every
//! write replaces the full document, and atomicity is per document only —
//! there are no multi-document transactions. A template merge therefore
//! writes only the trip's document while the template stays read-only.
//!
//! The in-memory implementation backs the tests and the audit tooling;
//! real deployments plug a database-backed implementation into the same
//! trait.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::model::{Trip, TripTemplate};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_trip(&self, id: &str) -> Result<Option<Trip>>;
    async fn put_trip(&self, trip: &Trip) -> Result<()>;
    async fn list_trips(&self) -> Result<Vec<Trip>>;

    async fn get_template(&self, id: &str) -> Result<Option<TripTemplate>>;
    async fn put_template(&self, template: &TripTemplate) -> Result<()>;
    async fn list_templates(&self) -> Result<Vec<TripTemplate>>;
}

/// In-memory document store keyed by trip/template id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    trips: Arc<RwLock<HashMap<String, Trip>>>,
    templates: Arc<RwLock<HashMap<String, TripTemplate>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn get_trip(&self, id: &str) -> Result<Option<Trip>> {
        Ok(self.trips.read().await.get(id).cloned())
    }

    async fn put_trip(&self, trip: &Trip) -> Result<()> {
        self.trips
            .write()
            .await
            .insert(trip.id.clone(), trip.clone());
        Ok(())
    }

    async fn list_trips(&self) -> Result<Vec<Trip>> {
        let mut trips: Vec<Trip> = self.trips.read().await.values().cloned().collect();
        trips.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(trips)
    }

    async fn get_template(&self, id: &str) -> Result<Option<TripTemplate>> {
        Ok(self.templates.read().await.get(id).cloned())
    }

    async fn put_template(&self, template: &TripTemplate) -> Result<()> {
        self.templates
            .write()
            .await
            .insert(template.id.clone(), template.clone());
        Ok(())
    }

    async fn list_templates(&self) -> Result<Vec<TripTemplate>> {
        let mut templates: Vec<TripTemplate> =
            self.templates.read().await.values().cloned().collect();
        templates.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(templates)
    }
}
