//! Tripdesk — itinerary timeline engine
//!
//! A travel operator assembles, edits, and publishes a multi-day trip
//! itinerary that travellers later view. This crate is the engine behind
//! that: the card/timeline data model and the rules for safely mutating,
//! reordering, merging-from-template, and publish-gating an itinerary.
//!
//! ## Architecture
//! Every edit flows the same way:
//! Raw client JSON -> Sanitizers -> Engine transforms -> whole-document write
//!
//! Sanitizers ([`sanitize`]) narrow untrusted input and never fail. Engine
//! modules ([`cards`], [`timing`], [`reorder`], [`merge`], [`publish`])
//! transform the typed model. [`service::TripService`] ties one
//! read-modify-write cycle per operation to the storage and email
//! collaborators ([`store`], [`notify`]).
//!
//! ## Quick Start
//!
//! ```rust
//! use tripdesk::model::Itinerary;
//!
//! let itinerary = Itinerary::scaffold(3);
//! assert_eq!(itinerary.day_positions().len(), 3);
//! ```

// Core error handling
pub mod error;

// The card/timeline data model
pub mod model;

// Sanitization boundary for untrusted client input
pub mod sanitize;

// Engine transforms
pub mod cards;
pub mod merge;
pub mod publish;
pub mod reorder;
pub mod timing;

// Collaborator seams
pub mod notify;
pub mod store;

// Operation contracts for UI/admin callers
pub mod service;

pub use error::{ItineraryError, Result};
pub use model::{Card, Itinerary, TimelineEntry, Trip, TripTemplate};
pub use service::TripService;
