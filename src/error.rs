//! Error handling for the itinerary engine
//!
//! This module provides idiomatic Rust error types using thiserror for
//! better error messages and proper error chain handling. Sanitization
//! layers never produce these errors — they narrow input silently. The
//! mutation and validation layers return them with enough detail for a
//! caller-facing message.

use thiserror::Error;

/// Main error type for the itinerary engine and service layer
#[derive(Error, Debug)]
pub enum ItineraryError {
    #[error("trip not found: {0}")]
    TripNotFound(String),

    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("no itinerary has been generated for trip {0}")]
    MissingItinerary(String),

    #[error("unknown card: {0}")]
    UnknownCard(String),

    #[error("card {0} is not a day card")]
    NotADayCard(String),

    #[error("timeline entry not found: {0}")]
    UnknownEntry(String),

    #[error("entry index {index} is out of bounds for a timeline of length {len}")]
    EntryIndexOutOfBounds { index: usize, len: usize },

    #[error("card order mismatch: {0}")]
    ReorderMismatch(String),

    #[error("stale revision: submitted {submitted}, current {current}")]
    StaleRevision { submitted: u64, current: u64 },

    #[error("cannot publish: {0}")]
    PublishBlocked(String),

    #[error("template has no day cards to apply")]
    EmptyTemplate,

    #[error("trip has no day cards to receive the template")]
    NoDayCards,

    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ItineraryError>;

impl ItineraryError {
    /// Whether the error is a semantic rejection (the request was
    /// well-formed but refused), as opposed to a malformed request or a
    /// collaborator failure.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::ReorderMismatch(_)
                | Self::StaleRevision { .. }
                | Self::PublishBlocked(_)
                | Self::EmptyTemplate
                | Self::NoDayCards
        )
    }
}
