//! `trip-prompt` - trip request validation and prompt assembly
//!
//! Validates a traveler's trip request against their stored profile,
//! enriches their hobbies with known locations, confirms the destination
//! is inside the supported country and renders the recommendation prompt.

pub mod api;
pub mod catalog;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod generation;
pub mod http;
pub mod location;
pub mod models;
pub mod pipeline;
pub mod prompt;
pub mod storage;
pub mod telemetry;
pub mod validation;
pub mod web;

// Re-export core types for public API
pub use api::{AppState, TripResponse};
pub use config::ServiceConfig;
pub use error::{PipelineError, StorageError, UpstreamError};
pub use location::{LocationValidator, PassthroughLocationValidator, StrictLocationValidator, ValidationMode};
pub use models::{TripRequest, UserProfile, ValidatedTrip};
pub use pipeline::{Clock, FixedClock, RegionClock, TripPipeline};
pub use prompt::{PromptComposer, RenderMode};
pub use storage::{FjallStore, HobbyDirectory, InMemoryStore, ProfileStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
