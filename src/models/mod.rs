//! Data models for the trip prompt service
//!
//! - Profile: stored traveler demographics and preferences
//! - Trip: incoming trip requests and the validated, enriched trip

pub mod profile;
pub mod trip;

pub use profile::{ProfileRecord, UserProfile, list_codec};
pub use trip::{HobbyLocations, TripRequest, ValidatedTrip};
