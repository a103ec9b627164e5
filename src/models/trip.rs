//! Trip request and validated trip models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::models::UserProfile;

/// Incoming trip request, transient per call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripRequest {
    pub user_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Free-text address, validated by the location validator
    pub address: String,
    pub budget: f64,
}

impl TripRequest {
    /// Boundary checks the deserializer cannot express
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.budget.is_finite() || self.budget <= 0.0 {
            return Err(PipelineError::malformed("budget must be a positive amount"));
        }
        if self.address.trim().is_empty() {
            return Err(PipelineError::malformed("address cannot be empty"));
        }
        if self.end_date < self.start_date {
            return Err(PipelineError::malformed(
                "end_date cannot be before start_date",
            ));
        }
        Ok(())
    }
}

/// One hobby with its known locations, comma-space joined
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HobbyLocations {
    pub hobby: String,
    pub locations: String,
}

/// Fully validated and enriched trip, ready for prompt rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedTrip {
    pub user_id: u64,
    pub date_of_birth: NaiveDate,
    /// One entry per profile hobby, in profile order
    pub hobby_locations: Vec<HobbyLocations>,
    pub dietary_restrictions: Vec<String>,
    pub accessibilities: Vec<String>,
    pub normalized_address: String,
    pub travel_dates: (NaiveDate, NaiveDate),
    pub budget: Option<f64>,
}

impl ValidatedTrip {
    #[must_use]
    pub fn new(
        profile: UserProfile,
        request: &TripRequest,
        normalized_address: String,
        hobby_locations: Vec<HobbyLocations>,
    ) -> Self {
        Self {
            user_id: profile.user_id,
            date_of_birth: profile.date_of_birth,
            hobby_locations,
            dietary_restrictions: profile.dietary_restrictions,
            accessibilities: profile.accessibilities,
            normalized_address,
            travel_dates: (request.start_date, request.end_date),
            budget: Some(request.budget),
        }
    }
}
