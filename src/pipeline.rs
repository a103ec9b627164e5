//! Trip request pipeline
//!
//! Sequences profile lookup, location validation, preference validation,
//! hobby enrichment and prompt composition for one request, stopping at the
//! first failing stage. Requests share nothing mutable, so any number may
//! run concurrently against one pipeline.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{debug, error, info, instrument};

use crate::enrichment::enrich_hobbies;
use crate::error::PipelineError;
use crate::location::LocationValidator;
use crate::models::{TripRequest, ValidatedTrip};
use crate::prompt::PromptComposer;
use crate::storage::{HobbyDirectory, ProfileStore};
use crate::validation::validate_preferences;

/// Source of "today" for birthday and age decisions
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Current date in the supported region's timezone
#[derive(Debug, Clone, Copy)]
pub struct RegionClock {
    timezone: Tz,
}

impl RegionClock {
    #[must_use]
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }
}

impl Clock for RegionClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }
}

/// Always the same date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Collaborators are injected once at startup and shared by all requests
pub struct TripPipeline {
    profiles: Arc<dyn ProfileStore>,
    directory: Arc<dyn HobbyDirectory>,
    locations: Arc<dyn LocationValidator>,
    composer: PromptComposer,
    clock: Arc<dyn Clock>,
    country: String,
}

impl TripPipeline {
    #[must_use]
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        directory: Arc<dyn HobbyDirectory>,
        locations: Arc<dyn LocationValidator>,
        composer: PromptComposer,
        clock: Arc<dyn Clock>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            profiles,
            directory,
            locations,
            composer,
            clock,
            country: country.into(),
        }
    }

    /// Turn a trip request into a rendered prompt or the first failure
    #[instrument(name = "handle_trip", skip(self, request), fields(user_id = request.user_id))]
    pub async fn handle(&self, request: &TripRequest) -> Result<String, PipelineError> {
        request.validate()?;

        let profile = self
            .profiles
            .get_profile(request.user_id)
            .await
            .map_err(|e| {
                error!("Profile lookup failed: {}", e);
                PipelineError::upstream("profile store", e.to_string())
            })?
            .ok_or(PipelineError::UserNotFound {
                user_id: request.user_id,
            })?;
        debug!("Loaded profile with {} hobbies", profile.hobbies.len());

        let normalized_address = self
            .locations
            .validate(&request.address)
            .await
            .ok_or_else(|| PipelineError::LocationInvalid {
                country: self.country.clone(),
            })?;

        validate_preferences(&profile.dietary_restrictions, &profile.accessibilities)
            .map_err(PipelineError::InvalidPreferences)?;

        let hobby_locations = enrich_hobbies(self.directory.as_ref(), &profile.hobbies)
            .await
            .map_err(|e| PipelineError::HobbyEnrichmentFailed {
                missing: e.missing().to_vec(),
            })?;

        let trip = ValidatedTrip::new(profile, request, normalized_address, hobby_locations);
        let prompt = self
            .composer
            .compose(&trip, self.clock.today())
            .map_err(|e| PipelineError::CompositionFailed {
                reason: e.to_string(),
            })?;

        info!("Composed prompt ({} chars)", prompt.len());
        Ok(prompt)
    }
}
