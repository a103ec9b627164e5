//! Prompt composition
//!
//! Renders a validated trip into the recommendation request sent to the
//! text generation provider. Rendering is deterministic for a given trip
//! and date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ValidatedTrip;
use crate::models::profile::{age_on, is_birthday};

/// Layout of the rendered prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Multi-line sections
    Readable,
    /// Whitespace runs collapsed into single spaces
    Flattened,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CompositionError {
    #[error("Incomplete profile, missing: {}", .missing.join(", "))]
    IncompleteProfile { missing: Vec<&'static str> },
}

#[derive(Debug, Clone)]
pub struct PromptComposer {
    country: String,
    currency: String,
    min_recommendations: u32,
    render_mode: RenderMode,
}

impl PromptComposer {
    #[must_use]
    pub fn new(
        country: impl Into<String>,
        currency: impl Into<String>,
        min_recommendations: u32,
        render_mode: RenderMode,
    ) -> Self {
        Self {
            country: country.into(),
            currency: currency.into(),
            min_recommendations,
            render_mode,
        }
    }

    /// Render `trip` as of `today`. Refuses trips lacking hobbies, a
    /// location or a budget rather than emitting a partial prompt.
    pub fn compose(&self, trip: &ValidatedTrip, today: NaiveDate) -> Result<String, CompositionError> {
        let budget = self.check_complete(trip)?;

        let clauses = self.clauses(trip, budget, today);
        let hobbies = trip
            .hobby_locations
            .iter()
            .map(|entry| format!("{}: {}", entry.hobby, entry.locations))
            .collect::<Vec<_>>()
            .join(", ");
        let location = trip.normalized_address.trim();
        let current_location = if location.contains(&self.country) {
            location.to_string()
        } else {
            format!("{location}, {}", self.country)
        };
        let (start, end) = trip.travel_dates;
        let age = age_on(trip.date_of_birth, today);

        let prompt = format!(
            "User Information:
- Age: {age}
- Hobbies: {hobbies}
- Dietary Restrictions: {dietary}
- Accessibilities: {accessibilities}

Travel Information:
- Current Location: {current_location}
- Travel Dates: {start} to {end}
- Budget: {budget} {currency}

Request:
Recommend a minimum of {minimum} places for the user near {location} to visit.
Consider the user's hobbies and recent headlines or trends from the internet related to the area, ensure recommendations are age-appropriate to the user's age.
{clauses}",
            dietary = trip.dietary_restrictions.join(", "),
            accessibilities = trip.accessibilities.join(", "),
            currency = self.currency,
            minimum = self.min_recommendations,
            clauses = clauses.join(" "),
        );

        Ok(match self.render_mode {
            RenderMode::Readable => prompt,
            RenderMode::Flattened => collapse_whitespace(&prompt),
        })
    }

    fn check_complete(&self, trip: &ValidatedTrip) -> Result<f64, CompositionError> {
        let mut missing = Vec::new();
        if trip.hobby_locations.is_empty() {
            missing.push("hobbies");
        }
        if trip.normalized_address.trim().is_empty() {
            missing.push("current_location");
        }
        match trip.budget {
            Some(budget) if missing.is_empty() => Ok(budget),
            Some(_) => Err(CompositionError::IncompleteProfile { missing }),
            None => {
                missing.push("budget");
                Err(CompositionError::IncompleteProfile { missing })
            }
        }
    }

    fn clauses(&self, trip: &ValidatedTrip, budget: f64, today: NaiveDate) -> Vec<String> {
        let mut clauses = Vec::new();

        if is_birthday(trip.date_of_birth, today) {
            clauses.push(
                "It's the user's birthday today, so add an appropriate birthday venue activity."
                    .to_string(),
            );
        }
        if !trip.dietary_restrictions.is_empty() {
            clauses.push(format!(
                "The user has dietary restrictions: {}. Recommend only places that meet these criteria for food and activities.",
                trip.dietary_restrictions.join(", ")
            ));
        }
        if !trip.accessibilities.is_empty() {
            clauses.push(format!(
                "The user has accessibilities: {}. Ensure that recommended places are accessible.",
                trip.accessibilities.join(", ")
            ));
        }
        clauses.push(format!(
            "The user has a budget of {budget} {}. Make sure the total costs of activities shown do not go above this.",
            self.currency
        ));
        clauses.push(format!("Only recommend places in {}.", self.country));

        clauses
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
