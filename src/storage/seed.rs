//! Seeding of profiles and hobby locations from a JSON document

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use super::{HobbyDirectory, ProfileStore};
use crate::models::UserProfile;
use crate::models::profile::DATE_OF_BIRTH_FORMAT;

#[derive(Debug, Deserialize)]
pub struct SeedProfile {
    pub user_id: u64,
    /// `DD/MM/YYYY`
    pub date_of_birth: String,
    #[serde(default)]
    pub hobbies: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub accessibilities: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SeedDocument {
    #[serde(default)]
    pub profiles: Vec<SeedProfile>,
    #[serde(default)]
    pub hobby_locations: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub profiles: usize,
    pub hobbies: usize,
}

impl SeedDocument {
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read seed file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse seed file: {}", path.display()))
    }

    /// Upsert every profile and replace the location list of every hobby
    pub async fn apply(
        &self,
        profiles: &dyn ProfileStore,
        directory: &dyn HobbyDirectory,
    ) -> Result<SeedSummary> {
        for seed in &self.profiles {
            let date_of_birth = NaiveDate::parse_from_str(&seed.date_of_birth, DATE_OF_BIRTH_FORMAT)
                .with_context(|| {
                    format!(
                        "Invalid date of birth '{}' for user {}",
                        seed.date_of_birth, seed.user_id
                    )
                })?;
            let profile = UserProfile {
                user_id: seed.user_id,
                date_of_birth,
                hobbies: seed.hobbies.clone(),
                dietary_restrictions: seed.dietary_restrictions.clone(),
                accessibilities: seed.accessibilities.clone(),
            };
            profiles
                .put_profile(&profile)
                .await
                .with_context(|| format!("Failed to store profile for user {}", seed.user_id))?;
        }

        for (hobby, locations) in &self.hobby_locations {
            directory
                .set_locations(hobby, locations)
                .await
                .with_context(|| format!("Failed to store locations for hobby '{hobby}'"))?;
        }

        let summary = SeedSummary {
            profiles: self.profiles.len(),
            hobbies: self.hobby_locations.len(),
        };
        info!(
            "Seeded {} profiles and {} hobbies",
            summary.profiles, summary.hobbies
        );
        Ok(summary)
    }
}
