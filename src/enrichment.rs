//! Hobby enrichment: attaches known locations to each profile hobby.
//!
//! All or nothing. One unmatched hobby fails the whole enrichment, and a
//! directory failure is reported the same way to the caller.

use thiserror::Error;
use tracing::{error, warn};

use crate::error::StorageError;
use crate::models::HobbyLocations;
use crate::storage::HobbyDirectory;

#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("No locations for hobbies: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("Hobby directory unavailable: {0}")]
    Directory(#[from] StorageError),
}

impl EnrichmentError {
    /// Unmatched hobbies; empty when the directory itself failed
    #[must_use]
    pub fn missing(&self) -> &[String] {
        match self {
            EnrichmentError::Missing(missing) => missing,
            EnrichmentError::Directory(_) => &[],
        }
    }
}

/// Resolve every hobby, in order, to its comma-space joined locations.
///
/// Duplicated hobbies are looked up and recorded independently. The
/// directory reader lives for the duration of this call only.
pub async fn enrich_hobbies(
    directory: &dyn HobbyDirectory,
    hobbies: &[String],
) -> Result<Vec<HobbyLocations>, EnrichmentError> {
    let result = lookup_all(directory, hobbies).await;

    match &result {
        Err(EnrichmentError::Missing(missing)) => warn!(
            "The following hobbies do not exist in the directory: {}",
            missing.join(", ")
        ),
        Err(EnrichmentError::Directory(e)) => {
            error!("An error occurred while accessing the hobby directory: {}", e)
        }
        Ok(_) => {}
    }

    result
}

async fn lookup_all(
    directory: &dyn HobbyDirectory,
    hobbies: &[String],
) -> Result<Vec<HobbyLocations>, EnrichmentError> {
    let reader = directory.open_reader()?;

    let mut enriched = Vec::with_capacity(hobbies.len());
    let mut missing = Vec::new();

    for hobby in hobbies {
        let locations = reader.lookup_locations(hobby).await?;
        if locations.is_empty() {
            missing.push(hobby.clone());
        } else {
            enriched.push(HobbyLocations {
                hobby: hobby.clone(),
                locations: locations.join(", "),
            });
        }
    }

    if !missing.is_empty() {
        return Err(EnrichmentError::Missing(missing));
    }

    Ok(enriched)
}
