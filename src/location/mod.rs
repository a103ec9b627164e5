//! Location validation
//!
//! Confirms a free-text address lies inside the supported country. Two
//! variants share one interface: a strict one backed by a geocoding oracle
//! and a pass-through one that trusts the address as given.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::UpstreamError;

pub mod google;

pub use google::GoogleGeocoder;

/// How addresses are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Reject unresolvable and out-of-region addresses
    Strict,
    /// Accept any address as already validated
    Passthrough,
    /// Strict when a geocoding api key is configured, pass-through otherwise
    Auto,
}

/// A geocoder's best match for an address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodedAddress {
    pub canonical_address: String,
}

/// External address resolution service
#[async_trait]
pub trait GeocodingOracle: Send + Sync {
    /// Best match for `address`, `None` when nothing matched
    async fn resolve(&self, address: &str) -> Result<Option<GeocodedAddress>, UpstreamError>;
}

#[async_trait]
pub trait LocationValidator: Send + Sync {
    /// Normalized address, or `None` when the address is rejected.
    ///
    /// Oracle failures are logged and reported as a rejection.
    async fn validate(&self, address: &str) -> Option<String>;
}

/// Geographic gate backed by a geocoding oracle
pub struct StrictLocationValidator {
    oracle: Arc<dyn GeocodingOracle>,
    country: String,
}

impl StrictLocationValidator {
    #[must_use]
    pub fn new(oracle: Arc<dyn GeocodingOracle>, country: impl Into<String>) -> Self {
        Self {
            oracle,
            country: country.into(),
        }
    }
}

#[async_trait]
impl LocationValidator for StrictLocationValidator {
    #[tracing::instrument(name = "validate_location", skip(self))]
    async fn validate(&self, address: &str) -> Option<String> {
        debug!("Starting geocode for address: {:?}", address);

        match self.oracle.resolve(address).await {
            Ok(Some(result)) if result.canonical_address.contains(&self.country) => {
                debug!("Geocode successful: {}", result.canonical_address);
                Some(result.canonical_address)
            }
            Ok(Some(result)) => {
                info!(
                    "Resolved address '{}' is not in {}",
                    result.canonical_address, self.country
                );
                None
            }
            Ok(None) => {
                info!("No geocoding match for address {:?}", address);
                None
            }
            Err(e) => {
                warn!("Error occurred while trying to geocode the address: {}", e);
                None
            }
        }
    }
}

/// Trusts every address; used when no geocoding credential is available
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughLocationValidator;

#[async_trait]
impl LocationValidator for PassthroughLocationValidator {
    async fn validate(&self, address: &str) -> Option<String> {
        debug!("Skipping location validation for {:?}", address);
        Some(address.trim().to_string())
    }
}
