//! Google Geocoding API client

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::debug;

use super::{GeocodedAddress, GeocodingOracle};
use crate::error::UpstreamError;

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingResult>,
    status: String,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    formatted_address: String,
}

/// Geocoder speaking the Google Geocoding JSON protocol
pub struct GoogleGeocoder {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
}

impl GoogleGeocoder {
    #[must_use]
    pub fn new(client: ClientWithMiddleware, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn request_url(&self, address: &str) -> String {
        format!(
            "{}/json?address={}&key={}",
            self.base_url,
            urlencoding::encode(address),
            urlencoding::encode(&self.api_key)
        )
    }
}

#[async_trait]
impl GeocodingOracle for GoogleGeocoder {
    async fn resolve(&self, address: &str) -> Result<Option<GeocodedAddress>, UpstreamError> {
        debug!("Geocoding address: {}", address);

        let response = self.client.get(self.request_url(address)).send().await?;
        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status()));
        }

        let body: GeocodingResponse = response.json().await?;
        match body.status.as_str() {
            "OK" => Ok(body.results.into_iter().next().map(|result| GeocodedAddress {
                canonical_address: result.formatted_address,
            })),
            "ZERO_RESULTS" => Ok(None),
            _ => Err(UpstreamError::Provider {
                status: body.status,
                message: body.error_message,
            }),
        }
    }
}
