//! Error types and handling for the trip prompt service

use thiserror::Error;

use crate::validation::PreferenceReport;

/// Outcome of a failed trip request, one variant per pipeline stage
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Request body could not be turned into a `TripRequest`
    #[error("Malformed request: {message}")]
    MalformedRequest { message: String },

    /// No stored profile for the requested user
    #[error("User {user_id} not found")]
    UserNotFound { user_id: u64 },

    /// Address did not resolve to a place inside the supported country
    #[error("Location is not inside {country}")]
    LocationInvalid { country: String },

    /// Profile carries labels outside the reference catalogs
    #[error("Invalid preferences: {0}")]
    InvalidPreferences(PreferenceReport),

    /// At least one hobby has no known location, or the directory failed
    #[error("Hobby enrichment failed (missing: {missing:?})")]
    HobbyEnrichmentFailed { missing: Vec<String> },

    /// The composer refused to render the trip
    #[error("Prompt composition failed: {reason}")]
    CompositionFailed { reason: String },

    /// Profile store, geocoder or generator could not be reached
    #[error("{service} unavailable: {message}")]
    UpstreamUnavailable {
        service: &'static str,
        message: String,
    },
}

impl PipelineError {
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedRequest {
            message: message.into(),
        }
    }

    pub fn upstream<S: Into<String>>(service: &'static str, message: S) -> Self {
        Self::UpstreamUnavailable {
            service,
            message: message.into(),
        }
    }

    /// Short summary suitable for the `message` field of a failure response
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::MalformedRequest { message } => format!("Invalid request: {message}"),
            PipelineError::UserNotFound { user_id } => {
                format!("User with ID {user_id} not found.")
            }
            PipelineError::LocationInvalid { country } => {
                format!("Location validation failed. The location must be in {country}.")
            }
            PipelineError::InvalidPreferences(report) => format!(
                "Validation of dietary restrictions or accessibilities failed: {report}"
            ),
            PipelineError::HobbyEnrichmentFailed { missing } if missing.is_empty() => {
                "Could not look up locations for the user's hobbies.".to_string()
            }
            PipelineError::HobbyEnrichmentFailed { missing } => {
                format!("No known locations for hobbies: {}", missing.join(", "))
            }
            PipelineError::CompositionFailed { .. } => {
                "Could not generate prompt due to missing or invalid data.".to_string()
            }
            PipelineError::UpstreamUnavailable { .. } => {
                "An upstream service is unavailable. Please try again later.".to_string()
            }
        }
    }
}

/// Failures of the profile store or hobby directory backends
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(#[from] fjall::Error),

    #[error("Record encoding error: {0}")]
    Encoding(#[from] postcard::Error),

    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Corrupt record '{key}': {message}")]
    Corrupt { key: String, message: String },

    #[error("Invalid label '{label}': {message}")]
    InvalidLabel { label: String, message: String },
}

impl StorageError {
    pub fn corrupt<K: Into<String>, S: Into<String>>(key: K, message: S) -> Self {
        Self::Corrupt {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Failures talking to the geocoding or text generation providers
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest_middleware::Error),

    #[error("Invalid response body: {0}")]
    Decode(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("Provider reported '{status}'{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Provider {
        status: String,
        message: Option<String>,
    },

    #[error("Response is missing '{0}'")]
    MissingField(&'static str),
}

/// Invalid configuration values
#[derive(Error, Debug)]
#[error("Configuration error: {message}")]
pub struct ConfigError {
    pub message: String,
}

impl ConfigError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}
