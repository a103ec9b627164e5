//! Configuration management for the trip prompt service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::location::ValidationMode;
use crate::prompt::RenderMode;

/// Root configuration structure for the service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Supported region
    pub region: RegionConfig,
    /// Address validation settings
    pub geocoding: GeocodingConfig,
    /// Text generation provider, disabled when absent
    pub generation: Option<GenerationConfig>,
    /// Profile store and hobby directory settings
    pub storage: StorageConfig,
    /// Prompt rendering settings
    pub prompt: PromptConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// OpenTelemetry export
    pub telemetry: TelemetryConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub request_timeout_seconds: u32,
    pub body_limit_bytes: usize,
    /// `*` allows any origin
    pub allowed_origins: Vec<String>,
    pub tls_cert_path: Option<PathBuf>,
    pub tls_key_path: Option<PathBuf>,
}

/// The single country recommendations are restricted to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Must appear in geocoded addresses
    pub country: String,
    /// Currency of trip budgets
    pub currency: String,
    /// IANA timezone deciding "today"
    pub timezone: String,
}

/// Geocoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub mode: ValidationMode,
    /// Geocoding API key
    pub api_key: Option<String>,
    /// Base URL of a Google Geocoding compatible API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    pub max_retries: u32,
}

/// Text generation provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub endpoint: String,
    pub api_token: Option<String>,
    pub adapter_id: String,
    #[serde(default = "default_adapter_source")]
    pub adapter_source: String,
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_generation_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_generation_max_retries")]
    pub max_retries: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Fjall,
    Memory,
}

/// Storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Database directory for the fjall backend
    pub path: String,
    /// JSON document loaded into the store at startup
    pub seed_file: Option<PathBuf>,
}

/// Prompt settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub render_mode: RenderMode,
    pub min_recommendations: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

/// OpenTelemetry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// OTLP/HTTP collector endpoint, export disabled when absent
    pub otlp_endpoint: Option<String>,
    pub service_name: String,
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0:4568".to_string()
}

fn default_request_timeout() -> u32 {
    30
}

fn default_body_limit() -> usize {
    64 * 1024
}

fn default_country() -> String {
    "South Korea".to_string()
}

fn default_currency() -> String {
    "KRW".to_string()
}

fn default_timezone() -> String {
    "Asia/Seoul".to_string()
}

fn default_geocoding_base_url() -> String {
    "https://maps.googleapis.com/maps/api/geocode".to_string()
}

fn default_geocoding_timeout() -> u32 {
    10
}

fn default_geocoding_max_retries() -> u32 {
    2
}

fn default_adapter_source() -> String {
    "pbase".to_string()
}

fn default_max_new_tokens() -> u32 {
    1500
}

fn default_temperature() -> f32 {
    0.6
}

fn default_generation_timeout() -> u32 {
    60
}

fn default_generation_max_retries() -> u32 {
    2
}

fn default_storage_path() -> String {
    dirs::data_dir()
        .map(|dir| dir.join("trip-prompt").join("db"))
        .unwrap_or_else(|| PathBuf::from("data"))
        .to_string_lossy()
        .to_string()
}

fn default_min_recommendations() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_service_name() -> String {
    "trip-prompt".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            request_timeout_seconds: default_request_timeout(),
            body_limit_bytes: default_body_limit(),
            allowed_origins: vec!["*".to_string()],
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            country: default_country(),
            currency: default_currency(),
            timezone: default_timezone(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            mode: ValidationMode::Auto,
            api_key: None,
            base_url: default_geocoding_base_url(),
            timeout_seconds: default_geocoding_timeout(),
            max_retries: default_geocoding_max_retries(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Fjall,
            path: default_storage_path(),
            seed_file: None,
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::Readable,
            min_recommendations: default_min_recommendations(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            otlp_endpoint: None,
            service_name: default_service_name(),
        }
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

impl ServiceConfig {
    /// Load configuration from `config_path`, or the default location when
    /// absent, overlaid with environment variables
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. TRIP_PROMPT__GEOCODING__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("TRIP_PROMPT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: ServiceConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("trip-prompt").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.bind_address.is_empty() {
            self.server.bind_address = default_bind_address();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.server.body_limit_bytes == 0 {
            self.server.body_limit_bytes = default_body_limit();
        }
        if self.region.country.is_empty() {
            self.region.country = default_country();
        }
        if self.region.currency.is_empty() {
            self.region.currency = default_currency();
        }
        if self.region.timezone.is_empty() {
            self.region.timezone = default_timezone();
        }
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.geocoding.timeout_seconds == 0 {
            self.geocoding.timeout_seconds = default_geocoding_timeout();
        }
        if self.storage.path.is_empty() {
            self.storage.path = default_storage_path();
        }
        if self.prompt.min_recommendations == 0 {
            self.prompt.min_recommendations = default_min_recommendations();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.telemetry.service_name.is_empty() {
            self.telemetry.service_name = default_service_name();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        if let Some(api_key) = &self.geocoding.api_key
            && api_key.trim().is_empty()
        {
            return Err(ConfigError::new(
                "Geocoding API key cannot be empty if provided. Either remove it or provide a valid key.",
            )
            .into());
        }

        if self.geocoding.mode == ValidationMode::Strict && self.geocoding.api_key.is_none() {
            return Err(ConfigError::new(
                "Strict location validation requires a geocoding API key",
            )
            .into());
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.request_timeout_seconds > 300 {
            return Err(ConfigError::new("Request timeout cannot exceed 300 seconds").into());
        }

        if self.geocoding.timeout_seconds > 60 {
            return Err(ConfigError::new("Geocoding timeout cannot exceed 60 seconds").into());
        }

        if self.geocoding.max_retries > 10 {
            return Err(ConfigError::new("Geocoding max retries cannot exceed 10").into());
        }

        if !(1..=50).contains(&self.prompt.min_recommendations) {
            return Err(ConfigError::new("Minimum recommendations must be between 1 and 50").into());
        }

        if let Some(generation) = &self.generation {
            if !(0.0..=2.0).contains(&generation.temperature) {
                return Err(ConfigError::new("Generation temperature must be between 0 and 2").into());
            }
            if generation.max_new_tokens == 0 || generation.max_new_tokens > 8192 {
                return Err(ConfigError::new("Generation max_new_tokens must be between 1 and 8192").into());
            }
            if generation.timeout_seconds == 0 || generation.timeout_seconds > 300 {
                return Err(ConfigError::new("Generation timeout must be between 1 and 300 seconds").into());
            }
            if generation.max_retries > 10 {
                return Err(ConfigError::new("Generation max retries cannot exceed 10").into());
            }
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::new(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::new(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        self.server
            .bind_address
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::new(format!("Invalid bind address '{}': {e}", self.server.bind_address)))?;

        if self.server.tls_cert_path.is_some() != self.server.tls_key_path.is_some() {
            return Err(ConfigError::new("TLS needs both a certificate and a key path").into());
        }

        self.timezone()?;

        if !is_http_url(&self.geocoding.base_url) {
            return Err(ConfigError::new("Geocoding base URL must be a valid HTTP or HTTPS URL").into());
        }

        if let Some(generation) = &self.generation {
            if !is_http_url(&generation.endpoint) {
                return Err(ConfigError::new("Generation endpoint must be a valid HTTP or HTTPS URL").into());
            }
            if generation.adapter_id.trim().is_empty() {
                return Err(ConfigError::new("Generation adapter_id cannot be empty").into());
            }
        }

        if let Some(endpoint) = &self.telemetry.otlp_endpoint
            && !is_http_url(endpoint)
        {
            return Err(ConfigError::new("OTLP endpoint must be a valid HTTP or HTTPS URL").into());
        }

        Ok(())
    }

    /// Region timezone
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.region
            .timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::new(format!("Unknown timezone '{}'", self.region.timezone)))
    }

    /// Validation mode with `auto` resolved against the configured api key
    #[must_use]
    pub fn effective_geocoding_mode(&self) -> ValidationMode {
        match (self.geocoding.mode, &self.geocoding.api_key) {
            (ValidationMode::Auto, Some(_)) => ValidationMode::Strict,
            (ValidationMode::Auto, None) => ValidationMode::Passthrough,
            (mode, _) => mode,
        }
    }
}
