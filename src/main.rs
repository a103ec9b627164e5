use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use trip_prompt::config::{ServiceConfig, StorageBackend};
use trip_prompt::generation::{GenerationParameters, TextGenerator};
use trip_prompt::http::build_client;
use trip_prompt::location::GoogleGeocoder;
use trip_prompt::storage::SeedDocument;
use trip_prompt::{
    AppState, FjallStore, HobbyDirectory, InMemoryStore, LocationValidator,
    PassthroughLocationValidator, ProfileStore, PromptComposer, RegionClock,
    StrictLocationValidator, TripPipeline, ValidationMode, telemetry, web,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Optional config file path as the only argument
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = ServiceConfig::load_from_path(config_path)?;

    let _telemetry = telemetry::init(&config.logging, &config.telemetry)?;
    info!("Starting trip-prompt {}", trip_prompt::VERSION);

    let (profiles, directory) = open_storage(&config).await?;
    let locations = location_validator(&config)?;

    let composer = PromptComposer::new(
        config.region.country.clone(),
        config.region.currency.clone(),
        config.prompt.min_recommendations,
        config.prompt.render_mode,
    );
    let clock = Arc::new(RegionClock::new(config.timezone()?));

    let pipeline = TripPipeline::new(
        profiles,
        directory,
        locations,
        composer,
        clock,
        config.region.country.clone(),
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
        generator: text_generator(&config)?.map(Arc::new),
    };

    web::run(&config.server, state).await
}

async fn open_storage(
    config: &ServiceConfig,
) -> Result<(Arc<dyn ProfileStore>, Arc<dyn HobbyDirectory>)> {
    let (profiles, directory) = match config.storage.backend {
        StorageBackend::Fjall => {
            let store = FjallStore::open(&config.storage.path)
                .with_context(|| format!("Failed to open database at {}", config.storage.path))?;
            info!("Opened database at {}", config.storage.path);
            shared(Arc::new(store))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage, data is lost on exit");
            shared(Arc::new(InMemoryStore::new()))
        }
    };

    if let Some(seed_file) = &config.storage.seed_file {
        let summary = SeedDocument::from_file(seed_file)
            .await?
            .apply(profiles.as_ref(), directory.as_ref())
            .await?;
        info!(
            "Seeded {} profiles and {} hobbies from {}",
            summary.profiles,
            summary.hobbies,
            seed_file.display()
        );
    }

    Ok((profiles, directory))
}

/// One store serving both roles
fn shared<S>(store: Arc<S>) -> (Arc<dyn ProfileStore>, Arc<dyn HobbyDirectory>)
where
    S: ProfileStore + HobbyDirectory + 'static,
{
    (store.clone(), store)
}

fn location_validator(config: &ServiceConfig) -> Result<Arc<dyn LocationValidator>> {
    match (config.effective_geocoding_mode(), &config.geocoding.api_key) {
        (ValidationMode::Strict, Some(api_key)) => {
            let client = build_client(
                config.geocoding.timeout_seconds,
                config.geocoding.max_retries,
            )?;
            let geocoder = GoogleGeocoder::new(client, config.geocoding.base_url.clone(), api_key.clone());
            info!("Strict location validation for {}", config.region.country);
            Ok(Arc::new(StrictLocationValidator::new(
                Arc::new(geocoder),
                config.region.country.clone(),
            )))
        }
        _ => {
            warn!("Location validation disabled, addresses are accepted as given");
            Ok(Arc::new(PassthroughLocationValidator))
        }
    }
}

fn text_generator(config: &ServiceConfig) -> Result<Option<TextGenerator>> {
    let Some(generation) = &config.generation else {
        info!("Text generation disabled, responses carry the prompt only");
        return Ok(None);
    };

    let client = build_client(generation.timeout_seconds, generation.max_retries)?;
    Ok(Some(TextGenerator::new(
        client,
        generation.endpoint.clone(),
        generation.api_token.clone(),
        GenerationParameters {
            adapter_id: generation.adapter_id.clone(),
            adapter_source: generation.adapter_source.clone(),
            max_new_tokens: generation.max_new_tokens,
            temperature: generation.temperature,
        },
    )))
}
