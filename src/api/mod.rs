use std::sync::Arc;

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{VERSION, error::PipelineError, generation::TextGenerator, models::TripRequest, pipeline::TripPipeline};

/// Shared handler state, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<TripPipeline>,
    pub generator: Option<Arc<TextGenerator>>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TripResponse {
    Success {
        prompt: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        generated_text: Option<String>,
    },
    Failure {
        message: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/receive_trip_data", post(receive_trip_data))
        .route("/api/trips/prompt", post(receive_trip_data))
        .route("/health", get(health))
        .with_state(state)
}

impl PipelineError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::MalformedRequest { .. } => StatusCode::BAD_REQUEST,
            PipelineError::UserNotFound { .. } => StatusCode::NOT_FOUND,
            PipelineError::LocationInvalid { .. }
            | PipelineError::InvalidPreferences(_)
            | PipelineError::HobbyEnrichmentFailed { .. }
            | PipelineError::CompositionFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        info!("Trip request failed: {}", self);
        let body = TripResponse::Failure {
            message: self.user_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

async fn receive_trip_data(
    State(state): State<AppState>,
    payload: Result<Json<TripRequest>, JsonRejection>,
) -> Result<Json<TripResponse>, PipelineError> {
    let Json(request) = payload.map_err(|rejection| PipelineError::malformed(rejection.body_text()))?;

    let prompt = state.pipeline.handle(&request).await?;

    let generated_text = match &state.generator {
        Some(generator) => Some(generator.generate(&prompt).await.map_err(|e| {
            error!("Text generation failed: {}", e);
            PipelineError::upstream("text generation", e.to_string())
        })?),
        None => None,
    };

    Ok(Json(TripResponse::Success {
        prompt,
        generated_text,
    }))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: VERSION.to_string(),
    })
}
