//! End-to-end tests for the trip prompt pipeline and its HTTP surface

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use rstest::{fixture, rstest};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trip_prompt::api::{AppState, router};
use trip_prompt::error::UpstreamError;
use trip_prompt::generation::{GenerationParameters, TextGenerator};
use trip_prompt::http::build_client;
use trip_prompt::location::{GeocodedAddress, GeocodingOracle, GoogleGeocoder};
use trip_prompt::storage::SeedDocument;
use trip_prompt::{
    FixedClock, HobbyDirectory, InMemoryStore, PipelineError, PromptComposer, RenderMode,
    StrictLocationValidator, TripPipeline, TripRequest,
};

const SEED: &str = r#"{
    "profiles": [
        {
            "user_id": 42,
            "date_of_birth": "05/03/1990",
            "hobbies": ["Swimming"],
            "dietary_restrictions": ["Vegan"],
            "accessibilities": ["None"]
        },
        {
            "user_id": 43,
            "date_of_birth": "05/03/1990",
            "hobbies": ["Swimming"],
            "dietary_restrictions": ["Unicorn-free"],
            "accessibilities": ["None"]
        },
        {
            "user_id": 44,
            "date_of_birth": "05/03/1990",
            "hobbies": ["Underwater Basket Weaving"],
            "dietary_restrictions": ["Vegan"],
            "accessibilities": ["None"]
        },
        {
            "user_id": 45,
            "date_of_birth": "16/10/2000",
            "hobbies": ["Swimming", "Running", "Swimming"]
        }
    ],
    "hobby_locations": {
        "Swimming": ["Seoul Olympic Park"],
        "Running": ["Han River Park", "Seoul Forest"]
    }
}"#;

/// Geocoder with a fixed answer that counts how often it is asked
struct CountingOracle {
    canonical_address: &'static str,
    calls: AtomicUsize,
}

impl CountingOracle {
    fn new(canonical_address: &'static str) -> Arc<Self> {
        Arc::new(Self {
            canonical_address,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeocodingOracle for CountingOracle {
    async fn resolve(&self, _address: &str) -> Result<Option<GeocodedAddress>, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(GeocodedAddress {
            canonical_address: self.canonical_address.to_string(),
        }))
    }
}

async fn seeded_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    let seed: SeedDocument = serde_json::from_str(SEED).unwrap();
    seed.apply(store.as_ref(), store.as_ref()).await.unwrap();
    store
}

#[fixture]
async fn store() -> Arc<InMemoryStore> {
    seeded_store().await
}

fn pipeline(store: Arc<InMemoryStore>, oracle: Arc<dyn GeocodingOracle>) -> TripPipeline {
    TripPipeline::new(
        store.clone(),
        store,
        Arc::new(StrictLocationValidator::new(oracle, "South Korea")),
        PromptComposer::new("South Korea", "KRW", 10, RenderMode::Readable),
        Arc::new(FixedClock(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap())),
        "South Korea",
    )
}

fn request(user_id: u64) -> TripRequest {
    TripRequest {
        user_id,
        start_date: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 10, 25).unwrap(),
        address: "123 Main St, Seoul".to_string(),
        budget: 500_000.0,
    }
}

fn request_body(user_id: u64) -> String {
    format!(
        r#"{{"user_id":{user_id},"start_date":"2026-10-20","end_date":"2026-10-25","address":"123 Main St, Seoul","budget":500000}}"#
    )
}

async fn post(app: Router, body: String) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/receive_trip_data")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Profile, directory and geocoder all agree: the prompt carries every piece
#[rstest]
#[tokio::test]
async fn test_successful_trip(#[future] store: Arc<InMemoryStore>) {
    let oracle = CountingOracle::new("Seoul Olympic Park, Seoul, South Korea");
    let pipeline = pipeline(store.await, oracle.clone());

    let prompt = pipeline.handle(&request(42)).await.unwrap();

    assert!(prompt.contains("Swimming: Seoul Olympic Park"));
    assert!(prompt.contains("Vegan"));
    assert!(prompt.contains("Seoul Olympic Park, Seoul, South Korea"));
    assert!(prompt.contains("Recommend a minimum of 10 places"));
    assert!(prompt.ends_with("Only recommend places in South Korea."));
    assert_eq!(oracle.calls(), 1);
}

/// A label outside the catalog fails the whole request
#[rstest]
#[tokio::test]
async fn test_unknown_dietary_label(#[future] store: Arc<InMemoryStore>) {
    let store = store.await;
    let pipeline = pipeline(store.clone(), CountingOracle::new("Seoul, South Korea"));

    let err = pipeline.handle(&request(43)).await.unwrap_err();
    match &err {
        PipelineError::InvalidPreferences(report) => {
            assert_eq!(report.invalid_dietary, vec!["Unicorn-free"]);
            assert!(report.invalid_accessibilities.is_empty());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.user_message().contains("Unicorn-free"));
    // Enrichment never started
    assert_eq!(store.readers_opened(), 0);
}

/// Out-of-country addresses are rejected even when everything else is valid
#[rstest]
#[tokio::test]
async fn test_address_outside_country(#[future] store: Arc<InMemoryStore>) {
    let pipeline = pipeline(store.await, CountingOracle::new("Tokyo, Japan"));

    let err = pipeline.handle(&request(42)).await.unwrap_err();
    assert!(matches!(err, PipelineError::LocationInvalid { .. }));
    assert_eq!(
        err.user_message(),
        "Location validation failed. The location must be in South Korea."
    );
}

/// A hobby without directory entries fails enrichment and names the hobby
#[rstest]
#[tokio::test]
async fn test_hobby_without_locations(#[future] store: Arc<InMemoryStore>) {
    let store = store.await;
    let pipeline = pipeline(store.clone(), CountingOracle::new("Seoul, South Korea"));

    let err = pipeline.handle(&request(44)).await.unwrap_err();
    match &err {
        PipelineError::HobbyEnrichmentFailed { missing } => {
            assert_eq!(missing, &vec!["Underwater Basket Weaving".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(store.open_reader_count(), 0);
}

/// Unknown users never reach the geocoder
#[rstest]
#[tokio::test]
async fn test_unknown_user_skips_geocoding(#[future] store: Arc<InMemoryStore>) {
    let oracle = CountingOracle::new("Seoul, South Korea");
    let pipeline = pipeline(store.await, oracle.clone());

    let err = pipeline.handle(&request(7)).await.unwrap_err();
    assert!(matches!(err, PipelineError::UserNotFound { user_id: 7 }));
    assert_eq!(oracle.calls(), 0);
}

/// Duplicate hobbies are each resolved, in order
#[rstest]
#[tokio::test]
async fn test_duplicate_hobbies_and_birthday(#[future] store: Arc<InMemoryStore>) {
    let pipeline = pipeline(store.await, CountingOracle::new("Seoul, South Korea"));

    let prompt = pipeline.handle(&request(45)).await.unwrap();
    assert!(prompt.contains(
        "- Hobbies: Swimming: Seoul Olympic Park, Running: Han River Park, Seoul Forest, Swimming: Seoul Olympic Park"
    ));
    assert!(prompt.contains("- Age: 26"));
    assert!(prompt.contains("It's the user's birthday today"));
    assert!(!prompt.contains("The user has dietary restrictions"));
}

/// Same request against the same data gives the same bytes
#[rstest]
#[tokio::test]
async fn test_idempotent(#[future] store: Arc<InMemoryStore>) {
    let pipeline = pipeline(store.await, CountingOracle::new("Seoul Olympic Park, Seoul, South Korea"));

    let first = pipeline.handle(&request(42)).await.unwrap();
    let second = pipeline.handle(&request(42)).await.unwrap();
    assert_eq!(first, second);
}

/// Full stack: router, Google geocoder and text generator behind wiremock
#[rstest]
#[tokio::test]
async fn test_http_round_trip_with_generation(#[future] store: Arc<InMemoryStore>) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geocode/json"))
        .and(query_param("address", "123 Main St, Seoul"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "results": [{"formatted_address": "Seoul Olympic Park, Seoul, South Korea"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"generated_text": "1. Seoul Olympic Park"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let geocoder = GoogleGeocoder::new(
        build_client(5, 0).unwrap(),
        format!("{}/geocode", server.uri()),
        "test-key",
    );
    let generator = TextGenerator::new(
        build_client(5, 0).unwrap(),
        format!("{}/generate", server.uri()),
        Some("token".to_string()),
        GenerationParameters {
            adapter_id: "travel/1".to_string(),
            adapter_source: "pbase".to_string(),
            max_new_tokens: 1500,
            temperature: 0.6,
        },
    );
    let app = router(AppState {
        pipeline: Arc::new(pipeline(store.await, Arc::new(geocoder))),
        generator: Some(Arc::new(generator)),
    });

    let (status, body) = post(app, request_body(42)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["generated_text"], "1. Seoul Olympic Park");
    assert!(
        body["prompt"]
            .as_str()
            .unwrap()
            .contains("- Current Location: Seoul Olympic Park, Seoul, South Korea")
    );
}

/// A failing generator turns a composed prompt into a bad gateway
#[rstest]
#[tokio::test]
async fn test_generation_failure_is_bad_gateway(#[future] store: Arc<InMemoryStore>) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let generator = TextGenerator::new(
        build_client(5, 0).unwrap(),
        server.uri(),
        None,
        GenerationParameters {
            adapter_id: "travel/1".to_string(),
            adapter_source: "pbase".to_string(),
            max_new_tokens: 1500,
            temperature: 0.6,
        },
    );
    let app = router(AppState {
        pipeline: Arc::new(pipeline(store.await, CountingOracle::new("Seoul, South Korea"))),
        generator: Some(Arc::new(generator)),
    });

    let (status, body) = post(app, request_body(42)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], "failure");
    assert_eq!(
        body["message"],
        "An upstream service is unavailable. Please try again later."
    );
}

#[rstest]
#[case(43, StatusCode::UNPROCESSABLE_ENTITY)]
#[case(44, StatusCode::UNPROCESSABLE_ENTITY)]
#[case(99, StatusCode::NOT_FOUND)]
#[tokio::test]
async fn test_failure_status_codes(#[case] user_id: u64, #[case] expected: StatusCode) {
    let store = seeded_store().await;
    let app = router(AppState {
        pipeline: Arc::new(pipeline(store, CountingOracle::new("Seoul, South Korea"))),
        generator: None,
    });

    let (status, body) = post(app, request_body(user_id)).await;
    assert_eq!(status, expected);
    assert_eq!(body["status"], "failure");
}

#[rstest]
#[case(r#"{"user_id": 42"#)]
#[case(r#"{"user_id": 42, "start_date": "2026-10-20"}"#)]
#[case(r#"{"user_id":42,"start_date":"20/10/2026","end_date":"2026-10-25","address":"Seoul","budget":1}"#)]
#[case(r#"{"user_id":42,"start_date":"2026-10-26","end_date":"2026-10-25","address":"Seoul","budget":1}"#)]
#[case(r#"{"user_id":42,"start_date":"2026-10-20","end_date":"2026-10-25","address":"  ","budget":1}"#)]
#[case(r#"{"user_id":42,"start_date":"2026-10-20","end_date":"2026-10-25","address":"Seoul","budget":-5}"#)]
#[tokio::test]
async fn test_malformed_requests(#[case] body: &str) {
    let oracle = CountingOracle::new("Seoul, South Korea");
    let app = router(AppState {
        pipeline: Arc::new(pipeline(seeded_store().await, oracle.clone())),
        generator: None,
    });

    let (status, response) = post(app, body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["status"], "failure");
    assert_eq!(oracle.calls(), 0);
}

/// Directory handles are released after every request
#[rstest]
#[tokio::test]
async fn test_directory_readers_released(#[future] store: Arc<InMemoryStore>) {
    let store = store.await;
    store
        .set_locations("Running", &["Namsan".to_string()])
        .await
        .unwrap();
    let pipeline = pipeline(store.clone(), CountingOracle::new("Seoul, South Korea"));

    let _ = pipeline.handle(&request(45)).await.unwrap();
    let _ = pipeline.handle(&request(44)).await.unwrap_err();
    assert_eq!(store.open_reader_count(), 0);
}

/// Unknown users are answered without calling the text generator
#[rstest]
#[tokio::test]
async fn test_unknown_user_skips_generation(#[future] store: Arc<InMemoryStore>) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"generated_text": "unused"})),
        )
        .expect(0)
        .mount(&server)
        .await;

    let generator = TextGenerator::new(
        build_client(5, 0).unwrap(),
        format!("{}/generate", server.uri()),
        None,
        GenerationParameters {
            adapter_id: "travel/1".to_string(),
            adapter_source: "pbase".to_string(),
            max_new_tokens: 1500,
            temperature: 0.6,
        },
    );
    let oracle = CountingOracle::new("Seoul, South Korea");
    let app = router(AppState {
        pipeline: Arc::new(pipeline(store.await, oracle.clone())),
        generator: Some(Arc::new(generator)),
    });

    let (status, body) = post(app, request_body(99)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User with ID 99 not found.");
    assert_eq!(oracle.calls(), 0);
    server.verify().await;
}
