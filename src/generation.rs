//! Client for the text generation provider that turns prompts into
//! recommendations.

use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::UpstreamError;

/// Generation parameters sent with every prompt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParameters {
    pub adapter_id: String,
    pub adapter_source: String,
    pub max_new_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: &'a GenerationParameters,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    generated_text: Option<String>,
}

pub struct TextGenerator {
    client: ClientWithMiddleware,
    endpoint: String,
    api_token: Option<String>,
    parameters: GenerationParameters,
}

impl TextGenerator {
    #[must_use]
    pub fn new(
        client: ClientWithMiddleware,
        endpoint: impl Into<String>,
        api_token: Option<String>,
        parameters: GenerationParameters,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_token,
            parameters,
        }
    }

    #[instrument(name = "generate_text", skip_all, fields(prompt_len = prompt.len()))]
    pub async fn generate(&self, prompt: &str) -> Result<String, UpstreamError> {
        let body = GenerateRequest {
            inputs: prompt,
            parameters: &self.parameters,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status()));
        }

        let parsed: GenerateResponse = response.json().await?;
        let text = parsed
            .generated_text
            .ok_or(UpstreamError::MissingField("generated_text"))?;
        debug!("Generated {} chars", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::build_client;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn parameters() -> GenerationParameters {
        GenerationParameters {
            adapter_id: "travel-model/2".to_string(),
            adapter_source: "pbase".to_string(),
            max_new_tokens: 1500,
            temperature: 0.5,
        }
    }

    fn generator(server: &MockServer, token: Option<&str>) -> TextGenerator {
        TextGenerator::new(
            build_client(5, 0).unwrap(),
            format!("{}/generate", server.uri()),
            token.map(str::to_string),
            parameters(),
        )
    }

    #[tokio::test]
    async fn test_generate_sends_prompt_and_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .and(header("authorization", "Bearer secret"))
            .and(body_json(serde_json::json!({
                "inputs": "Recommend places",
                "parameters": {
                    "adapter_id": "travel-model/2",
                    "adapter_source": "pbase",
                    "max_new_tokens": 1500,
                    "temperature": 0.5
                }
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"generated_text": "1. Gyeongbokgung"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let text = generator(&server, Some("secret"))
            .generate("Recommend places")
            .await
            .unwrap();
        assert_eq!(text, "1. Gyeongbokgung");
    }

    #[tokio::test]
    async fn test_missing_generated_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = generator(&server, None).generate("x").await.unwrap_err();
        assert!(matches!(err, UpstreamError::MissingField("generated_text")));
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = generator(&server, None).generate("x").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Decode(_)));
    }
}
