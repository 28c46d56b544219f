use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("generate request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("generate failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("no text in Gemini response")]
    EmptyReply,
    #[error("failed to parse Gemini JSON: {source} - text: {text}")]
    Json {
        source: serde_json::Error,
        text: String,
    },
    #[error("generation is not configured")]
    Disabled,
}

/// Free-form text completion.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, GeminiError>;
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }

    /// Points the client at another host serving the same API.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, GeminiError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": { "temperature": temperature }
        });

        let res = self.client.post(&url).json(&body).send().await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(GeminiError::Status { status, body });
        }

        let json: Value = res.json().await?;
        reply_text(&json)
    }
}

/// Stand-in used when no API key is configured.
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    async fn generate(&self, _prompt: &str, _temperature: f32) -> Result<String, GeminiError> {
        Err(GeminiError::Disabled)
    }
}

/// Extracts `candidates[0].content.parts[0].text`.
pub fn reply_text(response: &Value) -> Result<String, GeminiError> {
    response["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(GeminiError::EmptyReply)
}

/// Parses a JSON object out of model text, tolerating markdown code fences.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, GeminiError> {
    let clean_text = text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    serde_json::from_str(clean_text).map_err(|source| GeminiError::Json {
        source,
        text: clean_text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde::Deserialize;

    /// Serves `reply` for every request and returns the base URL.
    async fn stub_server(status: StatusCode, reply: Value) -> String {
        let app = axum::Router::new().fallback(move || {
            let reply = reply.clone();
            async move { (status, axum::Json(reply)) }
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn client_returns_candidate_text() {
        let base_url = stub_server(
            StatusCode::OK,
            json!({ "candidates": [{ "content": { "parts": [{ "text": "Walk after dinner.\n" }] } }] }),
        )
        .await;
        let client = GeminiClient::new("test-key", "gemini-test").with_base_url(base_url);
        assert_eq!(client.generate("hi", 0.7).await.unwrap(), "Walk after dinner.");
    }

    #[tokio::test]
    async fn client_reports_upstream_status() {
        let base_url = stub_server(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "error": { "message": "overloaded" } }),
        )
        .await;
        let client = GeminiClient::new("test-key", "gemini-test").with_base_url(base_url);
        match client.generate("hi", 0.7).await {
            Err(GeminiError::Status { status, body }) => {
                assert_eq!(status, 503);
                assert!(body.contains("overloaded"));
            }
            other => panic!("expected a status error, got {other:?}"),
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Idea {
        name: String,
        calories: f64,
    }

    #[test]
    fn reply_text_reads_first_candidate() {
        let response = json!({
            "candidates": [{ "content": { "parts": [{ "text": "  Drink more water!\n" }] } }]
        });
        assert_eq!(reply_text(&response).unwrap(), "Drink more water!");
    }

    #[test]
    fn reply_text_without_candidates_is_error() {
        let response = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert!(matches!(reply_text(&response), Err(GeminiError::EmptyReply)));
    }

    #[test]
    fn parse_json_strips_code_fences() {
        let text = "```json\n{\"name\": \"Lentil soup\", \"calories\": 420}\n```";
        let idea: Idea = parse_json_reply(text).unwrap();
        assert_eq!(
            idea,
            Idea {
                name: "Lentil soup".into(),
                calories: 420.0
            }
        );
    }

    #[test]
    fn parse_json_reports_text_on_failure() {
        let err = parse_json_reply::<Idea>("not json").unwrap_err();
        assert!(err.to_string().contains("not json"));
    }
}
