//! Checklist generation backends: the generator contract plus the Gemini HTTP client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::GeminiConfig;

/// Message surfaced for every backend failure.
pub const CHECKLIST_FAILURE_MESSAGE: &str =
    "Failed to generate security checklist. Please check your API key and connection.";

/// Failure reported by a checklist generator. Carries a user-facing message only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GenerationError {
    message: String,
}

impl GenerationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn checklist_failed() -> Self {
        Self::new(CHECKLIST_FAILURE_MESSAGE)
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Produces a short ordered checklist for one layer.
#[async_trait]
pub trait ChecklistGenerator: Send + Sync {
    async fn generate_checklist(
        &self,
        layer_name: &str,
        layer_description: &str,
    ) -> Result<Vec<String>, GenerationError>;
}

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("API_KEY environment variable not set")]
    MissingApiKey,
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("response contained no candidate text")]
    EmptyResponse,
    #[error("response text is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Invalid checklist format received from API.")]
    InvalidChecklist,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn checklist(prompt: String) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: Some(prompt) }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: checklist_schema(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, parts concatenated.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

pub fn checklist_prompt(layer_name: &str, layer_description: &str) -> String {
    format!(
        "Based on the following description of the \"{}\" layer in a defense-in-depth security model, \
generate a simple, actionable security checklist with 3 to 5 items. The items should be high-level best practices.\n\n\
Description: \"{}\"",
        layer_name, layer_description
    )
}

fn checklist_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "checklist": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "A list of security checklist items."
            }
        }
    })
}

/// Extract the `checklist` string array from the model's JSON text.
pub fn parse_checklist(text: &str) -> Result<Vec<String>, GeminiError> {
    let value: serde_json::Value = serde_json::from_str(text.trim())?;
    let items = value
        .get("checklist")
        .and_then(|v| v.as_array())
        .ok_or(GeminiError::InvalidChecklist)?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or(GeminiError::InvalidChecklist)
        })
        .collect()
}

pub struct GeminiBackend {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    pub fn new(config: GeminiConfig) -> Result<Self, GeminiError> {
        if config.api_key.trim().is_empty() {
            error!("API_KEY environment variable not set");
            return Err(GeminiError::MissingApiKey);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(GeminiError::Client)?;

        Ok(Self { http, config })
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn request_checklist(
        &self,
        layer_name: &str,
        layer_description: &str,
    ) -> Result<Vec<String>, GeminiError> {
        let body = GenerateContentRequest::checklist(checklist_prompt(layer_name, layer_description));

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateContentResponse = response.json().await?;
        let Some(text) = payload.text() else {
            let finish_reason = payload
                .candidates
                .first()
                .and_then(|c| c.finish_reason.as_deref());
            warn!(?finish_reason, "checklist response carried no text");
            return Err(GeminiError::EmptyResponse);
        };
        debug!(chars = text.len(), "received checklist response");
        parse_checklist(&text)
    }
}

#[async_trait]
impl ChecklistGenerator for GeminiBackend {
    async fn generate_checklist(
        &self,
        layer_name: &str,
        layer_description: &str,
    ) -> Result<Vec<String>, GenerationError> {
        self.request_checklist(layer_name, layer_description)
            .await
            .map_err(|e| {
                error!(layer = layer_name, model = %self.config.model, error = %e, "error generating checklist");
                GenerationError::checklist_failed()
            })
    }
}

/// Used with `--offline`; every request fails.
pub struct OfflineBackend;

#[async_trait]
impl ChecklistGenerator for OfflineBackend {
    async fn generate_checklist(
        &self,
        layer_name: &str,
        _layer_description: &str,
    ) -> Result<Vec<String>, GenerationError> {
        warn!(layer = layer_name, "checklist requested while offline");
        Err(GenerationError::checklist_failed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Bytes,
        extract::State,
        http::{HeaderMap, StatusCode, Uri},
        Router,
    };
    use std::sync::Arc;
    use tokio::{net::TcpListener, sync::Mutex};

    const CHECKLIST_RESPONSE: &str = r#"{
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{"text": "{\"checklist\": [\"Segment networks\", \"Deny by default\", \"Log flows\"]}"}]
            },
            "finishReason": "STOP"
        }]
    }"#;

    struct RecordedRequest {
        path: String,
        api_key: Option<String>,
        body: serde_json::Value,
    }

    #[derive(Clone)]
    struct GeminiStub {
        status: StatusCode,
        body: &'static str,
        requests: Arc<Mutex<Vec<RecordedRequest>>>,
    }

    async fn handle_generate(
        State(stub): State<GeminiStub>,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    ) -> (StatusCode, String) {
        let api_key = headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        stub.requests.lock().await.push(RecordedRequest {
            path: uri.path().to_string(),
            api_key,
            body,
        });
        (stub.status, stub.body.to_string())
    }

    async fn spawn_gemini_stub(
        status: StatusCode,
        body: &'static str,
    ) -> (GeminiBackend, Arc<Mutex<Vec<RecordedRequest>>>) {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
        let addr = listener.local_addr().expect("stub addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let stub = GeminiStub {
            status,
            body,
            requests: requests.clone(),
        };
        let app = Router::new().fallback(handle_generate).with_state(stub);
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let backend = GeminiBackend::new(GeminiConfig {
            base_url: format!("http://{addr}/v1beta"),
            ..config_with_key("test-key")
        })
        .expect("backend");
        (backend, requests)
    }

    fn config_with_key(key: &str) -> GeminiConfig {
        GeminiConfig {
            api_key: key.to_string(),
            ..GeminiConfig::default()
        }
    }

    #[test]
    fn test_response_deserialize() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "{\"checklist\": [\"Enable segmentation\", \"Deny by default\"]}"}]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {"totalTokenCount": 42}
        }"#;

        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.candidates.len(), 1);
        assert_eq!(response.candidates[0].finish_reason.as_deref(), Some("STOP"));
        let items = parse_checklist(&response.text().unwrap()).unwrap();
        assert_eq!(items, vec!["Enable segmentation", "Deny by default"]);
    }

    #[test]
    fn test_response_text_joins_parts() {
        let json = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "{\"checklist\": "}, {"text": "[\"a\"]}"}]}
            }]
        }"#;

        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.text().as_deref(), Some("{\"checklist\": [\"a\"]}"));
    }

    #[test]
    fn test_response_without_candidates() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(response.text().is_none());

        let blank: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"content": {"parts": [{"text": "  "}]}}]}"#)
                .unwrap();
        assert!(blank.text().is_none());
    }

    #[test]
    fn test_parse_checklist_trims_whitespace() {
        let items = parse_checklist("\n  {\"checklist\": [\"one\", \"two\", \"three\"]}  \n").unwrap();
        assert_eq!(items, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_parse_checklist_missing_field() {
        let err = parse_checklist(r#"{"items": ["one"]}"#).unwrap_err();
        assert!(matches!(err, GeminiError::InvalidChecklist));
    }

    #[test]
    fn test_parse_checklist_wrong_shape() {
        assert!(matches!(
            parse_checklist(r#"{"checklist": "one"}"#).unwrap_err(),
            GeminiError::InvalidChecklist
        ));
        assert!(matches!(
            parse_checklist(r#"{"checklist": ["one", 2]}"#).unwrap_err(),
            GeminiError::InvalidChecklist
        ));
    }

    #[test]
    fn test_parse_checklist_invalid_json() {
        let err = parse_checklist("Here is your checklist: ...").unwrap_err();
        assert!(matches!(err, GeminiError::InvalidJson(_)));
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = GenerateContentRequest::checklist("prompt".to_string());
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["contents"][0]["parts"][0]["text"], "prompt");
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(
            value["generationConfig"]["responseSchema"]["properties"]["checklist"]["items"]["type"],
            "STRING"
        );
    }

    #[test]
    fn test_prompt_mentions_layer() {
        let prompt = checklist_prompt("Network", "Limits communication between resources.");

        assert!(prompt.contains("\"Network\" layer"));
        assert!(prompt.contains("3 to 5 items"));
        assert!(prompt.ends_with("Description: \"Limits communication between resources.\""));
    }

    #[test]
    fn test_backend_requires_api_key() {
        let result = GeminiBackend::new(config_with_key("   "));
        assert!(matches!(result, Err(GeminiError::MissingApiKey)));
    }

    #[test]
    fn test_endpoint_format() {
        let backend = GeminiBackend::new(GeminiConfig {
            base_url: "http://localhost:8080/v1beta/".to_string(),
            ..config_with_key("key")
        })
        .unwrap();

        assert_eq!(
            backend.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_reports_fixed_message() {
        let backend = GeminiBackend::new(GeminiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..config_with_key("key")
        })
        .unwrap();

        let err = backend.generate_checklist("Network", "desc").await.unwrap_err();
        assert_eq!(err.message(), CHECKLIST_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn test_offline_backend_fails() {
        let err = OfflineBackend
            .generate_checklist("Data", "desc")
            .await
            .unwrap_err();

        assert_eq!(err, GenerationError::checklist_failed());
        assert_eq!(err.to_string(), CHECKLIST_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn test_gemini_success_returns_items() {
        let (backend, requests) = spawn_gemini_stub(StatusCode::OK, CHECKLIST_RESPONSE).await;

        let items = backend
            .generate_checklist("Network", "Limits communication between resources.")
            .await
            .unwrap();

        assert_eq!(items, vec!["Segment networks", "Deny by default", "Log flows"]);

        let requests = requests.lock().await;
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.path, "/v1beta/models/gemini-2.5-flash:generateContent");
        assert_eq!(request.api_key.as_deref(), Some("test-key"));
        let prompt = request.body["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap();
        assert!(prompt.contains("\"Network\" layer"));
        assert_eq!(
            request.body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_gemini_forbidden_reports_fixed_message() {
        let (backend, requests) =
            spawn_gemini_stub(StatusCode::FORBIDDEN, r#"{"error": {"code": 403}}"#).await;

        let err = backend
            .request_checklist("Data", "desc")
            .await
            .unwrap_err();
        assert!(matches!(err, GeminiError::Status { status: 403, .. }));

        let err = backend.generate_checklist("Data", "desc").await.unwrap_err();
        assert_eq!(err.message(), CHECKLIST_FAILURE_MESSAGE);
        assert_eq!(requests.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_gemini_without_candidates_reports_fixed_message() {
        let (backend, _requests) = spawn_gemini_stub(StatusCode::OK, "{}").await;

        let err = backend
            .request_checklist("Compute", "desc")
            .await
            .unwrap_err();
        assert!(matches!(err, GeminiError::EmptyResponse));

        let err = backend.generate_checklist("Compute", "desc").await.unwrap_err();
        assert_eq!(err.message(), CHECKLIST_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn test_gemini_malformed_body_reports_fixed_message() {
        let (backend, _requests) = spawn_gemini_stub(StatusCode::OK, "<html>oops</html>").await;

        let err = backend
            .request_checklist("Perimeter", "desc")
            .await
            .unwrap_err();
        assert!(matches!(err, GeminiError::Transport(_)));

        let err = backend.generate_checklist("Perimeter", "desc").await.unwrap_err();
        assert_eq!(err.message(), CHECKLIST_FAILURE_MESSAGE);
    }
}
