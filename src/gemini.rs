use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// One schema-constrained call to the generative service.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub api_key: String,
    pub model: String,
    pub prompt: String,
    pub response_schema: Value,
}

/// Returns the raw response text; callers parse it against the schema they asked for.
#[async_trait]
pub trait GenerativeTransport: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<String>;
}

#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/{}:generateContent", self.base_url.trim_end_matches('/'), model)
    }
}

pub fn request_body(request: &GenerateRequest) -> Value {
    json!({
        "contents": [{
            "parts": [{"text": request.prompt}]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": request.response_schema,
        }
    })
}

#[async_trait]
impl GenerativeTransport for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let resp = self
            .client
            .post(self.endpoint(&request.model))
            .query(&[("key", request.api_key.as_str())])
            .json(&request_body(request))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Gemini API Error ({}): {}", status, error_text));
        }

        let gemini_resp: GeminiResponse = resp.json().await?;
        Ok(response_text(gemini_resp))
    }
}

// Concatenates the text parts of the first candidate; empty when there are none.
fn response_text(resp: GeminiResponse) -> String {
    resp.candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default()
}
