use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, Result};

/// A hosted text-generation service: prompt in, response text out.
#[async_trait]
pub trait SummaryModel: Send + Sync {
    /// Sends `prompt` once and returns the model's text verbatim.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

/// Google Gemini `generateContent` client.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build model HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            api_base: api_base.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            config.gemini_api_base.clone(),
            config.model_timeout,
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl SummaryModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        debug!(model = %self.model, prompt_chars = prompt.chars().count(), "calling Gemini");
        let res = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Model(format!("Gemini request failed: {}", e.without_url())))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| AppError::Model(format!("Failed to read Gemini response: {}", e.without_url())))?;

        let parsed: Option<GenerateResponse> = serde_json::from_str(&text).ok();

        if let Some(error) = parsed.as_ref().and_then(|r| r.error.as_ref()) {
            warn!(%status, "Gemini returned an error");
            return Err(AppError::Model(format!("Gemini API error ({}): {}", status, error.message)));
        }
        if !status.is_success() {
            warn!(%status, "Gemini returned a non-success status");
            return Err(AppError::Model(format!("Gemini API error ({}): {}", status, text)));
        }

        let parsed = parsed
            .ok_or_else(|| AppError::Model("Invalid response format from Gemini".to_string()))?;

        let reply: String = parsed
            .candidates
            .into_iter()
            .flatten()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
            .unwrap_or_default();

        if reply.is_empty() {
            return Err(AppError::Model("Gemini response contained no text".to_string()));
        }

        Ok(reply)
    }
}
