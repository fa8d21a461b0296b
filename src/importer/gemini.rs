//! Gemini vision slip reader.
//!
//! Implements the `SlipReader` trait using the Gemini `generateContent`
//! API. Handles prompt construction, response parsing (the model likes
//! to wrap JSON in code fences), and rate limiting with exponential
//! backoff.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::SlipReader;
use crate::types::BetDraft;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Maximum retries on rate limit / server errors.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (ms).
const BASE_BACKOFF_MS: u64 = 1000;

const EXTRACTION_PROMPT: &str = "\
You are reading a screenshot of a sports betting slip. Extract the bet \
details and respond with a single JSON object, nothing else, with these \
keys: \"date\" (DD/MM/YYYY), \"event\" (match/market description), \
\"odds\" (decimal number), \"stake\" (decimal number), \"book\" \
(bookmaker name), \"note\" (any extra market detail). Use null for \
anything not visible on the slip. Numbers use a decimal point.";

// ---------------------------------------------------------------------------
// API types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct GeminiSlipReader {
    http: Client,
    api_key: SecretString,
    model: String,
}

impl GeminiSlipReader {
    pub fn new(api_key: SecretString, model: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .context("Failed to build Gemini HTTP client")?;

        Ok(Self {
            http,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    /// Send a generateContent request with retry + backoff.
    async fn call_api(&self, request: &GenerateContentRequest) -> Result<String> {
        let url = format!(
            "{GEMINI_API_BASE}/{}:generateContent?key={}",
            self.model,
            urlencoding::encode(self.api_key.expose_secret()),
        );

        let mut last_error = None;

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let delay = BASE_BACKOFF_MS * 2u64.pow(attempt - 1);
                warn!(attempt, delay_ms = delay, "Retrying Gemini request");
                tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
            }

            let response = match self.http.post(&url).json(request).send().await {
                Ok(response) => response,
                Err(e) => {
                    last_error = Some(anyhow::anyhow!("Gemini request failed: {e}"));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                last_error = Some(anyhow::anyhow!("Gemini returned {status}"));
                continue;
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("Gemini returned {status}: {body}");
            }

            let parsed: GenerateContentResponse = response
                .json()
                .await
                .context("Failed to decode Gemini response")?;

            let text = parsed
                .candidates
                .into_iter()
                .next()
                .and_then(|c| c.content)
                .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
                .context("Gemini response contained no text")?;

            debug!(model = %self.model, chars = text.len(), "Slip text extracted");
            return Ok(text);
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Gemini request failed")))
    }
}

/// Pull the JSON object out of a model response.
///
/// The model is told to answer with bare JSON but routinely wraps it in
/// markdown fences or leads with prose; take everything between the
/// first `{` and the last `}`.
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Parse a model response into a draft.
pub fn parse_draft(text: &str) -> Result<BetDraft> {
    let json = extract_json(text)
        .with_context(|| format!("No JSON object in slip response: {text}"))?;
    let draft: BetDraft =
        serde_json::from_str(json).context("Slip response JSON did not match draft shape")?;
    Ok(draft)
}

#[async_trait]
impl SlipReader for GeminiSlipReader {
    async fn read_slip(&self, image_base64: &str, mime_type: &str) -> Result<BetDraft> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: Some(EXTRACTION_PROMPT.to_string()),
                        inline_data: None,
                    },
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: mime_type.to_string(),
                            data: image_base64.to_string(),
                        }),
                    },
                ],
            }],
        };

        let text = self.call_api(&request).await?;
        parse_draft(&text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
