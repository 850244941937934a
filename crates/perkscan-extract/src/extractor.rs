//! Vision-model extractor backends.

use std::path::Path;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde_json::{Value, json};
use tracing::debug;

use crate::{ExtractError, Result};

/// The model transcribes verbatim text and never computes numbers; the
/// rule engine owns all numeric derivation. Keeping arithmetic out of
/// the model makes the numeric fields reproducible.
const SYSTEM_PROMPT: &str = "\
You are a data extraction tool.
Extract perks from the screenshot.

Return ONLY valid JSON matching the schema.

Rules:
- Create ONE item per offer shown.
- company_name: brand/company name shown next to the offer
- offer_text: exact offer headline text (verbatim)
- expiry_text: exact expiry text shown (verbatim) or null
- conditions_text: any other constraints shown (verbatim) or null
- DO NOT compute numbers. Do NOT fill minimum_spend/money_back/percentage_value/cap_amount.
- confidence: 0..1 (how sure you captured the text correctly)
- overall_confidence: 0..1";

/// Trait for perk extraction backends.
///
/// Abstracts over the vision-model invocation so the pipeline can be
/// exercised with fixtures and the model service swapped out. Retry and
/// timeout policy belong to implementations, not to the pipeline.
#[async_trait]
pub trait PerkExtractor: Send + Sync {
    /// Run extraction on one image and return the raw JSON text
    /// produced by the model.
    async fn extract(&self, image_path: &Path, model: &str, temperature: f64) -> Result<String>;
}

/// Extractor backed by an Ollama chat endpoint.
pub struct OllamaExtractor {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaExtractor {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// JSON schema passed as the chat `format`, pinning the response to
    /// the raw batch shape. No numeric fields appear here.
    fn response_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "perks": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "company_name": {"type": "string"},
                            "offer_text": {"type": "string"},
                            "expiry_text": {"type": ["string", "null"]},
                            "conditions_text": {"type": ["string", "null"]},
                            "confidence": {"type": "number"}
                        },
                        "required": ["company_name", "offer_text", "confidence"]
                    }
                },
                "overall_confidence": {"type": "number"}
            },
            "required": ["perks", "overall_confidence"]
        })
    }
}

#[async_trait]
impl PerkExtractor for OllamaExtractor {
    async fn extract(&self, image_path: &Path, model: &str, temperature: f64) -> Result<String> {
        let image_bytes = tokio::fs::read(image_path)
            .await
            .map_err(|e| ExtractError::Request(format!("reading {}: {e}", image_path.display())))?;
        let image_b64 = BASE64.encode(image_bytes);

        let payload = json!({
            "model": model,
            "stream": false,
            "format": Self::response_schema(),
            "options": {"temperature": temperature},
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {
                    "role": "user",
                    "content": "Extract perks from this screenshot. Return JSON only.",
                    "images": [image_b64]
                }
            ]
        });

        let url = format!("{}/api/chat", self.base_url.trim_end_matches('/'));
        debug!(%url, model, temperature, "calling extractor");

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ExtractError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractError::Request(format!("status {status}: {body}")));
        }

        let root: Value = response
            .json()
            .await
            .map_err(|e| ExtractError::Request(e.to_string()))?;

        root.get("message")
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| {
                ExtractError::MalformedResponse("missing message.content in chat response".into())
            })
    }
}
