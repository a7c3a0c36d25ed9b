//! Google Gemini generateContent API.
//!
//! Requests are priced from `usageMetadata` token counts at $0.075 / $0.30
//! per million input / output tokens. The flat per-image estimate only
//! applies to replies without usage.

use super::{check_status, http_client, Pricing, VisionClient, VisionReply};
use crate::config::VisionConfig;
use crate::extractors::Method;
use crate::error::{Error, Result};
use crate::table::TokenUsage;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const PRICING: Pricing = Pricing::new(0.075, 0.30);

/// Gemini vision client.
#[derive(Debug)]
pub struct GeminiClient {
    client: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    Text(&'a str),
    InlineData(InlineData),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

impl GeminiClient {
    /// Create a client from an API key and shared settings.
    pub fn new(api_key: String, config: &VisionConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: config
                .model_for(Method::GeminiVision)
                .unwrap_or(DEFAULT_MODEL)
                .to_string(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Send requests to another endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }

    fn build_request<'a>(&self, png: &[u8], prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text(prompt),
                    Part::InlineData(InlineData {
                        mime_type: "image/png",
                        data: STANDARD.encode(png),
                    }),
                ],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        }
    }
}

fn into_reply(response: GenerateResponse) -> Result<VisionReply> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .ok_or_else(|| Error::ResponseFormat("Gemini returned no candidates".to_string()))?;
    Ok(VisionReply {
        text,
        usage: response
            .usage_metadata
            .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count)),
    })
}

impl VisionClient for GeminiClient {
    fn provider(&self) -> &'static str {
        "Google"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn pricing(&self) -> Pricing {
        PRICING
    }

    fn send(&self, png: &[u8], prompt: &str) -> Result<VisionReply> {
        let request = self.build_request(png, prompt);
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()?;
        let response: GenerateResponse = check_status(self.provider(), response)?.json()?;
        into_reply(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::vision::FLAT_IMAGE_ESTIMATE;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let client = GeminiClient::new("key".to_string(), &VisionConfig::default()).unwrap();
        let value = serde_json::to_value(client.build_request(b"png", "find tables")).unwrap();

        assert_eq!(value["contents"][0]["parts"][0], json!({"text": "find tables"}));
        assert_eq!(
            value["contents"][0]["parts"][1],
            json!({"inlineData": {"mimeType": "image/png", "data": "cG5n"}})
        );
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 4096);
    }

    #[test]
    fn test_endpoint() {
        let client = GeminiClient::new("key".to_string(), &VisionConfig::default())
            .unwrap()
            .with_base_url("http://localhost:8080/models");
        assert_eq!(
            client.endpoint(),
            "http://localhost:8080/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_endpoint_uses_gemini_override_only() {
        let config = VisionConfig::default()
            .with_model(Method::ClaudeVision, "claude-3-opus-20240229")
            .with_model(Method::GeminiVision, "gemini-1.5-pro");
        let client = GeminiClient::new("key".to_string(), &config)
            .unwrap()
            .with_base_url("http://localhost:8080/models");
        assert_eq!(client.endpoint(), "http://localhost:8080/models/gemini-1.5-pro:generateContent");
    }

    #[test]
    fn test_reply_joins_parts() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "{\"tables\""}, {"text": ": []}"}]}}],
            "usageMetadata": {"promptTokenCount": 300, "candidatesTokenCount": 20}
        }))
        .unwrap();
        let reply = into_reply(response).unwrap();
        assert_eq!(reply.text, "{\"tables\": []}");
        assert_eq!(reply.usage, Some(TokenUsage::new(300, 20)));
    }

    #[test]
    fn test_reported_usage_priced_by_tokens() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "{}"}]}}],
            "usageMetadata": {"promptTokenCount": 1_000_000, "candidatesTokenCount": 1_000_000}
        }))
        .unwrap();
        let cost = PRICING.cost(into_reply(response).unwrap().usage);
        assert!((cost - 0.375).abs() < 1e-12);
        assert_ne!(cost, FLAT_IMAGE_ESTIMATE);
    }

    #[test]
    fn test_flat_estimate_without_usage() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "{}"}]}}]
        }))
        .unwrap();
        let reply = into_reply(response).unwrap();
        assert_eq!(PRICING.cost(reply.usage), FLAT_IMAGE_ESTIMATE);
    }
}
