//! Anthropic messages API.

use super::{check_status, http_client, Pricing, VisionClient, VisionReply};
use crate::config::VisionConfig;
use crate::extractors::Method;
use crate::error::{Error, Result};
use crate::table::TokenUsage;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const PRICING: Pricing = Pricing::new(3.0, 15.0);

/// Claude vision client.
#[derive(Debug)]
pub struct AnthropicClient {
    client: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock<'a> {
    Image { source: ImageSource },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: &'static str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

impl AnthropicClient {
    /// Create a client from an API key and shared settings.
    pub fn new(api_key: String, config: &VisionConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: config
                .model_for(Method::ClaudeVision)
                .unwrap_or(DEFAULT_MODEL)
                .to_string(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Send requests to another endpoint (e.g. a proxy).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_request<'a>(&'a self, png: &[u8], prompt: &'a str) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: vec![Message {
                role: "user",
                content: vec![
                    ContentBlock::Image {
                        source: ImageSource {
                            kind: "base64",
                            media_type: "image/png",
                            data: STANDARD.encode(png),
                        },
                    },
                    ContentBlock::Text { text: prompt },
                ],
            }],
        }
    }
}

fn into_reply(response: MessagesResponse) -> Result<VisionReply> {
    let text = response
        .content
        .into_iter()
        .find_map(|block| block.text)
        .ok_or_else(|| Error::ResponseFormat("Claude returned no text content".to_string()))?;
    Ok(VisionReply {
        text,
        usage: response
            .usage
            .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens)),
    })
}

impl VisionClient for AnthropicClient {
    fn provider(&self) -> &'static str {
        "Anthropic"
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
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()?;
        let response: MessagesResponse = check_status(self.provider(), response)?.json()?;
        into_reply(response)
    }
}
