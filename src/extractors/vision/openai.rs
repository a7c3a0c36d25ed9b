//! OpenAI chat completions API.

use super::{check_status, http_client, Pricing, VisionClient, VisionReply};
use crate::config::VisionConfig;
use crate::extractors::Method;
use crate::error::{Error, Result};
use crate::table::TokenUsage;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

/// GPT-4o vision client.
#[derive(Debug)]
pub struct OpenAiClient {
    client: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

/// Prices per million tokens for the models this client is used with.
fn pricing_for(model: &str) -> Pricing {
    if model.starts_with("gpt-4o-mini") {
        Pricing::new(0.15, 0.60)
    } else {
        Pricing::new(2.50, 10.00)
    }
}

impl OpenAiClient {
    /// Create a client from an API key and shared settings.
    pub fn new(api_key: String, config: &VisionConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: config
                .model_for(Method::Gpt4Vision)
                .unwrap_or(DEFAULT_MODEL)
                .to_string(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Send requests to another endpoint (e.g. Azure or a proxy).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_request<'a>(&'a self, png: &[u8], prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:image/png;base64,{}", STANDARD.encode(png)),
                        },
                    },
                ],
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

fn into_reply(response: ChatResponse) -> Result<VisionReply> {
    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| Error::ResponseFormat("OpenAI returned no message content".to_string()))?;
    Ok(VisionReply {
        text,
        usage: response
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens)),
    })
}

impl VisionClient for OpenAiClient {
    fn provider(&self) -> &'static str {
        "OpenAI"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn pricing(&self) -> Pricing {
        pricing_for(&self.model)
    }

    fn send(&self, png: &[u8], prompt: &str) -> Result<VisionReply> {
        let request = self.build_request(png, prompt);
        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?;
        let response: ChatResponse = check_status(self.provider(), response)?.json()?;
        into_reply(response)
    }
}
