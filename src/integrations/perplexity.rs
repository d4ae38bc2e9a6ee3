//! Perplexity chat completions, used to explain a stock's move.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{check_status, decode_error, http_error, IntegrationError, LlmApi};

const SERVICE: &str = "Perplexity";
const PERPLEXITY_API_URL: &str = "https://api.perplexity.ai/chat/completions";
pub const MODEL: &str = "sonar";

pub struct PerplexityClient {
    client: reqwest::Client,
    api_key: String,
}

impl PerplexityClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

pub(crate) fn chat_request<'a>(system: &'a str, prompt: &'a str) -> ChatRequest<'a> {
    ChatRequest {
        model: MODEL,
        messages: vec![
            ChatMessage {
                role: "system",
                content: system,
            },
            ChatMessage {
                role: "user",
                content: prompt,
            },
        ],
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// First choice's text from a completion body.
pub(crate) fn first_choice(body: &str) -> Result<String, IntegrationError> {
    let parsed: ChatResponse = serde_json::from_str(body).map_err(|e| decode_error(SERVICE, e))?;
    parsed
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content.trim().to_string())
        .ok_or_else(|| decode_error(SERVICE, "no choices in response"))
}

#[async_trait]
impl LlmApi for PerplexityClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, IntegrationError> {
        let resp = self
            .client
            .post(PERPLEXITY_API_URL)
            .bearer_auth(&self.api_key)
            .json(&chat_request(system, prompt))
            .send()
            .await
            .map_err(|e| http_error(SERVICE, e))?;
        let resp = check_status(SERVICE, resp).await?;
        let body = resp.text().await.map_err(|e| http_error(SERVICE, e))?;
        first_choice(&body)
    }
}
