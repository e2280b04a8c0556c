use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::indicator::TypingIndicator;
use crate::providers::http_errors::api_request_error;

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";
const ENGINES_PATH: &str = "/v1/engines";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    model: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> ChatCompletionRequest<'a> {
    fn single_user_message(model: &'a str, content: &'a str) -> Self {
        Self {
            messages: vec![ChatMessage {
                role: "user",
                content,
            }],
            model,
        }
    }
}

/// Treats an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatCompletionResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub object: String,
    #[serde(deserialize_with = "null_as_default")]
    pub created: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(deserialize_with = "null_as_default")]
    pub choices: Vec<Choice>,
    #[serde(deserialize_with = "null_as_default")]
    pub usage: Usage,
}

impl ChatCompletionResponse {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.created, 0)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Choice {
    #[serde(deserialize_with = "null_as_default")]
    pub index: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub message: ChoiceMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChoiceMessage {
    #[serde(deserialize_with = "null_as_default")]
    pub role: String,
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Usage {
    #[serde(deserialize_with = "null_as_default")]
    pub prompt_tokens: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub completion_tokens: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

/// Status and raw body of the engines listing, reported verbatim.
#[derive(Debug)]
pub struct EngineListing {
    pub status: StatusCode,
    pub body: String,
}

fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

fn api_status_error(status: StatusCode, body: &[u8]) -> anyhow::Error {
    let detail = match serde_json::from_slice::<ApiErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.kind {
            Some(kind) => format!("{} ({})", envelope.error.message, kind),
            None => envelope.error.message,
        },
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    };
    anyhow!("Model request failed with status {}: {}", status, detail)
}

/// Sends one user message to the chat completions endpoint.
///
/// `indicator`, when given, is stopped as soon as response headers arrive (or
/// the request fails) and before the body is read.
pub async fn chat(
    client: &Client,
    cfg: &Config,
    model: &str,
    prompt: &str,
    indicator: Option<TypingIndicator>,
) -> Result<ChatCompletionResponse> {
    let api_url = endpoint_url(&cfg.base_url, CHAT_COMPLETIONS_PATH);
    let body = ChatCompletionRequest::single_user_message(model, prompt);
    debug!(
        api_url = %api_url,
        model = %model,
        prompt_len = prompt.len(),
        "sending chat completion request"
    );

    let sent = client
        .post(&api_url)
        .bearer_auth(&cfg.api_key)
        .json(&body)
        .send()
        .await;
    if let Some(indicator) = indicator {
        indicator.stop().await;
    }

    let response = sent.map_err(|err| {
        warn!(api_url = %api_url, model = %model, error = %err, "chat request failed");
        api_request_error(err, &api_url, cfg.request_timeout_secs)
    })?;

    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .with_context(|| format!("Failed to read response body from '{}'", api_url))?;

    if !status.is_success() {
        warn!(
            api_url = %api_url,
            model = %model,
            status = %status,
            response_body_len = bytes.len(),
            "chat endpoint returned non-success status"
        );
        return Err(api_status_error(status, &bytes));
    }

    let parsed: ChatCompletionResponse =
        serde_json::from_slice(&bytes).context("Failed to parse chat completion response")?;
    debug!(
        id = %parsed.id,
        model = %parsed.model,
        created = ?parsed.created_at(),
        choice_count = parsed.choices.len(),
        prompt_tokens = parsed.usage.prompt_tokens,
        completion_tokens = parsed.usage.completion_tokens,
        total_tokens = parsed.usage.total_tokens,
        "received chat completion response"
    );
    Ok(parsed)
}

/// Fetches the engines listing. Any HTTP status counts as success.
pub async fn list_engines(client: &Client, cfg: &Config) -> Result<EngineListing> {
    let api_url = endpoint_url(&cfg.base_url, ENGINES_PATH);
    debug!(api_url = %api_url, "probing engines endpoint");

    let response = client
        .get(&api_url)
        .bearer_auth(&cfg.api_key)
        .send()
        .await
        .map_err(|err| {
            warn!(api_url = %api_url, error = %err, "engines request failed");
            api_request_error(err, &api_url, cfg.request_timeout_secs)
        })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .with_context(|| format!("Failed to read response body from '{}'", api_url))?;
    debug!(status = %status, body_len = body.len(), "engines request completed");
    Ok(EngineListing { status, body })
}
