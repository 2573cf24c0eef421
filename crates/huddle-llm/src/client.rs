// Claude API client using reqwest-eventsource.
//
// Requests go to the Anthropic Messages API with `stream: true`. The text
// deltas of the Server-Sent Events are collected into one reply; huddle only
// ever needs the finished text (a JSON array of team names or a one-line
// announcement), so nothing is forwarded while the stream runs.

use futures_util::StreamExt;
use reqwest_eventsource::{Event, RequestBuilderExt};
use serde_json::Value;
use tracing::{debug, warn};

use huddle_core::config::Config;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ---------------------------------------------------------------------------
// ClaudeClient
// ---------------------------------------------------------------------------

/// Low-level Claude API client.
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
}

impl ClaudeClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_url(api_key, model, ANTHROPIC_API_URL.to_string())
    }

    /// Client pointed at a different Messages endpoint.
    pub fn with_url(api_key: String, model: String, url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            url,
        }
    }

    /// Send one message and return the concatenated reply text.
    ///
    /// Fails on a missing key, a non-success status, an `error` event, or a
    /// stream that ends before producing any text.
    pub async fn complete(&self, system: &str, user_content: &str, max_tokens: u32) -> anyhow::Result<String> {
        if self.api_key.is_empty() {
            anyhow::bail!("API key not configured");
        }

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "stream": true,
            "system": system,
            "messages": [{ "role": "user", "content": user_content }]
        });

        let request = self
            .http
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body);

        let mut es = request
            .eventsource()
            .map_err(|e| anyhow::anyhow!("Failed to create event source: {e}"))?;

        let mut reply = String::new();
        while let Some(event) = es.next().await {
            match event {
                Ok(Event::Open) => debug!("SSE connection opened"),
                Ok(Event::Message(msg)) => match msg.event.as_str() {
                    "content_block_delta" => {
                        if let Some(text) = parse_delta_text(&msg.data) {
                            reply.push_str(&text);
                        }
                    }
                    "message_delta" => {
                        if parse_stop_reason(&msg.data).as_deref() == Some("max_tokens") {
                            warn!(max_tokens, "reply truncated at the token limit");
                        }
                    }
                    "message_stop" => {
                        es.close();
                        debug!(chars = reply.chars().count(), "message_stop");
                        return Ok(reply);
                    }
                    "error" => {
                        es.close();
                        let message = parse_error_message(&msg.data)
                            .unwrap_or_else(|| "unknown error".to_string());
                        anyhow::bail!("API error: {message}");
                    }
                    other => debug!(event_type = other, "ignoring SSE event"),
                },
                Err(err) => {
                    es.close();
                    warn!(?err, "SSE stream error");
                    anyhow::bail!(describe_stream_error(&err));
                }
            }
        }

        // Stream ended without message_stop.
        if reply.is_empty() {
            anyhow::bail!("Stream ended unexpectedly without any content");
        }
        Ok(reply)
    }
}

// ---------------------------------------------------------------------------
// LlmClient wrapper
// ---------------------------------------------------------------------------

/// Either an active Claude client or disabled.
pub enum LlmClient {
    Active(ClaudeClient),
    /// No API key configured.
    Disabled,
}

impl LlmClient {
    /// `Active` if credentials carry a non-blank API key, otherwise `Disabled`.
    pub fn from_config(config: &Config) -> Self {
        match config.credentials.api_key() {
            Some(key) => LlmClient::Active(ClaudeClient::new(
                key.to_string(),
                config.llm.model.clone(),
            )),
            None => LlmClient::Disabled,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, LlmClient::Active(_))
    }

    /// Run one request to completion and return the full response text.
    pub async fn complete(&self, system: &str, user_content: &str, max_tokens: u32) -> anyhow::Result<String> {
        match self {
            LlmClient::Active(client) => client.complete(system, user_content, max_tokens).await,
            LlmClient::Disabled => anyhow::bail!("LLM not configured"),
        }
    }
}

// ---------------------------------------------------------------------------
// SSE JSON parsing helpers
// ---------------------------------------------------------------------------

/// `delta.text` from a `content_block_delta` event.
pub(crate) fn parse_delta_text(data: &str) -> Option<String> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("delta")?.get("text")?.as_str().map(|s| s.to_string())
}

/// `delta.stop_reason` from a `message_delta` event.
pub(crate) fn parse_stop_reason(data: &str) -> Option<String> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("delta")?
        .get("stop_reason")?
        .as_str()
        .map(|s| s.to_string())
}

/// `error.message` from an `error` event, e.g. `overloaded_error`.
pub(crate) fn parse_error_message(data: &str) -> Option<String> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("error")?
        .get("message")?
        .as_str()
        .map(|s| s.to_string())
}

fn describe_stream_error(err: &reqwest_eventsource::Error) -> String {
    match err {
        reqwest_eventsource::Error::InvalidStatusCode(status, _response) => {
            format!("API returned status {status}")
        }
        reqwest_eventsource::Error::Transport(e) => format!("Network error: {e}"),
        other => format!("Stream error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
