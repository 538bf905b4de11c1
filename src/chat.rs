//! The assistant chat panel.
//!
//! Unlike the polled panels, chat is strictly request/response: one POST to
//! the chatbot endpoint per submitted message. While a request is in flight
//! the transcript shows a thinking indicator and input is held back, so there
//! is never more than one outstanding exchange.

use serde_json::{json, Value};

use crate::fetch::FetchError;

/// Who said a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Bot,
}

/// One line of the transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    /// Error replies render dimmed/red, like the error bubble in the widget.
    pub is_error: bool,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            is_error: false,
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Bot,
            text: text.into(),
            is_error: false,
        }
    }

    pub fn bot_error(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Bot,
            text: text.into(),
            is_error: true,
        }
    }
}

/// A parsed chatbot response.
#[derive(Debug, Clone, PartialEq)]
pub struct BotReply {
    pub text: String,
    pub suggestions: Vec<String>,
    pub is_error: bool,
}

/// Fallback shown when the bot's answer has no recognisable shape.
const GENERIC_ERROR: &str = "Sorry, I encountered an error. Please try again.";

/// Interpret a chatbot response body.
///
/// The backend has answered with two shapes over time: `{"message": …}` with
/// optional `suggestions`, and `{"response": …}`; errors come back as
/// `{"error": …}` at any status. All three are accepted here.
pub fn parse_reply(value: &Value) -> BotReply {
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        return BotReply {
            text: error.to_string(),
            suggestions: Vec::new(),
            is_error: true,
        };
    }

    let text = value
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| value.get("response").and_then(Value::as_str));

    let suggestions = value
        .get("suggestions")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    match text {
        Some(text) => BotReply {
            text: text.to_string(),
            suggestions,
            is_error: false,
        },
        None => BotReply {
            text: GENERIC_ERROR.to_string(),
            suggestions: Vec::new(),
            is_error: true,
        },
    }
}

/// Posts user messages to the chatbot endpoint.
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ChatClient {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(FetchError::Network)?;
        Ok(Self {
            client,
            endpoint: format!("{base_url}/chatbot/chat"),
        })
    }

    /// Send one message and interpret the bot's answer.
    ///
    /// The chatbot route reports its own failures as a JSON `error` body with
    /// a non-success status, so the body is interpreted whenever it parses;
    /// only a JSON-less non-success response becomes a status error.
    pub async fn send(&self, message: &str) -> Result<BotReply, FetchError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "message": message }))
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = response.status();
        let body = response.text().await.map_err(FetchError::Network)?;

        match serde_json::from_str::<Value>(&body) {
            Ok(value) => Ok(parse_reply(&value)),
            Err(_) if !status.is_success() => Err(FetchError::Status {
                status,
                url: self.endpoint.clone(),
            }),
            Err(source) => Err(FetchError::Parse {
                url: self.endpoint.clone(),
                source,
            }),
        }
    }
}
