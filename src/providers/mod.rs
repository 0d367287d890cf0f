//! Completion endpoint abstraction.
//!
//! The pipeline talks to exactly one endpoint per engine. Adapters report
//! transport failures as `anyhow` errors and hand back whatever content the
//! first choice carried; deciding that "no content" is a failure is the
//! caller's job.

pub mod openai;
pub mod scripted;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use openai::OpenAiCompatibleProvider;
pub use scripted::{ScriptedProvider, ScriptedReply};

/// Hard ceiling on generated tokens for every completion the pipeline issues.
pub const MAX_OUTPUT_TOKENS: u32 = 95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// One request to the completion endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    /// Rendered prompt as system part, plus the user part when there is one.
    /// Without a user part the prompt itself travels as the user message. An
    /// empty user message counts as no user message.
    pub fn new(model: &str, prompt: &str, user_message: Option<&str>, temperature: f32) -> Self {
        let messages = match user_message.filter(|user| !user.is_empty()) {
            Some(user) => vec![ChatMessage::system(prompt), ChatMessage::user(user)],
            None => vec![ChatMessage::user(prompt)],
        };
        Self {
            model: model.to_string(),
            messages,
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature,
        }
    }
}

/// What the endpoint returned for the first choice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub content: Option<String>,
    pub tokens_used: Option<u64>,
}

#[async_trait]
pub trait Provider: Send + Sync {
    /// Short identifier used in logs and metrics (e.g. "openai").
    fn name(&self) -> &str;

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_with_user_message_has_two_parts() {
        let req = CompletionRequest::new("m", "prompt", Some("hello"), 0.5);
        assert_eq!(req.messages, vec![ChatMessage::system("prompt"), ChatMessage::user("hello")]);
        assert_eq!(req.max_tokens, 95);
    }

    #[test]
    fn request_without_user_message_has_single_part() {
        let req = CompletionRequest::new("m", "prompt", None, 0.5);
        assert_eq!(req.messages, vec![ChatMessage::user("prompt")]);
    }

    #[test]
    fn empty_user_message_is_treated_as_absent() {
        let req = CompletionRequest::new("m", "p", Some(""), 0.5);
        assert_eq!(req.messages, vec![ChatMessage::user("p")]);
    }

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_string(&ChatMessage::system("x")).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"x"}"#);
    }
}
