//! Deterministic provider that replays queued responses.
//!
//! Generation requests and ban-check requests draw from separate queues so
//! tests can script drafts and verdicts independently. An exhausted queue is
//! a provider error, which also bounds otherwise unbounded retry loops.

use super::{Completion, CompletionRequest, Provider};
use crate::prompt::templates::BAN_CHECK;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedReply {
    Text(String),
    /// First choice without content.
    Empty,
    /// Transport-level failure with the given message.
    Fail(String),
}

impl From<&str> for ScriptedReply {
    fn from(text: &str) -> Self {
        ScriptedReply::Text(text.to_string())
    }
}

impl From<String> for ScriptedReply {
    fn from(text: String) -> Self {
        ScriptedReply::Text(text)
    }
}

#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<ScriptedReply>>,
    verdicts: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

fn ban_check_header() -> &'static str {
    BAN_CHECK.lines().next().unwrap_or(BAN_CHECK)
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue responses for generation requests.
    pub fn with_replies<I, R>(self, replies: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<ScriptedReply>,
    {
        self.replies.lock().extend(replies.into_iter().map(Into::into));
        self
    }

    /// Queue responses for ban-check requests.
    pub fn with_verdicts<I, R>(self, verdicts: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<ScriptedReply>,
    {
        self.verdicts.lock().extend(verdicts.into_iter().map(Into::into));
        self
    }

    /// Every request seen so far, in order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    /// Generation requests only (ban checks filtered out).
    pub fn generation_requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| !Self::is_ban_check(r))
            .cloned()
            .collect()
    }

    pub fn ban_check_count(&self) -> usize {
        self.requests.lock().iter().filter(|r| Self::is_ban_check(r)).count()
    }

    fn is_ban_check(request: &CompletionRequest) -> bool {
        request
            .messages
            .first()
            .is_some_and(|m| m.content.starts_with(ban_check_header()))
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        self.requests.lock().push(request.clone());
        let (queue, lane) = if Self::is_ban_check(request) {
            (&self.verdicts, "verdict")
        } else {
            (&self.replies, "reply")
        };
        let next = queue.lock().pop_front();
        match next {
            Some(ScriptedReply::Text(text)) => Ok(Completion {
                content: Some(text),
                tokens_used: None,
            }),
            Some(ScriptedReply::Empty) => Ok(Completion::default()),
            Some(ScriptedReply::Fail(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("scripted provider has no {lane} left")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{render_ban_check, PromptContext};
    use crate::persona::Persona;

    #[tokio::test]
    async fn routes_ban_checks_to_verdict_queue() {
        let provider = ScriptedProvider::new().with_replies(["draft"]).with_verdicts(["NO"]);
        let persona = Persona::new("Rook", "rook_bot", "m");
        let check = CompletionRequest::new("m", &render_ban_check(&PromptContext::identity(&persona)), Some("draft"), 0.1);
        let generate = CompletionRequest::new("m", "# Reply Guy Prompt", Some("hi"), 0.1);

        let verdict = provider.complete(&check).await.unwrap();
        let draft = provider.complete(&generate).await.unwrap();
        assert_eq!(verdict.content.as_deref(), Some("NO"));
        assert_eq!(draft.content.as_deref(), Some("draft"));
        assert_eq!(provider.ban_check_count(), 1);
        assert_eq!(provider.generation_requests().len(), 1);
    }

    #[tokio::test]
    async fn exhausted_queue_is_an_error() {
        let provider = ScriptedProvider::new();
        let req = CompletionRequest::new("m", "p", None, 0.1);
        assert!(provider.complete(&req).await.is_err());
    }
}
