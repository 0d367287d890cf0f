use crate::error::{ReplyError, Result};
use crate::observability::{CompletionPurpose, Observer, ObserverEvent, ObserverMetric};
use crate::persona::Persona;
use crate::prompt::Mode;
use crate::providers::{CompletionRequest, Provider};
use std::time::Instant;

/// Model for a completion in `mode`: the chat override in chat mode when
/// the persona has one, the primary model otherwise.
pub fn model_for(persona: &Persona, mode: Mode) -> &str {
    match mode {
        Mode::Chat => persona.chat_mode_model().unwrap_or(&persona.model),
        Mode::Reply => &persona.model,
    }
}

/// Issues single completions and turns the endpoint's answer into text.
///
/// Never retries. An empty first choice is `EmptyCompletion`; anything the
/// provider reports is `Provider`.
#[derive(Clone, Copy)]
pub struct Invoker<'a> {
    provider: &'a dyn Provider,
    observer: &'a dyn Observer,
}

impl<'a> Invoker<'a> {
    pub fn new(provider: &'a dyn Provider, observer: &'a dyn Observer) -> Self {
        Self { provider, observer }
    }

    pub fn observer(&self) -> &'a dyn Observer {
        self.observer
    }

    /// Generate with the model `mode` selects for this persona.
    pub async fn generate(
        &self,
        prompt: &str,
        persona: &Persona,
        mode: Mode,
        user_message: Option<&str>,
    ) -> Result<String> {
        let model = model_for(persona, mode);
        self.complete(model, prompt, persona, user_message, CompletionPurpose::Generate)
            .await
    }

    /// One completion against an explicit model.
    pub async fn complete(
        &self,
        model: &str,
        prompt: &str,
        persona: &Persona,
        user_message: Option<&str>,
        purpose: CompletionPurpose,
    ) -> Result<String> {
        tracing::debug!(model = %model, purpose = purpose.as_str(), "Using model");
        if let Some(user) = user_message {
            tracing::debug!(user_prompt = %user, "User prompt");
        }

        let request = CompletionRequest::new(model, prompt, user_message, persona.temperature);
        let provider = self.provider.name().to_string();
        self.observer.record_event(&ObserverEvent::LlmRequest {
            provider: provider.clone(),
            model: model.to_string(),
            purpose,
            messages_count: request.messages.len(),
        });

        let started = Instant::now();
        let outcome = self.provider.complete(&request).await;
        let duration = started.elapsed();

        self.observer.record_event(&ObserverEvent::LlmResponse {
            provider,
            model: model.to_string(),
            purpose,
            duration,
            success: outcome.is_ok(),
            error_message: outcome.as_ref().err().map(|e| format!("{e:#}")),
        });
        self.observer
            .record_metric(&ObserverMetric::CompletionLatency(duration));

        let completion = outcome.map_err(ReplyError::Provider)?;
        if let Some(tokens) = completion.tokens_used {
            self.observer.record_metric(&ObserverMetric::TokensUsed(tokens));
        }

        match completion.content {
            Some(content) if !content.is_empty() => Ok(content),
            _ => Err(ReplyError::EmptyCompletion {
                model: model.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::NoopObserver;
    use crate::providers::{ChatMessage, ScriptedProvider, ScriptedReply};

    fn persona() -> Persona {
        let mut persona = Persona::new("Rook", "rook_bot", "big-model");
        persona.temperature = 0.4;
        persona
    }

    #[test]
    fn chat_override_only_applies_in_chat_mode() {
        let mut persona = persona();
        assert_eq!(model_for(&persona, Mode::Chat), "big-model");
        persona.posting_behavior.chat_mode_model = Some("chat-model".into());
        assert_eq!(model_for(&persona, Mode::Chat), "chat-model");
        assert_eq!(model_for(&persona, Mode::Reply), "big-model");
    }

    #[tokio::test]
    async fn generate_sends_system_and_user_parts() {
        let provider = ScriptedProvider::new().with_replies(["gg"]);
        let invoker = Invoker::new(&provider, &NoopObserver);

        let text = invoker
            .generate("prompt", &persona(), Mode::Reply, Some("hello"))
            .await
            .unwrap();

        assert_eq!(text, "gg");
        let req = &provider.requests()[0];
        assert_eq!(req.model, "big-model");
        assert_eq!(req.max_tokens, 95);
        assert!((req.temperature - 0.4).abs() < f32::EPSILON);
        assert_eq!(req.messages, vec![ChatMessage::system("prompt"), ChatMessage::user("hello")]);
    }

    #[tokio::test]
    async fn empty_content_is_empty_completion_error() {
        let provider = ScriptedProvider::new().with_replies([ScriptedReply::Empty, "".into()]);
        let invoker = Invoker::new(&provider, &NoopObserver);

        for _ in 0..2 {
            let err = invoker
                .generate("prompt", &persona(), Mode::Reply, None)
                .await
                .unwrap_err();
            assert!(matches!(err, ReplyError::EmptyCompletion { ref model } if model == "big-model"));
        }
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn provider_failures_propagate() {
        let provider = ScriptedProvider::new().with_replies([ScriptedReply::Fail("401 Unauthorized".into())]);
        let invoker = Invoker::new(&provider, &NoopObserver);

        let err = invoker
            .generate("prompt", &persona(), Mode::Reply, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ReplyError::Provider(_)));
        assert!(err.to_string().contains("401 Unauthorized"));
    }
}
