//! The reply pipeline: render a prompt, generate, enforce policy and length
//! outside chat mode, format.
//!
//! [`ReplyEngine`] is the entry point. It owns the provider and observer,
//! runs at most one generation per persona at a time, and optionally bounds
//! every run with a deadline.

pub mod format;
pub mod invoker;
pub mod policy;
pub mod retry;

pub use format::{format_reply, unescape_newlines};
pub use invoker::{model_for, Invoker};
pub use policy::is_banned_verdict;
pub use retry::RetryPolicy;

use crate::config::Config;
use crate::error::{ReplyError, Result};
use crate::observability::{create_observer, CompletionPurpose, NoopObserver, Observer, ObserverEvent};
use crate::persona::Persona;
use crate::prompt::{self, Mode, PromptContext};
use crate::providers::{OpenAiCompatibleProvider, Provider};
use parking_lot::Mutex;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The rendered prompt (for diagnostics) and the final reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReply {
    pub prompt: String,
    pub reply: String,
}

/// One async mutex per persona handle.
#[derive(Default)]
struct PersonaLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl PersonaLocks {
    fn for_persona(&self, persona: &Persona) -> Arc<tokio::sync::Mutex<()>> {
        self.locks
            .lock()
            .entry(persona.username.clone())
            .or_default()
            .clone()
    }
}

pub struct ReplyEngine {
    provider: Arc<dyn Provider>,
    observer: Arc<dyn Observer>,
    policy: RetryPolicy,
    deadline: Option<Duration>,
    locks: PersonaLocks,
}

/// Pick one topic and one adjective uniformly at random.
pub fn pick_topic<'p, R: Rng + ?Sized>(persona: &'p Persona, rng: &mut R) -> Result<(&'p str, &'p str)> {
    let topic = persona
        .topics
        .choose(rng)
        .ok_or(ReplyError::MissingTopicList { field: "topics" })?;
    let adjective = persona
        .adjectives
        .choose(rng)
        .ok_or(ReplyError::MissingTopicList { field: "adjectives" })?;
    Ok((topic.as_str(), adjective.as_str()))
}

impl ReplyEngine {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            observer: Arc::new(NoopObserver),
            policy: RetryPolicy::default(),
            deadline: None,
            locks: PersonaLocks::default(),
        }
    }

    /// Engine talking to the configured OpenAI-compatible endpoint.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = OpenAiCompatibleProvider::new(
            config.provider.base_url.clone(),
            config.provider.api_key.clone(),
            config.provider_timeout(),
        )?;
        let mut engine = Self::new(Arc::new(provider))
            .with_observer(create_observer(&config.observability)?)
            .with_policy(config.retry_policy());
        engine.deadline = config.deadline();
        Ok(engine)
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Bound every generation (including all retries and any wait behind
    /// the same persona's in-flight generation) by `deadline`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn observer(&self) -> &Arc<dyn Observer> {
        &self.observer
    }

    fn invoker(&self) -> Invoker<'_> {
        Invoker::new(self.provider.as_ref(), self.observer.as_ref())
    }

    /// Serialize per persona, apply the deadline, and report start/end.
    ///
    /// The deadline covers the wait for the persona's lock as well as the
    /// generation itself.
    async fn run<T, F>(&self, persona: &Persona, mode: &str, work: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.observer.record_event(&ObserverEvent::GenerationStart {
            persona: persona.username.clone(),
            mode: mode.to_string(),
        });
        let started = Instant::now();

        let lock = self.locks.for_persona(persona);
        let guarded = async {
            let _guard = lock.lock().await;
            work.await
        };

        let outcome = match self.deadline {
            Some(after) => tokio::time::timeout(after, guarded)
                .await
                .unwrap_or_else(|_| Err(ReplyError::DeadlineExceeded { after })),
            None => guarded.await,
        };

        if let Err(e) = &outcome {
            tracing::error!(persona = %persona.username, mode, error = %e, "Error generating reply");
            self.observer.record_event(&ObserverEvent::Error {
                component: "reply".to_string(),
                message: e.to_string(),
            });
        }
        self.observer.record_event(&ObserverEvent::GenerationEnd {
            persona: persona.username.clone(),
            duration: started.elapsed(),
            success: outcome.is_ok(),
        });
        outcome
    }

    /// Reply to `input_message` as `persona`.
    ///
    /// Chat mode accepts the first draft as-is; otherwise the draft goes
    /// through the policy/length retry loop. Either way the result is
    /// formatted per the persona's posting behavior.
    pub async fn generate_reply(
        &self,
        input_message: &str,
        persona: &Persona,
        is_chat_mode: bool,
        recent_history: Option<&str>,
    ) -> Result<GeneratedReply> {
        let mode = Mode::from_chat_flag(is_chat_mode);
        let label = if mode.is_chat() { "chat" } else { "reply" };
        self.run(persona, label, async {
            let context = PromptContext::for_persona(persona)
                .with_original_post(input_message)
                .with_recent_history(recent_history);
            let prompt = prompt::select_and_render(&context, mode, input_message.chars().count());
            tracing::debug!(prompt = %prompt, "Prompt");

            let invoker = self.invoker();
            let mut reply = invoker
                .generate(&prompt, persona, mode, Some(input_message))
                .await?;
            tracing::debug!(reply = %reply, "Reply");

            if !mode.is_chat() {
                reply = retry::settle(&invoker, &prompt, reply, persona, &self.policy, Some(input_message))
                    .await?;
            }

            let reply = format_reply(&reply, persona);
            Ok(GeneratedReply { prompt, reply })
        })
        .await
    }

    /// Unprompted post on a random topic with a random adjective.
    ///
    /// Goes through the retry loop without the input message; only literal
    /// `\n` escapes are expanded afterwards.
    pub async fn generate_topic_post(
        &self,
        persona: &Persona,
        recent_history: Option<&str>,
    ) -> Result<GeneratedReply> {
        self.run(persona, "topic", async {
            let (topic, adjective) = pick_topic(persona, &mut rand::rng())?;
            let context = PromptContext::for_persona(persona).with_recent_history(recent_history);
            let prompt = prompt::render_topic_post(&context);
            let user_prompt = format!("Generate a post that is {adjective} about {topic}");

            let invoker = self.invoker();
            let draft = invoker
                .generate(&prompt, persona, Mode::Reply, Some(&user_prompt))
                .await?;
            let reply = retry::settle(&invoker, &prompt, draft, persona, &self.policy, None).await?;
            let reply = unescape_newlines(&reply);

            tracing::info!(
                persona = %persona.username,
                topic,
                adjective,
                reply = %reply,
                "Topic post"
            );
            Ok(GeneratedReply { prompt, reply })
        })
        .await
    }

    /// Rewrite `prompt` into an image-generation prompt in the persona's
    /// voice. Single shot: no policy check, no retries.
    pub async fn generate_image_prompt(&self, prompt: &str, persona: &Persona) -> Result<String> {
        self.run(persona, "image_prompt", async {
            tracing::info!(persona = %persona.agent_name, "Generating image prompt");
            let context = PromptContext::for_persona(persona).with_original_post(prompt);
            let rendered = prompt::render_image_prompt(&context);
            self.invoker()
                .complete(
                    persona.image_prompt_model(),
                    &rendered,
                    persona,
                    None,
                    CompletionPurpose::ImagePrompt,
                )
                .await
        })
        .await
    }
}
