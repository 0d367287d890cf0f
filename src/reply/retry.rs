//! Policy/length retry loop with one-shot fallback escalation.
//!
//! A draft is rejected while it is banned or longer than `max_length`. Each
//! rejection regenerates on the primary model with the same prompt and user
//! message. Only bans count toward `ban_threshold`; once it is reached and
//! the persona has a fallback model, the fallback generates exactly once and
//! that draft is returned unchecked.

use super::invoker::Invoker;
use super::policy::is_banned;
use crate::error::{ReplyError, Result};
use crate::observability::{CompletionPurpose, ObserverEvent, ObserverMetric, RetryReason};
use crate::persona::Persona;
use crate::prompt::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Longest accepted draft, in characters.
    pub max_length: usize,
    /// Bans tolerated before escalating to the fallback model.
    pub ban_threshold: u32,
    /// Cap on regenerations; `None` keeps going until a draft is accepted.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_length: 280,
            ban_threshold: 3,
            max_attempts: None,
        }
    }
}

/// State carried across one run of the loop.
#[derive(Debug)]
struct GenerationAttempt<'p> {
    candidate: String,
    ban_count: u32,
    regenerations: u32,
    model: &'p str,
}

impl GenerationAttempt<'_> {
    fn too_long(&self, max_length: usize) -> bool {
        self.candidate.chars().count() > max_length
    }
}

/// Run the loop starting from `initial` and return the accepted draft.
pub async fn settle(
    invoker: &Invoker<'_>,
    prompt: &str,
    initial: String,
    persona: &Persona,
    policy: &RetryPolicy,
    input_message: Option<&str>,
) -> Result<String> {
    let mut attempt = GenerationAttempt {
        candidate: initial,
        ban_count: 0,
        regenerations: 0,
        model: &persona.model,
    };
    let mut banned = is_banned(invoker, &attempt.candidate, persona).await?;

    let accepted = loop {
        let too_long = attempt.too_long(policy.max_length);
        if !banned && !too_long {
            break attempt.candidate;
        }

        let reason = if banned {
            attempt.ban_count += 1;
            tracing::info!(
                ban_count = attempt.ban_count,
                threshold = policy.ban_threshold,
                "Draft would be banned"
            );

            if attempt.ban_count >= policy.ban_threshold {
                if let Some(fallback) = persona.fallback_model() {
                    tracing::info!(from = %attempt.model, to = %fallback, "Switching to fallback model");
                    invoker.observer().record_event(&ObserverEvent::Escalation {
                        from_model: attempt.model.to_string(),
                        to_model: fallback.to_string(),
                        ban_count: attempt.ban_count,
                    });
                    attempt.model = fallback;
                    attempt.candidate = invoker
                        .complete(
                            attempt.model,
                            prompt,
                            persona,
                            input_message,
                            CompletionPurpose::Generate,
                        )
                        .await?;
                    break attempt.candidate;
                }
            }
            RetryReason::Banned
        } else {
            tracing::info!(max_length = policy.max_length, "Draft too long, going again");
            RetryReason::TooLong
        };

        if let Some(max) = policy.max_attempts {
            if attempt.regenerations >= max {
                tracing::warn!(attempts = attempt.regenerations, "Giving up on reply");
                return Err(ReplyError::AttemptsExhausted {
                    attempts: attempt.regenerations,
                });
            }
        }

        attempt.regenerations += 1;
        invoker.observer().record_event(&ObserverEvent::Retry {
            attempt: attempt.regenerations,
            reason,
        });
        attempt.candidate = invoker
            .generate(prompt, persona, Mode::Reply, input_message)
            .await?;
        banned = is_banned(invoker, &attempt.candidate, persona).await?;
    };

    invoker
        .observer()
        .record_metric(&ObserverMetric::RetryAttempts(u64::from(attempt.regenerations)));
    Ok(accepted)
}
