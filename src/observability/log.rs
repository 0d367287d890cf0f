use super::traits::{Observer, ObserverEvent, ObserverMetric};

/// Forwards every event to `tracing`.
pub struct LogObserver;

impl Observer for LogObserver {
    fn record_event(&self, event: &ObserverEvent) {
        match event {
            ObserverEvent::GenerationStart { persona, mode } => {
                tracing::info!(persona = %persona, mode = %mode, "generation.start");
            }
            ObserverEvent::LlmRequest {
                provider,
                model,
                purpose,
                messages_count,
            } => {
                tracing::debug!(
                    provider = %provider,
                    model = %model,
                    purpose = purpose.as_str(),
                    messages_count,
                    "llm.request"
                );
            }
            ObserverEvent::LlmResponse {
                provider,
                model,
                purpose,
                duration,
                success,
                error_message,
            } => {
                let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
                tracing::info!(
                    provider = %provider,
                    model = %model,
                    purpose = purpose.as_str(),
                    duration_ms = ms,
                    success,
                    error = error_message.as_deref().unwrap_or(""),
                    "llm.response"
                );
            }
            ObserverEvent::BanVerdict { model, banned } => {
                tracing::debug!(model = %model, banned, "policy.verdict");
            }
            ObserverEvent::Retry { attempt, reason } => {
                tracing::info!(attempt, reason = reason.as_str(), "reply.retry");
            }
            ObserverEvent::Escalation {
                from_model,
                to_model,
                ban_count,
            } => {
                tracing::warn!(from = %from_model, to = %to_model, ban_count, "reply.escalate");
            }
            ObserverEvent::GenerationEnd {
                persona,
                duration,
                success,
            } => {
                let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
                tracing::info!(persona = %persona, duration_ms = ms, success, "generation.end");
            }
            ObserverEvent::Error { component, message } => {
                tracing::error!(component = %component, error = %message, "error");
            }
        }
    }

    fn record_metric(&self, metric: &ObserverMetric) {
        match metric {
            ObserverMetric::CompletionLatency(d) => {
                let ms = u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
                tracing::debug!(latency_ms = ms, "metric.completion_latency");
            }
            ObserverMetric::TokensUsed(t) => {
                tracing::debug!(tokens = t, "metric.tokens_used");
            }
            ObserverMetric::RetryAttempts(n) => {
                tracing::debug!(attempts = n, "metric.retry_attempts");
            }
        }
    }

    fn name(&self) -> &str {
        "log"
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::traits::{CompletionPurpose, RetryReason};
    use std::time::Duration;

    #[test]
    fn log_observer_accepts_every_event() {
        let obs = LogObserver;
        obs.record_event(&ObserverEvent::GenerationStart {
            persona: "rook_bot".into(),
            mode: "reply".into(),
        });
        obs.record_event(&ObserverEvent::LlmResponse {
            provider: "openai".into(),
            model: "m".into(),
            purpose: CompletionPurpose::Generate,
            duration: Duration::from_millis(12),
            success: false,
            error_message: Some("timeout".into()),
        });
        obs.record_event(&ObserverEvent::Retry {
            attempt: 1,
            reason: RetryReason::Banned,
        });
        obs.record_metric(&ObserverMetric::RetryAttempts(3));
        assert_eq!(obs.name(), "log");
    }
}
