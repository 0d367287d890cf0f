use std::time::Duration;

/// Why a completion was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionPurpose {
    Generate,
    BanCheck,
    ImagePrompt,
}

impl CompletionPurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            CompletionPurpose::Generate => "generate",
            CompletionPurpose::BanCheck => "ban_check",
            CompletionPurpose::ImagePrompt => "image_prompt",
        }
    }
}

/// Why a draft was sent back for regeneration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    Banned,
    TooLong,
}

impl RetryReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RetryReason::Banned => "banned",
            RetryReason::TooLong => "too_long",
        }
    }
}

/// Events the observer can record
#[derive(Debug, Clone)]
pub enum ObserverEvent {
    GenerationStart {
        persona: String,
        mode: String,
    },
    /// A request is about to be sent to the completion endpoint.
    ///
    /// Emitted before the call so observers can show progress without
    /// leaking prompt contents.
    LlmRequest {
        provider: String,
        model: String,
        purpose: CompletionPurpose,
        messages_count: usize,
    },
    /// Result of a single completion call.
    LlmResponse {
        provider: String,
        model: String,
        purpose: CompletionPurpose,
        duration: Duration,
        success: bool,
        error_message: Option<String>,
    },
    BanVerdict {
        model: String,
        banned: bool,
    },
    /// A draft was rejected and is about to be regenerated.
    Retry {
        attempt: u32,
        reason: RetryReason,
    },
    /// The ban threshold was reached and the fallback model takes one shot.
    Escalation {
        from_model: String,
        to_model: String,
        ban_count: u32,
    },
    GenerationEnd {
        persona: String,
        duration: Duration,
        success: bool,
    },
    Error {
        component: String,
        message: String,
    },
}

/// Numeric metrics
#[derive(Debug, Clone)]
pub enum ObserverMetric {
    CompletionLatency(Duration),
    TokensUsed(u64),
    /// Regenerations spent by one call to the retry loop.
    RetryAttempts(u64),
}

/// Core observability trait — implement for any backend
pub trait Observer: Send + Sync + 'static {
    /// Record a discrete event
    fn record_event(&self, event: &ObserverEvent);

    /// Record a numeric metric
    fn record_metric(&self, metric: &ObserverMetric);

    /// Flush any buffered data (no-op for most backends)
    fn flush(&self) {}

    /// Human-readable name of this observer
    fn name(&self) -> &str;

    /// Downcast to `Any` for backend-specific operations
    fn as_any(&self) -> &dyn std::any::Any;
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct DummyObserver {
        events: Mutex<u64>,
        metrics: Mutex<u64>,
    }

    impl Observer for DummyObserver {
        fn record_event(&self, _event: &ObserverEvent) {
            *self.events.lock() += 1;
        }

        fn record_metric(&self, _metric: &ObserverMetric) {
            *self.metrics.lock() += 1;
        }

        fn name(&self) -> &str {
            "dummy-observer"
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    #[test]
    fn observer_records_events_and_metrics() {
        let observer = DummyObserver::default();

        observer.record_event(&ObserverEvent::BanVerdict {
            model: "m".into(),
            banned: true,
        });
        observer.record_event(&ObserverEvent::Error {
            component: "test".into(),
            message: "boom".into(),
        });
        observer.record_metric(&ObserverMetric::TokensUsed(42));

        assert_eq!(*observer.events.lock(), 2);
        assert_eq!(*observer.metrics.lock(), 1);
    }

    #[test]
    fn observer_default_flush_and_as_any_work() {
        let observer = DummyObserver::default();

        observer.flush();
        assert_eq!(observer.name(), "dummy-observer");
        assert!(observer.as_any().downcast_ref::<DummyObserver>().is_some());
    }

    #[test]
    fn label_strings_are_snake_case() {
        assert_eq!(CompletionPurpose::BanCheck.as_str(), "ban_check");
        assert_eq!(RetryReason::TooLong.as_str(), "too_long");
    }
}
