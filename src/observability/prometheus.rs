use super::traits::{Observer, ObserverEvent, ObserverMetric};
use anyhow::{Context, Result};
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Counters and histograms for the reply pipeline, kept in a private
/// registry so embedding applications decide where to expose them.
pub struct PrometheusObserver {
    registry: Registry,
    completions: IntCounterVec,
    verdicts: IntCounterVec,
    retries: IntCounterVec,
    escalations: IntCounter,
    generations: IntCounterVec,
    tokens: IntCounter,
    completion_latency: Histogram,
    retry_attempts: Histogram,
}

impl PrometheusObserver {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let completions = IntCounterVec::new(
            Opts::new("replyguy_completions_total", "Completion calls by purpose and outcome"),
            &["purpose", "outcome"],
        )?;
        let verdicts = IntCounterVec::new(
            Opts::new("replyguy_ban_verdicts_total", "Policy classifications by verdict"),
            &["verdict"],
        )?;
        let retries = IntCounterVec::new(
            Opts::new("replyguy_retries_total", "Draft regenerations by reason"),
            &["reason"],
        )?;
        let escalations = IntCounter::new("replyguy_escalations_total", "Fallback model escalations")?;
        let generations = IntCounterVec::new(
            Opts::new("replyguy_generations_total", "Pipeline runs by outcome"),
            &["outcome"],
        )?;
        let tokens = IntCounter::new("replyguy_tokens_total", "Tokens reported by the endpoint")?;
        let completion_latency = Histogram::with_opts(HistogramOpts::new(
            "replyguy_completion_latency_seconds",
            "Completion call latency",
        ))?;
        let retry_attempts = Histogram::with_opts(
            HistogramOpts::new("replyguy_retry_attempts", "Regenerations per retry loop")
                .buckets(vec![0.0, 1.0, 2.0, 3.0, 5.0, 8.0, 13.0]),
        )?;

        registry.register(Box::new(completions.clone()))?;
        registry.register(Box::new(verdicts.clone()))?;
        registry.register(Box::new(retries.clone()))?;
        registry.register(Box::new(escalations.clone()))?;
        registry.register(Box::new(generations.clone()))?;
        registry.register(Box::new(tokens.clone()))?;
        registry.register(Box::new(completion_latency.clone()))?;
        registry.register(Box::new(retry_attempts.clone()))?;

        Ok(Self {
            registry,
            completions,
            verdicts,
            retries,
            escalations,
            generations,
            tokens,
            completion_latency,
            retry_attempts,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Text exposition format.
    pub fn encode(&self) -> Result<String> {
        TextEncoder::new()
            .encode_to_string(&self.registry.gather())
            .context("failed to encode prometheus metrics")
    }
}

fn outcome(success: bool) -> &'static str {
    if success {
        "ok"
    } else {
        "error"
    }
}

impl Observer for PrometheusObserver {
    fn record_event(&self, event: &ObserverEvent) {
        match event {
            ObserverEvent::LlmResponse { purpose, success, .. } => {
                self.completions
                    .with_label_values(&[purpose.as_str(), outcome(*success)])
                    .inc();
            }
            ObserverEvent::BanVerdict { banned, .. } => {
                let verdict = if *banned { "banned" } else { "clean" };
                self.verdicts.with_label_values(&[verdict]).inc();
            }
            ObserverEvent::Retry { reason, .. } => {
                self.retries.with_label_values(&[reason.as_str()]).inc();
            }
            ObserverEvent::Escalation { .. } => self.escalations.inc(),
            ObserverEvent::GenerationEnd { success, .. } => {
                self.generations.with_label_values(&[outcome(*success)]).inc();
            }
            ObserverEvent::GenerationStart { .. }
            | ObserverEvent::LlmRequest { .. }
            | ObserverEvent::Error { .. } => {}
        }
    }

    fn record_metric(&self, metric: &ObserverMetric) {
        match metric {
            ObserverMetric::CompletionLatency(d) => self.completion_latency.observe(d.as_secs_f64()),
            ObserverMetric::TokensUsed(t) => self.tokens.inc_by(*t),
            #[allow(clippy::cast_precision_loss)]
            ObserverMetric::RetryAttempts(n) => self.retry_attempts.observe(*n as f64),
        }
    }

    fn name(&self) -> &str {
        "prometheus"
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
