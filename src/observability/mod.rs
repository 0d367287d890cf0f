pub mod log;
pub mod prometheus;
pub mod traits;

pub use self::log::LogObserver;
pub use self::prometheus::PrometheusObserver;
pub use traits::{CompletionPurpose, Observer, ObserverEvent, ObserverMetric, RetryReason};

use crate::config::{ObservabilityBackend, ObservabilityConfig};
use anyhow::Result;
use std::sync::Arc;

/// Discards everything.
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn record_event(&self, _event: &ObserverEvent) {}

    fn record_metric(&self, _metric: &ObserverMetric) {}

    fn name(&self) -> &str {
        "noop"
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Build the observer named in config.
pub fn create_observer(config: &ObservabilityConfig) -> Result<Arc<dyn Observer>> {
    let observer: Arc<dyn Observer> = match config.backend {
        ObservabilityBackend::None => Arc::new(NoopObserver),
        ObservabilityBackend::Log => Arc::new(LogObserver),
        ObservabilityBackend::Prometheus => Arc::new(PrometheusObserver::new()?),
    };
    Ok(observer)
}
