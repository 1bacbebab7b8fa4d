use axum_prometheus::PrometheusMetricLayer;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Operational state shared by the health, readiness, and metrics endpoints.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) service: &'static str,
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

impl AppState {
    pub(crate) fn new(service: &'static str, metrics: Arc<PrometheusHandle>) -> Self {
        Self {
            service,
            readiness: Arc::new(AtomicBool::new(false)),
            metrics,
        }
    }

    pub(crate) fn mark_ready(&self) {
        self.readiness.store(true, Ordering::Release);
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.readiness.load(Ordering::Relaxed)
    }
}

/// Request metrics layer plus the handle that renders them.
///
/// The layer installs the global recorder, so build one per process and clone it into every
/// router that should report.
#[derive(Clone)]
pub(crate) struct ServiceMetrics {
    layer: PrometheusMetricLayer<'static>,
    handle: Arc<PrometheusHandle>,
}

impl ServiceMetrics {
    pub(crate) fn install() -> Self {
        let (layer, handle) = PrometheusMetricLayer::pair();
        Self {
            layer,
            handle: Arc::new(handle),
        }
    }

    pub(crate) fn layer(&self) -> PrometheusMetricLayer<'static> {
        self.layer.clone()
    }

    pub(crate) fn handle(&self) -> Arc<PrometheusHandle> {
        self.handle.clone()
    }
}
