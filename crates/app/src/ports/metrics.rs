//! Metrics port: optional gauge reporting.

/// A named gauge with its help text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gauge {
    pub name: &'static str,
    pub help: &'static str,
}

/// Receives gauge values.
///
/// Absence of a sink never affects reconciliation.
pub trait MetricsSink: Send + Sync {
    /// Record `value` for `gauge` under the given label set.
    fn set_gauge(&self, gauge: Gauge, labels: &[(&'static str, &str)], value: f64);

    /// Drop every series of `gauge`.
    fn clear_gauge(&self, gauge: Gauge);
}
