//! Per-component simulation output

use serde::{Deserialize, Serialize};

/// Traffic arriving at a component, decomposed into reads and writes.
///
/// The composition layer accumulates one `Load` per reached component before
/// invoking its model; connection kinds and cache hit ratios scale the two
/// halves independently.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Load {
    pub read_rps: f64,
    pub write_rps: f64,
}

impl Load {
    pub fn new(read_rps: f64, write_rps: f64) -> Self {
        Self {
            read_rps: read_rps.max(0.0),
            write_rps: write_rps.max(0.0),
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn total(&self) -> f64 {
        self.read_rps + self.write_rps
    }

    pub fn add(&mut self, other: Load) {
        self.read_rps += other.read_rps;
        self.write_rps += other.write_rps;
    }
}

/// Output of a single component's `simulate` call.
///
/// Ephemeral: recomputed fresh per test case, never persisted. Kind-specific
/// extras (queue depth, cache hit rate) are optional fields rather than a
/// trait object so results stay plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMetrics {
    /// Mean request latency through this component, in milliseconds
    pub latency_ms: f64,
    /// Probability a request through this component fails (0..=1)
    pub error_rate: f64,
    /// Offered rate over effective capacity; may exceed 1
    pub utilization: f64,
    /// Provisioning cost in USD per month, independent of traffic
    pub monthly_cost: f64,
    /// Cache components: fraction of reads served locally
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_hit_rate: Option<f64>,
    /// Queue-fed components: estimated backlog depth at the end of the window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_depth: Option<f64>,
    /// Queue-fed components: backlog drain time in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_lag_ms: Option<f64>,
}

impl ComponentMetrics {
    pub fn new(latency_ms: f64, error_rate: f64, utilization: f64, monthly_cost: f64) -> Self {
        Self {
            latency_ms,
            error_rate: error_rate.clamp(0.0, 1.0),
            utilization,
            monthly_cost,
            cache_hit_rate: None,
            queue_depth: None,
            processing_lag_ms: None,
        }
    }

    /// Identity metrics for pass-through components
    pub fn passthrough() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}
