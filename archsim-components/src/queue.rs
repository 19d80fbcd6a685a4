//! Message queue model
//!
//! A queue absorbs overload into backlog instead of failing fast: latency
//! and queue depth grow as soon as the offered rate exceeds capacity, but
//! publishes only start erroring under deep overload (past 150% of
//! capacity), when brokers shed load.

use archsim_core::{ComponentMetrics, Load, QueueConfig, SimulationContext};
use tracing::warn;

use crate::model::{overload_latency, EffectiveOutput};

const BASE_LATENCY_MS: f64 = 5.0;
const MONTHLY_COST_PER_PARTITION: f64 = 30.0;
const MONTHLY_COST_PER_THROUGHPUT: f64 = 0.001;

/// Utilization past which publishes begin to fail outright
const SHED_THRESHOLD: f64 = 1.5;

pub struct MessageQueue<'a> {
    pub name: &'a str,
    config: &'a QueueConfig,
}

impl<'a> MessageQueue<'a> {
    pub fn new(name: &'a str, config: &'a QueueConfig) -> Self {
        Self { name, config }
    }

    pub fn capacity(&self) -> f64 {
        self.config.max_throughput * self.config.partitions.max(1) as f64
    }

    pub fn simulate(&self, load: Load, ctx: &SimulationContext) -> EffectiveOutput {
        let rps = load.total();
        let capacity = self.capacity();
        let utilization = rps / capacity;

        let latency_ms = overload_latency(BASE_LATENCY_MS, utilization);
        let error_rate = if utilization <= SHED_THRESHOLD {
            0.0
        } else {
            ((utilization - SHED_THRESHOLD) * 0.5).min(1.0)
        };

        let (queue_depth, processing_lag_ms) = if rps > capacity {
            let depth = (rps - capacity) * ctx.elapsed_secs;
            (depth, depth / capacity * 1000.0)
        } else {
            (0.0, 0.0)
        };

        if queue_depth > 0.0 {
            warn!(
                queue = self.name,
                utilization, queue_depth, "queue backlog growing"
            );
        }

        let mut metrics = ComponentMetrics::new(
            latency_ms,
            error_rate,
            utilization,
            MONTHLY_COST_PER_PARTITION * self.config.partitions.max(1) as f64
                + MONTHLY_COST_PER_THROUGHPUT * self.config.max_throughput,
        );
        metrics.queue_depth = Some(queue_depth);
        metrics.processing_lag_ms = Some(processing_lag_ms);

        EffectiveOutput {
            metrics,
            forwarded: load,
        }
    }
}
