//! Worker model
//!
//! Asynchronous processing tier. Throughput derives from the instance count
//! scaled down by a complexity factor built from the selected behavior
//! profile, the number of validations, and the mean transformation cost
//! weight. The error-rate curve has three regimes keyed on utilization.

use archsim_core::{
    BehaviorConfig, BehaviorRegistry, ComponentMetrics, Load, SimulationContext, WorkerConfig,
};
use tracing::warn;

use crate::model::{error_union, EffectiveOutput};

const MONTHLY_COST_PER_INSTANCE: f64 = 40.0;

pub struct Worker<'a> {
    pub name: &'a str,
    config: &'a WorkerConfig,
}

impl<'a> Worker<'a> {
    pub fn new(name: &'a str, config: &'a WorkerConfig) -> Self {
        Self { name, config }
    }

    /// Jobs per second this worker pool can actually sustain, given the work
    /// each job implies.
    pub fn effective_throughput(
        &self,
        behavior: Option<&BehaviorConfig>,
        registry: &BehaviorRegistry,
    ) -> f64 {
        let throughput_multiplier = behavior
            .and_then(|b| b.behavior.as_deref())
            .and_then(|name| registry.worker(name))
            .map(|w| w.throughput_multiplier)
            .unwrap_or(1.0)
            .max(0.001);
        let validation_count = behavior.map(|b| b.validations.len()).unwrap_or(0);
        let cpu_factor = behavior
            .map(|b| registry.cpu_cost_factor(&b.transformations))
            .unwrap_or(1.0);

        let complexity =
            (1.0 / throughput_multiplier) * (1.0 + 0.2 * validation_count as f64) * cpu_factor;
        self.config.per_instance_throughput * self.config.instances.max(1) as f64 / complexity
    }

    pub fn simulate(
        &self,
        load: Load,
        ctx: &SimulationContext,
        behavior: Option<&BehaviorConfig>,
        registry: &BehaviorRegistry,
    ) -> EffectiveOutput {
        let rps = load.total();
        let throughput = self.effective_throughput(behavior, registry);
        let utilization = rps / throughput;

        let profile = behavior
            .and_then(|b| b.behavior.as_deref())
            .and_then(|name| registry.worker(name));

        // An executor-measured latency replaces the behavior's base figure
        // when the component runs user-submitted code.
        let custom = behavior.map(|b| b.custom_logic).unwrap_or(false);
        let base_latency = match (custom, ctx.benchmarked_latency_ms) {
            (true, Some(measured)) => measured,
            _ => profile.map(|p| p.base_latency_ms).unwrap_or(0.0),
        };

        let latency_ms = base_latency
            + behavior
                .map(|b| {
                    registry.validation_latency(&b.validations)
                        + registry.transformation_latency(&b.transformations)
                        + registry.external_api_latency(&b.external_apis)
                })
                .unwrap_or(0.0);

        let load_error = load_error_rate(utilization);
        let baseline = profile.map(|p| p.error_rate).unwrap_or(0.0);
        let dependency_error = behavior
            .map(|b| 1.0 - registry.combined_success_rate(b))
            .unwrap_or(0.0);
        let error_rate = error_union(load_error, error_union(baseline, dependency_error));

        let (queue_depth, processing_lag_ms) = if rps > throughput {
            let depth = (rps - throughput) * ctx.elapsed_secs;
            (depth, depth / throughput * 1000.0)
        } else {
            (0.0, 0.0)
        };

        if utilization > 1.0 {
            warn!(
                worker = self.name,
                utilization, queue_depth, "worker over capacity, backlog accumulating"
            );
        }

        let mut metrics = ComponentMetrics::new(
            latency_ms,
            error_rate,
            utilization,
            MONTHLY_COST_PER_INSTANCE * self.config.instances.max(1) as f64,
        );
        metrics.queue_depth = Some(queue_depth);
        metrics.processing_lag_ms = Some(processing_lag_ms);

        EffectiveOutput {
            metrics,
            forwarded: load,
        }
    }
}

/// Load-driven error rate for workers and app servers.
///
/// Zero below 95% utilization, a steep ramp through the 95–120% band, then a
/// shallower tail above 120%. The drop at the 120% boundary reproduces the
/// charging curve the challenge catalog was calibrated against.
pub(crate) fn load_error_rate(utilization: f64) -> f64 {
    if utilization < 0.95 {
        0.0
    } else if utilization <= 1.2 {
        (utilization - 0.95) * 2.0
    } else {
        ((utilization - 1.2) * 0.5).min(1.0)
    }
}
