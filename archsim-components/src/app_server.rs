//! App server model
//!
//! Stateless request-handling tier. Shares the worker error curve but
//! carries its own base request latency; behavior configuration (validations,
//! transformations, external APIs, benchmarked custom code) adds latency the
//! same way it does for workers.

use archsim_core::{
    AppServerConfig, BehaviorConfig, BehaviorRegistry, ComponentMetrics, Load, SimulationContext,
};
use tracing::warn;

use crate::model::{error_union, EffectiveOutput};
use crate::worker::load_error_rate;

const BASE_LATENCY_MS: f64 = 5.0;
const MONTHLY_COST_PER_INSTANCE: f64 = 50.0;

pub struct AppServer<'a> {
    pub name: &'a str,
    config: &'a AppServerConfig,
}

impl<'a> AppServer<'a> {
    pub fn new(name: &'a str, config: &'a AppServerConfig) -> Self {
        Self { name, config }
    }

    pub fn capacity(&self) -> f64 {
        self.config.per_instance_rps * self.config.instances.max(1) as f64
    }

    pub fn simulate(
        &self,
        load: Load,
        ctx: &SimulationContext,
        behavior: Option<&BehaviorConfig>,
        registry: &BehaviorRegistry,
    ) -> EffectiveOutput {
        let rps = load.total();
        let utilization = rps / self.capacity();

        let custom = behavior.map(|b| b.custom_logic).unwrap_or(false);
        let handler_latency = match (custom, ctx.benchmarked_latency_ms) {
            (true, Some(measured)) => measured,
            _ => BASE_LATENCY_MS,
        };
        let latency_ms = handler_latency
            + behavior
                .map(|b| {
                    registry.validation_latency(&b.validations)
                        + registry.transformation_latency(&b.transformations)
                        + registry.external_api_latency(&b.external_apis)
                })
                .unwrap_or(0.0);

        let dependency_error = behavior
            .map(|b| 1.0 - registry.combined_success_rate(b))
            .unwrap_or(0.0);
        let error_rate = error_union(load_error_rate(utilization), dependency_error);

        if utilization > 1.0 {
            warn!(
                server = self.name,
                utilization, "app server over capacity, shedding requests"
            );
        }

        let metrics = ComponentMetrics::new(
            latency_ms,
            error_rate,
            utilization,
            MONTHLY_COST_PER_INSTANCE * self.config.instances.max(1) as f64,
        );
        EffectiveOutput {
            metrics,
            forwarded: load,
        }
    }
}
