//! CDN model
//!
//! Edge tier with high capacity and low latency. Follows the shared
//! degradation pattern against its declared edge capacity.

use archsim_core::{CdnConfig, ComponentMetrics, Load};

use crate::model::{overload_error, overload_latency, EffectiveOutput};

const BASE_LATENCY_MS: f64 = 8.0;
const MONTHLY_COST: f64 = 110.0;

pub struct Cdn<'a> {
    pub name: &'a str,
    config: &'a CdnConfig,
}

impl<'a> Cdn<'a> {
    pub fn new(name: &'a str, config: &'a CdnConfig) -> Self {
        Self { name, config }
    }

    pub fn simulate(&self, load: Load) -> EffectiveOutput {
        let utilization = load.total() / self.config.edge_capacity_rps;
        let metrics = ComponentMetrics::new(
            overload_latency(BASE_LATENCY_MS, utilization),
            overload_error(utilization),
            utilization,
            MONTHLY_COST,
        );
        EffectiveOutput {
            metrics,
            forwarded: load,
        }
    }
}
