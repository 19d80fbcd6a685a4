//! Object store model
//!
//! Blob storage with per-GB provisioning cost and a request-rate ceiling.

use archsim_core::{ComponentMetrics, Load, ObjectStoreConfig};

use crate::model::{overload_error, overload_latency, EffectiveOutput};

const BASE_LATENCY_MS: f64 = 20.0;
const MONTHLY_COST_PER_GB: f64 = 0.023;

pub struct ObjectStore<'a> {
    pub name: &'a str,
    config: &'a ObjectStoreConfig,
}

impl<'a> ObjectStore<'a> {
    pub fn new(name: &'a str, config: &'a ObjectStoreConfig) -> Self {
        Self { name, config }
    }

    pub fn simulate(&self, load: Load) -> EffectiveOutput {
        let utilization = load.total() / self.config.request_capacity_rps;
        let metrics = ComponentMetrics::new(
            overload_latency(BASE_LATENCY_MS, utilization),
            overload_error(utilization),
            utilization,
            MONTHLY_COST_PER_GB * self.config.storage_gb,
        );
        EffectiveOutput {
            metrics,
            forwarded: load,
        }
    }
}
