//! Load balancer model
//!
//! Cheap and reliable in steady state: one millisecond of forwarding
//! latency, no errors of its own, flat monthly cost. Algorithm selection
//! only shows up as a small bookkeeping overhead for the stateful
//! algorithms; the traffic-splitting math lives in [`crate::balancing`].

use archsim_core::{BalancingAlgorithm, ComponentMetrics, Load, LoadBalancerConfig, SimOptions};

use crate::model::EffectiveOutput;

const BASE_LATENCY_MS: f64 = 1.0;
const MONTHLY_COST: f64 = 50.0;

fn algorithm_overhead_ms(algorithm: BalancingAlgorithm) -> f64 {
    match algorithm {
        BalancingAlgorithm::RoundRobin | BalancingAlgorithm::Random => 0.0,
        BalancingAlgorithm::WeightedRoundRobin | BalancingAlgorithm::WeightedRandom => 0.2,
        BalancingAlgorithm::IpHash => 0.3,
        BalancingAlgorithm::LeastConnections => 0.5,
    }
}

pub struct LoadBalancer<'a> {
    pub name: &'a str,
    config: &'a LoadBalancerConfig,
}

impl<'a> LoadBalancer<'a> {
    pub fn new(name: &'a str, config: &'a LoadBalancerConfig) -> Self {
        Self { name, config }
    }

    pub fn algorithm(&self) -> BalancingAlgorithm {
        self.config.algorithm
    }

    pub fn simulate(&self, load: Load, options: &SimOptions) -> EffectiveOutput {
        let latency_ms = if options.lb_algorithms {
            BASE_LATENCY_MS + algorithm_overhead_ms(self.config.algorithm)
        } else {
            BASE_LATENCY_MS
        };
        let metrics = ComponentMetrics::new(latency_ms, 0.0, 0.0, MONTHLY_COST);
        EffectiveOutput {
            metrics,
            forwarded: load,
        }
    }
}
