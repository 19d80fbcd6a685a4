//! Shared degradation math and kind dispatch
//!
//! Every capacity-bound component follows the same pattern: below effective
//! capacity traffic sees a flat base latency and no overload errors; above
//! capacity latency grows with the square of the overload ratio and the
//! error rate ramps linearly. Both curves are monotonic in offered rate.

use archsim_core::{
    BehaviorConfig, BehaviorRegistry, ComponentMetrics, ComponentNode, ComponentSpec, Load,
    SimOptions, SimulationContext,
};

use crate::{
    AppServer, Cache, Cdn, Client, Database, LoadBalancer, MessageQueue, ObjectStore, Worker,
};

/// Latency under load: flat at base below capacity, quadratic in the
/// overload ratio above it.
pub(crate) fn overload_latency(base_ms: f64, utilization: f64) -> f64 {
    if utilization <= 1.0 {
        base_ms
    } else {
        base_ms * utilization * utilization
    }
}

/// Overload error rate: zero below capacity, then half the excess ratio,
/// clamped to 1.
pub(crate) fn overload_error(utilization: f64) -> f64 {
    if utilization <= 1.0 {
        0.0
    } else {
        ((utilization - 1.0) * 0.5).min(1.0)
    }
}

/// Probabilistic union of independent failure probabilities
pub(crate) fn error_union(a: f64, b: f64) -> f64 {
    (1.0 - (1.0 - a.clamp(0.0, 1.0)) * (1.0 - b.clamp(0.0, 1.0))).clamp(0.0, 1.0)
}

/// A component's metrics plus the traffic it forwards downstream.
///
/// Caches divert hits away from their backing store, so the forwarded load
/// is not always the arriving load.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveOutput {
    pub metrics: ComponentMetrics,
    pub forwarded: Load,
}

/// Dispatch a node to its kind's model.
///
/// This is the single seam between the graph's tagged variants and the
/// models; match exhaustiveness guarantees every kind is handled.
pub fn simulate_node(
    node: &ComponentNode,
    load: Load,
    ctx: &SimulationContext,
    behavior: Option<&BehaviorConfig>,
    registry: &BehaviorRegistry,
    options: &SimOptions,
) -> EffectiveOutput {
    match &node.spec {
        ComponentSpec::Client(config) => Client::new(&node.id, config).simulate(load),
        ComponentSpec::AppServer(config) => {
            AppServer::new(&node.id, config).simulate(load, ctx, behavior, registry)
        }
        ComponentSpec::Worker(config) => {
            Worker::new(&node.id, config).simulate(load, ctx, behavior, registry)
        }
        ComponentSpec::Database(config) => Database::new(&node.id, config).simulate(load),
        ComponentSpec::Cache(config) => Cache::new(&node.id, config).simulate(load, options),
        ComponentSpec::MessageQueue(config) => {
            MessageQueue::new(&node.id, config).simulate(load, ctx)
        }
        ComponentSpec::LoadBalancer(config) => {
            LoadBalancer::new(&node.id, config).simulate(load, options)
        }
        ComponentSpec::Cdn(config) => Cdn::new(&node.id, config).simulate(load),
        ComponentSpec::ObjectStore(config) => ObjectStore::new(&node.id, config).simulate(load),
    }
}
