//! Component models for the archsim capacity simulator
//!
//! One model per component kind, each exposing a pure
//! `simulate(load, context, behavior) -> ComponentMetrics` function. Models
//! hold only their own static configuration; every call is idempotent and
//! side-effect free, so a model can be invoked any number of times per test
//! case without bookkeeping.
//!
//! Out-of-range configuration never produces an error here: graph
//! construction clamps it, and the models are total over the clamped domain.

pub mod app_server;
pub mod balancing;
pub mod cache;
pub mod cdn;
pub mod client;
pub mod database;
pub mod load_balancer;
pub mod model;
pub mod object_store;
pub mod queue;
pub mod worker;

pub use app_server::AppServer;
pub use balancing::{
    balancer_metrics, distribute_traffic, recommended_algorithm, select_by_hash, select_random,
    select_weighted_random, validate_config, BalanceError, BalancerMetrics, Distribution,
    LoadBalancerState, ValidationReport, WorkloadTraits,
};
pub use cache::{
    dynamic_hit_ratio, recommended_cache_size, warming_time_secs, AccessSkew, Cache, CacheModel,
    LEGACY_HIT_RATIO,
};
pub use cdn::Cdn;
pub use client::Client;
pub use database::{
    async_replication_lag_ms, replica_distribution, Database, DbCapacity, ReplicaDistribution,
};
pub use load_balancer::LoadBalancer;
pub use model::{simulate_node, EffectiveOutput};
pub use object_store::ObjectStore;
pub use queue::MessageQueue;
pub use worker::Worker;
