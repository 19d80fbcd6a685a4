//! Core data model for the archsim capacity simulator.
//!
//! This crate provides the fundamental building blocks shared by the component
//! models and the composition engine:
//!
//! - [`BehaviorRegistry`]: immutable lookup tables mapping symbolic behavior
//!   names (worker behaviors, validations, transformations, external APIs) to
//!   latency/throughput/error-rate parameters.
//! - [`SystemGraph`]: the user-submitted architecture, typed component nodes
//!   plus directed connections.
//! - [`TrafficProfile`] and [`TrafficPattern`]: steady-state and time-varying
//!   traffic descriptions.
//! - [`TestCase`] / [`TestResult`]: the grading contract between a challenge
//!   definition and the test runner.
//!
//! # Design
//!
//! The simulator is synchronous and closed-form: every estimate is computed
//! analytically from a traffic rate and static configuration, never from a
//! per-request event loop. All types here are plain data; construction
//! normalizes out-of-range configuration (instance counts clamped to at least
//! one, ratios clamped into `0..=1`) so that downstream math is total.

pub mod behavior;
pub mod context;
pub mod error;
pub mod graph;
pub mod logging;
pub mod metrics;
pub mod options;
pub mod testcase;
pub mod traffic;

pub use behavior::{
    BehaviorConfig, BehaviorRegistry, ComponentBehaviors, CostWeight, ExternalApiSpec,
    PrebuiltBehavior, TransformationSpec, ValidationSpec, WorkerBehavior,
};
pub use context::SimulationContext;
pub use error::{ExecError, GraphError, SimError};
pub use graph::{
    AppServerConfig, Backend, BalancingAlgorithm, CacheConfig, CdnConfig, ClientConfig,
    ComponentKind, ComponentNode, ComponentSpec, Connection, ConnectionKind, DatabaseConfig,
    EvictionPolicy, LoadBalancerConfig, ObjectStoreConfig, QueryComplexity, QueueConfig,
    SystemGraph, WorkerConfig, WorkingSet,
};
pub use logging::{init_simulation_logging, init_simulation_logging_with_level};
pub use metrics::{ComponentMetrics, Load};
pub use options::SimOptions;
pub use testcase::{
    Challenge, FailureKind, FailureSpec, PassCriteria, ResultMetrics, TestCase, TestKind,
    TestResult, TestStatus,
};
pub use traffic::{
    geo_distribution, spike_events, Region, SpikeEvent, TrafficPattern, TrafficPhase, TrafficPoint,
    TrafficProfile,
};
