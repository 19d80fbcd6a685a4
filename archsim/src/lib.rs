//! # archsim: capacity simulator for system-design exercises
//!
//! archsim grades user-built architecture diagrams: given a system graph
//! (components + connections + configuration) and a traffic profile, it
//! produces closed-form latency, error-rate, cost, and availability
//! estimates and checks them against a challenge's pass criteria.
//!
//! ## Quick start
//!
//! ```rust
//! use archsim::prelude::*;
//!
//! let graph = SystemGraph::new(
//!     vec![
//!         ComponentNode::new("web", ComponentSpec::Client(Default::default())),
//!         ComponentNode::new("app", ComponentSpec::AppServer(Default::default())),
//!         ComponentNode::new("db", ComponentSpec::Database(Default::default())),
//!     ],
//!     vec![Connection::new("web", "app"), Connection::new("app", "db")],
//! );
//!
//! let case = TestCase {
//!     name: "baseline".to_string(),
//!     kind: TestKind::Performance,
//!     traffic: TrafficProfile::new(100.0, 0.8),
//!     duration: 60,
//!     failure_injection: None,
//!     pass_criteria: PassCriteria {
//!         max_p99_latency: Some(100.0),
//!         ..Default::default()
//!     },
//! };
//!
//! let mut runner = TestRunner::new();
//! let results = runner.run_all(&graph, &[case]);
//! assert!(results[0].passed);
//! ```
//!
//! The simulator is a library invoked in-process by a UI layer; it owns no
//! network surface, file format, or CLI. It is synchronous and
//! single-threaded by design; every estimate is a pure function of the
//! graph snapshot, the behavior registry, and the test case.

pub use archsim_components as components;
pub use archsim_core as core;
pub use archsim_engine as engine;

pub mod prelude {
    //! Commonly used types and entry points

    pub use archsim_core::{
        BehaviorConfig, BehaviorRegistry, Challenge, ComponentBehaviors, ComponentKind,
        ComponentMetrics, ComponentNode, ComponentSpec, Connection, ConnectionKind, FailureKind,
        FailureSpec, Load, PassCriteria, PrebuiltBehavior, SimOptions, SimulationContext,
        SystemGraph, TestCase, TestKind, TestResult, TestStatus, TrafficPattern, TrafficProfile,
    };

    pub use archsim_components::simulate_node;

    pub use archsim_engine::{compose, component_types_to_apis, ComposeParams, TestRunner};
}
