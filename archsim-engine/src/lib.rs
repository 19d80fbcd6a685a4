//! Composition engine and test runner for the archsim capacity simulator
//!
//! This crate turns a [`archsim_core::SystemGraph`] plus a traffic profile
//! into end-to-end estimates and grades them against a challenge's test
//! cases:
//!
//! - [`compose`]: breadth-first traversal from the entry component, routing
//!   traffic along declared connections and aggregating per-component
//!   metrics into one end-to-end figure.
//! - [`failure`]: closed-form failure injection over a declared time window,
//!   plus the dependency-level analysis helpers (cascading failure, blast
//!   radius, MTTR, availability impact).
//! - [`TestRunner`]: one verdict per test case; guaranteed never to panic or
//!   return an error; every problem becomes a failing result.
//! - [`executor`]: the boundary to the external code executor, including the
//!   `__TEST_RESULT__` marker protocol.

pub mod apis;
pub mod compose;
pub mod executor;
pub mod failure;
pub mod runner;

pub use apis::component_types_to_apis;
pub use compose::{compose, provisioned_cost, Composed, ComposeParams, FailureOverride};
pub use executor::{parse_benchmark, BenchmarkResult, CodeExecutor, ExecutionOutput, RESULT_MARKER};
pub use failure::{
    availability_impact, blast_radius, cascading_failure, estimate_mttr, failure_effect_at,
    failure_phases, resolve_target, CascadeResult, FailureEffect, FailureMode, FailurePhase,
    FailureWindow, RecoveryPattern,
};
pub use runner::{TestRunner, P99_FACTOR};
