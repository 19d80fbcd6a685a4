//! Test runner
//!
//! The outermost boundary of the simulator: one verdict per test case,
//! produced by composing the graph under the case's traffic, applying any
//! declared failure window, and checking each populated pass criterion.
//!
//! `run_all` never panics and never returns an error: structural problems
//! and executor failures are converted into failing results so the only way
//! a problem reaches the user is through the pass/fail panel.

use archsim_core::{
    BehaviorRegistry, Challenge, ComponentBehaviors, ResultMetrics, SimError, SimOptions,
    SimulationContext, SystemGraph, TestCase, TestResult, TestStatus,
};
use metrics::{counter, gauge};
use tracing::{debug, info};
use uuid::Uuid;

use crate::compose::{compose, provisioned_cost, ComposeParams};
use crate::executor::{parse_benchmark, CodeExecutor};
use crate::failure::{failure_phases, resolve_target};

/// p99 is derived from the mean by a fixed multiplier. There is no
/// per-request distribution in a closed-form estimate, so this is a
/// placeholder policy, not a statistical claim.
pub const P99_FACTOR: f64 = 1.5;

/// A phase's composed error rate above this counts as a full outage
const OUTAGE_ERROR_RATE: f64 = 0.999;

pub struct TestRunner {
    registry: BehaviorRegistry,
    options: SimOptions,
    behaviors: ComponentBehaviors,
    executor: Option<Box<dyn CodeExecutor>>,
    code: Option<String>,
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRunner {
    pub fn new() -> Self {
        Self {
            registry: BehaviorRegistry::builtin(),
            options: SimOptions::default(),
            behaviors: ComponentBehaviors::default(),
            executor: None,
            code: None,
        }
    }

    pub fn with_registry(mut self, registry: BehaviorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_options(mut self, options: SimOptions) -> Self {
        self.options = options;
        self
    }

    /// Challenge-supplied behavior configuration for the graph's components
    pub fn set_behaviors(&mut self, behaviors: ComponentBehaviors) {
        self.behaviors = behaviors;
    }

    /// Attach the external code executor used to benchmark custom logic
    pub fn set_executor(&mut self, executor: Box<dyn CodeExecutor>) {
        self.executor = Some(executor);
    }

    /// User-submitted source to benchmark when a component declares custom
    /// logic
    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = Some(code.into());
    }

    /// One executor round trip, when the challenge calls for it.
    fn benchmarked_latency(&mut self) -> Result<Option<f64>, SimError> {
        if !self.behaviors.any_custom_logic() {
            return Ok(None);
        }
        let (Some(executor), Some(code)) = (self.executor.as_mut(), self.code.as_deref()) else {
            return Ok(None);
        };
        let output = executor.execute(Uuid::new_v4(), code)?;
        let result = parse_benchmark(&output.output)?;
        debug!(latency_ms = result.latency_ms, "benchmarked user code");
        Ok(Some(result.latency_ms))
    }

    /// Run a single test case against the submitted graph.
    pub fn run_test(&mut self, case: &TestCase, graph: &SystemGraph) -> TestResult {
        info!(test = case.name.as_str(), "running test case");

        let mut ctx = SimulationContext::new(case.duration as f64);
        match self.benchmarked_latency() {
            Ok(Some(latency)) => ctx.benchmarked_latency_ms = Some(latency),
            Ok(None) => {}
            Err(error) => {
                let cost = provisioned_cost(graph, &self.registry, &self.options);
                return record(TestResult::failed_closed(
                    format!("Code execution failed: {error}"),
                    cost,
                ));
            }
        }

        let nominal = match compose(&ComposeParams {
            graph,
            traffic: &case.traffic,
            ctx,
            behaviors: &self.behaviors,
            registry: &self.registry,
            options: &self.options,
            failure: None,
        }) {
            Ok(composed) => composed,
            Err(error) => {
                let cost = provisioned_cost(graph, &self.registry, &self.options);
                return record(TestResult::failed_closed(error.to_string(), cost));
            }
        };

        let nominal_availability = (1.0 - nominal.error_rate).clamp(0.0, 1.0);
        let (availability, downtime_secs) =
            match (&case.failure_injection, self.options.failure_injection) {
                (Some(spec), true) => match resolve_target(graph, spec.kind) {
                    Some(target) => {
                        let phases = failure_phases(spec, &target.id, case.duration);
                        let total: f64 = case.duration.max(1) as f64;
                        let mut weighted = 0.0;
                        let mut downtime = 0.0;
                        for phase in &phases {
                            let error_rate = match &phase.failure {
                                None => nominal.error_rate,
                                Some(failure) => compose(&ComposeParams {
                                    graph,
                                    traffic: &case.traffic,
                                    ctx,
                                    behaviors: &self.behaviors,
                                    registry: &self.registry,
                                    options: &self.options,
                                    failure: Some(failure),
                                })
                                .map(|c| c.error_rate)
                                .unwrap_or(1.0),
                            };
                            weighted += phase.secs * (1.0 - error_rate);
                            if error_rate >= OUTAGE_ERROR_RATE {
                                downtime += phase.secs;
                            }
                        }
                        ((weighted / total).clamp(0.0, 1.0), Some(downtime))
                    }
                    // Nothing on the canvas matches the declared failure;
                    // there is nothing to degrade.
                    None => (nominal_availability, Some(0.0)),
                },
                _ => (nominal_availability, None),
            };

        let metrics = ResultMetrics {
            p50_latency: nominal.latency_ms,
            p99_latency: nominal.latency_ms * P99_FACTOR,
            error_rate: nominal.error_rate,
            monthly_cost: nominal.monthly_cost,
            availability,
            cache_hit_rate: nominal.cache_hit_rate,
            infrastructure_cost: Some(nominal.monthly_cost),
            downtime_secs,
        };

        let result = match first_failing_criterion(case, &metrics) {
            Some(explanation) => TestResult {
                passed: false,
                status: TestStatus::Failed,
                metrics,
                explanation,
            },
            None => TestResult {
                passed: true,
                status: TestStatus::Passed,
                explanation: format!(
                    "All pass criteria met at {:.0} rps",
                    case.traffic.total_rps()
                ),
                metrics,
            },
        };
        record(result)
    }

    /// Run every test case, producing exactly one result per case.
    pub fn run_all(&mut self, graph: &SystemGraph, cases: &[TestCase]) -> Vec<TestResult> {
        cases.iter().map(|case| self.run_test(case, graph)).collect()
    }

    /// Run a challenge: install its behavior configuration, then grade the
    /// graph against every declared test case.
    pub fn run_challenge(&mut self, challenge: &Challenge, graph: &SystemGraph) -> Vec<TestResult> {
        info!(challenge = challenge.id.as_str(), "running challenge");
        self.behaviors = challenge.component_behaviors.clone();
        self.run_all(graph, &challenge.test_cases)
    }

    /// Synthetic all-failing result set, used when pre-simulation validation
    /// (connection/schema linting) gates the run before the engine is
    /// invoked.
    pub fn fail_all(&self, graph: &SystemGraph, cases: &[TestCase], reason: &str) -> Vec<TestResult> {
        let cost = provisioned_cost(graph, &self.registry, &self.options);
        cases
            .iter()
            .map(|_| TestResult::failed_closed(reason, cost))
            .collect()
    }
}

/// Check criteria in declaration order and describe the first violation.
fn first_failing_criterion(case: &TestCase, metrics: &ResultMetrics) -> Option<String> {
    let criteria = &case.pass_criteria;
    if let Some(limit) = criteria.max_p99_latency {
        if metrics.p99_latency > limit {
            return Some(format!(
                "p99 latency {:.1}ms exceeds the {limit:.1}ms limit",
                metrics.p99_latency
            ));
        }
    }
    if let Some(limit) = criteria.max_error_rate {
        if metrics.error_rate > limit {
            return Some(format!(
                "error rate {:.2}% exceeds the {:.2}% limit",
                metrics.error_rate * 100.0,
                limit * 100.0
            ));
        }
    }
    if let Some(limit) = criteria.max_monthly_cost {
        if metrics.monthly_cost > limit {
            return Some(format!(
                "monthly cost ${:.2} exceeds the ${limit:.2} budget",
                metrics.monthly_cost
            ));
        }
    }
    if let Some(required) = criteria.min_availability {
        if metrics.availability < required {
            return Some(format!(
                "availability {:.3} is below the required {required:.3}",
                metrics.availability
            ));
        }
    }
    if let Some(required) = criteria.min_cache_hit_rate {
        let hit = metrics.cache_hit_rate.unwrap_or(0.0);
        if hit < required {
            return Some(format!(
                "cache hit rate {hit:.2} is below the required {required:.2}"
            ));
        }
    }
    if let Some(allowance) = criteria.max_downtime {
        let downtime = metrics.downtime_secs.unwrap_or(0.0);
        if downtime > allowance {
            return Some(format!(
                "downtime {downtime:.0}s exceeds the {allowance:.0}s allowance"
            ));
        }
    }
    None
}

fn record(result: TestResult) -> TestResult {
    counter!("archsim_test_cases_total").increment(1);
    if result.passed {
        counter!("archsim_test_cases_passed").increment(1);
    } else {
        counter!("archsim_test_cases_failed").increment(1);
    }
    if result.metrics.p99_latency.is_finite() {
        gauge!("archsim_last_p99_latency_ms").set(result.metrics.p99_latency);
    }
    gauge!("archsim_last_error_rate").set(result.metrics.error_rate);
    result
}
