//! Behavior profile registry
//!
//! Static lookup tables mapping symbolic names to latency/throughput/error
//! parameters. Profiles are defined once at startup via
//! [`BehaviorRegistry::builtin`] and passed into the simulation explicitly;
//! there is no global singleton. The registry is never mutated at runtime.
//!
//! Lookups are deliberately lenient: an unknown name contributes zero latency
//! and perfect success rather than an error, so an incompletely configured
//! challenge never crashes the simulator.

use crate::graph::ComponentNode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Overall processing style of a worker or app server
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkerBehavior {
    /// Base processing latency per request, in milliseconds
    pub base_latency_ms: f64,
    /// Multiplier on the instance's nominal throughput (1.0 = nominal,
    /// below 1.0 = heavier work per request)
    pub throughput_multiplier: f64,
    /// Baseline error rate independent of load
    pub error_rate: f64,
}

/// A validation check performed on each request (schema check, auth, ...)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationSpec {
    pub latency_ms: f64,
    pub success_rate: f64,
}

/// Relative CPU cost weight of a transformation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostWeight {
    Low,
    Medium,
    High,
}

impl CostWeight {
    pub fn factor(self) -> f64 {
        match self {
            CostWeight::Low => 1.0,
            CostWeight::Medium => 1.5,
            CostWeight::High => 2.0,
        }
    }
}

/// A data transformation applied to each request (parse, compress, ...)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformationSpec {
    pub latency_ms: f64,
    pub cost: CostWeight,
}

/// An external API dependency called during request processing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExternalApiSpec {
    pub p50_latency_ms: f64,
    pub p99_latency_ms: f64,
    pub success_rate: f64,
}

/// Behavior selection for a single component, supplied by the challenge
/// definition or the user's configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BehaviorConfig {
    /// Named worker behavior selecting base latency and throughput
    pub behavior: Option<String>,
    /// Validation checks run on every request
    pub validations: Vec<String>,
    /// Transformations applied to every request
    pub transformations: Vec<String>,
    /// External APIs called during processing
    pub external_apis: Vec<String>,
    /// Whether the component runs user-submitted code that should be
    /// benchmarked by the external executor
    pub custom_logic: bool,
}

/// Behavior configuration for a whole graph, keyed by component id or, as a
/// fallback, by component kind name (`"worker"`, `"app_server"`).
///
/// Challenge definitions supply this alongside their test cases; the
/// composition layer resolves one entry per node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentBehaviors(pub HashMap<String, BehaviorConfig>);

impl ComponentBehaviors {
    pub fn for_node<'a>(&'a self, node: &ComponentNode) -> Option<&'a BehaviorConfig> {
        self.0
            .get(&node.id)
            .or_else(|| self.0.get(node.kind().name()))
    }

    /// Whether any configured component runs user-submitted code
    pub fn any_custom_logic(&self) -> bool {
        self.0.values().any(|b| b.custom_logic)
    }
}

/// A named behavior bundle a challenge offers for one component kind.
///
/// The canvas editor presents these as a menu; picking one installs its
/// config for the matching component. The simulator itself only ever sees
/// the resulting [`BehaviorConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltBehavior {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub config: BehaviorConfig,
}

/// Immutable registry of behavior profiles, keyed by symbolic name
///
/// Four categories: worker behaviors, validations, transformations, and
/// external APIs. Aggregation helpers sum latencies, multiply success rates,
/// and average transformation cost weights; missing names are silently
/// ignored.
#[derive(Debug, Clone)]
pub struct BehaviorRegistry {
    workers: HashMap<String, WorkerBehavior>,
    validations: HashMap<String, ValidationSpec>,
    transformations: HashMap<String, TransformationSpec>,
    external_apis: HashMap<String, ExternalApiSpec>,
}

impl BehaviorRegistry {
    /// Construct the built-in profile tables.
    ///
    /// Values are calibration constants for the exercise catalog, not
    /// measurements of any real system.
    pub fn builtin() -> Self {
        let mut workers = HashMap::new();
        workers.insert(
            "simple_read".to_string(),
            WorkerBehavior {
                base_latency_ms: 10.0,
                throughput_multiplier: 1.2,
                error_rate: 0.0,
            },
        );
        workers.insert(
            "simple_write".to_string(),
            WorkerBehavior {
                base_latency_ms: 20.0,
                throughput_multiplier: 1.0,
                error_rate: 0.0,
            },
        );
        workers.insert(
            "heavy_compute".to_string(),
            WorkerBehavior {
                base_latency_ms: 150.0,
                throughput_multiplier: 0.25,
                error_rate: 0.001,
            },
        );
        workers.insert(
            "batch_process".to_string(),
            WorkerBehavior {
                base_latency_ms: 500.0,
                throughput_multiplier: 0.1,
                error_rate: 0.002,
            },
        );
        workers.insert(
            "media_transcode".to_string(),
            WorkerBehavior {
                base_latency_ms: 2000.0,
                throughput_multiplier: 0.05,
                error_rate: 0.005,
            },
        );

        let mut validations = HashMap::new();
        validations.insert(
            "schema_check".to_string(),
            ValidationSpec {
                latency_ms: 1.0,
                success_rate: 0.9995,
            },
        );
        validations.insert(
            "auth_token".to_string(),
            ValidationSpec {
                latency_ms: 2.0,
                success_rate: 0.999,
            },
        );
        validations.insert(
            "rate_limit_check".to_string(),
            ValidationSpec {
                latency_ms: 0.5,
                success_rate: 0.9999,
            },
        );
        validations.insert(
            "dedupe_check".to_string(),
            ValidationSpec {
                latency_ms: 3.0,
                success_rate: 0.999,
            },
        );
        validations.insert(
            "content_filter".to_string(),
            ValidationSpec {
                latency_ms: 5.0,
                success_rate: 0.998,
            },
        );

        let mut transformations = HashMap::new();
        transformations.insert(
            "json_parse".to_string(),
            TransformationSpec {
                latency_ms: 0.5,
                cost: CostWeight::Low,
            },
        );
        transformations.insert(
            "field_mapping".to_string(),
            TransformationSpec {
                latency_ms: 1.0,
                cost: CostWeight::Low,
            },
        );
        transformations.insert(
            "compress".to_string(),
            TransformationSpec {
                latency_ms: 8.0,
                cost: CostWeight::Medium,
            },
        );
        transformations.insert(
            "encrypt".to_string(),
            TransformationSpec {
                latency_ms: 6.0,
                cost: CostWeight::Medium,
            },
        );
        transformations.insert(
            "thumbnail_resize".to_string(),
            TransformationSpec {
                latency_ms: 40.0,
                cost: CostWeight::High,
            },
        );
        transformations.insert(
            "ml_embedding".to_string(),
            TransformationSpec {
                latency_ms: 60.0,
                cost: CostWeight::High,
            },
        );

        let mut external_apis = HashMap::new();
        external_apis.insert(
            "payment_gateway".to_string(),
            ExternalApiSpec {
                p50_latency_ms: 120.0,
                p99_latency_ms: 450.0,
                success_rate: 0.995,
            },
        );
        external_apis.insert(
            "email_service".to_string(),
            ExternalApiSpec {
                p50_latency_ms: 80.0,
                p99_latency_ms: 300.0,
                success_rate: 0.998,
            },
        );
        external_apis.insert(
            "geoip_lookup".to_string(),
            ExternalApiSpec {
                p50_latency_ms: 15.0,
                p99_latency_ms: 60.0,
                success_rate: 0.9995,
            },
        );
        external_apis.insert(
            "push_notification".to_string(),
            ExternalApiSpec {
                p50_latency_ms: 60.0,
                p99_latency_ms: 250.0,
                success_rate: 0.997,
            },
        );
        external_apis.insert(
            "webhook_delivery".to_string(),
            ExternalApiSpec {
                p50_latency_ms: 90.0,
                p99_latency_ms: 400.0,
                success_rate: 0.99,
            },
        );

        Self {
            workers,
            validations,
            transformations,
            external_apis,
        }
    }

    /// Construct an empty registry (every lookup misses). Useful in tests.
    pub fn empty() -> Self {
        Self {
            workers: HashMap::new(),
            validations: HashMap::new(),
            transformations: HashMap::new(),
            external_apis: HashMap::new(),
        }
    }

    pub fn worker(&self, name: &str) -> Option<&WorkerBehavior> {
        self.workers.get(name)
    }

    pub fn validation(&self, name: &str) -> Option<&ValidationSpec> {
        self.validations.get(name)
    }

    pub fn transformation(&self, name: &str) -> Option<&TransformationSpec> {
        self.transformations.get(name)
    }

    pub fn external_api(&self, name: &str) -> Option<&ExternalApiSpec> {
        self.external_apis.get(name)
    }

    /// Sum of validation latencies; missing names contribute 0.
    pub fn validation_latency(&self, names: &[String]) -> f64 {
        names
            .iter()
            .filter_map(|n| self.validation(n))
            .map(|v| v.latency_ms)
            .sum()
    }

    /// Sum of transformation latencies; missing names contribute 0.
    pub fn transformation_latency(&self, names: &[String]) -> f64 {
        names
            .iter()
            .filter_map(|n| self.transformation(n))
            .map(|t| t.latency_ms)
            .sum()
    }

    /// Sum of external API p50 latencies; missing names contribute 0.
    pub fn external_api_latency(&self, names: &[String]) -> f64 {
        names
            .iter()
            .filter_map(|n| self.external_api(n))
            .map(|a| a.p50_latency_ms)
            .sum()
    }

    /// Product of success rates across validations and external APIs,
    /// starting from 1.0. Assumes independent failures.
    pub fn combined_success_rate(&self, config: &BehaviorConfig) -> f64 {
        let validations = config
            .validations
            .iter()
            .filter_map(|n| self.validation(n))
            .map(|v| v.success_rate);
        let apis = config
            .external_apis
            .iter()
            .filter_map(|n| self.external_api(n))
            .map(|a| a.success_rate);
        validations.chain(apis).product()
    }

    /// Mean transformation cost weight (low=1.0, medium=1.5, high=2.0).
    ///
    /// Missing names count as low. An empty list yields 1.0; the divisor is
    /// guarded so the mean is always well defined.
    pub fn cpu_cost_factor(&self, names: &[String]) -> f64 {
        if names.is_empty() {
            return 1.0;
        }
        let total: f64 = names
            .iter()
            .map(|n| {
                self.transformation(n)
                    .map(|t| t.cost.factor())
                    .unwrap_or(1.0)
            })
            .sum();
        total / names.len().max(1) as f64
    }
}
