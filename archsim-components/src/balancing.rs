//! Load-balancing algorithms and traffic distribution
//!
//! Backend selection state machines (round robin, weighted round robin,
//! least connections, hash, random) plus the rate-level
//! [`distribute_traffic`] used by the composition layer, which splits an
//! aggregate request rate across backends and flags distribution problems
//! (hot spots, overloaded backends, nothing healthy).

use archsim_core::{Backend, BalancingAlgorithm, LoadBalancerConfig, SimOptions};
use rand::Rng;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Errors from single-request backend selection
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BalanceError {
    #[error("No healthy backends available")]
    NoHealthyBackends,
}

/// Mutable selection state carried across requests.
///
/// The simulator itself is stateless per test case; this state exists for
/// per-request selection (round-robin cursors, connection tracking) when the
/// balancer is driven request by request.
#[derive(Debug, Default)]
pub struct LoadBalancerState {
    round_robin_cursor: usize,
    weighted_credit: HashMap<String, f64>,
    connections: HashMap<String, u64>,
    total_requests: u64,
}

fn healthy(backends: &[Backend]) -> Vec<&Backend> {
    backends.iter().filter(|b| b.healthy).collect()
}

impl LoadBalancerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cycle through healthy backends in order.
    pub fn next_round_robin<'a>(&mut self, backends: &'a [Backend]) -> Result<&'a str, BalanceError> {
        let candidates = healthy(backends);
        if candidates.is_empty() {
            return Err(BalanceError::NoHealthyBackends);
        }
        let pick = candidates[self.round_robin_cursor % candidates.len()];
        self.round_robin_cursor += 1;
        self.total_requests += 1;
        Ok(&pick.id)
    }

    /// Smooth weighted round robin: each backend accrues credit equal to its
    /// weight per round and the highest credit wins, keeping the interleave
    /// deterministic and proportional.
    pub fn next_weighted_round_robin<'a>(
        &mut self,
        backends: &'a [Backend],
    ) -> Result<&'a str, BalanceError> {
        let candidates = healthy(backends);
        if candidates.is_empty() {
            return Err(BalanceError::NoHealthyBackends);
        }
        let total_weight: f64 = candidates.iter().map(|b| b.weight.max(0.0)).sum();
        let mut best: Option<&Backend> = None;
        let mut best_credit = f64::NEG_INFINITY;
        for &backend in &candidates {
            let credit = self
                .weighted_credit
                .entry(backend.id.clone())
                .or_insert(0.0);
            *credit += backend.weight.max(0.0);
            if *credit > best_credit {
                best_credit = *credit;
                best = Some(backend);
            }
        }
        let picked = best.ok_or(BalanceError::NoHealthyBackends)?;
        if let Some(credit) = self.weighted_credit.get_mut(&picked.id) {
            *credit -= total_weight.max(f64::MIN_POSITIVE);
        }
        self.total_requests += 1;
        Ok(&picked.id)
    }

    /// Pick the backend with the fewest weighted connections.
    ///
    /// Declared `active_connections` on the backend wins; otherwise internal
    /// tracking is used and the selection counts as a new connection.
    pub fn least_connections<'a>(&mut self, backends: &'a [Backend]) -> Result<&'a str, BalanceError> {
        let candidates = healthy(backends);
        if candidates.is_empty() {
            return Err(BalanceError::NoHealthyBackends);
        }
        let picked = candidates
            .iter()
            .min_by(|a, b| {
                let conn_a = a
                    .active_connections
                    .unwrap_or_else(|| self.connection_count(&a.id));
                let conn_b = b
                    .active_connections
                    .unwrap_or_else(|| self.connection_count(&b.id));
                let weighted_a = conn_a as f64 / a.weight.max(f64::MIN_POSITIVE);
                let weighted_b = conn_b as f64 / b.weight.max(f64::MIN_POSITIVE);
                weighted_a.total_cmp(&weighted_b)
            })
            .ok_or(BalanceError::NoHealthyBackends)?;
        self.increment_connections(&picked.id);
        self.total_requests += 1;
        Ok(&picked.id)
    }

    pub fn increment_connections(&mut self, id: &str) {
        *self.connections.entry(id.to_string()).or_insert(0) += 1;
    }

    pub fn decrement_connections(&mut self, id: &str) {
        if let Some(count) = self.connections.get_mut(id) {
            *count = count.saturating_sub(1);
        }
    }

    pub fn connection_count(&self, id: &str) -> u64 {
        self.connections.get(id).copied().unwrap_or(0)
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests
    }

    pub fn reset(&mut self) {
        self.round_robin_cursor = 0;
        self.weighted_credit.clear();
        self.connections.clear();
        self.total_requests = 0;
    }
}

/// Deterministic backend choice for a sticky session key.
pub fn select_by_hash<'a>(backends: &'a [Backend], key: &str) -> Result<&'a str, BalanceError> {
    let candidates = healthy(backends);
    if candidates.is_empty() {
        return Err(BalanceError::NoHealthyBackends);
    }
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    let index = (hasher.finish() as usize) % candidates.len();
    Ok(&candidates[index].id)
}

/// Uniform random choice among healthy backends.
pub fn select_random<'a, R: Rng>(
    backends: &'a [Backend],
    rng: &mut R,
) -> Result<&'a str, BalanceError> {
    let candidates = healthy(backends);
    if candidates.is_empty() {
        return Err(BalanceError::NoHealthyBackends);
    }
    Ok(&candidates[rng.gen_range(0..candidates.len())].id)
}

/// Weight-proportional random choice among healthy backends.
pub fn select_weighted_random<'a, R: Rng>(
    backends: &'a [Backend],
    rng: &mut R,
) -> Result<&'a str, BalanceError> {
    let candidates = healthy(backends);
    if candidates.is_empty() {
        return Err(BalanceError::NoHealthyBackends);
    }
    let total: f64 = candidates.iter().map(|b| b.weight.max(0.0)).sum();
    if total <= 0.0 {
        return Ok(&candidates[0].id);
    }
    let mut target = rng.gen_range(0.0..total);
    for backend in &candidates {
        target -= backend.weight.max(0.0);
        if target <= 0.0 {
            return Ok(&backend.id);
        }
    }
    Ok(&candidates[candidates.len() - 1].id)
}

/// Result of splitting an aggregate rate across backends
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    /// Requests per second landing on each backend
    pub load: HashMap<String, f64>,
    pub warnings: Vec<String>,
}

/// Share of traffic above which a single backend counts as a hot spot
const HOT_SPOT_SHARE: f64 = 0.7;

/// Split an aggregate request rate across the configured backends.
///
/// With algorithms disabled the split is simply even across healthy
/// backends; otherwise the expected steady-state share of each algorithm is
/// used (round robin and random are even, weighted variants are
/// weight-proportional, ip-hash pins a sticky key to one backend).
pub fn distribute_traffic(
    rps: f64,
    config: &LoadBalancerConfig,
    options: &SimOptions,
) -> Distribution {
    let mut warnings = Vec::new();
    let candidates = healthy(&config.backends);
    if candidates.is_empty() {
        warnings.push("No healthy backends available".to_string());
        return Distribution {
            load: HashMap::new(),
            warnings,
        };
    }

    let mut load: HashMap<String, f64> = HashMap::new();
    if !options.lb_algorithms {
        let share = rps / candidates.len() as f64;
        for backend in &candidates {
            load.insert(backend.id.clone(), share);
        }
    } else {
        match config.algorithm {
            BalancingAlgorithm::RoundRobin
            | BalancingAlgorithm::Random
            | BalancingAlgorithm::LeastConnections => {
                // Least-connections converges to an even split when request
                // durations are homogeneous, which is all a closed-form
                // estimate can assume.
                let share = rps / candidates.len() as f64;
                for backend in &candidates {
                    load.insert(backend.id.clone(), share);
                }
            }
            BalancingAlgorithm::WeightedRoundRobin | BalancingAlgorithm::WeightedRandom => {
                let total: f64 = candidates.iter().map(|b| b.weight.max(0.0)).sum();
                if total <= 0.0 {
                    let share = rps / candidates.len() as f64;
                    for backend in &candidates {
                        load.insert(backend.id.clone(), share);
                    }
                } else {
                    for backend in &candidates {
                        load.insert(backend.id.clone(), rps * backend.weight.max(0.0) / total);
                    }
                }
            }
            BalancingAlgorithm::IpHash => match &config.sticky_session_key {
                Some(key) => {
                    // A single sticky key pins all of its traffic to one
                    // backend.
                    for backend in &candidates {
                        load.insert(backend.id.clone(), 0.0);
                    }
                    if let Ok(target) = select_by_hash(&config.backends, key) {
                        load.insert(target.to_string(), rps);
                    }
                }
                None => {
                    // Many distinct client addresses spread evenly
                    let share = rps / candidates.len() as f64;
                    for backend in &candidates {
                        load.insert(backend.id.clone(), share);
                    }
                }
            },
        }
    }

    if candidates.len() > 1 && rps > 0.0 {
        if let Some((id, max_rps)) = load
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(id, rps)| (id.clone(), *rps))
        {
            if max_rps / rps > HOT_SPOT_SHARE {
                warnings.push(format!(
                    "Hot spot: backend {id} receives {:.0}% of traffic",
                    max_rps / rps * 100.0
                ));
            }
        }
    }
    for backend in &candidates {
        if let (Some(capacity), Some(assigned)) = (backend.capacity, load.get(&backend.id)) {
            if *assigned > capacity {
                warnings.push(format!(
                    "Backend {} overloaded: {assigned:.0} rps against capacity {capacity:.0}",
                    backend.id
                ));
            }
        }
    }

    Distribution { load, warnings }
}

/// Combined metrics for a balancer given per-backend observations
#[derive(Debug, Clone, PartialEq)]
pub struct BalancerMetrics {
    /// Distribution-weighted mean backend latency
    pub avg_latency_ms: f64,
    pub max_latency_ms: f64,
    /// Distribution-weighted mean backend error rate
    pub combined_error_rate: f64,
    /// How uneven the split is: 0 for perfectly even, approaching 1 when one
    /// backend takes nearly everything
    pub utilization_skew: f64,
}

pub fn balancer_metrics(
    rps: f64,
    config: &LoadBalancerConfig,
    backend_metrics: &HashMap<String, (f64, f64)>,
    options: &SimOptions,
) -> BalancerMetrics {
    let distribution = distribute_traffic(rps, config, options);
    let total: f64 = distribution.load.values().sum();

    let mut avg_latency_ms = 0.0;
    let mut max_latency_ms: f64 = 0.0;
    let mut combined_error_rate = 0.0;
    for (id, assigned) in &distribution.load {
        if let Some((latency, error)) = backend_metrics.get(id) {
            let share = if total > 0.0 { assigned / total } else { 0.0 };
            avg_latency_ms += latency * share;
            combined_error_rate += error * share;
            max_latency_ms = max_latency_ms.max(*latency);
        }
    }

    let utilization_skew = if distribution.load.len() > 1 && total > 0.0 {
        let max_share = distribution
            .load
            .values()
            .fold(0.0_f64, |acc, v| acc.max(*v))
            / total;
        let min_share = distribution
            .load
            .values()
            .fold(f64::INFINITY, |acc, v| acc.min(*v))
            / total;
        if max_share > 0.0 {
            (max_share - min_share) / max_share
        } else {
            0.0
        }
    } else {
        0.0
    };

    BalancerMetrics {
        avg_latency_ms,
        max_latency_ms,
        combined_error_rate,
        utilization_skew,
    }
}

/// Workload traits used to pick a sensible default algorithm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkloadTraits {
    pub session_affinity: bool,
    pub varying_request_duration: bool,
    pub uneven_capacity: bool,
    pub high_volume: bool,
}

pub fn recommended_algorithm(traits: WorkloadTraits) -> BalancingAlgorithm {
    if traits.session_affinity {
        BalancingAlgorithm::IpHash
    } else if traits.varying_request_duration {
        BalancingAlgorithm::LeastConnections
    } else if traits.uneven_capacity {
        BalancingAlgorithm::WeightedRoundRobin
    } else if traits.high_volume {
        BalancingAlgorithm::Random
    } else {
        BalancingAlgorithm::RoundRobin
    }
}

/// Configuration lint outcome
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

pub fn validate_config(config: &LoadBalancerConfig) -> ValidationReport {
    let mut errors = Vec::new();
    if config.backends.is_empty() {
        errors.push("No backends configured".to_string());
    } else if healthy(&config.backends).is_empty() {
        errors.push("No healthy backends configured".to_string());
    }
    for backend in &config.backends {
        if backend.weight <= 0.0 {
            errors.push(format!("Backend {} has invalid weight", backend.id));
        }
        if matches!(backend.capacity, Some(c) if c <= 0.0) {
            errors.push(format!("Backend {} has invalid capacity", backend.id));
        }
    }
    if config.algorithm == BalancingAlgorithm::IpHash && config.sticky_session_key.is_none() {
        errors.push("ip_hash requires a sticky session key".to_string());
    }
    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn backends(ids: &[&str]) -> Vec<Backend> {
        ids.iter().map(|id| Backend::new(*id)).collect()
    }

    #[test]
    fn test_round_robin_cycles_in_order() {
        let mut state = LoadBalancerState::new();
        let pool = backends(&["app1", "app2", "app3"]);
        assert_eq!(state.next_round_robin(&pool).unwrap(), "app1");
        assert_eq!(state.next_round_robin(&pool).unwrap(), "app2");
        assert_eq!(state.next_round_robin(&pool).unwrap(), "app3");
        assert_eq!(state.next_round_robin(&pool).unwrap(), "app1");
    }

    #[test]
    fn test_round_robin_skips_unhealthy() {
        let mut state = LoadBalancerState::new();
        let pool = vec![
            Backend::new("app1"),
            Backend::new("app2").unhealthy(),
            Backend::new("app3"),
        ];
        assert_eq!(state.next_round_robin(&pool).unwrap(), "app1");
        assert_eq!(state.next_round_robin(&pool).unwrap(), "app3");
        assert_eq!(state.next_round_robin(&pool).unwrap(), "app1");
    }

    #[test]
    fn test_round_robin_errors_with_no_healthy() {
        let mut state = LoadBalancerState::new();
        let pool = vec![Backend::new("app1").unhealthy(), Backend::new("app2").unhealthy()];
        assert_eq!(
            state.next_round_robin(&pool),
            Err(BalanceError::NoHealthyBackends)
        );
    }

    #[test]
    fn test_weighted_round_robin_respects_weights() {
        let mut state = LoadBalancerState::new();
        let pool = vec![
            Backend::new("app1").with_weight(5.0),
            Backend::new("app2").with_weight(1.0),
        ];
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for _ in 0..60 {
            let picked = state.next_weighted_round_robin(&pool).unwrap();
            *counts.entry(picked).or_insert(0) += 1;
        }
        assert_eq!(counts["app1"], 50);
        assert_eq!(counts["app2"], 10);
    }

    #[test]
    fn test_least_connections_prefers_idle() {
        let mut state = LoadBalancerState::new();
        let pool = vec![
            Backend {
                active_connections: Some(10),
                ..Backend::new("app1")
            },
            Backend {
                active_connections: Some(5),
                ..Backend::new("app2")
            },
            Backend {
                active_connections: Some(8),
                ..Backend::new("app3")
            },
        ];
        assert_eq!(state.least_connections(&pool).unwrap(), "app2");
    }

    #[test]
    fn test_least_connections_uses_internal_tracking() {
        let mut state = LoadBalancerState::new();
        let pool = backends(&["app1", "app2", "app3"]);
        state.increment_connections("app1");
        state.increment_connections("app1");
        state.increment_connections("app2");
        assert_eq!(state.least_connections(&pool).unwrap(), "app3");
    }

    #[test]
    fn test_least_connections_is_weight_aware() {
        let mut state = LoadBalancerState::new();
        let pool = vec![
            Backend {
                active_connections: Some(10),
                ..Backend::new("app1").with_weight(2.0)
            },
            Backend {
                active_connections: Some(8),
                ..Backend::new("app2")
            },
        ];
        // app1: 10/2 = 5 weighted, app2: 8/1 = 8 weighted
        assert_eq!(state.least_connections(&pool).unwrap(), "app1");
    }

    #[test]
    fn test_connection_count_never_goes_negative() {
        let mut state = LoadBalancerState::new();
        state.increment_connections("app1");
        state.decrement_connections("app1");
        state.decrement_connections("app1");
        assert_eq!(state.connection_count("app1"), 0);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut state = LoadBalancerState::new();
        let pool = backends(&["app1", "app2"]);
        state.increment_connections("app1");
        let _ = state.next_round_robin(&pool);
        state.reset();
        assert_eq!(state.connection_count("app1"), 0);
        assert_eq!(state.total_requests(), 0);
        assert_eq!(state.next_round_robin(&pool).unwrap(), "app1");
    }

    #[test]
    fn test_hash_selection_is_sticky() {
        let pool = backends(&["app1", "app2", "app3"]);
        let first = select_by_hash(&pool, "user-123").unwrap();
        for _ in 0..10 {
            assert_eq!(select_by_hash(&pool, "user-123").unwrap(), first);
        }
    }

    #[test]
    fn test_hash_distributes_distinct_keys() {
        let pool = backends(&["app1", "app2", "app3"]);
        let mut seen = std::collections::HashSet::new();
        for i in 0..100 {
            seen.insert(select_by_hash(&pool, &format!("user-{i}")).unwrap());
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_hash_skips_unhealthy() {
        let pool = vec![
            Backend::new("app1").unhealthy(),
            Backend::new("app2"),
            Backend::new("app3"),
        ];
        for i in 0..50 {
            assert_ne!(select_by_hash(&pool, &format!("key-{i}")).unwrap(), "app1");
        }
    }

    #[test]
    fn test_weighted_random_respects_weights() {
        let pool = vec![
            Backend::new("app1").with_weight(9.0),
            Backend::new("app2").with_weight(1.0),
        ];
        let mut rng = StdRng::seed_from_u64(11);
        let mut app1 = 0u32;
        for _ in 0..1000 {
            if select_weighted_random(&pool, &mut rng).unwrap() == "app1" {
                app1 += 1;
            }
        }
        let ratio = app1 as f64 / 1000.0;
        assert!(ratio > 0.85 && ratio < 0.95);
    }

    #[test]
    fn test_distribute_even_when_algorithms_disabled() {
        let config = LoadBalancerConfig {
            algorithm: BalancingAlgorithm::WeightedRoundRobin,
            backends: vec![
                Backend::new("app1").with_weight(10.0),
                Backend::new("app2").with_weight(1.0),
            ],
            sticky_session_key: None,
        };
        let result = distribute_traffic(1000.0, &config, &SimOptions::legacy());
        assert_eq!(result.load["app1"], result.load["app2"]);
    }

    #[test]
    fn test_distribute_weighted() {
        let config = LoadBalancerConfig {
            algorithm: BalancingAlgorithm::WeightedRoundRobin,
            backends: vec![
                Backend::new("app1").with_weight(2.0),
                Backend::new("app2").with_weight(1.0),
            ],
            sticky_session_key: None,
        };
        let result = distribute_traffic(1000.0, &config, &SimOptions::default());
        let ratio = result.load["app1"] / result.load["app2"];
        assert!((ratio - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_distribute_sticky_key_warns_hot_spot() {
        let config = LoadBalancerConfig {
            algorithm: BalancingAlgorithm::IpHash,
            backends: backends(&["app1", "app2", "app3"]),
            sticky_session_key: Some("same-client".to_string()),
        };
        let result = distribute_traffic(1000.0, &config, &SimOptions::default());
        let max = result.load.values().fold(0.0_f64, |acc, v| acc.max(*v));
        assert!((max - 1000.0).abs() < 1e-9);
        assert!(result.warnings.iter().any(|w| w.contains("Hot spot")));
    }

    #[test]
    fn test_distribute_warns_overloaded_backends() {
        let config = LoadBalancerConfig {
            algorithm: BalancingAlgorithm::RoundRobin,
            backends: vec![
                Backend {
                    capacity: Some(100.0),
                    ..Backend::new("app1")
                },
                Backend {
                    capacity: Some(100.0),
                    ..Backend::new("app2")
                },
            ],
            sticky_session_key: None,
        };
        let result = distribute_traffic(500.0, &config, &SimOptions::default());
        assert!(result.warnings.iter().any(|w| w.contains("overloaded")));
    }

    #[test]
    fn test_distribute_no_healthy_backends() {
        let config = LoadBalancerConfig {
            algorithm: BalancingAlgorithm::RoundRobin,
            backends: vec![Backend::new("app1").unhealthy()],
            sticky_session_key: None,
        };
        let result = distribute_traffic(1000.0, &config, &SimOptions::default());
        assert!(result.load.is_empty());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("No healthy backends")));
    }

    #[test]
    fn test_balancer_metrics_weighted_average() {
        let config = LoadBalancerConfig {
            algorithm: BalancingAlgorithm::RoundRobin,
            backends: backends(&["app1", "app2"]),
            sticky_session_key: None,
        };
        let mut backend_metrics = HashMap::new();
        backend_metrics.insert("app1".to_string(), (10.0, 0.01));
        backend_metrics.insert("app2".to_string(), (20.0, 0.02));
        let metrics = balancer_metrics(1000.0, &config, &backend_metrics, &SimOptions::default());
        assert!(metrics.avg_latency_ms > 10.0 && metrics.avg_latency_ms < 20.0);
        assert_eq!(metrics.max_latency_ms, 20.0);
        assert!(metrics.combined_error_rate > 0.01 && metrics.combined_error_rate < 0.05);
    }

    #[test]
    fn test_balancer_metrics_skew() {
        let config = LoadBalancerConfig {
            algorithm: BalancingAlgorithm::WeightedRoundRobin,
            backends: vec![
                Backend::new("app1").with_weight(10.0),
                Backend::new("app2").with_weight(1.0),
            ],
            sticky_session_key: None,
        };
        let mut backend_metrics = HashMap::new();
        backend_metrics.insert("app1".to_string(), (10.0, 0.0));
        backend_metrics.insert("app2".to_string(), (10.0, 0.0));
        let metrics = balancer_metrics(1000.0, &config, &backend_metrics, &SimOptions::default());
        assert!(metrics.utilization_skew > 0.5);
    }

    #[test]
    fn test_recommended_algorithm_priorities() {
        assert_eq!(
            recommended_algorithm(WorkloadTraits {
                session_affinity: true,
                ..Default::default()
            }),
            BalancingAlgorithm::IpHash
        );
        assert_eq!(
            recommended_algorithm(WorkloadTraits {
                varying_request_duration: true,
                ..Default::default()
            }),
            BalancingAlgorithm::LeastConnections
        );
        assert_eq!(
            recommended_algorithm(WorkloadTraits {
                uneven_capacity: true,
                ..Default::default()
            }),
            BalancingAlgorithm::WeightedRoundRobin
        );
        assert_eq!(
            recommended_algorithm(WorkloadTraits {
                high_volume: true,
                ..Default::default()
            }),
            BalancingAlgorithm::Random
        );
        assert_eq!(
            recommended_algorithm(WorkloadTraits::default()),
            BalancingAlgorithm::RoundRobin
        );
    }

    #[test]
    fn test_validate_config() {
        let valid = validate_config(&LoadBalancerConfig {
            algorithm: BalancingAlgorithm::RoundRobin,
            backends: backends(&["app1", "app2"]),
            sticky_session_key: None,
        });
        assert!(valid.valid);
        assert!(valid.errors.is_empty());

        let empty = validate_config(&LoadBalancerConfig::default());
        assert!(!empty.valid);
        assert!(empty.errors.iter().any(|e| e.contains("No backends")));

        let unhealthy = validate_config(&LoadBalancerConfig {
            algorithm: BalancingAlgorithm::RoundRobin,
            backends: vec![Backend::new("app1").unhealthy()],
            sticky_session_key: None,
        });
        assert!(unhealthy
            .errors
            .iter()
            .any(|e| e.contains("No healthy backends")));

        let bad_weight = validate_config(&LoadBalancerConfig {
            algorithm: BalancingAlgorithm::WeightedRoundRobin,
            backends: vec![Backend::new("app1").with_weight(0.0)],
            sticky_session_key: None,
        });
        assert!(bad_weight.errors.iter().any(|e| e.contains("invalid weight")));

        let bad_capacity = validate_config(&LoadBalancerConfig {
            algorithm: BalancingAlgorithm::RoundRobin,
            backends: vec![Backend {
                capacity: Some(-100.0),
                ..Backend::new("app1")
            }],
            sticky_session_key: None,
        });
        assert!(bad_capacity
            .errors
            .iter()
            .any(|e| e.contains("invalid capacity")));

        let no_key = validate_config(&LoadBalancerConfig {
            algorithm: BalancingAlgorithm::IpHash,
            backends: backends(&["app1"]),
            sticky_session_key: None,
        });
        assert!(no_key
            .errors
            .iter()
            .any(|e| e.contains("sticky session key")));
    }
}
