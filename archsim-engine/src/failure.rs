//! Failure injection and failure analysis
//!
//! Injection is closed-form: a test case declares when a component fails and
//! (optionally) recovers, which splits the window into at most three phases
//! (nominal, degraded, recovered). Each phase composes the graph with the
//! appropriate override and availability is the duration-weighted mean of
//! per-phase success rates, with no tick-by-tick simulation.
//!
//! The analysis helpers (cascading failure, blast radius, MTTR,
//! availability impact) operate on dependency maps rather than the system
//! graph; they answer "what else breaks" questions for reliability-oriented
//! challenges.

use std::collections::{HashMap, HashSet, VecDeque};

use archsim_core::{ComponentKind, ComponentNode, FailureKind, FailureSpec, SystemGraph};
use serde::{Deserialize, Serialize};

use crate::compose::FailureOverride;

/// One slice of the test window
#[derive(Debug, Clone, PartialEq)]
pub struct FailurePhase {
    pub secs: f64,
    pub failure: Option<FailureOverride>,
}

/// Resolve which component a declared failure targets.
///
/// Challenge definitions name the failure kind, not the component: a
/// `db_crash` takes out the first database on the canvas, a cache failure
/// the first cache, a server crash the first app server. A partition
/// targets the first stateful component it finds.
pub fn resolve_target<'a>(graph: &'a SystemGraph, kind: FailureKind) -> Option<&'a ComponentNode> {
    match kind {
        FailureKind::DbCrash => graph.first_of_kind(ComponentKind::Database),
        FailureKind::CacheCrash | FailureKind::CacheFlush => {
            graph.first_of_kind(ComponentKind::Cache)
        }
        FailureKind::ServerCrash => graph.first_of_kind(ComponentKind::AppServer),
        FailureKind::NetworkPartition => graph
            .first_of_kind(ComponentKind::Database)
            .or_else(|| graph.first_of_kind(ComponentKind::Cache))
            .or_else(|| graph.first_of_kind(ComponentKind::AppServer)),
    }
}

/// Split a test window into nominal / degraded / recovered phases.
///
/// Transition seconds are clamped into the window; a missing recovery means
/// the component stays degraded to the end. Returns only non-empty phases.
pub fn failure_phases(
    spec: &FailureSpec,
    target_id: &str,
    duration_secs: u64,
) -> Vec<FailurePhase> {
    let duration = duration_secs as f64;
    let at = (spec.at_second as f64).min(duration);
    let recovery = spec
        .recovery_second
        .map(|s| (s as f64).clamp(at, duration))
        .unwrap_or(duration);

    let failure = match spec.kind {
        FailureKind::CacheFlush => FailureOverride::FlushCache {
            target_id: target_id.to_string(),
        },
        kind => FailureOverride::Unavailable {
            target_id: target_id.to_string(),
            availability: kind.degraded_availability(),
        },
    };

    let mut phases = Vec::new();
    if at > 0.0 {
        phases.push(FailurePhase {
            secs: at,
            failure: None,
        });
    }
    if recovery > at {
        phases.push(FailurePhase {
            secs: recovery - at,
            failure: Some(failure),
        });
    }
    if duration > recovery {
        phases.push(FailurePhase {
            secs: duration - recovery,
            failure: None,
        });
    }
    phases
}

// ---------------------------------------------------------------------------
// Dependency-level failure analysis
// ---------------------------------------------------------------------------

/// Failure modes used by the analysis helpers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    Crash,
    Slow,
    NetworkPartition,
    ResourceExhaustion,
}

impl FailureMode {
    /// How much a second of this failure counts against availability
    fn downtime_weight(self) -> f64 {
        match self {
            FailureMode::Crash => 1.0,
            FailureMode::Slow => 0.3,
            FailureMode::NetworkPartition => 0.9,
            FailureMode::ResourceExhaustion => 0.6,
        }
    }

    fn description(self) -> &'static str {
        match self {
            FailureMode::Crash => "crashed",
            FailureMode::Slow => "slowed",
            FailureMode::NetworkPartition => "partitioned",
            FailureMode::ResourceExhaustion => "exhausted resources",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryPattern {
    Instant,
    /// Effects decay linearly for a tail after the window ends
    Gradual,
}

/// A declared failure window over named components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureWindow {
    pub mode: FailureMode,
    pub targets: Vec<String>,
    pub start_secs: f64,
    pub duration_secs: f64,
    /// 0..=1; how completely the component is affected
    pub severity: f64,
    #[serde(default = "default_recovery")]
    pub recovery: RecoveryPattern,
}

fn default_recovery() -> RecoveryPattern {
    RecoveryPattern::Instant
}

/// Point-in-time effect of the declared failures on one component
#[derive(Debug, Clone, PartialEq)]
pub struct FailureEffect {
    pub affected: bool,
    /// Fraction of requests the component can still answer
    pub availability_factor: f64,
    pub latency_multiplier: f64,
    pub description: String,
}

impl FailureEffect {
    fn nominal() -> Self {
        Self {
            affected: false,
            availability_factor: 1.0,
            latency_multiplier: 1.0,
            description: "nominal".to_string(),
        }
    }
}

fn in_window_effect(window: &FailureWindow) -> (f64, f64) {
    let severity = window.severity.clamp(0.0, 1.0);
    match window.mode {
        FailureMode::Crash => (1.0 - severity, 1.0),
        FailureMode::Slow => (1.0, 1.0 + severity * 20.0),
        FailureMode::NetworkPartition => (1.0 - 0.5 * severity, 1.0 + severity * 2.0),
        FailureMode::ResourceExhaustion => (1.0 - 0.7 * severity, 1.0 + severity * 5.0),
    }
}

/// Evaluate the effect of every declared failure on `component` at time `t`.
///
/// Gradual recovery leaves a linearly decaying latency tail after the window
/// closes; instant recovery snaps back to nominal.
pub fn failure_effect_at(component: &str, t_secs: f64, windows: &[FailureWindow]) -> FailureEffect {
    let mut effect = FailureEffect::nominal();
    for window in windows {
        if !window.targets.iter().any(|target| target == component) {
            continue;
        }
        let end = window.start_secs + window.duration_secs;
        if t_secs >= window.start_secs && t_secs < end {
            let (availability, multiplier) = in_window_effect(window);
            effect.affected = true;
            effect.availability_factor = effect.availability_factor.min(availability);
            effect.latency_multiplier = effect.latency_multiplier.max(multiplier);
            effect.description = format!("{component} {}", window.mode.description());
        } else if window.recovery == RecoveryPattern::Gradual && t_secs >= end {
            let tail = 60.0 * window.severity.clamp(0.0, 1.0);
            if tail > 0.0 && t_secs < end + tail {
                let (_, multiplier) = in_window_effect(window);
                let remaining = 1.0 - (t_secs - end) / tail;
                let decayed = 1.0 + (multiplier - 1.0) * remaining;
                effect.affected = true;
                effect.latency_multiplier = effect.latency_multiplier.max(decayed);
                effect.description = format!("{component} recovering from {}", window.mode.description());
            }
        }
    }
    effect
}

/// Result of propagating failures through a dependency map
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeResult {
    pub failed: HashSet<String>,
    /// Number of propagation waves beyond the initial failures
    pub depth: usize,
}

/// Propagate failure through `dependencies` (component -> what it depends
/// on). A component fails once the failed fraction of its dependencies
/// reaches `threshold`.
pub fn cascading_failure(
    initial: &[String],
    dependencies: &HashMap<String, Vec<String>>,
    threshold: f64,
) -> CascadeResult {
    let threshold = threshold.clamp(0.0, 1.0);
    let mut failed: HashSet<String> = initial.iter().cloned().collect();
    let mut depth = 0;
    loop {
        let wave: Vec<String> = dependencies
            .iter()
            .filter(|(component, deps)| {
                !failed.contains(*component)
                    && !deps.is_empty()
                    && failed_fraction(deps, &failed) >= threshold
            })
            .map(|(component, _)| component.clone())
            .collect();
        if wave.is_empty() {
            break;
        }
        depth += 1;
        failed.extend(wave);
    }
    CascadeResult { failed, depth }
}

fn failed_fraction(deps: &[String], failed: &HashSet<String>) -> f64 {
    let hit = deps.iter().filter(|d| failed.contains(*d)).count();
    hit as f64 / deps.len() as f64
}

/// Everything transitively affected by the failure of `origin`, including
/// the origin itself. `dependents` maps component -> who depends on it.
pub fn blast_radius(
    origin: &str,
    dependents: &HashMap<String, Vec<String>>,
) -> HashSet<String> {
    let mut affected: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<String> = VecDeque::new();
    affected.insert(origin.to_string());
    queue.push_back(origin.to_string());
    while let Some(current) = queue.pop_front() {
        if let Some(children) = dependents.get(&current) {
            for child in children {
                if affected.insert(child.clone()) {
                    queue.push_back(child.clone());
                }
            }
        }
    }
    affected
}

/// Estimated mean time to recovery in seconds.
///
/// Auto-recovery (restart loops, failover) is an order of magnitude faster
/// than paging a human; partitions take the longest either way.
pub fn estimate_mttr(mode: FailureMode, severity: f64, auto_recovery: bool) -> f64 {
    let base = match mode {
        FailureMode::Crash => 120.0,
        FailureMode::Slow => 600.0,
        FailureMode::NetworkPartition => 1800.0,
        FailureMode::ResourceExhaustion => 300.0,
    };
    let manual_factor = if auto_recovery { 1.0 } else { 6.0 };
    base * manual_factor * (0.5 + severity.clamp(0.0, 1.0))
}

/// System availability over a window given the declared failures:
/// `1 - sum(weighted downtime) / total`, clamped into `0..=1`.
pub fn availability_impact(windows: &[FailureWindow], total_duration_secs: f64) -> f64 {
    if total_duration_secs <= 0.0 {
        return 1.0;
    }
    let downtime: f64 = windows
        .iter()
        .map(|w| {
            w.duration_secs.max(0.0)
                * w.severity.clamp(0.0, 1.0)
                * w.mode.downtime_weight()
        })
        .sum();
    (1.0 - downtime / total_duration_secs).clamp(0.0, 1.0)
}
