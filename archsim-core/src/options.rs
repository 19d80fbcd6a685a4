//! Simulation feature options
//!
//! The advanced models (load-balancing algorithms, dynamic cache hit ratios,
//! time-varying traffic, failure injection) can be switched off individually
//! to reproduce the legacy fixed-constant behavior. Options are plain data
//! threaded through explicitly; there is no process-global flag state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimOptions {
    /// Use the configured balancing algorithm instead of an even split
    pub lb_algorithms: bool,
    /// Derive cache hit ratios from working-set coverage instead of the
    /// static configured value
    pub dynamic_cache: bool,
    /// Evaluate time-varying traffic patterns
    pub traffic_patterns: bool,
    /// Honor declared failure-injection windows
    pub failure_injection: bool,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            lb_algorithms: true,
            dynamic_cache: true,
            traffic_patterns: true,
            failure_injection: true,
        }
    }
}

impl SimOptions {
    /// Everything off: even traffic splits, fixed 90% cache hit ratio, flat
    /// traffic, failures ignored.
    pub fn legacy() -> Self {
        Self {
            lb_algorithms: false,
            dynamic_cache: false,
            traffic_patterns: false,
            failure_injection: false,
        }
    }
}
