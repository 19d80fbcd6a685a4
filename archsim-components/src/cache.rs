//! Cache model
//!
//! Cache-aside semantics: the hit ratio diverts a fraction of arriving reads
//! away from whatever the cache fronts; only misses (plus all writes)
//! propagate downstream. The hit ratio is either the static configured value
//! or, when a working set is described and the dynamic model is enabled,
//! derived from how much of the hot set fits in memory.

use archsim_core::{CacheConfig, ComponentMetrics, EvictionPolicy, Load, SimOptions, WorkingSet};
use tracing::warn;

use crate::model::{overload_error, overload_latency, EffectiveOutput};

const BASE_LATENCY_MS: f64 = 1.0;
const MONTHLY_COST_BASE: f64 = 20.0;
const MONTHLY_COST_PER_MB: f64 = 0.05;

/// Request throughput a cache node absorbs before degrading
const REQUEST_CAPACITY_RPS: f64 = 100_000.0;

/// Hit ratio used when the dynamic model is disabled and none is configured
pub const LEGACY_HIT_RATIO: f64 = 0.9;

/// Hot-set access skew assumed by the dynamic hit-ratio model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessSkew {
    /// Zipf-like: a small coverage of the hot set captures most accesses
    Zipf,
    /// Uniform: hits scale linearly with coverage
    Uniform,
}

/// Dynamic hit-ratio model output
#[derive(Debug, Clone, PartialEq)]
pub struct CacheModel {
    pub hit_ratio: f64,
    /// Items evicted per second under the offered load
    pub eviction_rate: f64,
    pub warnings: Vec<String>,
}

/// Derive a hit ratio from working-set coverage.
///
/// Zipf skew rewards partial coverage (a quarter-root curve); uniform access
/// tracks coverage linearly. Write traffic invalidates entries and discounts
/// the hit ratio proportionally.
pub fn dynamic_hit_ratio(
    config: &CacheConfig,
    working_set: &WorkingSet,
    skew: AccessSkew,
    load: Load,
) -> CacheModel {
    let cache_gb = config.max_memory_mb / 1024.0;
    let hot_gb = (working_set.total_data_gb * working_set.hot_fraction).max(0.001);
    // LFU holds the hot set a little better than LRU; pure TTL expiry
    // churns entries that are still hot.
    let policy_factor = match config.eviction {
        EvictionPolicy::Lru => 1.0,
        EvictionPolicy::Lfu => 1.1,
        EvictionPolicy::Ttl => 0.85,
    };
    let coverage = (cache_gb / hot_gb * policy_factor).min(1.0);

    let raw_hit = match skew {
        AccessSkew::Zipf => coverage.powf(0.25),
        AccessSkew::Uniform => coverage,
    };

    let total = load.total();
    let write_fraction = if total > 0.0 {
        load.write_rps / total
    } else {
        0.0
    };
    let hit_ratio = (raw_hit * (1.0 - 0.5 * write_fraction)).clamp(0.0, 0.99);

    // Traffic that cannot fit in the covered set churns entries out
    let eviction_rate = total * (1.0 - coverage);

    let mut warnings = Vec::new();
    if coverage < 0.5 {
        warnings.push(format!(
            "cache covers only {:.0}% of the hot set; consider more memory",
            coverage * 100.0
        ));
    }
    if write_fraction > 0.3 {
        warnings.push("write-heavy workload invalidates cached entries aggressively".to_string());
    }

    CacheModel {
        hit_ratio,
        eviction_rate,
        warnings,
    }
}

/// Seconds to warm a cold cache to the given target hit ratio.
///
/// Bounded by the entry TTL (entries expiring mid-warmup can never be
/// outrun) and capped at one hour.
pub fn warming_time_secs(
    target_hit_ratio: f64,
    config: &CacheConfig,
    working_set: &WorkingSet,
    read_rps: f64,
) -> f64 {
    let target = target_hit_ratio.clamp(0.0, 1.0);
    let cache_items = config.max_memory_mb * 1024.0 / working_set.avg_item_kb.max(0.001);
    let fill_rps = read_rps.max(1.0);
    let fill_secs = cache_items * target / fill_rps;
    let cap = (config.ttl_secs as f64).clamp(1.0, 3600.0);
    fill_secs.clamp(1.0, cap)
}

/// Cache size in GB needed to reach a target hit ratio over the working set.
pub fn recommended_cache_size(
    working_set: &WorkingSet,
    target_hit_ratio: f64,
    skew: AccessSkew,
) -> f64 {
    let target = target_hit_ratio.clamp(0.0, 0.99);
    let hot_gb = working_set.total_data_gb * working_set.hot_fraction;
    let coverage_needed = match skew {
        AccessSkew::Zipf => target.powi(4),
        AccessSkew::Uniform => target,
    };
    (hot_gb * coverage_needed).max(0.1)
}

pub struct Cache<'a> {
    pub name: &'a str,
    config: &'a CacheConfig,
}

impl<'a> Cache<'a> {
    pub fn new(name: &'a str, config: &'a CacheConfig) -> Self {
        Self { name, config }
    }

    /// Resolve the hit ratio for this cache under the given load.
    pub fn hit_ratio(&self, load: Load, options: &SimOptions) -> f64 {
        match (&self.config.working_set, options.dynamic_cache) {
            (Some(working_set), true) => {
                let model = dynamic_hit_ratio(self.config, working_set, AccessSkew::Zipf, load);
                for warning in &model.warnings {
                    warn!(cache = self.name, "{warning}");
                }
                model.hit_ratio
            }
            _ => {
                if options.dynamic_cache {
                    self.config.hit_ratio
                } else {
                    LEGACY_HIT_RATIO
                }
            }
        }
    }

    pub fn simulate(&self, load: Load, options: &SimOptions) -> EffectiveOutput {
        let hit_ratio = self.hit_ratio(load, options);
        let utilization = load.total() / REQUEST_CAPACITY_RPS;
        let latency_ms = overload_latency(BASE_LATENCY_MS, utilization);
        let error_rate = overload_error(utilization);

        let mut metrics = ComponentMetrics::new(
            latency_ms,
            error_rate,
            utilization,
            MONTHLY_COST_BASE + MONTHLY_COST_PER_MB * self.config.max_memory_mb,
        );
        metrics.cache_hit_rate = Some(hit_ratio);

        // Only misses continue to the backing store; writes always do.
        let forwarded = Load::new(load.read_rps * (1.0 - hit_ratio), load.write_rps);
        EffectiveOutput { metrics, forwarded }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> SimOptions {
        SimOptions::default()
    }

    #[test]
    fn test_static_hit_ratio_diverts_reads() {
        let config = CacheConfig {
            hit_ratio: 0.8,
            ..Default::default()
        };
        let cache = Cache::new("redis", &config);
        let out = cache.simulate(Load::new(1000.0, 100.0), &options());
        assert_eq!(out.metrics.cache_hit_rate, Some(0.8));
        assert!((out.forwarded.read_rps - 200.0).abs() < 1e-9);
        assert_eq!(out.forwarded.write_rps, 100.0);
    }

    #[test]
    fn test_legacy_mode_fixed_ratio() {
        let config = CacheConfig {
            hit_ratio: 0.42,
            ..Default::default()
        };
        let cache = Cache::new("redis", &config);
        let out = cache.simulate(Load::new(1000.0, 0.0), &SimOptions::legacy());
        assert_eq!(out.metrics.cache_hit_rate, Some(LEGACY_HIT_RATIO));
    }

    #[test]
    fn test_dynamic_hit_ratio_reasonable() {
        let config = CacheConfig {
            max_memory_mb: 10.0 * 1024.0,
            ..Default::default()
        };
        let working_set = WorkingSet {
            total_data_gb: 100.0,
            hot_fraction: 0.2,
            avg_item_kb: 1.0,
        };
        let model = dynamic_hit_ratio(
            &config,
            &working_set,
            AccessSkew::Zipf,
            Load::new(9000.0, 1000.0),
        );
        assert!(model.hit_ratio > 0.1);
        assert!(model.hit_ratio <= 1.0);
    }

    #[test]
    fn test_write_heavy_workload_lowers_hits() {
        let config = CacheConfig {
            max_memory_mb: 8.0 * 1024.0,
            ..Default::default()
        };
        let working_set = WorkingSet::default();
        let read_only = dynamic_hit_ratio(
            &config,
            &working_set,
            AccessSkew::Zipf,
            Load::new(1000.0, 0.0),
        );
        let write_heavy = dynamic_hit_ratio(
            &config,
            &working_set,
            AccessSkew::Zipf,
            Load::new(500.0, 500.0),
        );
        assert!(write_heavy.hit_ratio < read_only.hit_ratio);
        assert!(write_heavy
            .warnings
            .iter()
            .any(|w| w.contains("write-heavy")));
    }

    #[test]
    fn test_eviction_rate_grows_with_traffic() {
        let config = CacheConfig {
            max_memory_mb: 1024.0,
            ..Default::default()
        };
        let working_set = WorkingSet {
            total_data_gb: 100.0,
            hot_fraction: 0.1,
            avg_item_kb: 2.0,
        };
        let calm = dynamic_hit_ratio(
            &config,
            &working_set,
            AccessSkew::Zipf,
            Load::new(1000.0, 100.0),
        );
        let storm = dynamic_hit_ratio(
            &config,
            &working_set,
            AccessSkew::Zipf,
            Load::new(13_500.0, 1500.0),
        );
        assert!(storm.eviction_rate > calm.eviction_rate);
    }

    #[test]
    fn test_eviction_policy_shapes_coverage() {
        let working_set = WorkingSet::default();
        let load = Load::new(1000.0, 0.0);
        let base = CacheConfig {
            max_memory_mb: 4.0 * 1024.0,
            ..Default::default()
        };
        let lfu = CacheConfig {
            eviction: EvictionPolicy::Lfu,
            ..base.clone()
        };
        let ttl = CacheConfig {
            eviction: EvictionPolicy::Ttl,
            ..base.clone()
        };
        let lru_hit = dynamic_hit_ratio(&base, &working_set, AccessSkew::Zipf, load).hit_ratio;
        let lfu_hit = dynamic_hit_ratio(&lfu, &working_set, AccessSkew::Zipf, load).hit_ratio;
        let ttl_hit = dynamic_hit_ratio(&ttl, &working_set, AccessSkew::Zipf, load).hit_ratio;
        assert!(lfu_hit > lru_hit);
        assert!(ttl_hit < lru_hit);
    }

    #[test]
    fn test_warming_time_bounded_by_ttl() {
        let config = CacheConfig {
            max_memory_mb: 100.0 * 1024.0,
            ttl_secs: 120,
            ..Default::default()
        };
        let working_set = WorkingSet {
            avg_item_kb: 1.0,
            ..Default::default()
        };
        // A huge cache fed slowly would take far longer than the TTL
        let time = warming_time_secs(0.9, &config, &working_set, 10.0);
        assert_eq!(time, 120.0);
    }

    #[test]
    fn test_warming_time_bounds() {
        let config = CacheConfig {
            max_memory_mb: 5.0 * 1024.0,
            ..Default::default()
        };
        let working_set = WorkingSet {
            total_data_gb: 50.0,
            hot_fraction: 0.1,
            avg_item_kb: 2.0,
        };
        let time = warming_time_secs(0.8, &config, &working_set, 5000.0);
        assert!(time > 0.0);
        assert!(time <= 3600.0);
    }

    #[test]
    fn test_recommended_size_below_total_data() {
        let working_set = WorkingSet {
            total_data_gb: 200.0,
            hot_fraction: 0.15,
            avg_item_kb: 4.0,
        };
        let size = recommended_cache_size(&working_set, 0.8, AccessSkew::Zipf);
        assert!(size > 0.0);
        assert!(size < 200.0);
    }

    #[test]
    fn test_uniform_skew_needs_more_memory_than_zipf() {
        let working_set = WorkingSet::default();
        let zipf = recommended_cache_size(&working_set, 0.8, AccessSkew::Zipf);
        let uniform = recommended_cache_size(&working_set, 0.8, AccessSkew::Uniform);
        assert!(uniform > zipf);
    }

    #[test]
    fn test_cost_scales_with_memory_not_traffic() {
        let small = CacheConfig {
            max_memory_mb: 1024.0,
            ..Default::default()
        };
        let large = CacheConfig {
            max_memory_mb: 8192.0,
            ..Default::default()
        };
        let small_out = Cache::new("c", &small).simulate(Load::new(100.0, 0.0), &options());
        let large_idle = Cache::new("c", &large).simulate(Load::zero(), &options());
        let large_busy = Cache::new("c", &large).simulate(Load::new(50_000.0, 0.0), &options());
        assert!(large_idle.metrics.monthly_cost > small_out.metrics.monthly_cost);
        assert_eq!(
            large_idle.metrics.monthly_cost,
            large_busy.metrics.monthly_cost
        );
    }
}
