//! Database model
//!
//! Reads and writes are budgeted against separate declared capacities, with
//! query complexity shrinking both. Replication provisions read replicas:
//! the primary keeps all writes plus a tenth of the reads, replicas split
//! the rest evenly, and asynchronous replication accrues lag that grows with
//! the write rate.

use archsim_core::{ComponentMetrics, DatabaseConfig, Load, QueryComplexity};
use tracing::warn;

use crate::model::{overload_error, overload_latency, EffectiveOutput};

const BASE_LATENCY_MS: f64 = 10.0;
const MONTHLY_COST_BASE: f64 = 150.0;
const MONTHLY_COST_PER_CAPACITY: f64 = 0.02;
const MONTHLY_COST_PER_REPLICA: f64 = 150.0;

/// Fraction of reads the primary keeps when replicas are provisioned
const PRIMARY_READ_SHARE: f64 = 0.1;

/// Replication lag above this threshold earns a warning
const LAG_WARNING_MS: f64 = 100.0;

/// Derived capacity figures for a database under a given load
#[derive(Debug, Clone, PartialEq)]
pub struct DbCapacity {
    /// Read capacity after the query-complexity discount
    pub effective_read_capacity: f64,
    /// Write capacity after the query-complexity discount
    pub effective_write_capacity: f64,
    /// Fraction of the connection pool occupied (can exceed 1)
    pub pool_utilization: f64,
    /// Latency multiplier applied when the pool saturates
    pub latency_multiplier: f64,
    pub warnings: Vec<String>,
}

/// How read traffic lands across the primary and its replicas
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicaDistribution {
    pub primary_read_rps: f64,
    /// Reads landing on each individual replica
    pub replica_read_rps: f64,
    pub replication_lag_ms: f64,
    pub lag_warning: Option<String>,
}

/// Split reads across the primary and `replicas` read replicas.
pub fn replica_distribution(
    read_rps: f64,
    write_rps: f64,
    replicas: u32,
) -> ReplicaDistribution {
    let replicas = replicas.max(1);
    let primary_read_rps = read_rps * PRIMARY_READ_SHARE;
    let replica_read_rps = read_rps * (1.0 - PRIMARY_READ_SHARE) / replicas as f64;
    let replication_lag_ms = async_replication_lag_ms(write_rps, replicas);
    let lag_warning = (replication_lag_ms > LAG_WARNING_MS).then(|| {
        format!(
            "replication lag {replication_lag_ms:.0}ms exceeds {LAG_WARNING_MS:.0}ms; \
             replicas may serve stale reads"
        )
    });
    ReplicaDistribution {
        primary_read_rps,
        replica_read_rps,
        replication_lag_ms,
        lag_warning,
    }
}

/// Estimated asynchronous replication lag: grows with the write rate and the
/// number of replicas applying the stream.
pub fn async_replication_lag_ms(write_rps: f64, replicas: u32) -> f64 {
    5.0 * replicas.max(1) as f64 + 0.2 * write_rps.max(0.0)
}

pub struct Database<'a> {
    pub name: &'a str,
    config: &'a DatabaseConfig,
}

impl<'a> Database<'a> {
    pub fn new(name: &'a str, config: &'a DatabaseConfig) -> Self {
        Self { name, config }
    }

    /// Capacity after query-complexity and connection-pool effects.
    pub fn capacity(&self, load: Load) -> DbCapacity {
        let complexity = self.config.query_complexity.multiplier();
        let effective_read_capacity = self.config.read_capacity / complexity;
        let effective_write_capacity = self.config.write_capacity / complexity;

        let concurrent = load.total() * self.config.avg_query_ms / 1000.0;
        let pool_utilization = concurrent / self.config.max_connections.max(1) as f64;
        let latency_multiplier = if pool_utilization <= 0.8 {
            1.0
        } else {
            1.0 + (pool_utilization - 0.8) * 2.5
        };

        let mut warnings = Vec::new();
        if pool_utilization > 0.8 {
            warnings.push(format!(
                "connection pool at {:.0}% occupancy; queries are queueing for connections",
                pool_utilization * 100.0
            ));
        }
        if self.config.query_complexity != QueryComplexity::Simple {
            warnings.push(format!(
                "query complexity reduces usable capacity by {:.0}%",
                (1.0 - 1.0 / complexity) * 100.0
            ));
        }

        DbCapacity {
            effective_read_capacity,
            effective_write_capacity,
            pool_utilization,
            latency_multiplier,
            warnings,
        }
    }

    pub fn simulate(&self, load: Load) -> EffectiveOutput {
        let capacity = self.capacity(load);

        // Replicas absorb most of the read traffic; the primary always takes
        // every write.
        let (primary_reads, replica_count) = if self.config.replication {
            let replicas = self.config.replicas.max(1);
            let distribution = replica_distribution(load.read_rps, load.write_rps, replicas);
            if let Some(lag) = &distribution.lag_warning {
                warn!(database = self.name, "{lag}");
            }
            (distribution.primary_read_rps, replicas)
        } else {
            (load.read_rps, 0)
        };

        let read_util = primary_reads / capacity.effective_read_capacity;
        let write_util = load.write_rps / capacity.effective_write_capacity;
        let utilization = read_util.max(write_util);

        let latency_ms =
            overload_latency(BASE_LATENCY_MS * capacity.latency_multiplier, utilization);
        let error_rate = overload_error(utilization);

        if utilization > 1.0 {
            warn!(
                database = self.name,
                utilization, "database over capacity, queries failing"
            );
        }

        let monthly_cost = MONTHLY_COST_BASE
            + MONTHLY_COST_PER_CAPACITY * (self.config.read_capacity + self.config.write_capacity)
            + MONTHLY_COST_PER_REPLICA * replica_count as f64;

        let metrics = ComponentMetrics::new(latency_ms, error_rate, utilization, monthly_cost);
        EffectiveOutput {
            metrics,
            forwarded: load,
        }
    }
}
