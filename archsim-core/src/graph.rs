//! System graph types
//!
//! The user's submitted architecture: an ordered list of typed component
//! nodes plus directed connections. The canvas editor builds this
//! incrementally and snapshots it at submit time; the simulator treats the
//! snapshot as read-only.
//!
//! Component configuration is a tagged variant per kind with named, typed,
//! defaulted fields. Normalization happens at construction
//! ([`ComponentSpec::normalize`]) so the component models never have to
//! defend against zero instances or out-of-range ratios at read time.

use serde::{Deserialize, Serialize};

/// Kind tag for a component node, used for dispatch and for resolving
/// failure-injection targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Client,
    AppServer,
    Worker,
    Database,
    Cache,
    MessageQueue,
    LoadBalancer,
    Cdn,
    ObjectStore,
}

impl ComponentKind {
    /// Stable name matching the challenge-definition vocabulary
    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Client => "client",
            ComponentKind::AppServer => "app_server",
            ComponentKind::Worker => "worker",
            ComponentKind::Database => "database",
            ComponentKind::Cache => "cache",
            ComponentKind::MessageQueue => "message_queue",
            ComponentKind::LoadBalancer => "load_balancer",
            ComponentKind::Cdn => "cdn",
            ComponentKind::ObjectStore => "object_storage",
        }
    }
}

/// Traffic generator / entry point. No tunables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {}

/// Stateless request-handling tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppServerConfig {
    /// Number of instances behind this node
    pub instances: u32,
    /// Nominal request throughput of a single instance, per second
    pub per_instance_rps: f64,
}

impl Default for AppServerConfig {
    fn default() -> Self {
        Self {
            instances: 1,
            per_instance_rps: 500.0,
        }
    }
}

/// Asynchronous processing tier consuming from a queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkerConfig {
    pub instances: u32,
    /// Jobs a single instance can process per second at nominal complexity
    pub per_instance_throughput: f64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            instances: 1,
            per_instance_throughput: 100.0,
        }
    }
}

/// Relative complexity of the dominant query shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryComplexity {
    Simple,
    Moderate,
    Complex,
}

impl QueryComplexity {
    /// Capacity divisor: heavier queries shrink effective capacity
    pub fn multiplier(self) -> f64 {
        match self {
            QueryComplexity::Simple => 1.0,
            QueryComplexity::Moderate => 1.5,
            QueryComplexity::Complex => 2.5,
        }
    }
}

/// Relational or document database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseConfig {
    /// Sustainable read queries per second
    pub read_capacity: f64,
    /// Sustainable write queries per second
    pub write_capacity: f64,
    /// Whether read replicas are provisioned
    pub replication: bool,
    /// Number of read replicas when replication is enabled
    pub replicas: u32,
    pub query_complexity: QueryComplexity,
    /// Connection pool size
    pub max_connections: u32,
    /// Mean query duration used for pool occupancy estimates
    pub avg_query_ms: f64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            read_capacity: 1000.0,
            write_capacity: 500.0,
            replication: false,
            replicas: 0,
            query_complexity: QueryComplexity::Simple,
            max_connections: 100,
            avg_query_ms: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    Lru,
    Lfu,
    Ttl,
}

/// Working-set description used by the dynamic cache hit-ratio model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkingSet {
    pub total_data_gb: f64,
    /// Fraction of the data set that is hot (0..=1)
    pub hot_fraction: f64,
    pub avg_item_kb: f64,
}

impl Default for WorkingSet {
    fn default() -> Self {
        Self {
            total_data_gb: 100.0,
            hot_fraction: 0.2,
            avg_item_kb: 1.0,
        }
    }
}

/// In-memory cache in a cache-aside arrangement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheConfig {
    pub max_memory_mb: f64,
    /// Static hit ratio used when no working set is described (0..=1)
    pub hit_ratio: f64,
    pub ttl_secs: u64,
    pub eviction: EvictionPolicy,
    /// When present, the hit ratio is derived from working-set coverage
    /// instead of the static value
    pub working_set: Option<WorkingSet>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_memory_mb: 1024.0,
            hit_ratio: 0.9,
            ttl_secs: 3600,
            eviction: EvictionPolicy::Lru,
            working_set: None,
        }
    }
}

/// Partitioned message queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueueConfig {
    /// Messages per second a single partition can absorb
    pub max_throughput: f64,
    pub partitions: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_throughput: 10_000.0,
            partitions: 1,
        }
    }
}

/// Backend selection algorithm for the load balancer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalancingAlgorithm {
    RoundRobin,
    WeightedRoundRobin,
    LeastConnections,
    IpHash,
    Random,
    WeightedRandom,
}

impl Default for BalancingAlgorithm {
    fn default() -> Self {
        BalancingAlgorithm::RoundRobin
    }
}

/// One backend instance registered with a load balancer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backend {
    pub id: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default = "default_healthy")]
    pub healthy: bool,
    #[serde(default)]
    pub active_connections: Option<u64>,
    /// Per-backend capacity in requests per second, when declared
    #[serde(default)]
    pub capacity: Option<f64>,
}

fn default_weight() -> f64 {
    1.0
}

fn default_healthy() -> bool {
    true
}

impl Backend {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            weight: 1.0,
            healthy: true,
            active_connections: None,
            capacity: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoadBalancerConfig {
    pub algorithm: BalancingAlgorithm,
    pub backends: Vec<Backend>,
    /// Session key for ip-hash stickiness
    pub sticky_session_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CdnConfig {
    /// Requests per second the edge tier can absorb
    pub edge_capacity_rps: f64,
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            edge_capacity_rps: 50_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectStoreConfig {
    pub storage_gb: f64,
    /// Requests per second the store can absorb
    pub request_capacity_rps: f64,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            storage_gb: 1000.0,
            request_capacity_rps: 5_000.0,
        }
    }
}

/// Kind-specific configuration, tagged by component kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "snake_case")]
pub enum ComponentSpec {
    Client(ClientConfig),
    AppServer(AppServerConfig),
    Worker(WorkerConfig),
    Database(DatabaseConfig),
    Cache(CacheConfig),
    MessageQueue(QueueConfig),
    LoadBalancer(LoadBalancerConfig),
    Cdn(CdnConfig),
    #[serde(rename = "object_storage")]
    ObjectStore(ObjectStoreConfig),
}

impl ComponentSpec {
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentSpec::Client(_) => ComponentKind::Client,
            ComponentSpec::AppServer(_) => ComponentKind::AppServer,
            ComponentSpec::Worker(_) => ComponentKind::Worker,
            ComponentSpec::Database(_) => ComponentKind::Database,
            ComponentSpec::Cache(_) => ComponentKind::Cache,
            ComponentSpec::MessageQueue(_) => ComponentKind::MessageQueue,
            ComponentSpec::LoadBalancer(_) => ComponentKind::LoadBalancer,
            ComponentSpec::Cdn(_) => ComponentKind::Cdn,
            ComponentSpec::ObjectStore(_) => ComponentKind::ObjectStore,
        }
    }

    /// Clamp out-of-range configuration into the valid domain.
    ///
    /// Instance counts are clamped to at least one, capacities to
    /// non-negative, ratios into `0..=1`. The canvas cannot normally produce
    /// these states, but the simulator must stay total for any graph it is
    /// handed.
    pub fn normalize(mut self) -> Self {
        match &mut self {
            ComponentSpec::Client(_) => {}
            ComponentSpec::AppServer(c) => {
                c.instances = c.instances.max(1);
                c.per_instance_rps = c.per_instance_rps.max(1.0);
            }
            ComponentSpec::Worker(c) => {
                c.instances = c.instances.max(1);
                c.per_instance_throughput = c.per_instance_throughput.max(1.0);
            }
            ComponentSpec::Database(c) => {
                c.read_capacity = c.read_capacity.max(1.0);
                c.write_capacity = c.write_capacity.max(1.0);
                c.max_connections = c.max_connections.max(1);
                c.avg_query_ms = c.avg_query_ms.max(0.1);
                if c.replication {
                    c.replicas = c.replicas.max(1);
                }
            }
            ComponentSpec::Cache(c) => {
                c.max_memory_mb = c.max_memory_mb.max(1.0);
                c.hit_ratio = c.hit_ratio.clamp(0.0, 1.0);
                if let Some(ws) = &mut c.working_set {
                    ws.total_data_gb = ws.total_data_gb.max(0.001);
                    ws.hot_fraction = ws.hot_fraction.clamp(0.001, 1.0);
                    ws.avg_item_kb = ws.avg_item_kb.max(0.001);
                }
            }
            ComponentSpec::MessageQueue(c) => {
                c.max_throughput = c.max_throughput.max(1.0);
                c.partitions = c.partitions.max(1);
            }
            ComponentSpec::LoadBalancer(c) => {
                for backend in &mut c.backends {
                    backend.weight = backend.weight.max(0.0);
                }
            }
            ComponentSpec::Cdn(c) => {
                c.edge_capacity_rps = c.edge_capacity_rps.max(1.0);
            }
            ComponentSpec::ObjectStore(c) => {
                c.storage_gb = c.storage_gb.max(0.0);
                c.request_capacity_rps = c.request_capacity_rps.max(1.0);
            }
        }
        self
    }
}

/// One node on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentNode {
    /// Stable identity used by connections
    pub id: String,
    #[serde(flatten)]
    pub spec: ComponentSpec,
}

impl ComponentNode {
    pub fn new(id: impl Into<String>, spec: ComponentSpec) -> Self {
        Self {
            id: id.into(),
            spec: spec.normalize(),
        }
    }

    pub fn kind(&self) -> ComponentKind {
        self.spec.kind()
    }
}

/// Traffic class carried by a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionKind {
    Read,
    Write,
    ReadWrite,
}

impl Default for ConnectionKind {
    fn default() -> Self {
        ConnectionKind::ReadWrite
    }
}

/// Directed edge between two components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub from: String,
    pub to: String,
    #[serde(default, rename = "type")]
    pub kind: ConnectionKind,
    #[serde(default)]
    pub label: Option<String>,
}

impl Connection {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind: ConnectionKind::ReadWrite,
            label: None,
        }
    }

    pub fn read(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            kind: ConnectionKind::Read,
            ..Self::new(from, to)
        }
    }

    pub fn write(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            kind: ConnectionKind::Write,
            ..Self::new(from, to)
        }
    }
}

/// The user's submitted architecture
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemGraph {
    pub components: Vec<ComponentNode>,
    pub connections: Vec<Connection>,
}

impl SystemGraph {
    pub fn new(components: Vec<ComponentNode>, connections: Vec<Connection>) -> Self {
        Self {
            components,
            connections,
        }
    }

    pub fn node(&self, id: &str) -> Option<&ComponentNode> {
        self.components.iter().find(|c| c.id == id)
    }

    /// The traversal root: the client node, falling back to an app server
    /// for challenges whose traffic originates there. `None` means the graph
    /// fails closed.
    pub fn entry(&self) -> Option<&ComponentNode> {
        self.components
            .iter()
            .find(|c| c.kind() == ComponentKind::Client)
            .or_else(|| {
                self.components
                    .iter()
                    .find(|c| c.kind() == ComponentKind::AppServer)
            })
    }

    /// Outgoing edges from a component, in declaration order
    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Connection> {
        self.connections.iter().filter(move |c| c.from == id)
    }

    /// First component of a given kind, in declaration order
    pub fn first_of_kind(&self, kind: ComponentKind) -> Option<&ComponentNode> {
        self.components.iter().find(|c| c.kind() == kind)
    }

    /// Whether anything is reachable from the entry point
    pub fn has_connected_entry(&self) -> bool {
        self.entry()
            .map(|e| self.outgoing(&e.id).next().is_some())
            .unwrap_or(false)
    }
}
