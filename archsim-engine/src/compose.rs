//! Graph traversal and metric composition
//!
//! Walks the user's graph breadth-first from the entry component, following
//! only declared `from -> to` edges. The traversal runs in three phases:
//!
//! 1. **Discovery and rate accumulation**: level by level, each node's
//!    outbound traffic is scaled per edge (read/write split by connection
//!    kind, miss fraction out of caches) and accumulated into its targets.
//!    Each node forwards exactly once; edges that would flow strictly
//!    backwards (to a shallower level, or a self-edge) are dropped, which is
//!    what bounds cycles. Edges within or ahead of the current level always
//!    accumulate, so a database fed by both an app server and a cache sees
//!    the sum of writes and cache misses regardless of declaration order.
//! 2. **Simulation**: every reached node is simulated once with its final
//!    accumulated load.
//! 3. **Critical path**: arrival times are relaxed along the traversed
//!    edges in discovery order: sequential hops sum, parallel branches take
//!    the max.
//!
//! Error rates combine as the probabilistic union over reached components;
//! cost sums over every declared component whether reachable or not; you
//! pay for provisioned infrastructure, not for the hot path.

use std::collections::{HashMap, HashSet};

use archsim_core::{
    BehaviorRegistry, CacheConfig, ComponentBehaviors, ComponentMetrics, ComponentNode,
    ComponentSpec, ConnectionKind, GraphError, Load, SimOptions, SimulationContext, SystemGraph,
    TrafficProfile,
};
use archsim_components::{simulate_node, Cache};
use tracing::debug;

/// Override applied to one component while a failure window is active
#[derive(Debug, Clone, PartialEq)]
pub enum FailureOverride {
    /// Component answers only the given fraction of requests
    Unavailable { target_id: String, availability: f64 },
    /// Cache contents lost: every read misses for the window
    FlushCache { target_id: String },
}

/// Inputs to one composition pass
pub struct ComposeParams<'a> {
    pub graph: &'a SystemGraph,
    pub traffic: &'a TrafficProfile,
    pub ctx: SimulationContext,
    pub behaviors: &'a ComponentBehaviors,
    pub registry: &'a BehaviorRegistry,
    pub options: &'a SimOptions,
    pub failure: Option<&'a FailureOverride>,
}

/// End-to-end aggregate over one traversal
#[derive(Debug, Clone, PartialEq)]
pub struct Composed {
    /// Critical-path latency: sums along sequential hops, max across
    /// parallel branches
    pub latency_ms: f64,
    /// Union of per-component failure probabilities along the path
    pub error_rate: f64,
    /// Sum over every declared component, reachable or not
    pub monthly_cost: f64,
    /// Read-weighted mean hit ratio over reached caches
    pub cache_hit_rate: Option<f64>,
    /// Component ids reached from the entry point, in discovery order
    pub reached: Vec<String>,
    pub per_component: HashMap<String, ComponentMetrics>,
}

fn scale_edge(kind: ConnectionKind, forwarded: Load) -> Load {
    match kind {
        ConnectionKind::Read => Load::new(forwarded.read_rps, 0.0),
        ConnectionKind::Write => Load::new(0.0, forwarded.write_rps),
        ConnectionKind::ReadWrite => forwarded,
    }
}

/// Apply an active failure override to a node before using it.
///
/// A cache flush rewrites the cache's configuration (hit ratio zero) so the
/// miss traffic propagates downstream consistently; availability overrides
/// are applied to the resulting metrics instead.
fn effective_node(node: &ComponentNode, failure: Option<&FailureOverride>) -> ComponentNode {
    if let Some(FailureOverride::FlushCache { target_id }) = failure {
        if node.id == *target_id {
            if let ComponentSpec::Cache(config) = &node.spec {
                return ComponentNode::new(
                    node.id.clone(),
                    ComponentSpec::Cache(CacheConfig {
                        hit_ratio: 0.0,
                        working_set: None,
                        ..config.clone()
                    }),
                );
            }
        }
    }
    node.clone()
}

/// Traffic a node passes to its outgoing edges. Only caches transform the
/// load (hits never leave the cache); everything else forwards what arrived.
fn forward_load(node: &ComponentNode, load: Load, options: &SimOptions) -> Load {
    match &node.spec {
        ComponentSpec::Cache(config) => {
            let hit = Cache::new(&node.id, config).hit_ratio(load, options);
            Load::new(load.read_rps * (1.0 - hit), load.write_rps)
        }
        _ => load,
    }
}

/// An edge the traversal actually followed, kept for the latency pass
struct TraversedEdge {
    from: String,
    to: String,
}

/// Compose the graph under the given traffic.
///
/// Fails only structurally (no entry component); everything downstream of a
/// valid entry is total.
pub fn compose(params: &ComposeParams<'_>) -> Result<Composed, GraphError> {
    let graph = params.graph;
    let entry = graph.entry().ok_or(GraphError::NoEntryComponent)?;

    let initial = Load::new(
        params.traffic.effective_read_rps(),
        params.traffic.effective_write_rps(),
    );

    // Phase 1: discovery and rate accumulation
    let mut node_level: HashMap<String, usize> = HashMap::new();
    let mut in_load: HashMap<String, Load> = HashMap::new();
    let mut reached: Vec<String> = Vec::new();
    let mut traversed: Vec<TraversedEdge> = Vec::new();

    node_level.insert(entry.id.clone(), 0);
    in_load.insert(entry.id.clone(), initial);
    reached.push(entry.id.clone());
    let mut level_nodes: Vec<String> = vec![entry.id.clone()];
    let mut level = 0usize;

    while !level_nodes.is_empty() {
        let mut next_level: Vec<String> = Vec::new();
        for id in &level_nodes {
            let node = effective_node(
                graph.node(id).expect("reached nodes exist in the graph"),
                params.failure,
            );
            let arrived = in_load.get(id).copied().unwrap_or_default();
            let out_load = forward_load(&node, arrived, params.options);

            let mut seen_edges: HashSet<(&str, ConnectionKind)> = HashSet::new();
            for edge in graph.outgoing(id) {
                if graph.node(&edge.to).is_none() {
                    // Dangling connection: tolerated, the validator flags it
                    continue;
                }
                // Duplicate edges affect reachability only
                if !seen_edges.insert((edge.to.as_str(), edge.kind)) {
                    continue;
                }
                // Self-edges and edges back to a shallower level are what
                // cycles are made of; dropping them bounds the traversal.
                // Edges within the current level (cache -> sibling store)
                // and forward edges always accumulate.
                match node_level.get(&edge.to) {
                    Some(&target_level) => {
                        if edge.to == *id || target_level < level {
                            continue;
                        }
                    }
                    None => {
                        node_level.insert(edge.to.clone(), level + 1);
                        reached.push(edge.to.clone());
                        next_level.push(edge.to.clone());
                    }
                }
                in_load
                    .entry(edge.to.clone())
                    .or_default()
                    .add(scale_edge(edge.kind, out_load));
                traversed.push(TraversedEdge {
                    from: id.clone(),
                    to: edge.to.clone(),
                });
            }
        }
        level += 1;
        level_nodes = next_level;
    }

    // Phase 2: simulate every reached node with its final load
    let mut per_component: HashMap<String, ComponentMetrics> = HashMap::new();
    for id in &reached {
        let node = effective_node(
            graph.node(id).expect("reached nodes exist in the graph"),
            params.failure,
        );
        let load = in_load.get(id).copied().unwrap_or_default();
        let behavior = params.behaviors.for_node(&node);
        let mut out = simulate_node(
            &node,
            load,
            &params.ctx,
            behavior,
            params.registry,
            params.options,
        );

        if let Some(FailureOverride::Unavailable {
            target_id,
            availability,
        }) = params.failure
        {
            if id == target_id {
                out.metrics.error_rate = out
                    .metrics
                    .error_rate
                    .max(1.0 - availability.clamp(0.0, 1.0));
            }
        }

        debug!(
            component = id.as_str(),
            rps = load.total(),
            latency_ms = out.metrics.latency_ms,
            error_rate = out.metrics.error_rate,
            "simulated component"
        );
        per_component.insert(id.clone(), out.metrics);
    }

    // Phase 3: relax arrival times along the traversed edges
    let mut arrival_ms: HashMap<&str, f64> = HashMap::new();
    arrival_ms.insert(&entry.id, 0.0);
    for edge in &traversed {
        let depart = arrival_ms.get(edge.from.as_str()).copied().unwrap_or(0.0)
            + per_component
                .get(&edge.from)
                .map(|m| m.latency_ms)
                .unwrap_or(0.0);
        let arrival = arrival_ms.entry(&edge.to).or_insert(0.0);
        *arrival = arrival.max(depart);
    }
    let latency_ms = reached
        .iter()
        .map(|id| {
            arrival_ms.get(id.as_str()).copied().unwrap_or(0.0) + per_component[id].latency_ms
        })
        .fold(0.0_f64, f64::max);

    let error_rate = 1.0
        - reached
            .iter()
            .map(|id| 1.0 - per_component[id].error_rate)
            .product::<f64>();

    // Unreachable components still cost money: simulate them at zero load
    // for their provisioning figure alone.
    let mut monthly_cost = 0.0;
    for node in &graph.components {
        if let Some(metrics) = per_component.get(&node.id) {
            monthly_cost += metrics.monthly_cost;
        } else {
            let idle = simulate_node(
                node,
                Load::zero(),
                &params.ctx,
                params.behaviors.for_node(node),
                params.registry,
                params.options,
            );
            monthly_cost += idle.metrics.monthly_cost;
        }
    }

    let mut hit_weight = 0.0;
    let mut hit_total = 0.0;
    for id in &reached {
        if let Some(hit) = per_component[id].cache_hit_rate {
            let reads = in_load.get(id).map(|l| l.read_rps).unwrap_or(0.0);
            let weight = reads.max(f64::MIN_POSITIVE);
            hit_weight += weight;
            hit_total += hit * weight;
        }
    }
    let cache_hit_rate = (hit_weight > 0.0).then(|| hit_total / hit_weight);

    Ok(Composed {
        latency_ms,
        error_rate: error_rate.clamp(0.0, 1.0),
        monthly_cost,
        cache_hit_rate,
        reached,
        per_component,
    })
}

/// Total provisioning cost of everything on the canvas, independent of any
/// traversal. Used for fail-closed results where no traversal happens.
pub fn provisioned_cost(
    graph: &SystemGraph,
    registry: &BehaviorRegistry,
    options: &SimOptions,
) -> f64 {
    let ctx = SimulationContext::default();
    let behaviors = ComponentBehaviors::default();
    graph
        .components
        .iter()
        .map(|node| {
            simulate_node(
                node,
                Load::zero(),
                &ctx,
                behaviors.for_node(node),
                registry,
                options,
            )
            .metrics
            .monthly_cost
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use archsim_core::{
        AppServerConfig, CacheConfig, ClientConfig, ComponentNode, ComponentSpec, Connection,
        DatabaseConfig,
    };

    fn params<'a>(
        graph: &'a SystemGraph,
        traffic: &'a TrafficProfile,
        registry: &'a BehaviorRegistry,
        behaviors: &'a ComponentBehaviors,
        options: &'a SimOptions,
    ) -> ComposeParams<'a> {
        ComposeParams {
            graph,
            traffic,
            ctx: SimulationContext::new(60.0),
            behaviors,
            registry,
            options,
            failure: None,
        }
    }

    fn web_app_db() -> SystemGraph {
        SystemGraph::new(
            vec![
                ComponentNode::new("web", ComponentSpec::Client(ClientConfig {})),
                ComponentNode::new(
                    "app",
                    ComponentSpec::AppServer(AppServerConfig {
                        instances: 4,
                        per_instance_rps: 500.0,
                    }),
                ),
                ComponentNode::new(
                    "db",
                    ComponentSpec::Database(DatabaseConfig {
                        read_capacity: 5000.0,
                        write_capacity: 2000.0,
                        ..Default::default()
                    }),
                ),
            ],
            vec![Connection::new("web", "app"), Connection::new("app", "db")],
        )
    }

    fn cache_aside_graph(db_read_capacity: f64) -> SystemGraph {
        SystemGraph::new(
            vec![
                ComponentNode::new("web", ComponentSpec::Client(ClientConfig {})),
                ComponentNode::new("app", ComponentSpec::AppServer(Default::default())),
                ComponentNode::new(
                    "redis",
                    ComponentSpec::Cache(CacheConfig {
                        hit_ratio: 0.9,
                        ..Default::default()
                    }),
                ),
                ComponentNode::new(
                    "db",
                    ComponentSpec::Database(DatabaseConfig {
                        read_capacity: db_read_capacity,
                        write_capacity: 200.0,
                        ..Default::default()
                    }),
                ),
            ],
            vec![
                Connection::new("web", "app"),
                Connection::read("app", "redis"),
                Connection::read("redis", "db"),
                Connection::write("app", "db"),
            ],
        )
    }

    #[test]
    fn test_sequential_latency_sums() {
        let graph = web_app_db();
        let traffic = TrafficProfile::new(1000.0, 0.8);
        let registry = BehaviorRegistry::builtin();
        let behaviors = ComponentBehaviors::default();
        let options = SimOptions::default();
        let composed =
            compose(&params(&graph, &traffic, &registry, &behaviors, &options)).unwrap();
        // client 0 + app 5 + db 10
        assert!((composed.latency_ms - 15.0).abs() < 1e-9);
        assert_eq!(composed.reached.len(), 3);
    }

    #[test]
    fn test_no_entry_fails_closed() {
        let graph = SystemGraph::new(
            vec![ComponentNode::new(
                "db",
                ComponentSpec::Database(Default::default()),
            )],
            vec![],
        );
        let traffic = TrafficProfile::new(100.0, 0.8);
        let registry = BehaviorRegistry::builtin();
        let behaviors = ComponentBehaviors::default();
        let options = SimOptions::default();
        let result = compose(&params(&graph, &traffic, &registry, &behaviors, &options));
        assert!(matches!(result, Err(GraphError::NoEntryComponent)));
    }

    #[test]
    fn test_cache_misses_and_writes_reach_the_database() {
        let graph = cache_aside_graph(200.0);
        // 1000 reads: 90% absorbed by the cache, so the database sees
        // 100 rps of misses plus the 100 rps of writes.
        let traffic = TrafficProfile {
            rps: 1100.0,
            read_ratio: None,
            read_rps: Some(1000.0),
            write_rps: Some(100.0),
        };
        let registry = BehaviorRegistry::builtin();
        let behaviors = ComponentBehaviors::default();
        let options = SimOptions::default();
        let composed =
            compose(&params(&graph, &traffic, &registry, &behaviors, &options)).unwrap();
        let db = &composed.per_component["db"];
        // Misses 100/200 read capacity, writes 100/200 write capacity
        assert!((db.utilization - 0.5).abs() < 1e-9);
        assert_eq!(composed.cache_hit_rate, Some(0.9));
    }

    #[test]
    fn test_miss_propagation_is_independent_of_edge_order() {
        let mut graph = cache_aside_graph(200.0);
        // Declare the write edge before the cache edges
        graph.connections = vec![
            Connection::write("app", "db"),
            Connection::new("web", "app"),
            Connection::read("app", "redis"),
            Connection::read("redis", "db"),
        ];
        let traffic = TrafficProfile {
            rps: 1100.0,
            read_ratio: None,
            read_rps: Some(1000.0),
            write_rps: Some(100.0),
        };
        let registry = BehaviorRegistry::builtin();
        let behaviors = ComponentBehaviors::default();
        let options = SimOptions::default();
        let composed =
            compose(&params(&graph, &traffic, &registry, &behaviors, &options)).unwrap();
        let db = &composed.per_component["db"];
        assert!((db.utilization - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_parallel_branches_take_max() {
        let graph = SystemGraph::new(
            vec![
                ComponentNode::new("web", ComponentSpec::Client(ClientConfig {})),
                ComponentNode::new("fast", ComponentSpec::Cache(Default::default())), // 1ms
                ComponentNode::new("slow", ComponentSpec::Database(Default::default())), // 10ms
            ],
            vec![
                Connection::new("web", "fast"),
                Connection::new("web", "slow"),
            ],
        );
        let traffic = TrafficProfile::new(100.0, 0.8);
        let registry = BehaviorRegistry::builtin();
        let behaviors = ComponentBehaviors::default();
        let options = SimOptions::default();
        let composed =
            compose(&params(&graph, &traffic, &registry, &behaviors, &options)).unwrap();
        // Slower branch dominates
        assert!((composed.latency_ms - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_unreachable_component_costs_but_adds_no_latency() {
        let mut graph = web_app_db();
        graph.components.push(ComponentNode::new(
            "orphan_db",
            ComponentSpec::Database(Default::default()),
        ));
        let traffic = TrafficProfile::new(100.0, 0.8);
        let registry = BehaviorRegistry::builtin();
        let behaviors = ComponentBehaviors::default();
        let options = SimOptions::default();
        let composed =
            compose(&params(&graph, &traffic, &registry, &behaviors, &options)).unwrap();
        assert!(!composed.reached.contains(&"orphan_db".to_string()));
        // Latency unchanged from the three-node chain
        assert!((composed.latency_ms - 15.0).abs() < 1e-9);
        // But cost includes the orphan
        let base_cost = provisioned_cost(&web_app_db(), &registry, &options);
        assert!(composed.monthly_cost > base_cost);
    }

    #[test]
    fn test_cycles_terminate() {
        let graph = SystemGraph::new(
            vec![
                ComponentNode::new("web", ComponentSpec::Client(ClientConfig {})),
                ComponentNode::new("a", ComponentSpec::AppServer(Default::default())),
                ComponentNode::new("b", ComponentSpec::AppServer(Default::default())),
            ],
            vec![
                Connection::new("web", "a"),
                Connection::new("a", "b"),
                Connection::new("b", "a"), // cycle
                Connection::new("a", "a"), // self-edge
            ],
        );
        let traffic = TrafficProfile::new(100.0, 0.8);
        let registry = BehaviorRegistry::builtin();
        let behaviors = ComponentBehaviors::default();
        let options = SimOptions::default();
        let composed =
            compose(&params(&graph, &traffic, &registry, &behaviors, &options)).unwrap();
        assert_eq!(composed.reached.len(), 3);
        // The cycle adds no traffic: a sees exactly the original 100 rps
        assert!((composed.per_component["a"].utilization - 100.0 / 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_edges_are_idempotent() {
        let mut graph = web_app_db();
        graph.connections.push(Connection::new("web", "app"));
        graph.connections.push(Connection::new("web", "app"));
        let traffic = TrafficProfile::new(1000.0, 0.8);
        let registry = BehaviorRegistry::builtin();
        let behaviors = ComponentBehaviors::default();
        let options = SimOptions::default();
        let composed =
            compose(&params(&graph, &traffic, &registry, &behaviors, &options)).unwrap();
        // App sees the traffic once, not three times
        assert!((composed.per_component["app"].utilization - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_cost_additivity_at_zero_traffic() {
        let graph = web_app_db();
        let traffic = TrafficProfile::new(0.0, 0.8);
        let registry = BehaviorRegistry::builtin();
        let behaviors = ComponentBehaviors::default();
        let options = SimOptions::default();
        let composed =
            compose(&params(&graph, &traffic, &registry, &behaviors, &options)).unwrap();
        let standalone = provisioned_cost(&graph, &registry, &options);
        assert!((composed.monthly_cost - standalone).abs() < 1e-9);
    }

    #[test]
    fn test_unavailable_override_forces_errors() {
        let graph = web_app_db();
        let traffic = TrafficProfile::new(100.0, 0.8);
        let registry = BehaviorRegistry::builtin();
        let behaviors = ComponentBehaviors::default();
        let options = SimOptions::default();
        let failure = FailureOverride::Unavailable {
            target_id: "db".to_string(),
            availability: 0.0,
        };
        let mut p = params(&graph, &traffic, &registry, &behaviors, &options);
        p.failure = Some(&failure);
        let composed = compose(&p).unwrap();
        assert_eq!(composed.per_component["db"].error_rate, 1.0);
        assert_eq!(composed.error_rate, 1.0);
    }

    #[test]
    fn test_flush_override_zeroes_hit_ratio_and_forwards_all_reads() {
        let graph = cache_aside_graph(2000.0);
        let traffic = TrafficProfile {
            rps: 1000.0,
            read_ratio: None,
            read_rps: Some(1000.0),
            write_rps: Some(0.0),
        };
        let registry = BehaviorRegistry::builtin();
        let behaviors = ComponentBehaviors::default();
        let options = SimOptions::default();
        let failure = FailureOverride::FlushCache {
            target_id: "redis".to_string(),
        };
        let mut p = params(&graph, &traffic, &registry, &behaviors, &options);
        p.failure = Some(&failure);
        let composed = compose(&p).unwrap();
        assert_eq!(composed.per_component["redis"].cache_hit_rate, Some(0.0));
        // Every read now reaches the database
        assert!((composed.per_component["db"].utilization - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_composition_is_deterministic() {
        let graph = web_app_db();
        let traffic = TrafficProfile::new(750.0, 0.7);
        let registry = BehaviorRegistry::builtin();
        let behaviors = ComponentBehaviors::default();
        let options = SimOptions::default();
        let first = compose(&params(&graph, &traffic, &registry, &behaviors, &options)).unwrap();
        let second = compose(&params(&graph, &traffic, &registry, &behaviors, &options)).unwrap();
        assert_eq!(first, second);
    }
}
