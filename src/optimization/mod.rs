//! Ranking full topologies by layout cost
//!
//! The numerical work lives behind traits: a [`FlowSolver`] balances the
//! demand over a tree, a [`LayoutOptimizer`] places the Steiner nodes and
//! chooses pipes, and a [`GeometryCheck`] inspects the resulting layout.
//! This module only drives them over every full topology of an instance.

mod instance;

pub use instance::Instance;

use crate::config::EnumerationConfig;
use crate::network::{Arc, Edge, NodeId, Position, SteinerTree};
use crate::topology::{FreshIds, Label, TopologyEnumerator};
use crate::{GeonetError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

/// Signed flow per arc; positive values run from tail to head
pub type ArcFlows<N> = BTreeMap<Arc<N>, f64>;

/// Computes arc flows that satisfy the demand on a tree
pub trait FlowSolver<N: NodeId> {
    /// Flow on every arc of `tree`
    fn arc_flows(&self, tree: &SteinerTree<N>, demand: &BTreeMap<N, f64>) -> Result<ArcFlows<N>>;
}

/// Places Steiner nodes for a tree with known flows
pub trait LayoutOptimizer<N: NodeId> {
    /// Optimal layout, or `None` if the tree admits no feasible one
    fn optimize(&self, tree: &SteinerTree<N>, flows: &ArcFlows<N>, instance: &Instance<N>) -> Result<Option<Layout<N>>>;
}

/// Geometric validation of a laid-out tree
pub trait GeometryCheck<N: NodeId> {
    /// Edges whose length is effectively zero
    fn degenerate_edges(&self, tree: &SteinerTree<N>, positions: &BTreeMap<N, Position>) -> Vec<Edge<N>>;

    /// Pairs of edges that cross
    fn crossing_edges(&self, tree: &SteinerTree<N>, positions: &BTreeMap<N, Position>) -> Vec<(Edge<N>, Edge<N>)>;
}

/// Steiner node positions with the cost they achieve
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layout<N: NodeId> {
    /// Position of every Steiner node
    pub steiner_positions: BTreeMap<N, Position>,
    /// Objective value
    pub cost: f64,
}

/// A laid-out topology
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "N: Serialize", deserialize = "N: Deserialize<'de>"))]
pub struct Solution<N: NodeId> {
    /// Canonical label of the topology
    pub label: Label<N>,
    /// The tree, arcs oriented along the flow
    pub tree: SteinerTree<N>,
    /// Non-negative flow per arc of `tree`
    #[serde(with = "flow_list")]
    pub flows: ArcFlows<N>,
    /// Position of every Steiner node
    pub steiner_positions: BTreeMap<N, Position>,
    /// Objective value
    pub cost: f64,
}

/// Findings of a [`GeometryCheck`] on a solution
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeometryReport<N: NodeId> {
    /// Near-zero length edges
    pub degenerate: Vec<Edge<N>>,
    /// Crossing edge pairs
    pub crossing: Vec<(Edge<N>, Edge<N>)>,
}

/// Arc flows as a list of pairs; arcs cannot be JSON map keys
mod flow_list {
    use super::*;

    pub fn serialize<N: NodeId + Serialize, S: Serializer>(
        flows: &ArcFlows<N>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(flows.iter())
    }

    pub fn deserialize<'de, N: NodeId + Deserialize<'de>, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<ArcFlows<N>, D::Error> {
        Ok(Vec::<(Arc<N>, f64)>::deserialize(deserializer)?.into_iter().collect())
    }
}

impl<N: NodeId> GeometryReport<N> {
    /// No degenerate and no crossing edges
    pub fn is_clean(&self) -> bool {
        self.degenerate.is_empty() && self.crossing.is_empty()
    }
}

impl<N: NodeId> Solution<N> {
    /// Positions of all nodes, terminals and Steiner nodes alike
    pub fn positions(&self) -> BTreeMap<N, Position> {
        self.tree.merge_positions(&self.steiner_positions)
    }

    /// Run a geometry check on the layout
    pub fn inspect<G: GeometryCheck<N> + ?Sized>(&self, check: &G) -> GeometryReport<N> {
        let positions = self.positions();
        GeometryReport {
            degenerate: check.degenerate_edges(&self.tree, &positions),
            crossing: check.crossing_edges(&self.tree, &positions),
        }
    }
}

/// Reorient arcs so that all flows are non-negative
///
/// Arcs with negative flow are reversed and their flow negated; nodes and
/// terminal positions are kept. Every arc of `tree` needs a finite flow.
pub fn orient_forward<N: NodeId>(tree: &SteinerTree<N>, flows: &ArcFlows<N>) -> Result<(SteinerTree<N>, ArcFlows<N>)> {
    let mut arcs = Vec::with_capacity(tree.arcs().len());
    let mut forward = ArcFlows::new();

    for arc in tree.arcs() {
        let flow = match flows.get(arc) {
            Some(&f) if f.is_finite() => f,
            Some(&f) => return Err(GeonetError::Collaborator(format!("Flow {} on arc {:?}", f, arc))),
            None => return Err(GeonetError::Collaborator(format!("No flow for arc {:?}", arc))),
        };
        let (arc, flow) = if flow >= 0.0 {
            (arc.clone(), flow)
        } else {
            (arc.reversed(), -flow)
        };
        forward.insert(arc.clone(), flow);
        arcs.push(arc);
    }

    let oriented = SteinerTree::new(tree.nodes().cloned(), arcs, tree.terminal_positions().clone())?;
    Ok((oriented, forward))
}

/// Lay out every full topology of an instance and rank them by cost
///
/// Steiner nodes are named by [`FreshIds`]; see [`enum_fsts_with_ids`] for
/// identifier types without automatic names.
pub fn enum_fsts<N, F, L>(
    instance: &Instance<N>,
    flow_solver: &F,
    optimizer: &L,
    config: &EnumerationConfig,
) -> Result<Vec<Solution<N>>>
where
    N: FreshIds,
    F: FlowSolver<N> + ?Sized,
    L: LayoutOptimizer<N> + ?Sized,
{
    let taken: BTreeSet<N> = instance.terminal_positions.keys().cloned().collect();
    let ids = N::fresh_ids(&taken, taken.len().saturating_sub(2));
    enum_fsts_with_ids(instance, &ids, flow_solver, optimizer, config)
}

/// Lay out every full topology with the given Steiner node names
///
/// Topologies for which the optimizer finds no feasible layout are skipped.
/// Solutions come back in increasing cost; equal costs keep label order.
pub fn enum_fsts_with_ids<N, F, L>(
    instance: &Instance<N>,
    steiner_ids: &[N],
    flow_solver: &F,
    optimizer: &L,
    config: &EnumerationConfig,
) -> Result<Vec<Solution<N>>>
where
    N: NodeId,
    F: FlowSolver<N> + ?Sized,
    L: LayoutOptimizer<N> + ?Sized,
{
    instance.validate()?;
    let mut enumerator = TopologyEnumerator::new(config.clone())?;
    let topologies = enumerator.enumerate_with_ids(&instance.terminal_positions, steiner_ids)?;
    let total = topologies.len();

    let mut solutions = Vec::with_capacity(total);
    for (label, tree) in topologies {
        let flows = flow_solver.arc_flows(&tree, &instance.demand)?;
        let (tree, flows) = orient_forward(&tree, &flows)?;

        match optimizer.optimize(&tree, &flows, instance)? {
            Some(layout) => solutions.push(Solution {
                label,
                tree,
                flows,
                steiner_positions: layout.steiner_positions,
                cost: layout.cost,
            }),
            None => tracing::warn!(label = ?label, "no feasible layout, skipping topology"),
        }
    }

    solutions.sort_by(|a, b| a.cost.total_cmp(&b.cost));
    tracing::info!(
        topologies = total,
        feasible = solutions.len(),
        best = solutions.first().map(|s| s.cost),
        "ranked topologies"
    );
    Ok(solutions)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Flows computed from subtree demand sums
    struct SubtreeFlow;

    impl FlowSolver<char> for SubtreeFlow {
        fn arc_flows(&self, tree: &SteinerTree<char>, demand: &BTreeMap<char, f64>) -> Result<ArcFlows<char>> {
            // flow on (u, v) is the total demand on the v side
            fn side(tree: &SteinerTree<char>, demand: &BTreeMap<char, f64>, node: char, from: char) -> f64 {
                demand.get(&node).copied().unwrap_or(0.0)
                    + tree
                        .neighbors(&node)
                        .filter(|&&n| n != from)
                        .map(|&n| side(tree, demand, n, node))
                        .sum::<f64>()
            }
            Ok(tree
                .arcs()
                .iter()
                .map(|a| (a.clone(), side(tree, demand, a.head, a.tail)))
                .collect())
        }
    }

    /// Steiner nodes at the centroid of their terminal neighbors, cost = flow-weighted length
    ///
    /// Infeasible whenever terminals `a` and `b` share a Steiner node.
    struct Centroid;

    impl LayoutOptimizer<char> for Centroid {
        fn optimize(
            &self,
            tree: &SteinerTree<char>,
            flows: &ArcFlows<char>,
            instance: &Instance<char>,
        ) -> Result<Option<Layout<char>>> {
            let hub = |t: char| tree.neighbors(&t).next().copied();
            if hub('a').is_some() && hub('a') == hub('b') {
                return Ok(None);
            }

            let mut steiner_positions = BTreeMap::new();
            for s in tree.steiner_nodes() {
                let around: Vec<Position> = tree
                    .neighbors(s)
                    .filter_map(|n| instance.terminal_positions.get(n).copied())
                    .collect();
                let count = around.len().max(1) as f64;
                let x = around.iter().map(|p| p.0).sum::<f64>() / count;
                let y = around.iter().map(|p| p.1).sum::<f64>() / count;
                steiner_positions.insert(*s, (x, y));
            }

            let all = tree.merge_positions(&steiner_positions);
            let cost = flows
                .iter()
                .map(|(arc, flow)| {
                    let (p, q) = (all[&arc.tail], all[&arc.head]);
                    flow * ((p.0 - q.0).powi(2) + (p.1 - q.1).powi(2)).sqrt()
                })
                .sum();
            Ok(Some(Layout { steiner_positions, cost }))
        }
    }

    struct Failing;

    impl FlowSolver<char> for Failing {
        fn arc_flows(&self, _: &SteinerTree<char>, _: &BTreeMap<char, f64>) -> Result<ArcFlows<char>> {
            Err(GeonetError::Collaborator("singular system".to_string()))
        }
    }

    /// Flags edges shorter than a threshold, never reports crossings
    struct ShortEdges(f64);

    impl GeometryCheck<char> for ShortEdges {
        fn degenerate_edges(&self, tree: &SteinerTree<char>, positions: &BTreeMap<char, Position>) -> Vec<Edge<char>> {
            tree.arcs()
                .iter()
                .filter(|a| {
                    let (p, q) = (positions[&a.tail], positions[&a.head]);
                    ((p.0 - q.0).powi(2) + (p.1 - q.1).powi(2)).sqrt() < self.0
                })
                .map(|a| a.edge())
                .collect()
        }

        fn crossing_edges(&self, _: &SteinerTree<char>, _: &BTreeMap<char, Position>) -> Vec<(Edge<char>, Edge<char>)> {
            Vec::new()
        }
    }

    fn instance() -> Instance<char> {
        Instance {
            terminal_positions: BTreeMap::from([
                ('a', (0.0, 0.0)),
                ('b', (0.0, 2.0)),
                ('c', (5.0, 0.0)),
                ('d', (5.0, 2.0)),
            ]),
            demand: BTreeMap::from([('a', -2.0), ('b', -1.0), ('c', 1.5), ('d', 1.5)]),
            diameters: vec![1.0],
            costs: vec![1.0],
            pressure_min: 1.0,
            pressure_max: 2.0,
            weymouth_c: 1.0,
        }
    }

    #[test]
    fn test_orient_forward() {
        let tree = SteinerTree::new(
            "abcs".chars(),
            [('a', 's'), ('b', 's'), ('s', 'c')],
            BTreeMap::from([('a', (0.0, 0.0)), ('b', (1.0, 0.0)), ('c', (0.0, 1.0))]),
        )
        .unwrap();
        let flows = BTreeMap::from([
            (Arc::new('a', 's'), 2.0),
            (Arc::new('b', 's'), -1.0),
            (Arc::new('s', 'c'), 0.0),
        ]);

        let (oriented, forward) = orient_forward(&tree, &flows).unwrap();
        assert_eq!(oriented.arcs(), &[Arc::new('a', 's'), Arc::new('s', 'b'), Arc::new('s', 'c')]);
        assert_eq!(forward[&Arc::new('s', 'b')], 1.0);
        assert!(forward.values().all(|&f| f >= 0.0));
        assert_eq!(oriented.terminal_positions(), tree.terminal_positions());

        let mut missing = flows.clone();
        missing.remove(&Arc::new('b', 's'));
        assert!(matches!(orient_forward(&tree, &missing), Err(GeonetError::Collaborator(_))));

        let mut nan = flows;
        nan.insert(Arc::new('a', 's'), f64::NAN);
        assert!(orient_forward(&tree, &nan).is_err());
    }

    #[test]
    fn test_enum_fsts_ranks_feasible_topologies() {
        let solutions = enum_fsts(&instance(), &SubtreeFlow, &Centroid, &EnumerationConfig::default()).unwrap();

        // (b, (c, d)) joins a and b at one Steiner node and is rejected
        assert_eq!(solutions.len(), 2);
        assert!(solutions.iter().all(|s| s.label.to_string() != "(b, (c, d))"));
        assert!(solutions.windows(2).all(|w| w[0].cost <= w[1].cost));

        for solution in &solutions {
            assert!(solution.tree.is_full_steiner_topology());
            assert!(solution.flows.values().all(|&f| f >= 0.0));
            assert_eq!(solution.steiner_positions.len(), 2);
            assert_eq!(solution.positions().len(), 6);
            // supplies leave their terminals
            assert!(solution.tree.arcs().iter().any(|a| a.tail == 'a'));
        }
    }

    #[test]
    fn test_enum_fsts_errors() {
        let config = EnumerationConfig::default();
        let mut unbalanced = instance();
        unbalanced.demand.insert('d', 9.0);
        assert!(matches!(
            enum_fsts(&unbalanced, &SubtreeFlow, &Centroid, &config),
            Err(GeonetError::InvalidConfig(_))
        ));

        assert!(matches!(
            enum_fsts(&instance(), &Failing, &Centroid, &config),
            Err(GeonetError::Collaborator(_))
        ));
    }

    #[test]
    fn test_inspect_layout() {
        let solutions = enum_fsts(&instance(), &SubtreeFlow, &Centroid, &EnumerationConfig::default()).unwrap();
        let best = &solutions[0];

        assert!(best.inspect(&ShortEdges(1e-6)).is_clean());
        let report = best.inspect(&ShortEdges(100.0));
        assert_eq!(report.degenerate.len(), 5);
        assert!(report.crossing.is_empty());
        assert!(!report.is_clean());

        // (d, (b, c)) puts both Steiner nodes on the same centroid
        let collapsed = best_by_label(&solutions, "(d, (b, c))");
        assert_eq!(collapsed.inspect(&ShortEdges(1e-6)).degenerate.len(), 1);
        assert_eq!(best.label.to_string(), "(c, (b, d))");
        assert!((best.cost - 16.0).abs() < 1e-9);
    }

    fn best_by_label<'a>(solutions: &'a [Solution<char>], label: &str) -> &'a Solution<char> {
        solutions.iter().find(|s| s.label.to_string() == label).unwrap()
    }

    #[test]
    fn test_enum_fsts_with_explicit_ids() {
        let config = EnumerationConfig::sequential();
        let solutions = enum_fsts_with_ids(&instance(), &['x', 'y'], &SubtreeFlow, &Centroid, &config).unwrap();
        assert_eq!(solutions.len(), 2);
        for solution in &solutions {
            assert_eq!(solution.steiner_positions.keys().copied().collect::<Vec<_>>(), vec!['x', 'y']);
        }

        assert!(matches!(
            enum_fsts_with_ids(&instance(), &['x'], &SubtreeFlow, &Centroid, &config),
            Err(GeonetError::SteinerIdCount { expected: 2, actual: 1, .. })
        ));
        assert!(matches!(
            enum_fsts_with_ids(&instance(), &['x', 'a'], &SubtreeFlow, &Centroid, &config),
            Err(GeonetError::DuplicateNode(_))
        ));
    }

    #[test]
    fn test_solution_json_roundtrip() {
        let solutions = enum_fsts(&instance(), &SubtreeFlow, &Centroid, &EnumerationConfig::default()).unwrap();
        let best = &solutions[0];

        let json = serde_json::to_string(best).unwrap();
        let loaded: Solution<char> = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.label, best.label);
        assert_eq!(loaded.tree, best.tree);
        assert_eq!(loaded.flows, best.flows);
        assert_eq!(loaded.steiner_positions, best.steiner_positions);
        assert!((loaded.cost - best.cost).abs() < 1e-9);

        let report = best.inspect(&ShortEdges(100.0));
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(serde_json::from_str::<GeometryReport<char>>(&json).unwrap(), report);

        let layout = Layout {
            steiner_positions: best.steiner_positions.clone(),
            cost: 1.5,
        };
        let json = serde_json::to_string(&layout).unwrap();
        assert_eq!(serde_json::from_str::<Layout<char>>(&json).unwrap(), layout);
    }
}
