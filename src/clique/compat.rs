use std::collections::HashMap;

use bit_set::BitSet;
use tracing::{debug, trace};

use crate::graph::LabeledGraph;
use crate::label::LabelTable;
use crate::mapping::AtomAtomMapping;
use crate::matcher::{AtomMatcher, BondMatcher};

/// Graphs at least this large skip d-edges between non-bonded pairs in the
/// fallback build.
pub const SPARSE_D_EDGE_LIMIT: usize = 50;

/// One candidate atom pair. Ids are dense and start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompatNode {
    pub source: usize,
    pub target: usize,
    pub id: usize,
    /// Target symbol id, set only by the fallback build.
    pub label: Option<usize>,
}

/// Compatibility (modular product) graph of two labeled graphs.
///
/// Two nodes `(s1, t1)` and `(s2, t2)` with `s1 != s2` and `t1 != t2` are
/// joined by a c-edge when both pairs are non-bonded, or both are bonded
/// with compatible bonds; otherwise by a d-edge. Cliques over c-edges are
/// common induced subgraphs.
#[derive(Debug, Clone)]
pub struct CompatibilityGraph {
    nodes: Vec<CompatNode>,
    c_edges: Vec<(usize, usize)>,
    d_edges: Vec<(usize, usize)>,
    // indexed by id - 1
    c_adjacency: Vec<BitSet>,
    fallback: bool,
}

impl CompatibilityGraph {
    /// Primary build, with the label-aware fallback when the primary build
    /// finds no c-edge at all.
    pub fn build<A, B>(
        source: &LabeledGraph,
        target: &LabeledGraph,
        atoms: &A,
        bonds: &B,
        labels: &mut LabelTable,
        sparse_d_edge_limit: usize,
    ) -> Self
    where
        A: AtomMatcher + ?Sized,
        B: BondMatcher + ?Sized,
    {
        let mut cache = BondCache::default();
        let primary = Self::primary(source, target, atoms, bonds, &mut cache);
        if !primary.c_edges.is_empty() || primary.nodes.is_empty() {
            return primary;
        }
        debug!(
            nodes = primary.nodes.len(),
            "no c-edges in compatibility graph, rebuilding with fallback labels"
        );
        Self::fallback(source, target, atoms, bonds, labels, sparse_d_edge_limit, &mut cache)
    }

    fn primary<A, B>(
        source: &LabeledGraph,
        target: &LabeledGraph,
        atoms: &A,
        bonds: &B,
        cache: &mut BondCache,
    ) -> Self
    where
        A: AtomMatcher + ?Sized,
        B: BondMatcher + ?Sized,
    {
        let nodes = candidate_pairs(source, target, atoms, |_| None);
        let mut graph = Self::with_nodes(nodes, false);
        for i in 0..graph.nodes.len() {
            for j in i + 1..graph.nodes.len() {
                let (a, b) = (graph.nodes[i], graph.nodes[j]);
                if a.source == b.source || a.target == b.target {
                    continue;
                }
                let source_bonded = source.has_edge(a.source, b.source);
                let target_bonded = target.has_edge(a.target, b.target);
                let c_edge = match (source_bonded, target_bonded) {
                    (false, false) => true,
                    (true, true) => cache.compatible(bonds, source, target, &a, &b),
                    _ => false,
                };
                graph.add_edge(a.id, b.id, c_edge);
            }
        }
        trace!(
            nodes = graph.nodes.len(),
            c_edges = graph.c_edges.len(),
            d_edges = graph.d_edges.len(),
            "built compatibility graph"
        );
        graph
    }

    fn fallback<A, B>(
        source: &LabeledGraph,
        target: &LabeledGraph,
        atoms: &A,
        bonds: &B,
        labels: &mut LabelTable,
        sparse_d_edge_limit: usize,
        cache: &mut BondCache,
    ) -> Self
    where
        A: AtomMatcher + ?Sized,
        B: BondMatcher + ?Sized,
    {
        let nodes = candidate_pairs(source, target, atoms, |t| Some(labels.id(target.symbol(t))));
        let dense = source.node_count() < sparse_d_edge_limit
            && target.node_count() < sparse_d_edge_limit;
        let mut graph = Self::with_nodes(nodes, true);
        for i in 0..graph.nodes.len() {
            for j in i + 1..graph.nodes.len() {
                let (a, b) = (graph.nodes[i], graph.nodes[j]);
                if a.source == b.source || a.target == b.target {
                    continue;
                }
                let source_bonded = source.has_edge(a.source, b.source);
                let target_bonded = target.has_edge(a.target, b.target);
                match (source_bonded, target_bonded) {
                    (true, true) => {
                        let c_edge = cache.compatible(bonds, source, target, &a, &b);
                        graph.add_edge(a.id, b.id, c_edge);
                    }
                    (false, false) if !dense => {}
                    _ => graph.add_edge(a.id, b.id, false),
                }
            }
        }
        trace!(
            nodes = graph.nodes.len(),
            c_edges = graph.c_edges.len(),
            d_edges = graph.d_edges.len(),
            dense,
            "built fallback compatibility graph"
        );
        graph
    }

    fn with_nodes(nodes: Vec<CompatNode>, fallback: bool) -> Self {
        let c_adjacency = vec![BitSet::with_capacity(nodes.len()); nodes.len()];
        Self {
            nodes,
            c_edges: Vec::new(),
            d_edges: Vec::new(),
            c_adjacency,
            fallback,
        }
    }

    fn add_edge(&mut self, a: usize, b: usize, c_edge: bool) {
        if c_edge {
            self.c_edges.push((a, b));
            self.c_adjacency[a - 1].insert(b - 1);
            self.c_adjacency[b - 1].insert(a - 1);
        } else {
            self.d_edges.push((a, b));
        }
    }

    pub fn nodes(&self) -> &[CompatNode] {
        &self.nodes
    }

    pub fn node(&self, id: usize) -> Option<&CompatNode> {
        id.checked_sub(1).and_then(|i| self.nodes.get(i))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn c_edges(&self) -> &[(usize, usize)] {
        &self.c_edges
    }

    pub fn d_edges(&self) -> &[(usize, usize)] {
        &self.d_edges
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// c-edge neighbours of the node at zero-based `index`, as zero-based
    /// indices.
    pub(crate) fn c_neighbors(&self, index: usize) -> &BitSet {
        &self.c_adjacency[index]
    }

    /// Turn a clique of ids into a mapping, pairs in ascending id order.
    ///
    /// Returns `None` for an unknown id, or a clique that would map a source
    /// or target index twice.
    pub fn decode(&self, clique: &[usize]) -> Option<AtomAtomMapping> {
        let mut ids = clique.to_vec();
        ids.sort_unstable();
        let mut mapping = AtomAtomMapping::new();
        for id in ids {
            let Some(node) = self.node(id) else {
                debug!(id, nodes = self.nodes.len(), "clique id out of range, dropping");
                return None;
            };
            if !mapping.insert(node.source, node.target) {
                debug!(
                    source = node.source,
                    target = node.target,
                    "clique maps an atom twice, dropping"
                );
                return None;
            }
        }
        Some(mapping)
    }
}

fn candidate_pairs<A>(
    source: &LabeledGraph,
    target: &LabeledGraph,
    atoms: &A,
    mut label: impl FnMut(usize) -> Option<usize>,
) -> Vec<CompatNode>
where
    A: AtomMatcher + ?Sized,
{
    let mut nodes = Vec::new();
    for s in 0..source.node_count() {
        for t in 0..target.node_count() {
            if atoms.atoms_compatible(source.node(s), target.node(t)) {
                nodes.push(CompatNode {
                    source: s,
                    target: t,
                    id: nodes.len() + 1,
                    label: label(t),
                });
            }
        }
    }
    nodes
}

/// Bond comparisons keyed by source bond, target bond and the orientation
/// the endpoints are paired in. Shared by the primary and fallback builds.
#[derive(Debug, Default)]
struct BondCache {
    results: HashMap<(usize, usize, usize, usize), bool>,
}

impl BondCache {
    fn compatible<B>(
        &mut self,
        bonds: &B,
        source: &LabeledGraph,
        target: &LabeledGraph,
        a: &CompatNode,
        b: &CompatNode,
    ) -> bool
    where
        B: BondMatcher + ?Sized,
    {
        let (first, second) = if a.source < b.source { (a, b) } else { (b, a) };
        let key = (first.source, second.source, first.target, second.target);
        *self.results.entry(key).or_insert_with(|| {
            bonds.bonds_compatible(
                source,
                (first.source, second.source),
                target,
                (first.target, second.target),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{DefaultMatcher, MatcherConfig};
    use crate::smiles::from_smiles;

    fn graph(smiles: &str) -> LabeledGraph {
        LabeledGraph::from_mol(&from_smiles(smiles).unwrap())
    }

    fn build(source: &LabeledGraph, target: &LabeledGraph) -> CompatibilityGraph {
        let matcher = DefaultMatcher::new(MatcherConfig::default());
        CompatibilityGraph::build(
            source,
            target,
            &matcher,
            &matcher,
            &mut LabelTable::new(),
            SPARSE_D_EDGE_LIMIT,
        )
    }

    #[test]
    fn every_valid_pair_is_classified_once() {
        let source = graph("CCO");
        let target = graph("OCC=C");
        let compat = build(&source, &target);
        assert!(!compat.is_fallback());

        let mut expected = 0;
        let nodes = compat.nodes();
        for i in 0..nodes.len() {
            for j in i + 1..nodes.len() {
                if nodes[i].source != nodes[j].source && nodes[i].target != nodes[j].target {
                    expected += 1;
                }
            }
        }
        assert_eq!(compat.c_edges().len() + compat.d_edges().len(), expected);
        for edge in compat.c_edges() {
            assert!(!compat.d_edges().contains(edge));
        }
    }

    #[test]
    fn ids_are_dense_from_one() {
        let compat = build(&graph("CO"), &graph("OC"));
        let ids: Vec<_> = compat.nodes().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(compat.node(1).map(|n| (n.source, n.target)), Some((0, 1)));
        assert!(compat.node(0).is_none());
        assert!(compat.node(3).is_none());
    }

    #[test]
    fn zero_c_edges_switches_to_fallback() {
        let source = graph("CC");
        let target = graph("C=C");
        let compat = build(&source, &target);
        assert!(compat.is_fallback());
        assert!(compat.nodes().iter().all(|n| n.label == Some(1)));
        assert!(compat.c_edges().is_empty());
        assert_eq!(compat.d_edges().len(), 2);
    }

    #[test]
    fn fallback_keeps_one_sided_d_edges_when_sparse() {
        let source = graph("C.C");
        let target = graph("C=C");
        let matcher = DefaultMatcher::new(MatcherConfig::default());
        // primary: non-bonded vs bonded, every pair is a d-edge
        let dense = CompatibilityGraph::build(
            &source,
            &target,
            &matcher,
            &matcher,
            &mut LabelTable::new(),
            SPARSE_D_EDGE_LIMIT,
        );
        assert!(dense.is_fallback());
        assert_eq!(dense.d_edges().len(), 2);

        let sparse =
            CompatibilityGraph::build(&source, &target, &matcher, &matcher, &mut LabelTable::new(), 1);
        assert!(sparse.is_fallback());
        // exactly one side bonded is still a d-edge
        assert_eq!(sparse.d_edges().len(), 2);
    }

    #[test]
    fn decode_is_ordered_and_rejects_conflicts() {
        let compat = build(&graph("CO"), &graph("CO"));
        // nodes: 1=(0,0) 2=(1,1)
        let mapping = compat.decode(&[2, 1]).unwrap();
        assert_eq!(mapping.pairs(), vec![(0, 0), (1, 1)]);
        assert!(compat.decode(&[1, 7]).is_none());

        let carbons = build(&graph("CC"), &graph("CC"));
        // 1=(0,0) 2=(0,1) share source 0
        assert!(carbons.decode(&[1, 2]).is_none());
    }
}
