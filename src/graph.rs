//! Labeled-graph view over an annotated molecule.
//!
//! Every matcher in the crate works on [`LabeledGraph`] rather than on
//! [`Mol`] directly: node indices are dense `usize`, neighbour lists are
//! sorted, and all per-atom annotations the matchers consult are copied
//! into a [`GraphNode`] once.

use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::atom::AtomLabel;
use crate::bond::BondOrder;
use crate::element;
use crate::hybridization::Hybridization;
use crate::mol::Mol;
use crate::traits::{
    HasAromaticity, HasAtomLabel, HasBondOrder, HasFormalCharge, HasHybridization,
    HasRingMembership, HasRingSize,
};

#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub label: AtomLabel,
    pub charge: i8,
    pub aromatic: bool,
    pub in_ring: bool,
    pub ring_size: Option<u8>,
    pub hybridization: Hybridization,
}

impl GraphNode {
    pub fn element(atomic_num: u8) -> Self {
        Self {
            label: AtomLabel::Element(atomic_num),
            charge: 0,
            aromatic: false,
            in_ring: false,
            ring_size: None,
            hybridization: Hybridization::SP3,
        }
    }

    pub fn is_query(&self) -> bool {
        self.label.is_query()
    }

    pub fn symbol(&self) -> &'static str {
        match self.label {
            AtomLabel::Element(n) => element::symbol(n),
            AtomLabel::Query(_) => "*",
        }
    }

    pub fn is_carbon(&self) -> bool {
        self.label == AtomLabel::Element(element::CARBON)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphEdge {
    pub order: BondOrder,
    pub in_ring: bool,
}

impl GraphEdge {
    pub fn new(order: BondOrder) -> Self {
        Self {
            order,
            in_ring: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LabeledGraph {
    graph: UnGraph<GraphNode, GraphEdge>,
    adjacency: Vec<Vec<usize>>,
}

impl LabeledGraph {
    pub fn from_mol<A, B>(mol: &Mol<A, B>) -> Self
    where
        A: HasAtomLabel
            + HasFormalCharge
            + HasAromaticity
            + HasRingMembership
            + HasRingSize
            + HasHybridization,
        B: HasBondOrder + HasRingMembership,
    {
        let nodes = mol
            .atoms()
            .map(|idx| {
                let atom = mol.atom(idx);
                GraphNode {
                    label: atom.atom_label(),
                    charge: atom.formal_charge(),
                    aromatic: atom.is_aromatic(),
                    in_ring: atom.is_in_ring(),
                    ring_size: atom.smallest_ring_size(),
                    hybridization: atom.hybridization(),
                }
            })
            .collect();

        let edges = mol.bonds().filter_map(|bond| {
            let (a, b) = mol.bond_endpoints(bond)?;
            let data = mol.bond(bond);
            Some((
                a.index(),
                b.index(),
                GraphEdge {
                    order: data.bond_order(),
                    in_ring: data.is_in_ring(),
                },
            ))
        });

        Self::from_parts(nodes, edges)
    }

    /// Build from explicit nodes and `(a, b, edge)` triples. Duplicate
    /// pairs keep the first edge.
    pub fn from_parts(
        nodes: Vec<GraphNode>,
        edges: impl IntoIterator<Item = (usize, usize, GraphEdge)>,
    ) -> Self {
        let mut graph = UnGraph::with_capacity(nodes.len(), 0);
        for node in nodes {
            graph.add_node(node);
        }
        let mut adjacency = vec![Vec::new(); graph.node_count()];
        for (a, b, edge) in edges {
            assert!(
                a < adjacency.len() && b < adjacency.len() && a != b,
                "edge ({a}, {b}) does not join two distinct nodes"
            );
            if adjacency[a].contains(&b) {
                continue;
            }
            graph.add_edge(NodeIndex::new(a), NodeIndex::new(b), edge);
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
        for list in &mut adjacency {
            list.sort_unstable();
        }
        Self { graph, adjacency }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }

    pub fn node(&self, i: usize) -> &GraphNode {
        &self.graph[NodeIndex::new(i)]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> + '_ {
        self.graph.node_weights()
    }

    pub fn degree(&self, i: usize) -> usize {
        self.adjacency[i].len()
    }

    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.adjacency[i]
    }

    pub fn edge(&self, a: usize, b: usize) -> Option<&GraphEdge> {
        self.graph
            .find_edge(NodeIndex::new(a), NodeIndex::new(b))
            .map(|e| &self.graph[e])
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.adjacency[a].binary_search(&b).is_ok()
    }

    /// All edges as `(a, b)` with `a < b`, in ascending order.
    pub fn edge_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs: Vec<(usize, usize)> = self
            .adjacency
            .iter()
            .enumerate()
            .flat_map(|(a, list)| list.iter().filter(move |&&b| a < b).map(move |&b| (a, b)))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    pub fn symbol(&self, i: usize) -> &'static str {
        self.node(i).symbol()
    }

    pub fn fragment_count(&self) -> usize {
        connected_components(&self.graph)
    }
}
