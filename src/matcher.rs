//! Atom and bond compatibility predicates.
//!
//! The search engines are generic over [`AtomMatcher`] and [`BondMatcher`].
//! [`DefaultMatcher`] implements both from a [`MatcherConfig`]; closures
//! with the right signature work too, as does [`AnyBond`] for searches that
//! ignore bonds entirely.

use serde::{Deserialize, Serialize};

use crate::bond::BondOrder;
use crate::graph::{GraphEdge, GraphNode, LabeledGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub match_bond_order: bool,
    pub match_rings: bool,
    /// Compare element, hybridization and aromaticity instead of element only.
    pub match_atom_type: bool,
    pub match_ring_size: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            match_bond_order: true,
            match_rings: false,
            match_atom_type: false,
            match_ring_size: false,
        }
    }
}

impl MatcherConfig {
    /// Element-only matching; every bond is compatible.
    pub fn atoms_only() -> Self {
        Self {
            match_bond_order: false,
            match_rings: false,
            match_atom_type: false,
            match_ring_size: false,
        }
    }

    /// Same config with bond orders ignored.
    pub fn without_bond_order(self) -> Self {
        Self {
            match_bond_order: false,
            ..self
        }
    }

    pub fn is_bond_sensitive(&self) -> bool {
        self.match_bond_order
    }
}

pub trait AtomMatcher {
    fn atoms_compatible(&self, source: &GraphNode, target: &GraphNode) -> bool;
}

pub trait BondMatcher {
    /// Compare the source bond `s.0-s.1` with the target bond `t.0-t.1`;
    /// endpoints correspond in order.
    ///
    /// # Panics
    ///
    /// Either bond missing from its graph is a broken caller invariant.
    fn bonds_compatible(
        &self,
        source: &LabeledGraph,
        s: (usize, usize),
        target: &LabeledGraph,
        t: (usize, usize),
    ) -> bool;
}

impl<F> AtomMatcher for F
where
    F: Fn(&GraphNode, &GraphNode) -> bool,
{
    fn atoms_compatible(&self, source: &GraphNode, target: &GraphNode) -> bool {
        self(source, target)
    }
}

impl<F> BondMatcher for F
where
    F: Fn(&GraphEdge, &GraphEdge) -> bool,
{
    fn bonds_compatible(
        &self,
        source: &LabeledGraph,
        s: (usize, usize),
        target: &LabeledGraph,
        t: (usize, usize),
    ) -> bool {
        self(expect_edge(source, s), expect_edge(target, t))
    }
}

/// Accepts every pair of existing bonds.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyBond;

impl BondMatcher for AnyBond {
    fn bonds_compatible(
        &self,
        _source: &LabeledGraph,
        _s: (usize, usize),
        _target: &LabeledGraph,
        _t: (usize, usize),
    ) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultMatcher {
    pub config: MatcherConfig,
}

impl DefaultMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }
}

impl AtomMatcher for DefaultMatcher {
    fn atoms_compatible(&self, source: &GraphNode, target: &GraphNode) -> bool {
        if !source.label.accepts(&target.label) {
            return false;
        }
        // query nodes only constrain the label
        if source.is_query() || target.is_query() {
            return true;
        }
        let config = &self.config;
        if config.match_atom_type
            && (source.hybridization != target.hybridization || source.aromatic != target.aromatic)
        {
            return false;
        }
        if config.match_rings && source.in_ring != target.in_ring {
            return false;
        }
        if config.match_ring_size
            && source.in_ring
            && target.in_ring
            && source.ring_size != target.ring_size
        {
            return false;
        }
        true
    }
}

impl BondMatcher for DefaultMatcher {
    fn bonds_compatible(
        &self,
        source: &LabeledGraph,
        s: (usize, usize),
        target: &LabeledGraph,
        t: (usize, usize),
    ) -> bool {
        let source_edge = expect_edge(source, s);
        let target_edge = expect_edge(target, t);
        let config = &self.config;

        if config.match_bond_order && !orders_compatible(source_edge.order, target_edge.order) {
            return false;
        }
        if config.match_rings && source_edge.in_ring != target_edge.in_ring {
            return false;
        }
        if config.match_atom_type {
            let s_aromatic = (source.node(s.0).aromatic, source.node(s.1).aromatic);
            let t_aromatic = (target.node(t.0).aromatic, target.node(t.1).aromatic);
            if s_aromatic != t_aromatic {
                return false;
            }
        }
        true
    }
}

fn orders_compatible(a: BondOrder, b: BondOrder) -> bool {
    a == b || a == BondOrder::Unset || b == BondOrder::Unset
}

fn expect_edge(graph: &LabeledGraph, (a, b): (usize, usize)) -> &GraphEdge {
    match graph.edge(a, b) {
        Some(edge) => edge,
        None => panic!("no bond between nodes {a} and {b}"),
    }
}
