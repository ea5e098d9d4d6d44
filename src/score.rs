//! Scoring of candidate mappings.
//!
//! Every candidate mapping of a molecule pair becomes an [`McsSolution`]
//! carrying the numbers the winner selection compares: bond energy change,
//! fragment count of the mapped region, a stereo similarity score and the
//! number of carbon-carbon matches.

use std::cmp::Ordering;

use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};

use crate::bond::BondOrder;
use crate::graph::{GraphEdge, LabeledGraph};
use crate::mapping::AtomAtomMapping;

/// Energy cost of turning the source into the target under a mapping.
/// Lower is better.
pub trait EnergyScorer: Send + Sync {
    fn energy(&self, source: &LabeledGraph, target: &LabeledGraph, mapping: &AtomAtomMapping) -> f64;
}

/// Agreement of mapped bonds and atoms. Higher is better.
pub trait StereoScorer: Send + Sync {
    fn stereo_score(
        &self,
        source: &LabeledGraph,
        target: &LabeledGraph,
        mapping: &AtomAtomMapping,
    ) -> f64;
}

/// Sums tabulated bond dissociation energies (kJ/mol) of the bonds a
/// mapping breaks and forms. A bond kept with a different order costs the
/// difference of the two energies.
#[derive(Debug, Clone, Copy, Default)]
pub struct BondEnergyTable;

/// Energy used for element pairs missing from the table.
pub const DEFAULT_BOND_ENERGY: f64 = 350.0;

impl BondEnergyTable {
    pub fn bond_energy(a: &str, b: &str, order: BondOrder) -> f64 {
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        match order {
            BondOrder::Aromatic => {
                if (a, b) == ("C", "C") {
                    518.0
                } else {
                    (single_energy(a, b) + double_energy(a, b)) / 2.0
                }
            }
            BondOrder::Double => double_energy(a, b),
            BondOrder::Triple => triple_energy(a, b),
            BondOrder::Single | BondOrder::Unset => single_energy(a, b),
        }
    }

    fn edge_energy(graph: &LabeledGraph, a: usize, b: usize, edge: &GraphEdge) -> f64 {
        Self::bond_energy(graph.symbol(a), graph.symbol(b), edge.order)
    }
}

fn single_energy(a: &str, b: &str) -> f64 {
    match (a, b) {
        ("C", "C") => 346.0,
        ("C", "H") => 411.0,
        ("C", "N") => 305.0,
        ("C", "O") => 358.0,
        ("C", "S") => 272.0,
        ("C", "F") => 485.0,
        ("C", "Cl") => 327.0,
        ("Br", "C") => 285.0,
        ("C", "I") => 213.0,
        ("C", "P") => 264.0,
        ("H", "N") => 386.0,
        ("H", "O") => 459.0,
        ("H", "S") => 363.0,
        ("N", "N") => 167.0,
        ("N", "O") => 201.0,
        ("O", "O") => 142.0,
        ("O", "P") => 335.0,
        ("O", "S") => 265.0,
        ("S", "S") => 226.0,
        _ => DEFAULT_BOND_ENERGY,
    }
}

fn double_energy(a: &str, b: &str) -> f64 {
    match (a, b) {
        ("C", "C") => 602.0,
        ("C", "N") => 615.0,
        ("C", "O") => 799.0,
        ("C", "S") => 573.0,
        ("N", "N") => 418.0,
        ("N", "O") => 607.0,
        ("O", "O") => 494.0,
        ("O", "P") => 544.0,
        ("O", "S") => 522.0,
        _ => 2.0 * single_energy(a, b),
    }
}

fn triple_energy(a: &str, b: &str) -> f64 {
    match (a, b) {
        ("C", "C") => 835.0,
        ("C", "N") => 887.0,
        ("C", "O") => 1072.0,
        ("N", "N") => 942.0,
        _ => 3.0 * single_energy(a, b),
    }
}

impl EnergyScorer for BondEnergyTable {
    fn energy(&self, source: &LabeledGraph, target: &LabeledGraph, mapping: &AtomAtomMapping) -> f64 {
        let inverse = mapping.inverted();
        let mut total = 0.0;

        for (a, b) in source.edge_pairs() {
            let Some(edge) = source.edge(a, b) else { continue };
            let broken = Self::edge_energy(source, a, b, edge);
            total += match (mapping.get(a), mapping.get(b)) {
                (Some(x), Some(y)) => match target.edge(x, y) {
                    Some(other) if other.order == edge.order => 0.0,
                    Some(other) => (broken - Self::edge_energy(target, x, y, other)).abs(),
                    None => broken,
                },
                _ => broken,
            };
        }

        for (x, y) in target.edge_pairs() {
            let Some(edge) = target.edge(x, y) else { continue };
            let existed = match (inverse.get(x), inverse.get(y)) {
                (Some(a), Some(b)) => source.has_edge(a, b),
                _ => false,
            };
            if !existed {
                total += Self::edge_energy(target, x, y, edge);
            }
        }
        total
    }
}

/// `+1` per mapped bond with equal order and ring flag, `-1` per mapped
/// bond whose order differs, `+0.5` per mapped atom pair with equal
/// hybridization.
#[derive(Debug, Clone, Copy, Default)]
pub struct BondStereoComparator;

impl StereoScorer for BondStereoComparator {
    fn stereo_score(
        &self,
        source: &LabeledGraph,
        target: &LabeledGraph,
        mapping: &AtomAtomMapping,
    ) -> f64 {
        let mut score = 0.0;
        for (a, b) in source.edge_pairs() {
            let (Some(x), Some(y)) = (mapping.get(a), mapping.get(b)) else {
                continue;
            };
            let (Some(s), Some(t)) = (source.edge(a, b), target.edge(x, y)) else {
                continue;
            };
            if s.order != t.order {
                score -= 1.0;
            } else if s.in_ring == t.in_ring {
                score += 1.0;
            }
        }
        for (s, t) in mapping.iter() {
            if source.node(s).hybridization == target.node(t).hybridization {
                score += 0.5;
            }
        }
        score
    }
}

/// Connected pieces of the source subgraph covered by the mapping.
pub fn fragment_count(source: &LabeledGraph, mapping: &AtomAtomMapping) -> usize {
    if mapping.is_empty() {
        return 0;
    }
    let mut pieces = UnionFind::new(source.node_count());
    for (a, b) in source.edge_pairs() {
        if mapping.contains_source(a) && mapping.contains_source(b) {
            pieces.union(a, b);
        }
    }
    let mut roots: Vec<usize> = mapping.iter().map(|(s, _)| pieces.find(s)).collect();
    roots.sort_unstable();
    roots.dedup();
    roots.len()
}

pub fn carbon_matches(source: &LabeledGraph, target: &LabeledGraph, mapping: &AtomAtomMapping) -> usize {
    mapping
        .iter()
        .filter(|&(s, t)| source.node(s).is_carbon() && target.node(t).is_carbon())
        .count()
}

/// A scored mapping between educt `query_position` and product
/// `target_position`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McsSolution {
    pub query_position: usize,
    pub target_position: usize,
    pub mapping: AtomAtomMapping,
    pub energy: f64,
    pub fragment_count: usize,
    pub stereo_score: f64,
    pub carbon_matches: usize,
}

impl McsSolution {
    pub fn score(
        (query_position, target_position): (usize, usize),
        source: &LabeledGraph,
        target: &LabeledGraph,
        mapping: AtomAtomMapping,
        energy: &dyn EnergyScorer,
        stereo: &dyn StereoScorer,
    ) -> Self {
        Self {
            query_position,
            target_position,
            energy: energy.energy(source, target, &mapping),
            fragment_count: fragment_count(source, &mapping),
            stereo_score: stereo.stereo_score(source, target, &mapping),
            carbon_matches: carbon_matches(source, target, &mapping),
            mapping,
        }
    }

    /// Placeholder for a pair that produced no mapping.
    pub fn empty(query_position: usize, target_position: usize) -> Self {
        Self {
            query_position,
            target_position,
            mapping: AtomAtomMapping::new(),
            energy: 0.0,
            fragment_count: 0,
            stereo_score: 0.0,
            carbon_matches: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.mapping.count()
    }
}

/// Stereo score descending, then energy ascending, then fragment count
/// ascending.
pub fn compare_solutions(a: &McsSolution, b: &McsSolution) -> Ordering {
    b.stereo_score
        .total_cmp(&a.stereo_score)
        .then_with(|| a.energy.total_cmp(&b.energy))
        .then_with(|| a.fragment_count.cmp(&b.fragment_count))
}

/// Stable sort, best first.
pub fn rank_solutions(solutions: &mut [McsSolution]) {
    solutions.sort_by(compare_solutions);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;

    fn graph(smiles: &str) -> LabeledGraph {
        LabeledGraph::from_mol(&from_smiles(smiles).unwrap())
    }

    fn identity(n: usize) -> AtomAtomMapping {
        AtomAtomMapping::from_pairs((0..n).map(|i| (i, i)))
    }

    fn solution(stereo: f64, energy: f64, fragments: usize, tag: usize) -> McsSolution {
        McsSolution {
            stereo_score: stereo,
            energy,
            fragment_count: fragments,
            ..McsSolution::empty(tag, 0)
        }
    }

    #[test]
    fn identity_costs_nothing() {
        let g = graph("CC(=O)O");
        assert_eq!(BondEnergyTable.energy(&g, &g, &identity(4)), 0.0);
    }

    #[test]
    fn broken_and_formed_bonds_are_counted() {
        let ethanol = graph("CCO");
        let ethane = graph("CC");
        let mapping = identity(2);
        // C-O broken, nothing formed
        assert_eq!(BondEnergyTable.energy(&ethanol, &ethane, &mapping), 358.0);
        // C-O formed in the other direction
        assert_eq!(BondEnergyTable.energy(&ethane, &ethanol, &mapping), 358.0);
    }

    #[test]
    fn order_change_costs_the_difference() {
        let single = graph("CC");
        let double = graph("C=C");
        let energy = BondEnergyTable.energy(&single, &double, &identity(2));
        assert_eq!(energy, 602.0 - 346.0);
    }

    #[test]
    fn table_is_symmetric() {
        assert_eq!(
            BondEnergyTable::bond_energy("O", "C", BondOrder::Double),
            BondEnergyTable::bond_energy("C", "O", BondOrder::Double)
        );
        assert_eq!(
            BondEnergyTable::bond_energy("Xe", "C", BondOrder::Single),
            DEFAULT_BOND_ENERGY
        );
    }

    #[test]
    fn stereo_rewards_matching_bonds() {
        let acid = graph("CC(=O)O");
        // 3 bonds equal (+3), 4 atoms same hybridization (+2)
        assert_eq!(BondStereoComparator.stereo_score(&acid, &acid, &identity(4)), 5.0);

        let single = graph("CC");
        let double = graph("C=C");
        // order differs (-1), hybridization differs on both atoms
        assert_eq!(BondStereoComparator.stereo_score(&single, &double, &identity(2)), -1.0);
    }

    #[test]
    fn fragments_of_mapped_region() {
        let g = graph("CCOCC");
        let split = AtomAtomMapping::from_pairs([(0, 0), (1, 1), (3, 3), (4, 4)]);
        assert_eq!(fragment_count(&g, &split), 2);
        assert_eq!(fragment_count(&g, &identity(5)), 1);
        assert_eq!(fragment_count(&g, &AtomAtomMapping::new()), 0);
    }

    #[test]
    fn carbons_are_counted() {
        let g = graph("CCO");
        assert_eq!(carbon_matches(&g, &g, &identity(3)), 2);
    }

    #[test]
    fn ranking_is_stable() {
        let mut solutions = vec![
            solution(1.0, 10.0, 1, 0),
            solution(2.0, 50.0, 1, 1),
            solution(2.0, 10.0, 2, 2),
            solution(2.0, 10.0, 1, 3),
            solution(2.0, 10.0, 1, 4),
        ];
        rank_solutions(&mut solutions);
        let order: Vec<_> = solutions.iter().map(|s| s.query_position).collect();
        assert_eq!(order, vec![3, 4, 2, 1, 0]);
    }

    #[test]
    fn solution_serializes() {
        let g = graph("CO");
        let scored = McsSolution::score(
            (1, 2),
            &g,
            &g,
            identity(2),
            &BondEnergyTable,
            &BondStereoComparator,
        );
        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["query_position"], 1);
        assert_eq!(json["target_position"], 2);
        assert_eq!(json["carbon_matches"], 1);
        let back: McsSolution = serde_json::from_value(json).unwrap();
        assert_eq!(back, scored);
    }
}
