//! MCS-Plus: maximum common induced subgraphs as maximum cliques of the
//! compatibility graph.

mod bron_kerbosch;
mod compat;

use tracing::{debug, trace};

use crate::aggregate::BestHits;
use crate::graph::LabeledGraph;
use crate::label::LabelTable;
use crate::mapping::AtomAtomMapping;
use crate::matcher::{AtomMatcher, BondMatcher};
use crate::timeout::IterationManager;

pub use bron_kerbosch::{maximum_cliques, CliqueSearch, TIED_CLIQUE_LIMIT};
pub use compat::{CompatNode, CompatibilityGraph, SPARSE_D_EDGE_LIMIT};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliqueOutcome {
    pub mappings: Vec<AtomAtomMapping>,
    pub timeout: bool,
    /// The compatibility graph came from the fallback build.
    pub fallback: bool,
}

pub struct McsPlus<'g, A: ?Sized, B: ?Sized> {
    source: &'g LabeledGraph,
    target: &'g LabeledGraph,
    atoms: &'g A,
    bonds: &'g B,
    sparse_d_edge_limit: usize,
}

impl<'g, A, B> McsPlus<'g, A, B>
where
    A: AtomMatcher + ?Sized,
    B: BondMatcher + ?Sized,
{
    pub fn new(source: &'g LabeledGraph, target: &'g LabeledGraph, atoms: &'g A, bonds: &'g B) -> Self {
        Self {
            source,
            target,
            atoms,
            bonds,
            sparse_d_edge_limit: SPARSE_D_EDGE_LIMIT,
        }
    }

    pub fn with_sparse_d_edge_limit(mut self, limit: usize) -> Self {
        self.sparse_d_edge_limit = limit;
        self
    }

    pub fn search(&self, labels: &mut LabelTable, iterations: &mut IterationManager) -> CliqueOutcome {
        let graph = CompatibilityGraph::build(
            self.source,
            self.target,
            self.atoms,
            self.bonds,
            labels,
            self.sparse_d_edge_limit,
        );
        let found = maximum_cliques(&graph, iterations);
        trace!(
            cliques = found.cliques.len(),
            iterations = iterations.counter(),
            "clique search finished"
        );
        if found.timeout {
            debug!(limit = iterations.limit(), "clique search hit its iteration limit");
        }

        let mut hits = BestHits::new();
        hits.extend(found.cliques.iter().filter_map(|clique| graph.decode(clique)));
        CliqueOutcome {
            mappings: hits.into_vec(),
            timeout: found.timeout,
            fallback: graph.is_fallback(),
        }
    }
}
