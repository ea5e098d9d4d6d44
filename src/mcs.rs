//! Maximum common substructure between two labeled graphs.
//!
//! [`Mcs`] picks one of three engines and returns every maximum common
//! induced mapping it finds, keyed by source index:
//!
//! * [`Algorithm::Substructure`]: VF2 embeddings of the smaller graph in the
//!   larger one, kept only if induced.
//! * [`Algorithm::Vf2McGregor`]: VF2 with an atoms-only matcher collects the
//!   deepest partial mappings, which seed the McGregor search.
//! * [`Algorithm::McsPlus`]: maximum cliques of the compatibility graph,
//!   extended with McGregor when bond orders matter.
//!
//! With [`Algorithm::Auto`] the substructure engine is tried first whenever
//! the cheap element-count test allows an embedding.
//!
//! Every engine optimises the common *induced* subgraph: two mapped atoms
//! are bonded in the source iff their images are bonded in the target. A
//! chain therefore covers only two atoms of a three-membered ring here. For
//! plain monomorphism (every source bond present in the target, extra
//! target bonds allowed) use [`Vf2`] with [`MatchMode::Subgraph`] directly.
//!
//! ```
//! use crabmap::{from_smiles, LabeledGraph, Mcs, McsOptions};
//!
//! let benzene = LabeledGraph::from_mol(&from_smiles("c1ccccc1").unwrap());
//! let phenol = LabeledGraph::from_mol(&from_smiles("Oc1ccccc1").unwrap());
//! let result = Mcs::new(&benzene, &phenol, McsOptions::default()).run();
//! assert!(result.is_subgraph);
//! assert_eq!(result.first_mapping().unwrap().count(), 6);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::aggregate::BestHits;
use crate::atom::AtomLabel;
use crate::clique::{McsPlus, SPARSE_D_EDGE_LIMIT};
use crate::element;
use crate::graph::LabeledGraph;
use crate::label::LabelTable;
use crate::mapping::{AtomAtomMapping, Orientation};
use crate::matcher::{AnyBond, DefaultMatcher, MatcherConfig};
use crate::mcgregor::McGregor;
use crate::timeout::IterationManager;
use crate::vf2::{MatchMode, Vf2};

/// Estimated common size above which [`Algorithm::Auto`] prefers the
/// clique engine.
pub const CLIQUE_THRESHOLD: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Algorithm {
    #[default]
    Auto,
    Substructure,
    Vf2McGregor,
    McsPlus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct McsOptions {
    pub matcher: MatcherConfig,
    pub algorithm: Algorithm,
    /// Scales the per-engine iteration budget.
    pub iteration_weight: usize,
    pub clique_threshold: usize,
    pub sparse_d_edge_limit: usize,
}

impl Default for McsOptions {
    fn default() -> Self {
        Self {
            matcher: MatcherConfig::default(),
            algorithm: Algorithm::Auto,
            iteration_weight: 1,
            clique_threshold: CLIQUE_THRESHOLD,
            sparse_d_edge_limit: SPARSE_D_EDGE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct McsResult {
    /// Source-keyed mappings, all of the same size.
    pub mappings: Vec<AtomAtomMapping>,
    /// The smaller graph is entirely covered: it is an induced subgraph of
    /// the larger one.
    pub is_subgraph: bool,
    pub timeout: bool,
    /// The engine that produced the mappings.
    pub algorithm: Algorithm,
}

impl McsResult {
    pub fn first_mapping(&self) -> Option<&AtomAtomMapping> {
        self.mappings.first()
    }

    pub fn is_timeout(&self) -> bool {
        self.timeout
    }

    /// Size of the mappings, `0` when there are none.
    pub fn size(&self) -> usize {
        self.first_mapping().map_or(0, AtomAtomMapping::count)
    }
}

pub struct Mcs<'g> {
    source: &'g LabeledGraph,
    target: &'g LabeledGraph,
    options: McsOptions,
    educts: usize,
    products: usize,
}

impl<'g> Mcs<'g> {
    pub fn new(source: &'g LabeledGraph, target: &'g LabeledGraph, options: McsOptions) -> Self {
        Self {
            source,
            target,
            options,
            educts: 1,
            products: 1,
        }
    }

    /// Fragment counts of the reaction sides this pair came from; a 1×1
    /// pair always goes to [`Algorithm::Vf2McGregor`] when it is not a
    /// substructure.
    ///
    /// This only affects routing. The matcher in [`McsOptions`] is used as
    /// given; callers that want bond orders ignored for a single
    /// educt/product pair relax it themselves, as
    /// [`ReactionMapper`](crate::reaction::ReactionMapper) does.
    pub fn with_fragment_counts(mut self, educts: usize, products: usize) -> Self {
        self.educts = educts;
        self.products = products;
        self
    }

    fn swapped(&self) -> bool {
        self.source.node_count() > self.target.node_count()
    }

    fn ordered(&self) -> (&'g LabeledGraph, &'g LabeledGraph) {
        if self.swapped() {
            (self.target, self.source)
        } else {
            (self.source, self.target)
        }
    }

    fn iterations(&self) -> IterationManager {
        IterationManager::for_graphs(
            self.source.node_count(),
            self.target.node_count(),
            self.options.iteration_weight,
        )
    }

    pub fn run(&self) -> McsResult {
        let mut labels = LabelTable::new();
        let (smaller, larger) = self.ordered();

        if self.options.algorithm == Algorithm::Auto && is_subgraph_heuristic(smaller, larger) {
            let result = self.substructure();
            if result.is_subgraph {
                return result;
            }
            trace!("no induced embedding, falling back to common substructure");
        }

        let algorithm = self.select(&mut labels);
        debug!(
            ?algorithm,
            source = self.source.node_count(),
            target = self.target.node_count(),
            "selected mcs engine"
        );
        match algorithm {
            Algorithm::Substructure => self.substructure(),
            Algorithm::McsPlus => self.mcs_plus(&mut labels),
            Algorithm::Vf2McGregor | Algorithm::Auto => self.vf2_mcgregor(),
        }
    }

    fn select(&self, labels: &mut LabelTable) -> Algorithm {
        match self.options.algorithm {
            Algorithm::Auto => {
                if self.educts == 1 && self.products == 1 {
                    return Algorithm::Vf2McGregor;
                }
                let estimate = expected_max_graph_match(self.source, self.target, labels);
                if estimate > self.options.clique_threshold {
                    Algorithm::McsPlus
                } else {
                    Algorithm::Vf2McGregor
                }
            }
            explicit => explicit,
        }
    }

    fn finish(&self, mappings: Vec<AtomAtomMapping>, timeout: bool, algorithm: Algorithm) -> McsResult {
        let smaller = self.ordered().0.node_count();
        let is_subgraph = mappings.first().is_some_and(|m| m.count() == smaller);
        if timeout {
            debug!(?algorithm, "mcs result is best effort after timeout");
        }
        McsResult {
            mappings,
            is_subgraph,
            timeout,
            algorithm,
        }
    }

    fn substructure(&self) -> McsResult {
        let (smaller, larger) = self.ordered();
        let orientation = Orientation::swapped(self.swapped());
        let matcher = DefaultMatcher::new(self.options.matcher);
        let outcome = Vf2::new(smaller, larger, MatchMode::Subgraph, &matcher, &matcher)
            .with_iteration_limit(self.iterations().limit())
            .match_all();
        let mappings: Vec<_> = outcome
            .mappings
            .iter()
            .filter(|m| is_induced(smaller, larger, m))
            .map(|m| orientation.normalize(m))
            .collect();
        trace!(
            embeddings = outcome.mappings.len(),
            induced = mappings.len(),
            "substructure search finished"
        );
        if mappings.is_empty() {
            return McsResult {
                timeout: outcome.timeout,
                algorithm: Algorithm::Substructure,
                ..McsResult::default()
            };
        }
        self.finish(mappings, outcome.timeout, Algorithm::Substructure)
    }

    fn vf2_mcgregor(&self) -> McsResult {
        let (smaller, larger) = self.ordered();
        let weak = DefaultMatcher::new(MatcherConfig::atoms_only());
        let seeds = Vf2::new(smaller, larger, MatchMode::Subgraph, &weak, &AnyBond)
            .with_iteration_limit(self.iterations().limit())
            .largest_partials();
        trace!(
            seeds = seeds.mappings.len(),
            depth = seeds.mappings.first().map_or(0, AtomAtomMapping::count),
            seed_timeout = seeds.timeout,
            "collected mcgregor seeds"
        );

        let full = DefaultMatcher::new(self.options.matcher);
        let outcome = McGregor::new(self.source, self.target, &full, &full).extend(
            &seeds.mappings,
            Orientation::swapped(self.swapped()),
            &mut self.iterations(),
        );
        self.finish(outcome.mappings, outcome.timeout, Algorithm::Vf2McGregor)
    }

    fn mcs_plus(&self, labels: &mut LabelTable) -> McsResult {
        let config = self.options.matcher;
        let bond_sensitive = config.is_bond_sensitive();
        let clique_matcher = DefaultMatcher::new(if bond_sensitive {
            config.without_bond_order()
        } else {
            config
        });
        let cliques = McsPlus::new(self.source, self.target, &clique_matcher, &clique_matcher)
            .with_sparse_d_edge_limit(self.options.sparse_d_edge_limit)
            .search(labels, &mut self.iterations());

        if !bond_sensitive && !cliques.timeout && !cliques.fallback {
            return self.finish(cliques.mappings, false, Algorithm::McsPlus);
        }
        let full = DefaultMatcher::new(config);
        let outcome = McGregor::new(self.source, self.target, &full, &full).extend(
            &cliques.mappings,
            Orientation::SourceKeyed,
            &mut self.iterations(),
        );
        if !cliques.timeout && !outcome.timeout {
            return self.finish(outcome.mappings, false, Algorithm::McsPlus);
        }

        // cut-short cliques make poor seeds; keep whichever of the two
        // engines got further
        let partials = self.vf2_mcgregor();
        debug!(
            clique_size = outcome.mappings.first().map_or(0, AtomAtomMapping::count),
            partial_size = partials.size(),
            "clique search timed out, merged with vf2 seeds"
        );
        let mut hits = BestHits::new();
        hits.extend(outcome.mappings);
        hits.extend(partials.mappings);
        self.finish(hits.into_vec(), true, Algorithm::McsPlus)
    }
}

/// Shorthand for `Mcs::new(source, target, options).run()`.
pub fn find_mcs(source: &LabeledGraph, target: &LabeledGraph, options: McsOptions) -> McsResult {
    Mcs::new(source, target, options).run()
}

/// Whether the heavy-element counts of `smaller` fit inside `larger`.
///
/// A necessary condition for `smaller` to embed in `larger`: every heavy
/// element node needs a node of the same element, or a query node, on the
/// other side. Query nodes of `smaller` are not counted.
pub fn is_subgraph_heuristic(smaller: &LabeledGraph, larger: &LabeledGraph) -> bool {
    let mut available: HashMap<u8, usize> = HashMap::new();
    let mut wildcards = 0usize;
    for node in larger.nodes() {
        match node.label {
            AtomLabel::Element(n) if element::is_heavy(n) => *available.entry(n).or_default() += 1,
            AtomLabel::Element(_) => {}
            AtomLabel::Query(_) => wildcards += 1,
        }
    }
    for node in smaller.nodes() {
        let AtomLabel::Element(n) = node.label else { continue };
        if !element::is_heavy(n) {
            continue;
        }
        match available.get_mut(&n) {
            Some(count) if *count > 0 => *count -= 1,
            _ if wildcards > 0 => wildcards -= 1,
            _ => return false,
        }
    }
    true
}

/// Size of the common multiset of `symbol.hybridization` labels; an upper
/// estimate of the common substructure.
pub fn expected_max_graph_match(
    source: &LabeledGraph,
    target: &LabeledGraph,
    labels: &mut LabelTable,
) -> usize {
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for node in source.nodes() {
        let id = labels.id(&format!("{}.{}", node.symbol(), node.hybridization.as_str()));
        *counts.entry(id).or_default() += 1;
    }
    let mut common = 0;
    for node in target.nodes() {
        let id = labels.id(&format!("{}.{}", node.symbol(), node.hybridization.as_str()));
        if let Some(count) = counts.get_mut(&id).filter(|c| **c > 0) {
            *count -= 1;
            common += 1;
        }
    }
    common
}

/// Whether every pair of mapped source nodes is bonded exactly when its
/// images are.
pub fn is_induced(source: &LabeledGraph, target: &LabeledGraph, mapping: &AtomAtomMapping) -> bool {
    let pairs = mapping.pairs();
    pairs.iter().enumerate().all(|(k, &(a, x))| {
        pairs[k + 1..]
            .iter()
            .all(|&(b, y)| source.has_edge(a, b) == target.has_edge(x, y))
    })
}
