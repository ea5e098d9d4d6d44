//! VF2 subgraph and graph isomorphism.
//!
//! [`Vf2`] maps every node of the source graph into the target graph. In
//! [`MatchMode::Subgraph`] source edges must be preserved (a monomorphism);
//! in [`MatchMode::Identical`] the graphs must have equal size and edges
//! must correspond in both directions.
//!
//! Three drivers share one [`State`]: the recursive
//! [`match_first`](Vf2::match_first)/[`match_all`](Vf2::match_all), the
//! explicit-stack [`Vf2Stream`] iterator, and
//! [`largest_partials`](Vf2::largest_partials), which keeps the deepest
//! partial states reached and hands them to McGregor as seeds.

mod state;
mod stream;

use std::collections::HashSet;
use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::{BestHits, SearchOutcome};
use crate::graph::LabeledGraph;
use crate::mapping::AtomAtomMapping;
use crate::matcher::{AtomMatcher, BondMatcher};
use crate::timeout::IterationManager;

pub use state::State;
pub use stream::Vf2Stream;

/// Partial mappings retained per depth by [`Vf2::largest_partials`].
pub const PARTIAL_SEED_LIMIT: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatchMode {
    #[default]
    Subgraph,
    Identical,
}

pub struct Vf2<'g, A: ?Sized, B: ?Sized> {
    source: &'g LabeledGraph,
    target: &'g LabeledGraph,
    mode: MatchMode,
    atoms: &'g A,
    bonds: &'g B,
    iteration_limit: Option<usize>,
}

impl<'g, A, B> Vf2<'g, A, B>
where
    A: AtomMatcher + ?Sized,
    B: BondMatcher + ?Sized,
{
    pub fn new(
        source: &'g LabeledGraph,
        target: &'g LabeledGraph,
        mode: MatchMode,
        atoms: &'g A,
        bonds: &'g B,
    ) -> Self {
        Self {
            source,
            target,
            mode,
            atoms,
            bonds,
            iteration_limit: None,
        }
    }

    /// Stop after `limit` state expansions. Searches cut short report
    /// `timeout` and return whatever they had found.
    pub fn with_iteration_limit(mut self, limit: usize) -> Self {
        self.iteration_limit = Some(limit);
        self
    }

    pub fn source(&self) -> &'g LabeledGraph {
        self.source
    }

    pub fn target(&self) -> &'g LabeledGraph {
        self.target
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// No complete mapping can exist: the size constraint fails, or some
    /// source node has no compatible target node at all.
    pub fn is_dead(&self) -> bool {
        let (n, m) = (self.source.node_count(), self.target.node_count());
        let size_ok = match self.mode {
            MatchMode::Subgraph => n <= m,
            MatchMode::Identical => n == m,
        };
        if !size_ok {
            return true;
        }
        (0..n).any(|s| {
            let node = self.source.node(s);
            !(0..m).any(|t| self.atoms.atoms_compatible(node, self.target.node(t)))
        })
    }

    pub fn has_match(&self) -> bool {
        self.match_first().is_some()
    }

    pub fn match_first(&self) -> Option<AtomAtomMapping> {
        self.run(Collect::First).mappings.into_iter().next()
    }

    pub fn match_all(&self) -> SearchOutcome {
        self.run(Collect::All)
    }

    /// Deepest partial mappings reached, at most [`PARTIAL_SEED_LIMIT`] of
    /// them. Complete mappings count as partials of full depth.
    pub fn largest_partials(&self) -> SearchOutcome {
        self.run(Collect::Partials)
    }

    pub fn stream(&self) -> Vf2Stream<'_, 'g, A, B> {
        Vf2Stream::new(self)
    }

    pub(crate) fn iterations(&self) -> IterationManager {
        self.iteration_limit
            .map_or_else(IterationManager::unbounded, IterationManager::new)
    }

    pub(crate) fn atoms(&self) -> &'g A {
        self.atoms
    }

    pub(crate) fn bonds(&self) -> &'g B {
        self.bonds
    }

    fn run(&self, collect: Collect) -> SearchOutcome {
        // the partial driver still makes progress on graphs with no
        // complete mapping
        if collect != Collect::Partials && self.is_dead() {
            return SearchOutcome::default();
        }
        let mut sink = Sink {
            collect,
            found: Vec::new(),
            seen: HashSet::new(),
            partials: BestHits::new(),
            iterations: self.iterations(),
            timeout: false,
            goal_depth: self.source.node_count(),
        };
        let mut state = State::new(self.source, self.target, self.mode);
        if state.is_goal() {
            // empty source: the empty mapping is the only embedding
            sink.found.push(state.mapping());
            sink.partials.offer(state.mapping());
        } else {
            let _ = self.explore(&mut state, &mut sink);
        }
        if sink.timeout {
            debug!(
                iterations = sink.iterations.counter(),
                found = sink.found.len(),
                "vf2 search hit its iteration limit"
            );
        }
        let mappings = match collect {
            Collect::Partials => sink.partials.into_vec(),
            _ => sink.found,
        };
        SearchOutcome {
            mappings,
            timeout: sink.timeout,
        }
    }

    fn explore(&self, state: &mut State<'g>, sink: &mut Sink) -> ControlFlow<()> {
        if sink.iterations.is_max_iteration() {
            sink.timeout = true;
            return ControlFlow::Break(());
        }
        sink.iterations.increment();

        if state.is_goal() {
            return sink.record_goal(state);
        }
        let Some((n, terminal_only)) = state.next_source() else {
            return ControlFlow::Continue(());
        };

        let mut candidate = state.next_target(terminal_only, None);
        while let Some(m) = candidate {
            if state.is_feasible(n, m, self.atoms, self.bonds) {
                state.add_pair(n, m);
                let mut flow = sink.record_partial(state);
                if flow.is_continue() {
                    flow = self.explore(state, sink);
                }
                state.backtrack(n, m);
                if flow.is_break() {
                    return flow;
                }
            }
            candidate = state.next_target(terminal_only, Some(m));
        }
        ControlFlow::Continue(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collect {
    First,
    All,
    Partials,
}

struct Sink {
    collect: Collect,
    found: Vec<AtomAtomMapping>,
    seen: HashSet<Vec<(usize, usize)>>,
    partials: BestHits,
    iterations: IterationManager,
    timeout: bool,
    goal_depth: usize,
}

impl Sink {
    fn record_goal(&mut self, state: &State<'_>) -> ControlFlow<()> {
        match self.collect {
            Collect::First => {
                self.found.push(state.mapping());
                ControlFlow::Break(())
            }
            Collect::All => {
                let mapping = state.mapping();
                if self.seen.insert(mapping.sorted_pairs()) {
                    self.found.push(mapping);
                }
                ControlFlow::Continue(())
            }
            Collect::Partials => ControlFlow::Continue(()),
        }
    }

    fn record_partial(&mut self, state: &State<'_>) -> ControlFlow<()> {
        if self.collect != Collect::Partials {
            return ControlFlow::Continue(());
        }
        let depth = state.depth();
        let best = self.partials.best_size();
        if depth > best || (depth == best && self.partials.len() < PARTIAL_SEED_LIMIT) {
            self.partials.offer(state.mapping());
        }
        if depth == self.goal_depth && self.partials.len() >= PARTIAL_SEED_LIMIT {
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{AnyBond, DefaultMatcher, MatcherConfig};
    use crate::smiles::from_smiles;

    fn graph(smiles: &str) -> LabeledGraph {
        LabeledGraph::from_mol(&from_smiles(smiles).unwrap())
    }

    fn matcher() -> DefaultMatcher {
        DefaultMatcher::new(MatcherConfig::default())
    }

    fn is_embedding(source: &LabeledGraph, target: &LabeledGraph, m: &AtomAtomMapping) -> bool {
        m.count() == source.node_count()
            && source.edge_pairs().iter().all(|&(a, b)| {
                matches!((m.get(a), m.get(b)), (Some(x), Some(y)) if target.has_edge(x, y))
            })
    }

    #[test]
    fn benzene_has_twelve_automorphisms() {
        let benzene = graph("c1ccccc1");
        let matcher = matcher();
        let vf2 = Vf2::new(&benzene, &benzene, MatchMode::Identical, &matcher, &matcher);
        let outcome = vf2.match_all();
        assert!(!outcome.timeout);
        assert_eq!(outcome.mappings.len(), 12);
    }

    #[test]
    fn ethane_in_propane() {
        let ethane = graph("CC");
        let propane = graph("CCC");
        let matcher = matcher();
        let vf2 = Vf2::new(&ethane, &propane, MatchMode::Subgraph, &matcher, &matcher);
        let all = vf2.match_all().mappings;
        // both directions along both bonds
        assert_eq!(all.len(), 4);
        assert!(all.iter().all(|m| is_embedding(&ethane, &propane, m)));
        assert!(vf2.has_match());
    }

    #[test]
    fn propane_vs_cyclopropane_depends_on_mode() {
        let propane = graph("CCC");
        let cyclopropane = graph("C1CC1");
        let matcher = matcher();

        let sub = Vf2::new(&propane, &cyclopropane, MatchMode::Subgraph, &matcher, &matcher);
        assert_eq!(sub.match_all().mappings.len(), 6);

        let iso = Vf2::new(&propane, &cyclopropane, MatchMode::Identical, &matcher, &matcher);
        assert!(!iso.is_dead());
        assert!(iso.match_first().is_none());
    }

    #[test]
    fn acetic_acid_is_identical_to_itself_once() {
        let acid = graph("CC(O)=O");
        let matcher = matcher();
        let vf2 = Vf2::new(&acid, &acid, MatchMode::Identical, &matcher, &matcher);
        let all = vf2.match_all().mappings;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].sorted_pairs(), vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn bond_order_blocks_match() {
        let ethene = graph("C=C");
        let ethane = graph("CC");
        let strict = matcher();
        let vf2 = Vf2::new(&ethene, &ethane, MatchMode::Subgraph, &strict, &strict);
        assert!(vf2.match_first().is_none());

        let weak = DefaultMatcher::new(MatcherConfig::atoms_only());
        let vf2 = Vf2::new(&ethene, &ethane, MatchMode::Subgraph, &weak, &AnyBond);
        assert!(vf2.match_first().is_some());
    }

    #[test]
    fn dead_states() {
        let matcher = matcher();
        let big = graph("CCCC");
        let small = graph("CCC");
        assert!(Vf2::new(&big, &small, MatchMode::Subgraph, &matcher, &matcher).is_dead());
        assert!(Vf2::new(&small, &big, MatchMode::Identical, &matcher, &matcher).is_dead());

        let nitrogen = graph("CN");
        assert!(Vf2::new(&nitrogen, &big, MatchMode::Subgraph, &matcher, &matcher).is_dead());
        assert!(Vf2::new(&nitrogen, &big, MatchMode::Subgraph, &matcher, &matcher)
            .match_all()
            .mappings
            .is_empty());
    }

    #[test]
    fn empty_source_maps_trivially() {
        let empty = LabeledGraph::from_parts(Vec::new(), std::iter::empty());
        let target = graph("CC");
        let matcher = matcher();
        let vf2 = Vf2::new(&empty, &target, MatchMode::Subgraph, &matcher, &matcher);
        let all = vf2.match_all().mappings;
        assert_eq!(all, vec![AtomAtomMapping::new()]);
    }

    #[test]
    fn stream_matches_recursive_driver() {
        let source = graph("CC(C)O");
        let target = graph("CC(C)(C)CO");
        let matcher = matcher();
        let vf2 = Vf2::new(&source, &target, MatchMode::Subgraph, &matcher, &matcher);
        let mut recursive: Vec<_> = vf2.match_all().mappings.iter().map(|m| m.sorted_pairs()).collect();
        let mut streamed: Vec<_> = vf2.stream().map(|m| m.sorted_pairs()).collect();
        recursive.sort();
        streamed.sort();
        assert!(!recursive.is_empty());
        assert_eq!(recursive, streamed);
    }

    #[test]
    fn stream_is_lazy() {
        let benzene = graph("c1ccccc1");
        let matcher = matcher();
        let vf2 = Vf2::new(&benzene, &benzene, MatchMode::Identical, &matcher, &matcher);
        let first_two: Vec<_> = vf2.stream().take(2).collect();
        assert_eq!(first_two.len(), 2);
        assert_ne!(first_two[0], first_two[1]);
    }

    #[test]
    fn partials_reach_largest_common_depth() {
        let source = graph("CCOC");
        let target = graph("CCCC");
        let weak = DefaultMatcher::new(MatcherConfig::atoms_only());
        let vf2 = Vf2::new(&source, &target, MatchMode::Subgraph, &weak, &AnyBond);
        let outcome = vf2.largest_partials();
        assert!(!outcome.mappings.is_empty());
        assert!(outcome.mappings.len() <= PARTIAL_SEED_LIMIT);
        // the oxygen has no counterpart and blocks the path to the last carbon
        assert!(outcome.mappings.iter().all(|m| m.count() == outcome.mappings[0].count()));
        assert_eq!(outcome.mappings[0].count(), 2);
    }

    #[test]
    fn iteration_limit_reports_timeout() {
        let source = graph("C1CCCCCCCC1");
        let target = graph("C1CCCCCCCC1");
        let matcher = matcher();
        let vf2 = Vf2::new(&source, &target, MatchMode::Identical, &matcher, &matcher)
            .with_iteration_limit(5);
        let outcome = vf2.match_all();
        assert!(outcome.timeout);
        assert!(outcome.mappings.len() < 18);
    }
}
