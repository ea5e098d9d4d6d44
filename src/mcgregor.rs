//! McGregor-style extension of seed mappings to maximum common induced
//! subgraphs.
//!
//! The search is an exact branch and bound over source atoms. Each atom is
//! either paired with one of its remaining candidate targets or left out.
//! Seeds only steer the order in which branches are tried, so a good seed
//! finds a large mapping early and tightens the bound; they never restrict
//! the result. A search that runs out of iterations returns the best
//! mappings found so far, which are always at least as large as the largest
//! consistent seed.

use bit_set::BitSet;
use tracing::{debug, trace};

use crate::aggregate::{BestHits, SearchOutcome};
use crate::graph::LabeledGraph;
use crate::mapping::{AtomAtomMapping, Orientation};
use crate::matcher::{AtomMatcher, BondMatcher};
use crate::timeout::IterationManager;

pub struct McGregor<'g, A: ?Sized, B: ?Sized> {
    source: &'g LabeledGraph,
    target: &'g LabeledGraph,
    atoms: &'g A,
    bonds: &'g B,
}

impl<'g, A, B> McGregor<'g, A, B>
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
        }
    }

    /// Whether `(s1, t1)` and `(s2, t2)` can both be in one induced common
    /// subgraph: distinct atoms on both sides, and either no bond on either
    /// side or compatible bonds on both.
    pub fn pairs_consistent(&self, (s1, t1): (usize, usize), (s2, t2): (usize, usize)) -> bool {
        if s1 == s2 || t1 == t2 {
            return false;
        }
        let source_bonded = self.source.has_edge(s1, s2);
        if source_bonded != self.target.has_edge(t1, t2) {
            return false;
        }
        !source_bonded || self.bonds.bonds_compatible(self.source, (s1, s2), self.target, (t1, t2))
    }

    /// Keep the seed pairs, in order, that are in range, atom-compatible,
    /// and consistent with every pair kept before them.
    pub fn filter_seed(&self, seed: &AtomAtomMapping, orientation: Orientation) -> AtomAtomMapping {
        let seed = orientation.normalize(seed);
        let mut kept = AtomAtomMapping::new();
        for (s, t) in seed.iter() {
            if s >= self.source.node_count() || t >= self.target.node_count() {
                continue;
            }
            if !self.atoms.atoms_compatible(self.source.node(s), self.target.node(t)) {
                continue;
            }
            if kept.iter().all(|pair| self.pairs_consistent(pair, (s, t))) {
                kept.insert(s, t);
            }
        }
        kept
    }

    /// All maximum common induced mappings, searched with the largest
    /// consistent seed as a guide.
    pub fn extend(
        &self,
        seeds: &[AtomAtomMapping],
        orientation: Orientation,
        iterations: &mut IterationManager,
    ) -> SearchOutcome {
        let mut hits = BestHits::new();
        let mut guide = AtomAtomMapping::new();
        for seed in seeds {
            let filtered = self.filter_seed(seed, orientation);
            if filtered.count() < seed.count() {
                trace!(
                    seed = seed.count(),
                    kept = filtered.count(),
                    "dropped inconsistent seed pairs"
                );
            }
            if filtered.count() > guide.count() {
                guide = filtered.clone();
            }
            hits.offer(filtered);
        }

        let mut search = Search::new(self, &guide, hits, iterations);
        search.branch();
        if search.timeout {
            debug!(
                best = search.hits.best_size(),
                limit = search.iterations.limit(),
                "mcgregor search hit its iteration limit"
            );
        }
        SearchOutcome {
            mappings: search.hits.into_vec(),
            timeout: search.timeout,
        }
    }
}

struct Search<'s, 'g, A: ?Sized, B: ?Sized> {
    engine: &'s McGregor<'g, A, B>,
    domains: Vec<Vec<usize>>,
    mapped: Vec<Option<usize>>,
    decided: Vec<bool>,
    order: Vec<(usize, usize)>,
    seed_order: Vec<usize>,
    seed_target: Vec<Option<usize>>,
    hits: BestHits,
    iterations: &'s mut IterationManager,
    timeout: bool,
}

impl<'s, 'g, A, B> Search<'s, 'g, A, B>
where
    A: AtomMatcher + ?Sized,
    B: BondMatcher + ?Sized,
{
    fn new(
        engine: &'s McGregor<'g, A, B>,
        guide: &AtomAtomMapping,
        hits: BestHits,
        iterations: &'s mut IterationManager,
    ) -> Self {
        let (n, m) = (engine.source.node_count(), engine.target.node_count());
        let domains = (0..n)
            .map(|s| {
                (0..m)
                    .filter(|&t| {
                        engine
                            .atoms
                            .atoms_compatible(engine.source.node(s), engine.target.node(t))
                    })
                    .collect()
            })
            .collect();
        let mut seed_target = vec![None; n];
        for (s, t) in guide.iter() {
            seed_target[s] = Some(t);
        }
        Self {
            engine,
            domains,
            mapped: vec![None; n],
            decided: vec![false; n],
            order: Vec::with_capacity(n),
            seed_order: guide.iter().map(|(s, _)| s).collect(),
            seed_target,
            hits,
            iterations,
            timeout: false,
        }
    }

    fn open(&self, s: usize) -> bool {
        !self.decided[s] && !self.domains[s].is_empty()
    }

    /// Seed atoms first, then atoms next to the mapped region, then the atom
    /// with the fewest candidates.
    fn pick(&self) -> Option<usize> {
        let seeded = self.seed_order.iter().copied().find(|&s| {
            self.open(s) && self.seed_target[s].is_some_and(|t| self.domains[s].contains(&t))
        });
        if seeded.is_some() {
            return seeded;
        }
        let source = self.engine.source;
        let frontier = (0..self.domains.len())
            .filter(|&s| self.open(s))
            .filter(|&s| source.neighbors(s).iter().any(|&nb| self.mapped[nb].is_some()))
            .min_by_key(|&s| self.domains[s].len());
        if frontier.is_some() {
            return frontier;
        }
        (0..self.domains.len())
            .filter(|&s| self.open(s))
            .min_by_key(|&s| self.domains[s].len())
    }

    /// Upper bound on the pairs still addable.
    fn bound(&self) -> usize {
        let mut atoms = 0;
        let mut targets = BitSet::new();
        for s in (0..self.domains.len()).filter(|&s| self.open(s)) {
            atoms += 1;
            targets.extend(self.domains[s].iter().copied());
        }
        atoms.min(targets.len())
    }

    fn ordered_targets(&self, s: usize) -> Vec<usize> {
        let target = self.engine.target;
        let seed = self.seed_target[s];
        let mut targets = self.domains[s].clone();
        targets.sort_by_key(|&t| {
            let rank = if Some(t) == seed {
                0
            } else if target
                .neighbors(t)
                .iter()
                .any(|&nb| self.order.iter().any(|&(_, mt)| mt == nb))
            {
                1
            } else {
                2
            };
            (rank, t)
        });
        targets
    }

    fn branch(&mut self) {
        if self.timeout {
            return;
        }
        if self.iterations.is_max_iteration() {
            self.timeout = true;
            return;
        }
        self.iterations.increment();

        let Some(s) = self.pick() else {
            self.hits.offer(AtomAtomMapping::from_pairs(self.order.iter().copied()));
            return;
        };
        if self.order.len() + self.bound() < self.hits.best_size() {
            return;
        }

        self.decided[s] = true;
        for t in self.ordered_targets(s) {
            let saved = self.include(s, t);
            self.branch();
            self.exclude(s, saved);
            if self.timeout {
                break;
            }
        }
        if !self.timeout {
            // leave s unmapped
            self.branch();
        }
        self.decided[s] = false;
    }

    /// Map `s` to `t` and narrow every open domain; returns the domains it
    /// replaced.
    fn include(&mut self, s: usize, t: usize) -> Vec<(usize, Vec<usize>)> {
        self.mapped[s] = Some(t);
        self.order.push((s, t));
        let mut saved = Vec::new();
        for other in 0..self.domains.len() {
            if !self.open(other) {
                continue;
            }
            let narrowed: Vec<usize> = self.domains[other]
                .iter()
                .copied()
                .filter(|&ot| self.engine.pairs_consistent((other, ot), (s, t)))
                .collect();
            if narrowed.len() != self.domains[other].len() {
                saved.push((other, std::mem::replace(&mut self.domains[other], narrowed)));
            }
        }
        saved
    }

    fn exclude(&mut self, s: usize, saved: Vec<(usize, Vec<usize>)>) {
        for (other, domain) in saved {
            self.domains[other] = domain;
        }
        self.order.pop();
        self.mapped[s] = None;
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

    fn extend(source: &str, target: &str, seeds: &[AtomAtomMapping]) -> SearchOutcome {
        let (source, target) = (graph(source), graph(target));
        let matcher = DefaultMatcher::new(MatcherConfig::default());
        McGregor::new(&source, &target, &matcher, &matcher).extend(
            seeds,
            Orientation::SourceKeyed,
            &mut IterationManager::unbounded(),
        )
    }

    #[test]
    fn extends_a_single_pair_to_the_ring() {
        let seed = AtomAtomMapping::from_pairs([(0, 1)]);
        let outcome = extend("c1ccccc1", "Oc1ccccc1", &[seed]);
        assert!(!outcome.timeout);
        assert_eq!(outcome.mappings.len(), 12);
        assert!(outcome.mappings.iter().all(|m| m.count() == 6));
    }

    #[test]
    fn seed_order_comes_first() {
        let seed = AtomAtomMapping::from_pairs([(2, 2), (1, 1)]);
        let outcome = extend("CCO", "CCO", &[seed]);
        assert_eq!(outcome.mappings.len(), 1);
        assert_eq!(outcome.mappings[0].pairs(), vec![(2, 2), (1, 1), (0, 0)]);
    }

    #[test]
    fn inconsistent_seed_pairs_are_dropped() {
        let source = graph("CCC");
        let target = graph("CCCC");
        let matcher = DefaultMatcher::new(MatcherConfig::default());
        let engine = McGregor::new(&source, &target, &matcher, &matcher);
        // (7, 2) is out of range; (1, 1) is bonded to source 2 but target 1
        // is not bonded to target 3
        let seed = AtomAtomMapping::from_pairs([(0, 0), (2, 3), (7, 2), (1, 1)]);
        let kept = engine.filter_seed(&seed, Orientation::SourceKeyed);
        assert_eq!(kept.pairs(), vec![(0, 0), (2, 3)]);
    }

    #[test]
    fn target_keyed_seed_is_inverted() {
        let source = graph("CCN");
        let target = graph("NCC");
        let matcher = DefaultMatcher::new(MatcherConfig::default());
        let engine = McGregor::new(&source, &target, &matcher, &matcher);
        // keyed by target index: target 0 (N) <- source 2 (N)
        let seed = AtomAtomMapping::from_pairs([(0, 2)]);
        let kept = engine.filter_seed(&seed, Orientation::TargetKeyed);
        assert_eq!(kept.pairs(), vec![(2, 0)]);
    }

    #[test]
    fn result_is_induced() {
        // the propane path cannot be mapped onto all of cyclopropane
        let outcome = extend("CCC", "C1CC1", &[]);
        assert!(outcome.mappings.iter().all(|m| m.count() == 2));
    }

    #[test]
    fn works_without_seeds_and_empty_graphs() {
        let outcome = extend("CC=O", "CC=O", &[]);
        assert_eq!(outcome.mappings.len(), 1);
        assert_eq!(outcome.mappings[0].count(), 3);

        let empty = LabeledGraph::from_parts(Vec::new(), std::iter::empty());
        let target = graph("C");
        let matcher = DefaultMatcher::new(MatcherConfig::default());
        let outcome = McGregor::new(&empty, &target, &matcher, &matcher).extend(
            &[],
            Orientation::SourceKeyed,
            &mut IterationManager::unbounded(),
        );
        assert_eq!(outcome.mappings, vec![AtomAtomMapping::new()]);
    }

    #[test]
    fn timeout_keeps_the_seed() {
        let (source, target) = (graph("C1CCCCCC1"), graph("C1CCCCCC1"));
        let matcher = DefaultMatcher::new(MatcherConfig::default());
        let seed = AtomAtomMapping::from_pairs([(0, 0), (1, 1)]);
        let outcome = McGregor::new(&source, &target, &matcher, &matcher).extend(
            &[seed.clone()],
            Orientation::SourceKeyed,
            &mut IterationManager::new(1),
        );
        assert!(outcome.timeout);
        assert!(outcome.mappings.iter().all(|m| m.count() >= 2));
    }
}
