use bit_set::BitSet;

use crate::clique::compat::CompatibilityGraph;
use crate::timeout::IterationManager;

/// Maximum cliques kept before ties stop being enumerated.
pub const TIED_CLIQUE_LIMIT: usize = 32;

/// All maximum cliques found over the c-edges, as sorted id lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliqueSearch {
    pub cliques: Vec<Vec<usize>>,
    pub timeout: bool,
}

/// Bron-Kerbosch with Tomita pivoting, enumerating the cliques of maximum
/// size. Branches that cannot reach the best size seen so far are pruned;
/// once [`TIED_CLIQUE_LIMIT`] cliques of that size are held, branches that
/// can only tie it are pruned as well.
pub fn maximum_cliques(graph: &CompatibilityGraph, iterations: &mut IterationManager) -> CliqueSearch {
    let n = graph.node_count();
    if n == 0 {
        return CliqueSearch {
            cliques: vec![Vec::new()],
            timeout: false,
        };
    }
    let mut search = Search {
        graph,
        iterations,
        best: 0,
        cliques: Vec::new(),
        timeout: false,
    };
    let candidates: BitSet = (0..n).collect();
    search.expand(&mut Vec::new(), candidates, BitSet::with_capacity(n));

    let cliques = search
        .cliques
        .into_iter()
        .map(|clique| {
            let mut ids: Vec<usize> = clique.into_iter().map(|i| i + 1).collect();
            ids.sort_unstable();
            ids
        })
        .collect();
    CliqueSearch {
        cliques,
        timeout: search.timeout,
    }
}

struct Search<'a> {
    graph: &'a CompatibilityGraph,
    iterations: &'a mut IterationManager,
    best: usize,
    cliques: Vec<Vec<usize>>,
    timeout: bool,
}

impl Search<'_> {
    fn expand(&mut self, clique: &mut Vec<usize>, mut candidates: BitSet, mut excluded: BitSet) {
        if self.timeout {
            return;
        }
        if self.iterations.is_max_iteration() {
            self.timeout = true;
            return;
        }
        self.iterations.increment();

        if candidates.is_empty() {
            // a clique with an excluded extension is not maximal, so it
            // cannot be maximum either
            if excluded.is_empty() {
                self.report(clique);
            }
            return;
        }
        if self.cannot_improve(clique.len() + candidates.len()) {
            return;
        }

        let pivot = candidates
            .iter()
            .chain(excluded.iter())
            .max_by_key(|&u| candidates.intersection(self.graph.c_neighbors(u)).count())
            .unwrap_or(0);
        let mut branch = candidates.clone();
        branch.difference_with(self.graph.c_neighbors(pivot));

        for v in branch.iter() {
            let neighbors = self.graph.c_neighbors(v);
            let mut next_candidates = candidates.clone();
            next_candidates.intersect_with(neighbors);
            let mut next_excluded = excluded.clone();
            next_excluded.intersect_with(neighbors);

            clique.push(v);
            self.expand(clique, next_candidates, next_excluded);
            clique.pop();
            if self.timeout {
                return;
            }

            candidates.remove(v);
            excluded.insert(v);
            if self.cannot_improve(clique.len() + candidates.len()) {
                return;
            }
        }
    }

    fn cannot_improve(&self, reach: usize) -> bool {
        if self.cliques.len() >= TIED_CLIQUE_LIMIT {
            reach <= self.best
        } else {
            reach < self.best
        }
    }

    fn report(&mut self, clique: &[usize]) {
        if clique.len() > self.best {
            self.best = clique.len();
            self.cliques.clear();
        }
        if clique.len() == self.best && self.cliques.len() < TIED_CLIQUE_LIMIT {
            self.cliques.push(clique.to_vec());
        }
    }
}
