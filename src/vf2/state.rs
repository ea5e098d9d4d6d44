use crate::graph::LabeledGraph;
use crate::mapping::AtomAtomMapping;
use crate::matcher::{AtomMatcher, BondMatcher};
use crate::vf2::MatchMode;

/// Partial mapping plus VF2 terminal-set bookkeeping.
///
/// `term_source[i]` is the depth at which source node `i` entered
/// `M ∪ T` (mapped or adjacent to a mapped node), `0` if it has not.
/// Backtracking clears exactly the entries set at the current depth, so a
/// frontier node reached along several paths keeps its original depth.
#[derive(Debug, Clone)]
pub struct State<'g> {
    source: &'g LabeledGraph,
    target: &'g LabeledGraph,
    mode: MatchMode,
    core_source: Vec<Option<usize>>,
    core_target: Vec<Option<usize>>,
    term_source: Vec<usize>,
    term_target: Vec<usize>,
    // nodes with a non-zero terminal entry, mapped ones included
    term_source_len: usize,
    term_target_len: usize,
    order: Vec<(usize, usize)>,
}

impl<'g> State<'g> {
    pub fn new(source: &'g LabeledGraph, target: &'g LabeledGraph, mode: MatchMode) -> Self {
        Self {
            source,
            target,
            mode,
            core_source: vec![None; source.node_count()],
            core_target: vec![None; target.node_count()],
            term_source: vec![0; source.node_count()],
            term_target: vec![0; target.node_count()],
            term_source_len: 0,
            term_target_len: 0,
            order: Vec::with_capacity(source.node_count()),
        }
    }

    pub fn depth(&self) -> usize {
        self.order.len()
    }

    pub fn is_goal(&self) -> bool {
        self.depth() == self.source.node_count()
    }

    pub fn source_of(&self, target: usize) -> Option<usize> {
        self.core_target[target]
    }

    pub fn target_of(&self, source: usize) -> Option<usize> {
        self.core_source[source]
    }

    pub fn mapping(&self) -> AtomAtomMapping {
        AtomAtomMapping::from_pairs(self.order.iter().copied())
    }

    fn unmapped_terminal_source(&self) -> usize {
        self.term_source_len - self.depth()
    }

    fn unmapped_terminal_target(&self) -> usize {
        self.term_target_len - self.depth()
    }

    /// Source node to extend next, and whether its target candidates are
    /// restricted to the target terminal set.
    pub fn next_source(&self) -> Option<(usize, bool)> {
        let use_terminal = self.depth() > 0
            && self.unmapped_terminal_source() > 0
            && self.unmapped_terminal_target() > 0;
        (0..self.core_source.len())
            .find(|&i| self.core_source[i].is_none() && (!use_terminal || self.term_source[i] > 0))
            .map(|n| (n, use_terminal))
    }

    /// First unmapped target candidate strictly after `after`.
    pub fn next_target(&self, terminal_only: bool, after: Option<usize>) -> Option<usize> {
        let start = after.map_or(0, |m| m + 1);
        (start..self.core_target.len()).find(|&m| {
            self.core_target[m].is_none() && (!terminal_only || self.term_target[m] > 0)
        })
    }

    pub fn is_feasible<A, B>(&self, n: usize, m: usize, atoms: &A, bonds: &B) -> bool
    where
        A: AtomMatcher + ?Sized,
        B: BondMatcher + ?Sized,
    {
        if !atoms.atoms_compatible(self.source.node(n), self.target.node(m)) {
            return false;
        }

        let mut term_n = 0usize;
        let mut new_n = 0usize;
        for &nb in self.source.neighbors(n) {
            match self.core_source[nb] {
                Some(mb) => {
                    if !self.target.has_edge(m, mb)
                        || !bonds.bonds_compatible(self.source, (n, nb), self.target, (m, mb))
                    {
                        return false;
                    }
                }
                None if self.term_source[nb] > 0 => term_n += 1,
                None => new_n += 1,
            }
        }

        let mut term_m = 0usize;
        let mut new_m = 0usize;
        for &mb in self.target.neighbors(m) {
            match self.core_target[mb] {
                Some(nb) => {
                    if self.mode == MatchMode::Identical && !self.source.has_edge(n, nb) {
                        return false;
                    }
                }
                None if self.term_target[mb] > 0 => term_m += 1,
                None => new_m += 1,
            }
        }

        match self.mode {
            // a new source neighbour may still land on a frontier target node,
            // so the second look-ahead compares all unmapped neighbours
            MatchMode::Subgraph => term_n <= term_m && term_n + new_n <= term_m + new_m,
            MatchMode::Identical => term_n == term_m && new_n == new_m,
        }
    }

    pub fn add_pair(&mut self, n: usize, m: usize) {
        self.order.push((n, m));
        let depth = self.depth();
        self.core_source[n] = Some(m);
        self.core_target[m] = Some(n);

        mark(&mut self.term_source, &mut self.term_source_len, n, depth);
        for &nb in self.source.neighbors(n) {
            mark(&mut self.term_source, &mut self.term_source_len, nb, depth);
        }
        mark(&mut self.term_target, &mut self.term_target_len, m, depth);
        for &mb in self.target.neighbors(m) {
            mark(&mut self.term_target, &mut self.term_target_len, mb, depth);
        }
    }

    pub fn backtrack(&mut self, n: usize, m: usize) {
        debug_assert_eq!(self.order.last(), Some(&(n, m)), "backtrack out of order");
        let depth = self.depth();

        for &nb in self.source.neighbors(n) {
            unmark(&mut self.term_source, &mut self.term_source_len, nb, depth);
        }
        unmark(&mut self.term_source, &mut self.term_source_len, n, depth);
        for &mb in self.target.neighbors(m) {
            unmark(&mut self.term_target, &mut self.term_target_len, mb, depth);
        }
        unmark(&mut self.term_target, &mut self.term_target_len, m, depth);

        self.core_source[n] = None;
        self.core_target[m] = None;
        self.order.pop();
    }
}

fn mark(term: &mut [usize], len: &mut usize, i: usize, depth: usize) {
    if term[i] == 0 {
        term[i] = depth;
        *len += 1;
    }
}

fn unmark(term: &mut [usize], len: &mut usize, i: usize, depth: usize) {
    if term[i] == depth {
        term[i] = 0;
        *len -= 1;
    }
}
