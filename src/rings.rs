use std::collections::VecDeque;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::mol::Mol;

/// Ring membership of atoms and bonds.
///
/// A bond is a ring bond iff it is not a bridge. The smallest ring through
/// an atom is the shortest cycle closed by one of its ring bonds.
#[derive(Debug, Clone)]
pub struct RingInfo {
    ring_bonds: Vec<bool>,
    smallest: Vec<Option<usize>>,
}

impl RingInfo {
    pub fn perceive<A, B>(mol: &Mol<A, B>) -> Self {
        let adjacency = adjacency_with_edges(mol);
        let ring_bonds: Vec<bool> = find_bridges(&adjacency, mol.bond_count())
            .into_iter()
            .map(|is_bridge| !is_bridge)
            .collect();

        let smallest = (0..mol.atom_count())
            .map(|a| smallest_ring_through(&adjacency, &ring_bonds, a))
            .collect();

        Self {
            ring_bonds,
            smallest,
        }
    }

    pub fn is_ring_bond(&self, bond: EdgeIndex) -> bool {
        self.ring_bonds.get(bond.index()).copied().unwrap_or(false)
    }

    pub fn is_ring_atom(&self, atom: NodeIndex) -> bool {
        self.smallest_ring_size(atom).is_some()
    }

    pub fn smallest_ring_size(&self, atom: NodeIndex) -> Option<usize> {
        self.smallest.get(atom.index()).copied().flatten()
    }

    pub fn num_ring_bonds(&self) -> usize {
        self.ring_bonds.iter().filter(|&&r| r).count()
    }
}

fn adjacency_with_edges<A, B>(mol: &Mol<A, B>) -> Vec<Vec<(usize, usize)>> {
    let mut adjacency = vec![Vec::new(); mol.atom_count()];
    for bond in mol.bonds() {
        if let Some((a, b)) = mol.bond_endpoints(bond) {
            adjacency[a.index()].push((b.index(), bond.index()));
            adjacency[b.index()].push((a.index(), bond.index()));
        }
    }
    adjacency
}

// Iterative Tarjan lowlink; recursion depth would otherwise equal chain length.
fn find_bridges(adjacency: &[Vec<(usize, usize)>], edge_count: usize) -> Vec<bool> {
    let n = adjacency.len();
    let mut disc = vec![usize::MAX; n];
    let mut low = vec![0usize; n];
    let mut is_bridge = vec![false; edge_count];
    let mut timer = 0usize;

    for root in 0..n {
        if disc[root] != usize::MAX {
            continue;
        }
        disc[root] = timer;
        low[root] = timer;
        timer += 1;
        let mut stack: Vec<(usize, usize, usize)> = vec![(root, usize::MAX, 0)];

        while let Some(top) = stack.last_mut() {
            let (v, parent_edge) = (top.0, top.1);
            if top.2 < adjacency[v].len() {
                let (w, e) = adjacency[v][top.2];
                top.2 += 1;
                if e == parent_edge {
                    continue;
                }
                if disc[w] == usize::MAX {
                    disc[w] = timer;
                    low[w] = timer;
                    timer += 1;
                    stack.push((w, e, 0));
                } else {
                    low[v] = low[v].min(disc[w]);
                }
            } else {
                stack.pop();
                if let Some(&(p, _, _)) = stack.last() {
                    low[p] = low[p].min(low[v]);
                    if low[v] > disc[p] {
                        is_bridge[parent_edge] = true;
                    }
                }
            }
        }
    }

    is_bridge
}

fn smallest_ring_through(
    adjacency: &[Vec<(usize, usize)>],
    ring_bonds: &[bool],
    atom: usize,
) -> Option<usize> {
    adjacency[atom]
        .iter()
        .filter(|&&(_, e)| ring_bonds[e])
        .filter_map(|&(other, e)| ring_path_length(adjacency, ring_bonds, other, atom, e))
        .map(|len| len + 1)
        .min()
}

// Shortest path from `from` to `to` over ring bonds, skipping `skip_edge`.
fn ring_path_length(
    adjacency: &[Vec<(usize, usize)>],
    ring_bonds: &[bool],
    from: usize,
    to: usize,
    skip_edge: usize,
) -> Option<usize> {
    let mut dist = vec![usize::MAX; adjacency.len()];
    dist[from] = 0;
    let mut queue = VecDeque::from([from]);
    while let Some(current) = queue.pop_front() {
        if current == to {
            return Some(dist[current]);
        }
        for &(next, e) in &adjacency[current] {
            if e == skip_edge || !ring_bonds[e] || dist[next] != usize::MAX {
                continue;
            }
            dist[next] = dist[current] + 1;
            queue.push_back(next);
        }
    }
    None
}
