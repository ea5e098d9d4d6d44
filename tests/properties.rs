use std::collections::HashSet;

use crabmap::{
    find_mcs, Algorithm, AtomAtomMapping, BondOrder, DefaultMatcher, GraphEdge, GraphNode,
    LabeledGraph, MatchMode, MatcherConfig, McsOptions, Vf2,
};
use proptest::prelude::*;

fn build(labels: &[u8], bonds: &[u8]) -> LabeledGraph {
    let n = labels.len();
    let nodes = labels.iter().map(|&z| GraphNode::element(z)).collect();
    let mut edges = Vec::new();
    let mut k = 0;
    for a in 0..n {
        for b in (a + 1)..n {
            match bonds[k] {
                2 => edges.push((a, b, GraphEdge::new(BondOrder::Single))),
                3 => edges.push((a, b, GraphEdge::new(BondOrder::Double))),
                _ => {}
            }
            k += 1;
        }
    }
    LabeledGraph::from_parts(nodes, edges)
}

fn small_graph(max: usize) -> impl Strategy<Value = LabeledGraph> {
    (1..=max)
        .prop_flat_map(|n| {
            (
                prop::collection::vec(prop::sample::select(vec![6u8, 7, 8]), n),
                prop::collection::vec(0u8..4, n * (n - 1) / 2),
            )
        })
        .prop_map(|(labels, bonds)| build(&labels, &bonds))
}

fn order(g: &LabeledGraph, a: usize, b: usize) -> Option<BondOrder> {
    g.edge(a, b).map(|e| e.order)
}

fn pair_fits(
    source: &LabeledGraph,
    target: &LabeledGraph,
    mapped: &[(usize, usize)],
    (i, j): (usize, usize),
) -> bool {
    source.node(i).label == target.node(j).label
        && mapped
            .iter()
            .all(|&(k, l)| order(source, i, k) == order(target, j, l))
}

fn brute_force(source: &LabeledGraph, target: &LabeledGraph) -> usize {
    fn go(
        source: &LabeledGraph,
        target: &LabeledGraph,
        i: usize,
        mapped: &mut Vec<(usize, usize)>,
        used: &mut Vec<bool>,
    ) -> usize {
        if i == source.node_count() {
            return mapped.len();
        }
        let mut best = go(source, target, i + 1, mapped, used);
        for j in 0..target.node_count() {
            if used[j] || !pair_fits(source, target, mapped, (i, j)) {
                continue;
            }
            used[j] = true;
            mapped.push((i, j));
            best = best.max(go(source, target, i + 1, mapped, used));
            mapped.pop();
            used[j] = false;
        }
        best
    }
    go(source, target, 0, &mut Vec::new(), &mut vec![false; target.node_count()])
}

fn is_common_induced(source: &LabeledGraph, target: &LabeledGraph, m: &AtomAtomMapping) -> bool {
    let pairs = m.pairs();
    let targets: HashSet<usize> = pairs.iter().map(|&(_, t)| t).collect();
    targets.len() == pairs.len()
        && pairs
            .iter()
            .enumerate()
            .all(|(k, &p)| pair_fits(source, target, &pairs[..k], p))
}

fn options(algorithm: Algorithm) -> McsOptions {
    McsOptions {
        algorithm,
        iteration_weight: 1000,
        ..McsOptions::default()
    }
}

fn key_set(mappings: impl IntoIterator<Item = AtomAtomMapping>) -> HashSet<Vec<(usize, usize)>> {
    mappings.into_iter().map(|m| m.sorted_pairs()).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn mcs_mappings_are_common_induced(a in small_graph(6), b in small_graph(6)) {
        let result = find_mcs(&a, &b, options(Algorithm::Auto));
        let size = result.size();
        for m in &result.mappings {
            prop_assert_eq!(m.count(), size);
            prop_assert!(is_common_induced(&a, &b, m));
        }
    }

    #[test]
    fn engines_reach_brute_force_size(a in small_graph(5), b in small_graph(5)) {
        let expected = brute_force(&a, &b);
        for algorithm in [Algorithm::Auto, Algorithm::Vf2McGregor, Algorithm::McsPlus] {
            let result = find_mcs(&a, &b, options(algorithm));
            prop_assume!(!result.timeout);
            prop_assert_eq!(result.size(), expected, "{:?}", algorithm);
        }
    }

    #[test]
    fn self_match_counts_agree_across_modes(g in small_graph(5)) {
        let matcher = DefaultMatcher::new(MatcherConfig::default());
        let identical = Vf2::new(&g, &g, MatchMode::Identical, &matcher, &matcher).match_all();
        let subgraph = Vf2::new(&g, &g, MatchMode::Subgraph, &matcher, &matcher).match_all();
        prop_assert!(!identical.mappings.is_empty());
        prop_assert_eq!(key_set(identical.mappings), key_set(subgraph.mappings));
    }

    #[test]
    fn identical_match_implies_subgraph_match(a in small_graph(4), b in small_graph(4)) {
        let matcher = DefaultMatcher::new(MatcherConfig::default());
        if Vf2::new(&a, &b, MatchMode::Identical, &matcher, &matcher).has_match() {
            prop_assert!(Vf2::new(&a, &b, MatchMode::Subgraph, &matcher, &matcher).has_match());
        }
    }

    #[test]
    fn stream_yields_every_match(a in small_graph(4), b in small_graph(6)) {
        let matcher = DefaultMatcher::new(MatcherConfig::default());
        let vf2 = Vf2::new(&a, &b, MatchMode::Subgraph, &matcher, &matcher);
        let streamed = key_set(vf2.stream());
        prop_assert_eq!(streamed, key_set(vf2.match_all().mappings));
    }

    #[test]
    fn heuristic_accepts_every_induced_subgraph(
        g in small_graph(6),
        keep in prop::collection::vec(any::<bool>(), 6),
    ) {
        let kept: Vec<usize> = (0..g.node_count()).filter(|&i| keep[i]).collect();
        let nodes = kept.iter().map(|&i| g.node(i).clone()).collect();
        let mut edges = Vec::new();
        for (x, &a) in kept.iter().enumerate() {
            for (y, &b) in kept.iter().enumerate().skip(x + 1) {
                if let Some(edge) = g.edge(a, b) {
                    edges.push((x, y, *edge));
                }
            }
        }
        let sub = LabeledGraph::from_parts(nodes, edges);
        prop_assert!(crabmap::mcs::is_subgraph_heuristic(&sub, &g));
    }
}
