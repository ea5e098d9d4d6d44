use criterion::{black_box, criterion_group, criterion_main, Criterion};

use crabmap::{find_mcs, from_smiles, Algorithm, LabeledGraph, McsOptions, ReactionMapper};

fn graph(smiles: &str) -> LabeledGraph {
    LabeledGraph::from_mol(&from_smiles(smiles).unwrap())
}

fn bench_substructure(c: &mut Criterion) {
    let benzene = graph("c1ccccc1");
    let naphthalene = graph("c1ccc2ccccc2c1");

    c.bench_function("substructure_benzene_naphthalene", |b| {
        b.iter(|| black_box(find_mcs(&benzene, &naphthalene, McsOptions::default())))
    });
}

fn bench_engines(c: &mut Criterion) {
    let aspirin = graph("CC(=O)Oc1ccccc1C(=O)O");
    let salicylate = graph("OC(=O)c1ccccc1OC");

    for (name, algorithm) in [
        ("vf2_mcgregor_aspirin", Algorithm::Vf2McGregor),
        ("mcs_plus_aspirin", Algorithm::McsPlus),
    ] {
        let options = McsOptions {
            algorithm,
            ..McsOptions::default()
        };
        c.bench_function(name, |b| {
            b.iter(|| black_box(find_mcs(&aspirin, &salicylate, options)))
        });
    }
}

fn bench_reaction(c: &mut Criterion) {
    let educts = vec![graph("CC(=O)O"), graph("OCC")];
    let products = vec![graph("CC(=O)OCC"), graph("O")];
    let mapper = ReactionMapper::default();

    c.bench_function("reaction_esterification", |b| {
        b.iter(|| black_box(mapper.map(&educts, &products).unwrap()))
    });
}

criterion_group!(benches, bench_substructure, bench_engines, bench_reaction);
criterion_main!(benches);
