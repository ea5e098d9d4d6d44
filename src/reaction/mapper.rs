use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::graph::LabeledGraph;
use crate::mcs::{Algorithm, Mcs, McsOptions};
use crate::score::{
    rank_solutions, BondEnergyTable, BondStereoComparator, EnergyScorer, McsSolution, StereoScorer,
};

use super::error::ReactionError;
use super::winner::{choose_winners, tanimoto, SimilarityMatrix};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionOptions {
    pub mcs: McsOptions,
    /// Worker threads; `None` runs on the global rayon pool.
    pub threads: Option<usize>,
    /// Ignore bond orders when the reaction has one educt and one product.
    pub relax_single_pair: bool,
}

impl Default for ReactionOptions {
    fn default() -> Self {
        Self {
            mcs: McsOptions::default(),
            threads: None,
            relax_single_pair: true,
        }
    }
}

/// Ranked solutions of one educt/product pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairSolutions {
    pub query_position: usize,
    pub target_position: usize,
    pub algorithm: Algorithm,
    /// Best first; a single empty solution when the pair failed.
    pub solutions: Vec<McsSolution>,
}

impl PairSolutions {
    pub fn best(&self) -> Option<&McsSolution> {
        self.solutions.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionMapping {
    /// Row-major over educts × products.
    pub pairs: Vec<PairSolutions>,
    pub similarity: SimilarityMatrix,
    /// One solution per matched educt/product pair, in the order chosen.
    pub winners: Vec<McsSolution>,
}

impl ReactionMapping {
    pub fn pair(&self, educt: usize, product: usize) -> Option<&PairSolutions> {
        self.pairs
            .iter()
            .find(|p| p.query_position == educt && p.target_position == product)
    }
}

/// Maps the atoms of every educt onto the products of a reaction.
pub struct ReactionMapper {
    options: ReactionOptions,
    energy: Box<dyn EnergyScorer>,
    stereo: Box<dyn StereoScorer>,
}

impl Default for ReactionMapper {
    fn default() -> Self {
        Self::new(ReactionOptions::default())
    }
}

impl ReactionMapper {
    pub fn new(options: ReactionOptions) -> Self {
        Self {
            options,
            energy: Box::new(BondEnergyTable),
            stereo: Box::new(BondStereoComparator),
        }
    }

    pub fn with_energy_scorer(mut self, scorer: impl EnergyScorer + 'static) -> Self {
        self.energy = Box::new(scorer);
        self
    }

    pub fn with_stereo_scorer(mut self, scorer: impl StereoScorer + 'static) -> Self {
        self.stereo = Box::new(scorer);
        self
    }

    pub fn options(&self) -> &ReactionOptions {
        &self.options
    }

    pub fn map(
        &self,
        educts: &[LabeledGraph],
        products: &[LabeledGraph],
    ) -> Result<ReactionMapping, ReactionError> {
        if educts.is_empty() {
            return Err(ReactionError::NoEducts);
        }
        if products.is_empty() {
            return Err(ReactionError::NoProducts);
        }

        let mut options = self.options.mcs;
        if self.options.relax_single_pair && educts.len() == 1 && products.len() == 1 {
            debug!("single educt and product, ignoring bond orders");
            options.matcher = options.matcher.without_bond_order();
        }

        let tasks: Vec<(usize, usize)> = (0..educts.len())
            .flat_map(|i| (0..products.len()).map(move |j| (i, j)))
            .collect();
        let run = || -> Vec<PairSolutions> {
            tasks
                .par_iter()
                .map(|&(i, j)| self.map_pair(educts, products, (i, j), options))
                .collect()
        };
        let pairs = match self.options.threads {
            Some(threads) => ThreadPoolBuilder::new().num_threads(threads).build()?.install(run),
            None => run(),
        };

        let mut similarity = SimilarityMatrix::new(educts.len(), products.len());
        let mut best = Vec::with_capacity(pairs.len());
        for pair in &pairs {
            let (i, j) = (pair.query_position, pair.target_position);
            let top = pair
                .best()
                .cloned()
                .unwrap_or_else(|| McsSolution::empty(i, j));
            similarity.set(
                i,
                j,
                tanimoto(educts[i].node_count(), products[j].node_count(), top.size()),
            );
            best.push(top);
        }
        let winners = choose_winners(&similarity, &best);
        debug!(
            educts = educts.len(),
            products = products.len(),
            winners = winners.len(),
            "reaction mapped"
        );

        Ok(ReactionMapping {
            pairs,
            similarity,
            winners,
        })
    }

    fn map_pair(
        &self,
        educts: &[LabeledGraph],
        products: &[LabeledGraph],
        (i, j): (usize, usize),
        options: McsOptions,
    ) -> PairSolutions {
        let (source, target) = (&educts[i], &products[j]);
        let result = Mcs::new(source, target, options)
            .with_fragment_counts(educts.len(), products.len())
            .run();

        if result.timeout {
            warn!(
                educt = i,
                product = j,
                size = result.size(),
                "mcs timed out, scoring best effort mappings"
            );
        }
        let solutions = if result.mappings.is_empty() {
            debug!(educt = i, product = j, "no common substructure for pair");
            vec![McsSolution::empty(i, j)]
        } else {
            let mut solutions: Vec<McsSolution> = result
                .mappings
                .into_iter()
                .map(|mapping| {
                    McsSolution::score(
                        (i, j),
                        source,
                        target,
                        mapping,
                        self.energy.as_ref(),
                        self.stereo.as_ref(),
                    )
                })
                .collect();
            rank_solutions(&mut solutions);
            solutions
        };
        PairSolutions {
            query_position: i,
            target_position: j,
            algorithm: result.algorithm,
            solutions,
        }
    }
}
