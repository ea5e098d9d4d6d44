//! Reaction-level atom mapping.
//!
//! Every educt/product pair is an independent MCS task run on a rayon pool.
//! The best solution of each pair fills a Tanimoto similarity matrix, and a
//! greedy winner selection assigns educts to products one to one.

pub mod error;
mod mapper;
mod winner;

pub use error::ReactionError;
pub use mapper::{PairSolutions, ReactionMapper, ReactionMapping, ReactionOptions};
pub use winner::{choose_winners, tanimoto, SimilarityMatrix};
