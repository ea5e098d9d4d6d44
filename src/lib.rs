pub mod aggregate;
pub mod atom;
pub mod bond;
pub mod clique;
pub mod element;
pub mod graph;
pub mod hybridization;
pub mod label;
pub mod mapping;
pub mod matcher;
pub mod mcgregor;
pub mod mcs;
pub mod mol;
pub mod reaction;
pub mod rings;
pub mod score;
pub mod smiles;
pub mod timeout;
pub mod traits;
pub mod vf2;

pub use aggregate::{BestHits, SearchOutcome};
pub use atom::{Atom, AtomLabel, AtomQuery};
pub use bond::{Bond, BondOrder};
pub use clique::{CliqueOutcome, CompatibilityGraph, McsPlus};
pub use graph::{GraphEdge, GraphNode, LabeledGraph};
pub use hybridization::Hybridization;
pub use label::LabelTable;
pub use mapping::{AtomAtomMapping, Orientation};
pub use matcher::{AnyBond, AtomMatcher, BondMatcher, DefaultMatcher, MatcherConfig};
pub use mcgregor::McGregor;
pub use mcs::{find_mcs, Algorithm, Mcs, McsOptions, McsResult};
pub use mol::Mol;
pub use reaction::{ReactionError, ReactionMapper, ReactionMapping, ReactionOptions};
pub use rings::RingInfo;
pub use score::{BondEnergyTable, BondStereoComparator, EnergyScorer, McsSolution, StereoScorer};
pub use smiles::{from_smiles, SmilesError};
pub use timeout::IterationManager;
pub use traits::{
    HasAromaticity, HasAtomLabel, HasAtomicNum, HasBondOrder, HasFormalCharge, HasHybridization,
    HasRingMembership, HasRingSize,
};
pub use vf2::{MatchMode, Vf2, Vf2Stream};
