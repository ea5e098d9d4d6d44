use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::bond::BondOrder;
use crate::mol::Mol;
use crate::traits::{HasAtomicNum, HasBondOrder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Hybridization {
    S,
    SP,
    SP2,
    #[default]
    SP3,
    Other,
}

impl Hybridization {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::S => "s",
            Self::SP => "sp",
            Self::SP2 => "sp2",
            Self::SP3 => "sp3",
            Self::Other => "other",
        }
    }
}

/// Bond-order based hybridization estimate.
///
/// This is the coarse annotation the line-notation reader attaches to its
/// atoms; callers with real perception data should set the field directly.
pub fn estimate_hybridization<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> Hybridization
where
    A: HasAtomicNum,
    B: HasBondOrder,
{
    let atomic_num = mol.atom(idx).atomic_num();
    if atomic_num == 0 {
        return Hybridization::Other;
    }
    if atomic_num == 1 {
        return Hybridization::S;
    }

    let mut doubles = 0;
    let mut has_triple = false;
    let mut has_aromatic = false;
    for bond in mol.bonds_of(idx) {
        match mol.bond(bond).bond_order() {
            BondOrder::Double => doubles += 1,
            BondOrder::Triple => has_triple = true,
            BondOrder::Aromatic => has_aromatic = true,
            BondOrder::Single | BondOrder::Unset => {}
        }
    }

    if has_triple || doubles >= 2 {
        Hybridization::SP
    } else if doubles == 1 || has_aromatic {
        Hybridization::SP2
    } else {
        Hybridization::SP3
    }
}
