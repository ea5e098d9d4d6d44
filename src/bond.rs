use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
    /// Unknown or query bond; compatible with any order.
    Unset,
}

impl BondOrder {
    /// Numeric order used for energy lookups. Aromatic counts as 1.5.
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Single | Self::Unset => 1.0,
            Self::Double => 2.0,
            Self::Triple => 3.0,
            Self::Aromatic => 1.5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    pub order: BondOrder,
    pub in_ring: bool,
}

impl crate::traits::HasBondOrder for Bond {
    fn bond_order(&self) -> BondOrder {
        self.order
    }
}

impl crate::traits::HasRingMembership for Bond {
    fn is_in_ring(&self) -> bool {
        self.in_ring
    }
}
