use crate::atom::AtomLabel;
use crate::bond::BondOrder;
use crate::hybridization::Hybridization;

pub trait HasAtomicNum {
    fn atomic_num(&self) -> u8;
}

/// Concrete element or query pattern of a node.
///
/// Types without query semantics can rely on the default, which wraps
/// [`HasAtomicNum::atomic_num`].
pub trait HasAtomLabel: HasAtomicNum {
    fn atom_label(&self) -> AtomLabel {
        AtomLabel::Element(self.atomic_num())
    }
}

pub trait HasFormalCharge {
    fn formal_charge(&self) -> i8;
}

pub trait HasAromaticity {
    fn is_aromatic(&self) -> bool;
}

pub trait HasRingMembership {
    fn is_in_ring(&self) -> bool;
}

pub trait HasRingSize {
    fn smallest_ring_size(&self) -> Option<u8>;
}

pub trait HasHybridization {
    fn hybridization(&self) -> Hybridization;
}

pub trait HasBondOrder {
    fn bond_order(&self) -> BondOrder;
}
