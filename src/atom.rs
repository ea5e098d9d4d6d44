use serde::{Deserialize, Serialize};

use crate::hybridization::Hybridization;

/// Pattern carried by a query (wildcard) node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtomQuery {
    /// `*`: any atom, hydrogen included.
    Any,
    /// Any atom heavier than hydrogen.
    AnyHeavy,
    /// One of the listed atomic numbers.
    OneOf(Vec<u8>),
}

impl AtomQuery {
    pub fn accepts(&self, atomic_num: u8) -> bool {
        match self {
            Self::Any => true,
            Self::AnyHeavy => atomic_num > 1,
            Self::OneOf(list) => list.contains(&atomic_num),
        }
    }

    /// Whether some concrete element satisfies both queries.
    pub fn overlaps(&self, other: &AtomQuery) -> bool {
        match (self, other) {
            (Self::Any, _) | (_, Self::Any) => true,
            (Self::AnyHeavy, Self::AnyHeavy) => true,
            (Self::AnyHeavy, Self::OneOf(list)) | (Self::OneOf(list), Self::AnyHeavy) => {
                list.iter().any(|&n| n > 1)
            }
            (Self::OneOf(a), Self::OneOf(b)) => a.iter().any(|n| b.contains(n)),
        }
    }
}

/// Label of a graph node: an element, or a query pattern with relaxed
/// matching semantics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtomLabel {
    Element(u8),
    Query(AtomQuery),
}

impl AtomLabel {
    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }

    /// Atomic number of a concrete label.
    pub fn atomic_num(&self) -> Option<u8> {
        match self {
            Self::Element(n) => Some(*n),
            Self::Query(_) => None,
        }
    }

    pub fn accepts(&self, other: &AtomLabel) -> bool {
        match (self, other) {
            (Self::Element(a), Self::Element(b)) => a == b,
            (Self::Query(q), Self::Element(n)) | (Self::Element(n), Self::Query(q)) => {
                q.accepts(*n)
            }
            (Self::Query(a), Self::Query(b)) => a.overlaps(b),
        }
    }
}

/// Default atom type for a molecular graph node.
///
/// Besides the intrinsic properties read off a structural formula, `Atom`
/// stores the annotations the matching engines consume: ring membership,
/// smallest ring size and hybridization. These are expected to be filled
/// in by an upstream perception step (the line-notation reader in
/// [`smiles`](crate::smiles) does a coarse version of this).
///
/// # Examples
///
/// ```
/// use crabmap::Atom;
///
/// let carbon = Atom {
///     atomic_num: 6,
///     in_ring: true,
///     ring_size: Some(6),
///     ..Atom::default()
/// };
/// assert_eq!(carbon.atomic_num, 6);
/// assert!(carbon.query.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// Atomic number (1 = H, 6 = C, 7 = N, …). `0` for dummy/query atoms.
    pub atomic_num: u8,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Whether this atom is in an aromatic ring.
    pub is_aromatic: bool,
    /// Whether this atom belongs to at least one ring.
    pub in_ring: bool,
    /// Size of the smallest ring through this atom, if any.
    pub ring_size: Option<u8>,
    pub hybridization: Hybridization,
    /// Query pattern. When set the atom matches with relaxed semantics and
    /// `atomic_num` is ignored.
    pub query: Option<AtomQuery>,
}

impl crate::traits::HasAtomicNum for Atom {
    fn atomic_num(&self) -> u8 {
        self.atomic_num
    }
}

impl crate::traits::HasAtomLabel for Atom {
    fn atom_label(&self) -> AtomLabel {
        match &self.query {
            Some(q) => AtomLabel::Query(q.clone()),
            None => AtomLabel::Element(self.atomic_num),
        }
    }
}

impl crate::traits::HasFormalCharge for Atom {
    fn formal_charge(&self) -> i8 {
        self.formal_charge
    }
}

impl crate::traits::HasAromaticity for Atom {
    fn is_aromatic(&self) -> bool {
        self.is_aromatic
    }
}

impl crate::traits::HasRingMembership for Atom {
    fn is_in_ring(&self) -> bool {
        self.in_ring
    }
}

impl crate::traits::HasRingSize for Atom {
    fn smallest_ring_size(&self) -> Option<u8> {
        self.ring_size
    }
}

impl crate::traits::HasHybridization for Atom {
    fn hybridization(&self) -> Hybridization {
        self.hybridization
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_labels_match_by_number() {
        assert!(AtomLabel::Element(6).accepts(&AtomLabel::Element(6)));
        assert!(!AtomLabel::Element(6).accepts(&AtomLabel::Element(7)));
    }

    #[test]
    fn any_heavy_rejects_hydrogen() {
        let q = AtomLabel::Query(AtomQuery::AnyHeavy);
        assert!(q.accepts(&AtomLabel::Element(8)));
        assert!(!q.accepts(&AtomLabel::Element(1)));
        assert!(AtomLabel::Element(8).accepts(&q));
    }

    #[test]
    fn list_queries_overlap_on_shared_member() {
        let a = AtomQuery::OneOf(vec![7, 8]);
        let b = AtomQuery::OneOf(vec![8, 16]);
        let c = AtomQuery::OneOf(vec![1]);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(!AtomQuery::AnyHeavy.overlaps(&c));
    }

    #[test]
    fn query_atom_reports_query_label() {
        use crate::traits::HasAtomLabel;
        let atom = Atom {
            query: Some(AtomQuery::Any),
            ..Atom::default()
        };
        assert!(atom.atom_label().is_query());
        assert_eq!(atom.atom_label().atomic_num(), None);
    }
}
