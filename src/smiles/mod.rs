//! Minimal SMILES reader producing annotated molecules.
//!
//! Supports the organic subset, bracket atoms (isotope, chirality and atom
//! class are read and discarded), `*` wildcards, branches, ring closures and
//! disconnected components. No valence model or aromaticity perception is
//! applied: lowercase atoms are flagged aromatic and bonded aromatically,
//! Kekulé input stays Kekulé. Ring membership, smallest ring size and a
//! bond-order hybridization estimate are attached after the graph is built.

pub mod error;
mod tokenizer;

use std::collections::HashMap;

use petgraph::graph::NodeIndex;

pub use error::SmilesError;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::hybridization::estimate_hybridization;
use crate::mol::Mol;
use crate::rings::RingInfo;
use tokenizer::{tokenize, BondToken, Token};

pub fn from_smiles(s: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
    if s.trim().is_empty() {
        return Err(SmilesError::EmptyInput);
    }
    let tokens = tokenize(s)?;
    let mut mol = build(&tokens)?;
    annotate(&mut mol);
    Ok(mol)
}

struct OpenRing {
    atom: NodeIndex,
    bond: Option<BondToken>,
}

fn build(tokens: &[Token]) -> Result<Mol<Atom, Bond>, SmilesError> {
    let mut mol = Mol::new();
    let mut prev: Option<NodeIndex> = None;
    let mut pending: Option<(BondToken, usize)> = None;
    let mut branches: Vec<Option<NodeIndex>> = Vec::new();
    let mut rings: HashMap<u16, OpenRing> = HashMap::new();

    for token in tokens {
        match token {
            Token::Atom(tok) => {
                let idx = mol.add_atom(Atom {
                    atomic_num: tok.atomic_num,
                    formal_charge: tok.charge,
                    is_aromatic: tok.is_aromatic,
                    query: tok.query.clone(),
                    ..Atom::default()
                });
                if let Some(p) = prev {
                    let order = resolve_order(pending.map(|(b, _)| b), &mol, p, idx);
                    mol.add_bond(p, idx, Bond { order, in_ring: false });
                }
                pending = None;
                prev = Some(idx);
            }
            Token::Bond { bond, pos } => {
                if prev.is_none() {
                    return Err(SmilesError::DanglingBond { pos: *pos });
                }
                pending = Some((*bond, *pos));
            }
            Token::RingClosure { digit, pos } => {
                let current = prev.ok_or(SmilesError::DanglingBond { pos: *pos })?;
                let bond_here = pending.take().map(|(b, _)| b);
                match rings.remove(digit) {
                    Some(open) => {
                        if open.atom == current || mol.bond_between(open.atom, current).is_some()
                        {
                            return Err(SmilesError::InvalidRingBond {
                                digit: *digit,
                                pos: *pos,
                            });
                        }
                        let order = resolve_order(bond_here.or(open.bond), &mol, open.atom, current);
                        mol.add_bond(open.atom, current, Bond { order, in_ring: false });
                    }
                    None => {
                        rings.insert(
                            *digit,
                            OpenRing {
                                atom: current,
                                bond: bond_here,
                            },
                        );
                    }
                }
            }
            Token::OpenParen(pos) => {
                if prev.is_none() {
                    return Err(SmilesError::DanglingBond { pos: *pos });
                }
                branches.push(prev);
            }
            Token::CloseParen(pos) => {
                prev = branches
                    .pop()
                    .ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                pending = None;
            }
            Token::Dot => {
                prev = None;
                pending = None;
            }
        }
    }

    if let Some((_, pos)) = pending {
        return Err(SmilesError::DanglingBond { pos });
    }
    if !branches.is_empty() {
        return Err(SmilesError::UnclosedBranch);
    }
    if let Some(digit) = rings.keys().min() {
        return Err(SmilesError::UnclosedRing { digit: *digit });
    }

    Ok(mol)
}

fn resolve_order(
    explicit: Option<BondToken>,
    mol: &Mol<Atom, Bond>,
    a: NodeIndex,
    b: NodeIndex,
) -> BondOrder {
    match explicit {
        Some(BondToken::Single) => BondOrder::Single,
        Some(BondToken::Double) => BondOrder::Double,
        Some(BondToken::Triple) => BondOrder::Triple,
        Some(BondToken::Aromatic) => BondOrder::Aromatic,
        None => {
            if mol.atom(a).is_aromatic && mol.atom(b).is_aromatic {
                BondOrder::Aromatic
            } else {
                BondOrder::Single
            }
        }
    }
}

fn annotate(mol: &mut Mol<Atom, Bond>) {
    let rings = RingInfo::perceive(mol);

    let bonds: Vec<_> = mol.bonds().collect();
    for bond in bonds {
        mol.bond_mut(bond).in_ring = rings.is_ring_bond(bond);
    }

    let atoms: Vec<_> = mol.atoms().collect();
    for atom in atoms {
        let hybridization = estimate_hybridization(mol, atom);
        let ring_size = rings
            .smallest_ring_size(atom)
            .map(|size| u8::try_from(size).unwrap_or(u8::MAX));
        let a = mol.atom_mut(atom);
        a.in_ring = ring_size.is_some();
        a.ring_size = ring_size;
        a.hybridization = hybridization;
    }
}
