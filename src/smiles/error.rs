use std::fmt;

/// Errors produced when reading a SMILES string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmilesError {
    /// The input string was empty or contained only whitespace.
    EmptyInput,
    /// An unexpected character was encountered at the given position.
    UnexpectedChar { pos: usize, ch: char },
    /// An unrecognized element symbol was found.
    InvalidElement { pos: usize, text: String },
    /// A bracket atom `[` was opened but never closed with `]`.
    UnclosedBracket { pos: usize },
    /// A charge specifier inside a bracket atom could not be parsed.
    InvalidCharge { pos: usize },
    /// A bond or ring closure appeared with no preceding atom.
    DanglingBond { pos: usize },
    /// A `)` without a matching `(`.
    UnmatchedParen { pos: usize },
    /// A `(` that was never closed.
    UnclosedBranch,
    /// A ring-opening digit was never matched by a ring-closing digit.
    UnclosedRing { digit: u16 },
    /// A ring closure that would bond an atom to itself or duplicate a bond.
    InvalidRingBond { digit: u16, pos: usize },
}

impl fmt::Display for SmilesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "empty SMILES string"),
            Self::UnexpectedChar { pos, ch } => {
                write!(f, "unexpected character '{ch}' at position {pos}")
            }
            Self::InvalidElement { pos, text } => {
                write!(f, "invalid element '{text}' at position {pos}")
            }
            Self::UnclosedBracket { pos } => {
                write!(f, "unclosed bracket atom starting at position {pos}")
            }
            Self::InvalidCharge { pos } => write!(f, "invalid charge at position {pos}"),
            Self::DanglingBond { pos } => {
                write!(f, "bond without a preceding atom at position {pos}")
            }
            Self::UnmatchedParen { pos } => {
                write!(f, "unmatched parenthesis at position {pos}")
            }
            Self::UnclosedBranch => write!(f, "unclosed branch"),
            Self::UnclosedRing { digit } => write!(f, "unclosed ring {digit}"),
            Self::InvalidRingBond { digit, pos } => {
                write!(f, "invalid ring bond {digit} at position {pos}")
            }
        }
    }
}

impl std::error::Error for SmilesError {}
