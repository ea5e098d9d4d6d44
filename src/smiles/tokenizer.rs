use crate::atom::AtomQuery;
use crate::element::atomic_num_from_symbol;
use crate::smiles::error::SmilesError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Atom(AtomToken),
    Bond { bond: BondToken, pos: usize },
    RingClosure { digit: u16, pos: usize },
    OpenParen(usize),
    CloseParen(usize),
    Dot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomToken {
    pub atomic_num: u8,
    pub is_aromatic: bool,
    pub charge: i8,
    pub query: Option<AtomQuery>,
    pub pos: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondToken {
    Single,
    Double,
    Triple,
    Aromatic,
}

const ORGANIC: [(&str, u8); 10] = [
    ("Cl", 17),
    ("Br", 35),
    ("B", 5),
    ("C", 6),
    ("N", 7),
    ("O", 8),
    ("P", 15),
    ("S", 16),
    ("F", 9),
    ("I", 53),
];

const AROMATIC: [(&str, u8); 8] = [
    ("se", 34),
    ("te", 52),
    ("b", 5),
    ("c", 6),
    ("n", 7),
    ("o", 8),
    ("p", 15),
    ("s", 16),
];

pub fn tokenize(input: &str) -> Result<Vec<Token>, SmilesError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            ' ' | '\t' | '\r' | '\n' => i += 1,
            '[' => {
                let (tok, next) = bracket_atom(&chars, i)?;
                tokens.push(Token::Atom(tok));
                i = next;
            }
            '*' => {
                tokens.push(Token::Atom(AtomToken {
                    atomic_num: 0,
                    is_aromatic: false,
                    charge: 0,
                    query: Some(AtomQuery::Any),
                    pos: i,
                }));
                i += 1;
            }
            '-' | '/' | '\\' => {
                tokens.push(Token::Bond {
                    bond: BondToken::Single,
                    pos: i,
                });
                i += 1;
            }
            '=' => {
                tokens.push(Token::Bond {
                    bond: BondToken::Double,
                    pos: i,
                });
                i += 1;
            }
            '#' => {
                tokens.push(Token::Bond {
                    bond: BondToken::Triple,
                    pos: i,
                });
                i += 1;
            }
            ':' => {
                tokens.push(Token::Bond {
                    bond: BondToken::Aromatic,
                    pos: i,
                });
                i += 1;
            }
            '(' => {
                tokens.push(Token::OpenParen(i));
                i += 1;
            }
            ')' => {
                tokens.push(Token::CloseParen(i));
                i += 1;
            }
            '.' => {
                tokens.push(Token::Dot);
                i += 1;
            }
            '%' => {
                let digits: Option<u16> = chars
                    .get(i + 1..i + 3)
                    .filter(|d| d.iter().all(char::is_ascii_digit))
                    .map(|d| d.iter().fold(0, |acc, c| acc * 10 + digit_value(*c)));
                match digits {
                    Some(digit) => {
                        tokens.push(Token::RingClosure { digit, pos: i });
                        i += 3;
                    }
                    None => return Err(SmilesError::UnexpectedChar { pos: i, ch }),
                }
            }
            '0'..='9' => {
                tokens.push(Token::RingClosure {
                    digit: digit_value(ch),
                    pos: i,
                });
                i += 1;
            }
            _ => {
                let (atomic_num, aromatic, len) = organic_atom(&chars, i)
                    .ok_or(SmilesError::UnexpectedChar { pos: i, ch })?;
                tokens.push(Token::Atom(AtomToken {
                    atomic_num,
                    is_aromatic: aromatic,
                    charge: 0,
                    query: None,
                    pos: i,
                }));
                i += len;
            }
        }
    }

    Ok(tokens)
}

fn digit_value(c: char) -> u16 {
    c as u16 - b'0' as u16
}

fn starts_with(chars: &[char], at: usize, pat: &str) -> bool {
    pat.chars()
        .enumerate()
        .all(|(k, p)| chars.get(at + k) == Some(&p))
}

fn organic_atom(chars: &[char], at: usize) -> Option<(u8, bool, usize)> {
    if let Some(&(pat, n)) = ORGANIC.iter().find(|(pat, _)| starts_with(chars, at, pat)) {
        return Some((n, false, pat.len()));
    }
    // only single-letter aromatic symbols are valid outside brackets
    AROMATIC
        .iter()
        .filter(|(pat, _)| pat.len() == 1)
        .find(|(pat, _)| starts_with(chars, at, pat))
        .map(|&(_, n)| (n, true, 1))
}

fn bracket_atom(chars: &[char], start: usize) -> Result<(AtomToken, usize), SmilesError> {
    let mut i = start + 1;

    // isotope is accepted and ignored
    while chars.get(i).is_some_and(char::is_ascii_digit) {
        i += 1;
    }

    let (atomic_num, is_aromatic, query) = if chars.get(i) == Some(&'*') {
        i += 1;
        (0, false, Some(AtomQuery::Any))
    } else if let Some(&(pat, n)) = AROMATIC.iter().find(|(pat, _)| starts_with(chars, i, pat)) {
        i += pat.len();
        (n, true, None)
    } else {
        let first = *chars
            .get(i)
            .ok_or(SmilesError::UnclosedBracket { pos: start })?;
        if !first.is_ascii_uppercase() {
            return Err(SmilesError::InvalidElement {
                pos: i,
                text: first.to_string(),
            });
        }
        let two: String = chars[i..(i + 2).min(chars.len())].iter().collect();
        let one = first.to_string();
        if two.len() == 2 && two.chars().nth(1).is_some_and(|c| c.is_ascii_lowercase()) {
            if let Some(n) = atomic_num_from_symbol(&two) {
                i += 2;
                (n, false, None)
            } else {
                let n = atomic_num_from_symbol(&one)
                    .ok_or(SmilesError::InvalidElement { pos: i, text: two })?;
                i += 1;
                (n, false, None)
            }
        } else {
            let n = atomic_num_from_symbol(&one)
                .ok_or(SmilesError::InvalidElement { pos: i, text: one })?;
            i += 1;
            (n, false, None)
        }
    };

    // chirality marks carry no information for matching
    while chars.get(i) == Some(&'@') {
        i += 1;
    }

    if chars.get(i) == Some(&'H') {
        i += 1;
        while chars.get(i).is_some_and(char::is_ascii_digit) {
            i += 1;
        }
    }

    let charge = bracket_charge(chars, &mut i)?;

    if chars.get(i) == Some(&':') {
        i += 1;
        while chars.get(i).is_some_and(char::is_ascii_digit) {
            i += 1;
        }
    }

    if chars.get(i) != Some(&']') {
        return Err(SmilesError::UnclosedBracket { pos: start });
    }

    Ok((
        AtomToken {
            atomic_num,
            is_aromatic,
            charge,
            query,
            pos: start,
        },
        i + 1,
    ))
}

fn bracket_charge(chars: &[char], i: &mut usize) -> Result<i8, SmilesError> {
    let sign: i8 = match chars.get(*i) {
        Some('+') => 1,
        Some('-') => -1,
        _ => return Ok(0),
    };
    let sign_char = chars[*i];
    let pos = *i;
    *i += 1;

    let mut magnitude: i8 = 1;
    if chars.get(*i).is_some_and(char::is_ascii_digit) {
        let mut value: i32 = 0;
        while let Some(c) = chars.get(*i).filter(|c| c.is_ascii_digit()) {
            value = value * 10 + digit_value(*c) as i32;
            *i += 1;
        }
        magnitude = i8::try_from(value).map_err(|_| SmilesError::InvalidCharge { pos })?;
    } else {
        while chars.get(*i) == Some(&sign_char) {
            magnitude += 1;
            *i += 1;
        }
    }
    Ok(sign * magnitude)
}
