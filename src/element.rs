static SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

pub const CARBON: u8 = 6;

/// Element symbol for an atomic number. `0` (dummy atom) and out-of-range
/// numbers render as `*`.
pub fn symbol(atomic_num: u8) -> &'static str {
    match atomic_num {
        1..=118 => SYMBOLS[atomic_num as usize - 1],
        _ => "*",
    }
}

pub fn atomic_num_from_symbol(s: &str) -> Option<u8> {
    SYMBOLS
        .iter()
        .position(|&sym| sym == s)
        .map(|i| i as u8 + 1)
}

pub fn is_heavy(atomic_num: u8) -> bool {
    atomic_num > 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_roundtrip_for_organic_subset() {
        for sym in ["B", "C", "N", "O", "P", "S", "F", "Cl", "Br", "I"] {
            let n = atomic_num_from_symbol(sym).unwrap();
            assert_eq!(symbol(n), sym);
        }
    }

    #[test]
    fn dummy_atom_is_star() {
        assert_eq!(symbol(0), "*");
        assert_eq!(symbol(200), "*");
    }

    #[test]
    fn hydrogen_is_not_heavy() {
        assert!(!is_heavy(1));
        assert!(is_heavy(CARBON));
    }
}
