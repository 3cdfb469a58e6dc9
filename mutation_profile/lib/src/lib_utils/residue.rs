// Residue alphabet and the three-way classification against a reference

use std::fmt::{self, Display};

pub const GAP: u8 = b'-';
pub const AMBIGUOUS: u8 = b'X';
pub const AMINO_ACIDS: &[u8; 20] = b"ACDEFGHIKLMNPQRSTVWY";
// '.' is read as a gap
const ALTERNATE_GAP: u8 = b'.';

// Returns `None` for symbols outside the alphabet.
pub fn normalise_residue(raw: u8) -> Option<u8> {
    let upper = raw.to_ascii_uppercase();
    match upper {
        GAP | ALTERNATE_GAP => Some(GAP),
        AMBIGUOUS => Some(AMBIGUOUS),
        x if AMINO_ACIDS.contains(&x) => Some(x),
        _ => None,
    }
}

pub fn is_gap(residue: u8) -> bool {
    residue == GAP
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Classification {
    Conserved,
    Mutation,
    Missing,
}

impl Classification {
    pub fn of(observed: u8, reference: u8) -> Self {
        if is_gap(observed) {
            Classification::Missing
        } else if observed == reference {
            Classification::Conserved
        } else {
            Classification::Mutation
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Conserved => "conserved",
            Classification::Mutation => "mutation",
            Classification::Missing => "missing",
        }
    }
}

impl Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalises_case_and_gap_spelling() {
        assert_eq!(normalise_residue(b'a'), Some(b'A'));
        assert_eq!(normalise_residue(b'.'), Some(GAP));
        assert_eq!(normalise_residue(b'x'), Some(AMBIGUOUS));
        assert_eq!(normalise_residue(b'B'), None);
        assert_eq!(normalise_residue(b'*'), None);
    }

    #[test]
    fn classification_rules() {
        assert_eq!(Classification::of(b'-', b'A'), Classification::Missing);
        assert_eq!(Classification::of(b'-', b'-'), Classification::Missing);
        assert_eq!(Classification::of(b'A', b'A'), Classification::Conserved);
        assert_eq!(Classification::of(b'C', b'-'), Classification::Mutation);
        assert_eq!(Classification::of(b'X', b'A'), Classification::Mutation);
    }
}
