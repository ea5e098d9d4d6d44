use crate::mapping::AtomAtomMapping;

/// Mappings found by a search and whether it ran out of budget first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    pub mappings: Vec<AtomAtomMapping>,
    pub timeout: bool,
}

/// Running collection of the largest mappings seen so far.
#[derive(Debug, Clone, Default)]
pub struct BestHits {
    best: usize,
    hits: Vec<AtomAtomMapping>,
}

impl BestHits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a candidate. A strictly larger mapping replaces everything
    /// retained so far; an equal-size mapping not already present is
    /// appended; anything smaller is ignored. Returns whether the candidate
    /// was kept.
    pub fn offer(&mut self, mapping: AtomAtomMapping) -> bool {
        let size = mapping.count();
        if size > self.best || (self.hits.is_empty() && size == self.best) {
            self.best = size;
            self.hits.clear();
            self.hits.push(mapping);
            return true;
        }
        if size == self.best && !self.hits.contains(&mapping) {
            self.hits.push(mapping);
            return true;
        }
        false
    }

    pub fn extend(&mut self, mappings: impl IntoIterator<Item = AtomAtomMapping>) {
        for mapping in mappings {
            self.offer(mapping);
        }
    }

    pub fn best_size(&self) -> usize {
        self.best
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn hits(&self) -> &[AtomAtomMapping] {
        &self.hits
    }

    pub fn into_vec(self) -> Vec<AtomAtomMapping> {
        self.hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(pairs: &[(usize, usize)]) -> AtomAtomMapping {
        AtomAtomMapping::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn larger_mapping_clears_previous() {
        let mut hits = BestHits::new();
        assert!(hits.offer(m(&[(0, 0)])));
        assert!(hits.offer(m(&[(1, 1)])));
        assert_eq!(hits.len(), 2);
        assert!(hits.offer(m(&[(0, 0), (1, 1)])));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits.best_size(), 2);
    }

    #[test]
    fn smaller_and_duplicate_mappings_are_ignored() {
        let mut hits = BestHits::new();
        hits.offer(m(&[(0, 0), (1, 1)]));
        assert!(!hits.offer(m(&[(2, 2)])));
        assert!(!hits.offer(m(&[(1, 1), (0, 0)])));
        assert!(hits.offer(m(&[(0, 1), (1, 0)])));
        assert_eq!(hits.into_vec().len(), 2);
    }

    #[test]
    fn empty_mapping_is_retained_once() {
        let mut hits = BestHits::new();
        assert!(hits.offer(AtomAtomMapping::new()));
        assert!(!hits.offer(AtomAtomMapping::new()));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits.best_size(), 0);
    }
}
