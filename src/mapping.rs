use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered source-index → target-index correspondence.
///
/// Iteration follows insertion (discovery) order. Equality compares content
/// only, so two mappings built in different orders are equal.
///
/// ```
/// use crabmap::AtomAtomMapping;
///
/// let a = AtomAtomMapping::from_pairs([(0, 2), (1, 0)]);
/// let b = AtomAtomMapping::from_pairs([(1, 0), (0, 2)]);
/// assert_eq!(a, b);
/// assert_eq!(a.pairs(), vec![(0, 2), (1, 0)]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomAtomMapping {
    map: IndexMap<usize, usize>,
}

impl AtomAtomMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs that would break injectivity are skipped.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut mapping = Self::new();
        for (s, t) in pairs {
            mapping.insert(s, t);
        }
        mapping
    }

    /// Returns `false` (and leaves the mapping unchanged) if either index is
    /// already mapped.
    pub fn insert(&mut self, source: usize, target: usize) -> bool {
        if self.map.contains_key(&source) || self.contains_target(target) {
            return false;
        }
        self.map.insert(source, target);
        true
    }

    pub fn count(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, source: usize) -> Option<usize> {
        self.map.get(&source).copied()
    }

    pub fn contains_source(&self, source: usize) -> bool {
        self.map.contains_key(&source)
    }

    pub fn contains_target(&self, target: usize) -> bool {
        self.map.values().any(|&t| t == target)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.map.iter().map(|(&s, &t)| (s, t))
    }

    pub fn pairs(&self) -> Vec<(usize, usize)> {
        self.iter().collect()
    }

    pub fn sorted_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = self.pairs();
        pairs.sort_unstable();
        pairs
    }

    /// Target-index → source-index view, same order.
    pub fn inverted(&self) -> Self {
        Self {
            map: self.map.iter().map(|(&s, &t)| (t, s)).collect(),
        }
    }
}

/// Which side a mapping's keys index.
///
/// Engines run with the graphs swapped (smaller graph first) hand back
/// target-keyed mappings; [`Orientation::normalize`] turns them back into
/// source-keyed ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    SourceKeyed,
    TargetKeyed,
}

impl Orientation {
    pub fn swapped(swap: bool) -> Self {
        if swap {
            Self::TargetKeyed
        } else {
            Self::SourceKeyed
        }
    }

    pub fn normalize(self, mapping: &AtomAtomMapping) -> AtomAtomMapping {
        match self {
            Self::SourceKeyed => mapping.clone(),
            Self::TargetKeyed => mapping.inverted(),
        }
    }
}
