use std::collections::HashMap;

/// Dense integer ids for string labels, scoped to one matching session.
///
/// Ids are handed out in first-seen order starting at 1, so two sessions
/// that see labels in the same order assign the same ids.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    ids: HashMap<String, usize>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&mut self, label: &str) -> usize {
        if let Some(&id) = self.ids.get(label) {
            return id;
        }
        let id = self.ids.len() + 1;
        self.ids.insert(label.to_owned(), id);
        id
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.ids.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_dense_and_stable() {
        let mut table = LabelTable::new();
        assert_eq!(table.id("C"), 1);
        assert_eq!(table.id("O"), 2);
        assert_eq!(table.id("C"), 1);
        assert_eq!(table.get("O"), Some(2));
        assert_eq!(table.get("N"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn sessions_are_independent() {
        let mut a = LabelTable::new();
        let mut b = LabelTable::new();
        a.id("N");
        assert_eq!(b.id("C"), 1);
        assert_eq!(a.id("C"), 2);
    }
}
