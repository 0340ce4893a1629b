use std::collections::HashSet;

/// Local optimistic copy of the uncapped favorite set.
pub struct FavoriteStore {
    ids: HashSet<String>,
}

impl FavoriteStore {
    pub fn new() -> Self {
        Self {
            ids: HashSet::new(),
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    // ===== Query Methods =====

    pub fn contains(&self, event_id: &str) -> bool {
        self.ids.contains(event_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn as_set(&self) -> HashSet<String> {
        self.ids.clone()
    }

    // ===== Mutations =====

    pub fn insert(&mut self, event_id: &str) -> bool {
        self.ids.insert(event_id.to_string())
    }

    pub fn remove(&mut self, event_id: &str) -> bool {
        self.ids.remove(event_id)
    }

    pub fn replace_all(&mut self, ids: HashSet<String>) {
        self.ids = ids;
    }
}

impl Default for FavoriteStore {
    fn default() -> Self {
        Self::new()
    }
}
