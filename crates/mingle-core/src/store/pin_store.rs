use std::collections::HashSet;

/// Local optimistic copy of the capped pinned set, in pin order.
///
/// The authoritative copy lives server-side. Every mutation here happens
/// before the matching backend call; on backend failure the caller
/// replaces the whole store with a re-fetched authoritative list.
pub struct PinStore {
    ids: Vec<String>,
    limit: usize,
}

impl PinStore {
    pub fn new(limit: usize) -> Self {
        Self {
            ids: Vec::new(),
            limit,
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    // ===== Query Methods =====

    pub fn contains(&self, event_id: &str) -> bool {
        self.ids.iter().any(|id| id == event_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.ids.len() >= self.limit
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn as_set(&self) -> HashSet<String> {
        self.ids.iter().cloned().collect()
    }

    // ===== Mutations =====

    /// Add an id unless the store is full or already holds it.
    pub fn insert(&mut self, event_id: &str) -> bool {
        if self.is_full() || self.contains(event_id) {
            return false;
        }
        self.ids.push(event_id.to_string());
        true
    }

    pub fn remove(&mut self, event_id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| id != event_id);
        self.ids.len() < before
    }

    /// Replace the whole store with an authoritative backend list,
    /// de-duplicated and truncated to the cap.
    pub fn replace_all(&mut self, ids: Vec<String>) {
        self.ids.clear();
        for id in ids {
            if self.is_full() {
                break;
            }
            if !self.contains(&id) {
                self.ids.push(id);
            }
        }
    }
}
