use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::Notification;

/// What the viewer currently sees in the notification tray.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationSnapshot {
    /// Newest first.
    pub notifications: Vec<Notification>,
    pub unread: usize,
    /// The notification that just arrived, driving a one-shot toast.
    /// Transient: set by the diff on a push, cleared by `clear_latest`,
    /// never persisted.
    pub latest: Option<Notification>,
}

/// Sub-store turning raw notification pushes into a diffed snapshot.
///
/// The backend re-pushes the full list on every change. The store compares
/// ids against the previously applied push to decide whether something
/// genuinely new arrived. The first push after session start never counts
/// as new, so a cold start cannot toast.
pub struct NotificationStore {
    notifications: Vec<Notification>,
    /// Ids seen in the last applied push. Local mutations never touch
    /// this set, so a backend push racing a local delete cannot make the
    /// deleted notification look new again.
    prev_ids: HashSet<String>,
    had_nonempty_push: bool,
    latest: Option<Notification>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self {
            notifications: Vec::new(),
            prev_ids: HashSet::new(),
            had_nonempty_push: false,
            latest: None,
        }
    }

    pub fn clear(&mut self) {
        self.notifications.clear();
        self.prev_ids.clear();
        self.had_nonempty_push = false;
        self.latest = None;
    }

    // ===== Query Methods =====

    pub fn unread(&self) -> usize {
        self.notifications.iter().filter(|n| n.is_unread()).count()
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.latest.as_ref()
    }

    pub fn snapshot(&self) -> NotificationSnapshot {
        NotificationSnapshot {
            notifications: self.notifications.clone(),
            unread: self.unread(),
            latest: self.latest.clone(),
        }
    }

    // ===== Mutations =====

    /// Apply one full push from the backend, diffing against the previous
    /// one. `latest` is set only when a previous non-empty push existed
    /// and the new list holds an id it did not.
    pub fn apply_push(&mut self, mut list: Vec<Notification>) {
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        if self.had_nonempty_push {
            if let Some(new_entry) = list.iter().find(|n| !self.prev_ids.contains(&n.id)) {
                self.latest = Some(new_entry.clone());
            }
        }

        self.prev_ids = list.iter().map(|n| n.id.clone()).collect();
        self.had_nonempty_push |= !list.is_empty();
        self.notifications = list;
    }

    /// Reset the transient latest marker. List and unread count stay put.
    pub fn clear_latest(&mut self) {
        self.latest = None;
    }

    pub fn mark_read(&mut self, id: &str) {
        if let Some(n) = self.notifications.iter_mut().find(|n| n.id == id) {
            n.is_read = true;
        }
    }

    pub fn mark_all_read(&mut self) {
        for n in &mut self.notifications {
            n.is_read = true;
        }
    }

    pub fn delete(&mut self, id: &str) {
        self.notifications.retain(|n| n.id != id);
        if self.latest.as_ref().is_some_and(|n| n.id == id) {
            self.latest = None;
        }
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}
