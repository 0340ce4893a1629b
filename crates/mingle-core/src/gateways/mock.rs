//! Scriptable in-memory backend for tests.
//!
//! One [`MockBackend`] implements every gateway trait. Tests mutate its
//! tables directly, script per-operation failures with [`MockBackend::fail`],
//! and assert on call counts.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::{
    EventsGateway, FavoritesGateway, FriendsGateway, GatewayResult, Gateways, NotificationStream,
    NotificationsGateway, OrganizationsGateway, PinsGateway, StoriesGateway,
};
use crate::error::GatewayError;
use crate::models::{Event, Notification, Organization, Story};

#[derive(Default)]
pub(crate) struct MockBackend {
    pub visible: Mutex<Vec<Event>>,
    pub owned: Mutex<Vec<Event>>,
    pub joined_ids: Mutex<Vec<String>>,
    pub events_by_id: Mutex<HashMap<String, Event>>,
    pub organizations: Mutex<Vec<Organization>>,
    pub stories: Mutex<HashMap<String, Vec<Story>>>,
    pub friends: Mutex<HashSet<String>>,
    pub favorites: Mutex<HashSet<String>>,
    pub pins: Mutex<Vec<String>>,
    notification_tx: Mutex<Option<mpsc::Sender<Vec<Notification>>>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Bundle this backend into every gateway slot.
    pub fn gateways(self: &Arc<Self>) -> Gateways {
        Gateways {
            events: self.clone(),
            organizations: self.clone(),
            stories: self.clone(),
            friends: self.clone(),
            favorites: self.clone(),
            pins: self.clone(),
            notifications: self.clone(),
        }
    }

    /// Make one operation fail with `Unavailable` until healed.
    pub fn fail(&self, op: &str) {
        self.failing.lock().insert(op.to_string());
    }

    pub fn heal(&self, op: &str) {
        self.failing.lock().remove(op);
    }

    /// How many times an operation was invoked, failed calls included.
    pub fn calls(&self, op: &str) -> usize {
        self.calls.lock().get(op).copied().unwrap_or(0)
    }

    /// Push a full notification list to the active subscriber.
    pub async fn push_notifications(&self, list: Vec<Notification>) {
        let tx = self.notification_tx.lock().clone();
        if let Some(tx) = tx {
            let _ = tx.send(list).await;
        }
    }

    pub fn has_subscriber(&self) -> bool {
        self.notification_tx
            .lock()
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }

    fn guard(&self, op: &str) -> GatewayResult<()> {
        *self.calls.lock().entry(op.to_string()).or_insert(0) += 1;
        if self.failing.lock().contains(op) {
            return Err(GatewayError::Unavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl EventsGateway for MockBackend {
    async fn fetch_visible(&self) -> GatewayResult<Vec<Event>> {
        self.guard("events.visible")?;
        Ok(self.visible.lock().clone())
    }

    async fn fetch_owned(&self, _owner_id: &str) -> GatewayResult<Vec<Event>> {
        self.guard("events.owned")?;
        Ok(self.owned.lock().clone())
    }

    async fn fetch_joined_ids(&self, _user_id: &str) -> GatewayResult<Vec<String>> {
        self.guard("events.joined")?;
        Ok(self.joined_ids.lock().clone())
    }

    async fn fetch_event(&self, event_id: &str) -> GatewayResult<Option<Event>> {
        self.guard("events.by_id")?;
        Ok(self.events_by_id.lock().get(event_id).cloned())
    }
}

#[async_trait]
impl OrganizationsGateway for MockBackend {
    async fn fetch_all(&self) -> GatewayResult<Vec<Organization>> {
        self.guard("organizations")?;
        Ok(self.organizations.lock().clone())
    }
}

#[async_trait]
impl StoriesGateway for MockBackend {
    async fn fetch_for_event(&self, event_id: &str) -> GatewayResult<Vec<Story>> {
        self.guard("stories")?;
        Ok(self
            .stories
            .lock()
            .get(event_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl FriendsGateway for MockBackend {
    async fn fetch_friend_ids(&self, _user_id: &str) -> GatewayResult<HashSet<String>> {
        self.guard("friends")?;
        Ok(self.friends.lock().clone())
    }
}

#[async_trait]
impl FavoritesGateway for MockBackend {
    async fn fetch(&self, _user_id: &str) -> GatewayResult<HashSet<String>> {
        self.guard("favorites.fetch")?;
        Ok(self.favorites.lock().clone())
    }

    async fn add(&self, _user_id: &str, event_id: &str) -> GatewayResult<()> {
        self.guard("favorites.add")?;
        self.favorites.lock().insert(event_id.to_string());
        Ok(())
    }

    async fn remove(&self, _user_id: &str, event_id: &str) -> GatewayResult<()> {
        self.guard("favorites.remove")?;
        self.favorites.lock().remove(event_id);
        Ok(())
    }
}

#[async_trait]
impl PinsGateway for MockBackend {
    async fn fetch(&self, _user_id: &str) -> GatewayResult<Vec<String>> {
        self.guard("pins.fetch")?;
        Ok(self.pins.lock().clone())
    }

    async fn add(&self, _user_id: &str, event_id: &str) -> GatewayResult<()> {
        self.guard("pins.add")?;
        let mut pins = self.pins.lock();
        if !pins.iter().any(|id| id == event_id) {
            pins.push(event_id.to_string());
        }
        Ok(())
    }

    async fn remove(&self, _user_id: &str, event_id: &str) -> GatewayResult<()> {
        self.guard("pins.remove")?;
        self.pins.lock().retain(|id| id != event_id);
        Ok(())
    }
}

#[async_trait]
impl NotificationsGateway for MockBackend {
    async fn subscribe(&self, _user_id: &str) -> GatewayResult<NotificationStream> {
        self.guard("notifications.subscribe")?;
        let (tx, stream) = NotificationStream::channel(8);
        *self.notification_tx.lock() = Some(tx);
        Ok(stream)
    }

    async fn mark_read(&self, _user_id: &str, _notification_id: &str) -> GatewayResult<()> {
        self.guard("notifications.mark_read")?;
        Ok(())
    }

    async fn mark_all_read(&self, _user_id: &str) -> GatewayResult<()> {
        self.guard("notifications.mark_all_read")?;
        Ok(())
    }

    async fn delete(&self, _user_id: &str, _notification_id: &str) -> GatewayResult<()> {
        self.guard("notifications.delete")?;
        Ok(())
    }
}
