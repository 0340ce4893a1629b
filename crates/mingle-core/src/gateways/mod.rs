//! Typed async accessors for the backend data sources.
//!
//! Every trait here models one independently failable source. The engine
//! treats them as untrusted collaborators: any call may return a
//! [`GatewayError`], and the aggregator degrades that source rather than
//! aborting the pass.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::GatewayError;
use crate::models::{Event, Notification, Organization, Story};

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Event source: the three overlapping views the feed merges.
#[async_trait]
pub trait EventsGateway: Send + Sync {
    /// Events the current viewer is allowed to see (public plus shared
    /// private ones). The backend decides visibility.
    async fn fetch_visible(&self) -> GatewayResult<Vec<Event>>;

    /// Events owned by one user.
    async fn fetch_owned(&self, owner_id: &str) -> GatewayResult<Vec<Event>>;

    /// Ids of events the user has joined. Resolved to full events via
    /// [`fetch_event`](Self::fetch_event).
    async fn fetch_joined_ids(&self, user_id: &str) -> GatewayResult<Vec<String>>;

    /// Resolve a single event by id. `Ok(None)` when it no longer exists.
    async fn fetch_event(&self, event_id: &str) -> GatewayResult<Option<Event>>;
}

#[async_trait]
pub trait OrganizationsGateway: Send + Sync {
    async fn fetch_all(&self) -> GatewayResult<Vec<Organization>>;
}

#[async_trait]
pub trait StoriesGateway: Send + Sync {
    /// Raw story list for one event, before visibility filtering.
    async fn fetch_for_event(&self, event_id: &str) -> GatewayResult<Vec<Story>>;
}

#[async_trait]
pub trait FriendsGateway: Send + Sync {
    /// Ids of the user's confirmed friends.
    async fn fetch_friend_ids(&self, user_id: &str) -> GatewayResult<HashSet<String>>;
}

/// Uncapped favorite set, keyed by event id.
#[async_trait]
pub trait FavoritesGateway: Send + Sync {
    async fn fetch(&self, user_id: &str) -> GatewayResult<HashSet<String>>;
    async fn add(&self, user_id: &str, event_id: &str) -> GatewayResult<()>;
    async fn remove(&self, user_id: &str, event_id: &str) -> GatewayResult<()>;
}

/// Capped pinned set. The cap is enforced by the engine, not here; the
/// gateway is a dumb store.
#[async_trait]
pub trait PinsGateway: Send + Sync {
    async fn fetch(&self, user_id: &str) -> GatewayResult<Vec<String>>;
    async fn add(&self, user_id: &str, event_id: &str) -> GatewayResult<()>;
    async fn remove(&self, user_id: &str, event_id: &str) -> GatewayResult<()>;
}

/// Realtime notification source.
///
/// `subscribe` hands back a stream of full notification lists; the backend
/// re-pushes the whole list on every change, and the engine diffs. Dropping
/// the stream is the unsubscribe.
#[async_trait]
pub trait NotificationsGateway: Send + Sync {
    async fn subscribe(&self, user_id: &str) -> GatewayResult<NotificationStream>;
    async fn mark_read(&self, user_id: &str, notification_id: &str) -> GatewayResult<()>;
    async fn mark_all_read(&self, user_id: &str) -> GatewayResult<()>;
    async fn delete(&self, user_id: &str, notification_id: &str) -> GatewayResult<()>;
}

/// Channel-backed stream of notification list pushes.
pub struct NotificationStream {
    rx: mpsc::Receiver<Vec<Notification>>,
}

impl NotificationStream {
    /// Build a stream together with the sender half a gateway
    /// implementation pushes into.
    pub fn channel(capacity: usize) -> (mpsc::Sender<Vec<Notification>>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self { rx })
    }

    /// Next full list pushed by the backend, or `None` once the backend
    /// side hangs up.
    pub async fn recv(&mut self) -> Option<Vec<Notification>> {
        self.rx.recv().await
    }
}

/// The full set of sources the engine runs against, shared across tasks.
#[derive(Clone)]
pub struct Gateways {
    pub events: Arc<dyn EventsGateway>,
    pub organizations: Arc<dyn OrganizationsGateway>,
    pub stories: Arc<dyn StoriesGateway>,
    pub friends: Arc<dyn FriendsGateway>,
    pub favorites: Arc<dyn FavoritesGateway>,
    pub pins: Arc<dyn PinsGateway>,
    pub notifications: Arc<dyn NotificationsGateway>,
}

#[cfg(test)]
pub(crate) mod mock;
