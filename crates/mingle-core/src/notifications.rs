use std::sync::Arc;

use anyhow::{anyhow, Result};
use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::gateways::{Gateways, NotificationStream};
use crate::store::{NotificationSnapshot, NotificationStore};

/// Owns the realtime notification subscription for one viewer session.
///
/// A long-lived task consumes the gateway stream and applies every push to
/// the diffing store; subscribers observe the resulting snapshots through
/// a watch channel. Local mutations (mark read, delete) update the store
/// immediately and mirror to the backend fire-and-forget: a failed mirror
/// is logged and otherwise a no-op, never retried.
///
/// The subscription lives exactly as long as this value: `shutdown` stops
/// the listener task, and dropping the task's stream is the unsubscribe.
/// Drop calls `shutdown` as well, so a leaked center cannot leak the
/// backend subscription past the session.
pub struct NotificationCenter {
    gateways: Gateways,
    user_id: String,
    store: Arc<RwLock<NotificationStore>>,
    tx: Arc<watch::Sender<NotificationSnapshot>>,
    listener: Option<JoinHandle<()>>,
}

impl NotificationCenter {
    /// Subscribe to the backend and start the listener task.
    pub async fn start(gateways: Gateways, user_id: String) -> Result<Self> {
        let stream = gateways
            .notifications
            .subscribe(&user_id)
            .await
            .map_err(|e| anyhow!("subscribing notifications for {} failed: {}", user_id, e))?;

        let store = Arc::new(RwLock::new(NotificationStore::new()));
        let (tx, _rx) = watch::channel(NotificationSnapshot::default());
        let tx = Arc::new(tx);

        let listener = tokio::spawn(Self::listen(stream, store.clone(), tx.clone()));
        tracing::debug!("notification listener for {} started", user_id);

        Ok(Self {
            gateways,
            user_id,
            store,
            tx,
            listener: Some(listener),
        })
    }

    async fn listen(
        mut stream: NotificationStream,
        store: Arc<RwLock<NotificationStore>>,
        tx: Arc<watch::Sender<NotificationSnapshot>>,
    ) {
        while let Some(list) = stream.recv().await {
            let snapshot = {
                let mut store = store.write();
                store.apply_push(list);
                store.snapshot()
            };
            tx.send_replace(snapshot);
        }
        tracing::debug!("notification stream ended");
    }

    /// Watch snapshot publications. The receiver immediately holds the
    /// latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<NotificationSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> NotificationSnapshot {
        self.store.read().snapshot()
    }

    pub fn unread(&self) -> usize {
        self.store.read().unread()
    }

    /// Reset the transient "just arrived" marker. List and unread count
    /// stay untouched.
    pub fn clear_latest(&self) {
        self.store.write().clear_latest();
        self.publish();
    }

    pub fn mark_read(&self, notification_id: &str) {
        self.store.write().mark_read(notification_id);
        self.publish();
        let gateways = self.gateways.clone();
        let user_id = self.user_id.clone();
        let id = notification_id.to_string();
        tokio::spawn(async move {
            if let Err(e) = gateways.notifications.mark_read(&user_id, &id).await {
                tracing::warn!("marking notification {} read failed: {}", id, e);
            }
        });
    }

    pub fn mark_all_read(&self) {
        self.store.write().mark_all_read();
        self.publish();
        let gateways = self.gateways.clone();
        let user_id = self.user_id.clone();
        tokio::spawn(async move {
            if let Err(e) = gateways.notifications.mark_all_read(&user_id).await {
                tracing::warn!("marking all notifications read failed: {}", e);
            }
        });
    }

    pub fn delete(&self, notification_id: &str) {
        self.store.write().delete(notification_id);
        self.publish();
        let gateways = self.gateways.clone();
        let user_id = self.user_id.clone();
        let id = notification_id.to_string();
        tokio::spawn(async move {
            if let Err(e) = gateways.notifications.delete(&user_id, &id).await {
                tracing::warn!("deleting notification {} failed: {}", id, e);
            }
        });
    }

    /// Stop the listener task, dropping the backend subscription with it.
    pub fn shutdown(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
            tracing::debug!("notification listener for {} stopped", self.user_id);
        }
    }

    fn publish(&self) {
        let snapshot = self.store.read().snapshot();
        self.tx.send_replace(snapshot);
    }
}

impl Drop for NotificationCenter {
    fn drop(&mut self) {
        self.shutdown();
    }
}
