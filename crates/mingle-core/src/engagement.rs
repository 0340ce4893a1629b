use std::collections::HashSet;

use tokio::sync::Mutex;

use crate::constants::PIN_LIMIT;
use crate::error::{EngineError, GatewayError};
use crate::gateways::Gateways;
use crate::store::{FavoriteStore, PinStore};

/// Result of a pin toggle, surfaced synchronously to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinOutcome {
    Pinned,
    Unpinned,
    /// The cap would be exceeded. The backend was never called, the set is
    /// unchanged, and `message` is the caller-supplied rejection text.
    LimitReached { message: String },
}

/// Optimistically updated favorite and pinned sets for one viewer.
///
/// Every mutation follows the same protocol: edit the local store first,
/// then call the backend. On backend failure the authoritative set is
/// re-fetched and replaces the local copy wholesale; the optimistic edit
/// is never inverted, which stays correct when another device changed the
/// set in the meantime.
///
/// One async mutex owns both stores and is held across the backend call,
/// so concurrent toggles serialize and cannot race past the pin cap.
pub struct Engagement {
    gateways: Gateways,
    user_id: String,
    inner: Mutex<Sets>,
}

struct Sets {
    pins: PinStore,
    favorites: FavoriteStore,
}

impl Engagement {
    pub fn new(gateways: Gateways, user_id: String) -> Self {
        Self {
            gateways,
            user_id,
            inner: Mutex::new(Sets {
                pins: PinStore::new(PIN_LIMIT),
                favorites: FavoriteStore::new(),
            }),
        }
    }

    /// Load both authoritative sets. A failed fetch leaves that local set
    /// as it was and logs; the session continues.
    pub async fn load(&self) {
        let (pins, favorites) = tokio::join!(
            self.gateways.pins.fetch(&self.user_id),
            self.gateways.favorites.fetch(&self.user_id),
        );
        let mut sets = self.inner.lock().await;
        match pins {
            Ok(ids) => sets.pins.replace_all(ids),
            Err(e) => tracing::warn!("loading pinned set failed: {}", e),
        }
        match favorites {
            Ok(ids) => sets.favorites.replace_all(ids),
            Err(e) => tracing::warn!("loading favorite set failed: {}", e),
        }
    }

    /// Current `(favorites, pinned)` id sets.
    pub async fn sets(&self) -> (HashSet<String>, HashSet<String>) {
        let sets = self.inner.lock().await;
        (sets.favorites.as_set(), sets.pins.as_set())
    }

    /// Toggle a pin. Pinning a fourth event is rejected locally with
    /// `limit_message`; the backend never sees the attempt.
    pub async fn toggle_pin(&self, event_id: &str, limit_message: &str) -> PinOutcome {
        let mut sets = self.inner.lock().await;
        if sets.pins.contains(event_id) {
            sets.pins.remove(event_id);
            if let Err(cause) = self.gateways.pins.remove(&self.user_id, event_id).await {
                self.reconcile_pins(&mut sets, "unpin", cause).await;
                return self.pin_state(&sets, event_id);
            }
            PinOutcome::Unpinned
        } else if sets.pins.is_full() {
            tracing::info!(
                "{}",
                EngineError::CapacityExceeded {
                    limit: sets.pins.limit()
                }
            );
            PinOutcome::LimitReached {
                message: limit_message.to_string(),
            }
        } else {
            sets.pins.insert(event_id);
            if let Err(cause) = self.gateways.pins.add(&self.user_id, event_id).await {
                self.reconcile_pins(&mut sets, "pin", cause).await;
                return self.pin_state(&sets, event_id);
            }
            PinOutcome::Pinned
        }
    }

    /// Toggle a favorite. Returns whether the event is a favorite after
    /// the toggle (and any reconciliation) settled.
    pub async fn toggle_favorite(&self, event_id: &str) -> bool {
        let mut sets = self.inner.lock().await;
        if sets.favorites.contains(event_id) {
            sets.favorites.remove(event_id);
            if let Err(cause) = self.gateways.favorites.remove(&self.user_id, event_id).await {
                self.reconcile_favorites(&mut sets, "unfavorite", cause).await;
            }
        } else {
            sets.favorites.insert(event_id);
            if let Err(cause) = self.gateways.favorites.add(&self.user_id, event_id).await {
                self.reconcile_favorites(&mut sets, "favorite", cause).await;
            }
        }
        sets.favorites.contains(event_id)
    }

    /// Replace the local pinned set with a re-fetched authoritative copy.
    /// When the reload fails too, the optimistic copy stays until the next
    /// successful load.
    async fn reconcile_pins(&self, sets: &mut Sets, operation: &'static str, cause: GatewayError) {
        tracing::warn!("{}", EngineError::ReconciliationRequired { operation, cause });
        match self.gateways.pins.fetch(&self.user_id).await {
            Ok(ids) => sets.pins.replace_all(ids),
            Err(e) => tracing::warn!("authoritative pin reload failed: {}", e),
        }
    }

    async fn reconcile_favorites(
        &self,
        sets: &mut Sets,
        operation: &'static str,
        cause: GatewayError,
    ) {
        tracing::warn!("{}", EngineError::ReconciliationRequired { operation, cause });
        match self.gateways.favorites.fetch(&self.user_id).await {
            Ok(ids) => sets.favorites.replace_all(ids),
            Err(e) => tracing::warn!("authoritative favorite reload failed: {}", e),
        }
    }

    /// Outcome after reconciliation: report what the settled set says.
    fn pin_state(&self, sets: &Sets, event_id: &str) -> PinOutcome {
        if sets.pins.contains(event_id) {
            PinOutcome::Pinned
        } else {
            PinOutcome::Unpinned
        }
    }
}
