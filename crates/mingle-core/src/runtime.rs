use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use tokio::sync::watch;

use crate::config::EngineConfig;
use crate::engagement::{Engagement, PinOutcome};
use crate::feed::{FeedAggregator, FeedSnapshot};
use crate::gateways::Gateways;
use crate::models::{Event, FilterCriteria};
use crate::notifications::NotificationCenter;

/// One viewer session over the engine.
///
/// Bundles the aggregator, the engagement sets and the notification
/// listener behind the surface the embedding application talks to. With
/// `viewer: None` the session is anonymous: the feed still works, while
/// favorites, pins, stories and notifications are disabled.
pub struct CoreRuntime {
    aggregator: Arc<FeedAggregator>,
    engagement: Option<Engagement>,
    notifications: Option<NotificationCenter>,
}

impl CoreRuntime {
    /// Build a session: load the viewer's engagement sets and start the
    /// notification listener. Only the notification subscription can fail
    /// here; everything else degrades instead.
    pub async fn start(
        gateways: Gateways,
        config: EngineConfig,
        viewer: Option<String>,
    ) -> Result<Self> {
        let aggregator = Arc::new(FeedAggregator::new(
            gateways.clone(),
            config,
            viewer.clone(),
        ));

        let (engagement, notifications) = match viewer {
            Some(user_id) => {
                let engagement = Engagement::new(gateways.clone(), user_id.clone());
                engagement.load().await;
                let center = NotificationCenter::start(gateways, user_id).await?;
                (Some(engagement), Some(center))
            }
            None => (None, None),
        };

        Ok(Self {
            aggregator,
            engagement,
            notifications,
        })
    }

    /// Run one aggregation pass and publish the resulting snapshot.
    pub async fn refresh(&self, criteria: &FilterCriteria) -> FeedSnapshot {
        let (favorites, pinned) = match &self.engagement {
            Some(engagement) => engagement.sets().await,
            None => (HashSet::new(), HashSet::new()),
        };
        self.aggregator.refresh(criteria, favorites, pinned).await
    }

    /// Watch snapshot publications.
    pub fn snapshots(&self) -> watch::Receiver<FeedSnapshot> {
        self.aggregator.subscribe()
    }

    pub fn current_snapshot(&self) -> FeedSnapshot {
        self.aggregator.current()
    }

    /// Toggle a favorite. `None` for anonymous sessions; otherwise whether
    /// the event is a favorite after the toggle settled. The published
    /// snapshot picks the change up on the next refresh.
    pub async fn toggle_favorite(&self, event_id: &str) -> Option<bool> {
        match &self.engagement {
            Some(engagement) => Some(engagement.toggle_favorite(event_id).await),
            None => {
                tracing::debug!("ignoring favorite toggle for {} without a viewer", event_id);
                None
            }
        }
    }

    /// Toggle a pin. `None` for anonymous sessions.
    pub async fn toggle_pinned(&self, event_id: &str, limit_message: &str) -> Option<PinOutcome> {
        match &self.engagement {
            Some(engagement) => Some(engagement.toggle_pin(event_id, limit_message).await),
            None => {
                tracing::debug!("ignoring pin toggle for {} without a viewer", event_id);
                None
            }
        }
    }

    /// Every event starting on the given UTC day, for the calendar view.
    pub async fn events_for_date(&self, date: NaiveDate) -> Vec<Event> {
        self.aggregator.events_for_date(date).await
    }

    /// Past events under the history policy.
    pub async fn history(&self) -> Vec<Event> {
        self.aggregator.history().await
    }

    /// The notification center, present for authenticated sessions.
    pub fn notifications(&self) -> Option<&NotificationCenter> {
        self.notifications.as_ref()
    }

    pub fn clear_latest_notification(&self) {
        if let Some(center) = &self.notifications {
            center.clear_latest();
        }
    }

    /// Tear the session down, stopping the notification listener.
    pub fn shutdown(&mut self) {
        if let Some(center) = &mut self.notifications {
            center.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateways::mock::MockBackend;
    use crate::models::{EventKind, Notification, NotificationKind};
    use chrono::{Duration, TimeZone, Utc};

    fn upcoming(uid: &str, in_secs: i64) -> crate::models::Event {
        crate::models::Event {
            uid: uid.to_string(),
            kind: EventKind::Public,
            owner_id: "owner".to_string(),
            title: uid.to_string(),
            start: Utc::now() + Duration::seconds(in_secs),
            end: None,
            coordinate: None,
            tags: HashSet::new(),
            price: 0,
            is_flash: false,
        }
    }

    fn notification(id: &str, created_at: i64) -> Notification {
        Notification {
            id: id.to_string(),
            kind: NotificationKind::FriendRequest {
                from_user_id: "other".to_string(),
            },
            created_at: Utc.timestamp_opt(created_at, 0).unwrap(),
            is_read: false,
        }
    }

    async fn settle(mut condition: impl FnMut() -> bool) {
        for _ in 0..100 {
            if condition() {
                return;
            }
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_authenticated_session_flow() {
        let backend = MockBackend::new();
        *backend.visible.lock() = vec![upcoming("a", 3600)];
        *backend.pins.lock() = vec!["a".to_string()];
        backend.favorites.lock().insert("a".to_string());

        let runtime = CoreRuntime::start(
            backend.gateways(),
            EngineConfig::default(),
            Some("me".to_string()),
        )
        .await
        .unwrap();

        let snapshot = runtime.refresh(&FilterCriteria::default()).await;
        assert_eq!(snapshot.events.len(), 1);
        assert!(snapshot.is_pinned("a"));
        assert!(snapshot.is_favorite("a"));
        assert!(runtime.notifications().is_some());
    }

    #[tokio::test]
    async fn test_anonymous_session_disables_engagement() {
        let backend = MockBackend::new();
        *backend.visible.lock() = vec![upcoming("a", 3600)];

        let runtime = CoreRuntime::start(backend.gateways(), EngineConfig::default(), None)
            .await
            .unwrap();

        let snapshot = runtime.refresh(&FilterCriteria::default()).await;
        assert_eq!(snapshot.events.len(), 1);
        assert!(runtime.toggle_favorite("a").await.is_none());
        assert!(runtime.toggle_pinned("a", "limit").await.is_none());
        assert!(runtime.notifications().is_none());
        // No engagement, so none of those gateways were touched.
        assert_eq!(backend.calls("pins.fetch"), 0);
        assert_eq!(backend.calls("favorites.fetch"), 0);
        runtime.clear_latest_notification();
    }

    #[tokio::test]
    async fn test_toggles_show_up_in_next_snapshot() {
        let backend = MockBackend::new();
        *backend.visible.lock() = vec![upcoming("a", 3600)];

        let runtime = CoreRuntime::start(
            backend.gateways(),
            EngineConfig::default(),
            Some("me".to_string()),
        )
        .await
        .unwrap();

        let snapshot = runtime.refresh(&FilterCriteria::default()).await;
        assert!(!snapshot.is_pinned("a"));

        assert_eq!(
            runtime.toggle_pinned("a", "limit").await,
            Some(PinOutcome::Pinned)
        );
        assert_eq!(runtime.toggle_favorite("a").await, Some(true));

        let snapshot = runtime.refresh(&FilterCriteria::default()).await;
        assert!(snapshot.is_pinned("a"));
        assert!(snapshot.is_favorite("a"));
    }

    #[tokio::test]
    async fn test_clear_latest_notification_delegates() {
        let backend = MockBackend::new();
        let runtime = CoreRuntime::start(
            backend.gateways(),
            EngineConfig::default(),
            Some("me".to_string()),
        )
        .await
        .unwrap();

        backend
            .push_notifications(vec![notification("a", 100)])
            .await;
        backend
            .push_notifications(vec![notification("a", 100), notification("b", 200)])
            .await;
        let center = runtime.notifications().unwrap();
        settle(|| center.snapshot().latest.is_some()).await;

        runtime.clear_latest_notification();
        assert!(center.snapshot().latest.is_none());
        assert_eq!(center.unread(), 2);
    }

    #[tokio::test]
    async fn test_shutdown_stops_notification_listener() {
        let backend = MockBackend::new();
        let mut runtime = CoreRuntime::start(
            backend.gateways(),
            EngineConfig::default(),
            Some("me".to_string()),
        )
        .await
        .unwrap();
        assert!(backend.has_subscriber());

        runtime.shutdown();
        settle(|| !backend.has_subscriber()).await;
        assert!(!backend.has_subscriber());
    }
}
