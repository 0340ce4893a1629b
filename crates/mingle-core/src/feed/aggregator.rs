use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use futures::future;
use parking_lot::Mutex;
use tokio::sync::watch;

use super::filter::{visible_stories, FeedFilter};
use super::snapshot::{FeedSnapshot, FeedSource, SourceFailure};
use super::temporal::{TemporalPolicy, TemporalStatus};
use crate::config::EngineConfig;
use crate::error::{EngineError, GatewayError};
use crate::gateways::{GatewayResult, Gateways};
use crate::models::{Event, FilterCriteria, StorySummary};

/// Orchestrates one refresh pass over every source and publishes the
/// resulting [`FeedSnapshot`] to subscribers.
///
/// Each refresh fans out to the gateways concurrently, merges their
/// results behind a single barrier, filters, and publishes exactly one new
/// snapshot. A refresh started later always wins: an older in-flight pass
/// that finishes after a newer one began publishes nothing.
pub struct FeedAggregator {
    gateways: Gateways,
    config: EngineConfig,
    viewer: Option<String>,
    generation: AtomicU64,
    // Guards the generation check and snapshot publication as one step.
    publish: Mutex<()>,
    tx: watch::Sender<FeedSnapshot>,
}

impl FeedAggregator {
    pub fn new(gateways: Gateways, config: EngineConfig, viewer: Option<String>) -> Self {
        let (tx, _rx) = watch::channel(FeedSnapshot::loading());
        Self {
            gateways,
            config,
            viewer,
            generation: AtomicU64::new(0),
            publish: Mutex::new(()),
            tx,
        }
    }

    /// Subscribe to snapshot publications. The receiver immediately holds
    /// the latest published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.tx.subscribe()
    }

    /// The latest published snapshot.
    pub fn current(&self) -> FeedSnapshot {
        self.tx.borrow().clone()
    }

    /// Run one full aggregation pass with the given criteria and the
    /// engine's current favorite and pinned sets.
    ///
    /// Never fails: individual source failures degrade to empty
    /// contributions and are recorded on the snapshot. Returns the
    /// snapshot this pass published, or the latest published one when the
    /// pass was superseded mid-flight.
    pub async fn refresh(
        &self,
        criteria: &FilterCriteria,
        favorites: HashSet<String>,
        pinned: HashSet<String>,
    ) -> FeedSnapshot {
        self.refresh_at(criteria, favorites, pinned, Utc::now())
            .await
    }

    async fn refresh_at(
        &self,
        criteria: &FilterCriteria,
        favorites: HashSet<String>,
        pinned: HashSet<String>,
        now: DateTime<Utc>,
    ) -> FeedSnapshot {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("feed refresh {} started", generation);

        // Re-publish the current snapshot with the loading flag raised so
        // consumers can show progress without losing the stale content.
        let mut loading = self.current();
        loading.is_loading = true;
        self.publish_if_current(generation, loading);

        let ((mut events, mut failures), organizations, friends) = tokio::join!(
            self.merge_events(),
            self.gateways.organizations.fetch_all(),
            self.fetch_friend_ids(),
        );
        let organizations =
            unwrap_or_record(organizations, FeedSource::Organizations, &mut failures);
        let friends = unwrap_or_record(friends, FeedSource::Friends, &mut failures);

        let filter = FeedFilter::new(
            criteria,
            TemporalPolicy::point_in_time(),
            self.config.sentinel_distance_km,
            &favorites,
            now,
        );
        events.retain(|event| filter.admits(event));
        sort_most_imminent_first(&mut events);

        let stories = self
            .fetch_story_summaries(&events, &friends, &mut failures)
            .await;

        let snapshot = FeedSnapshot {
            events,
            organizations,
            stories,
            favorites,
            pinned,
            is_loading: false,
            failures,
            refreshed_at: Some(now),
        };

        if self.publish_if_current(generation, snapshot.clone()) {
            tracing::debug!(
                "feed refresh {} published {} events",
                generation,
                snapshot.events.len()
            );
            snapshot
        } else {
            tracing::debug!("feed refresh {}: {}", generation, EngineError::StaleRefresh);
            self.current()
        }
    }

    /// The viewer's past events under the history policy, most recent
    /// first. History is personal: only owned and joined events qualify,
    /// an event that was merely visible never enters it, and anonymous
    /// sessions get an empty list.
    ///
    /// History is a query, not a publication: it runs its own event
    /// fan-out and leaves the published snapshot untouched.
    pub async fn history(&self) -> Vec<Event> {
        self.history_at(Utc::now()).await
    }

    async fn history_at(&self, now: DateTime<Utc>) -> Vec<Event> {
        let (mut events, _failures) = self.merge_viewer_events().await;
        let policy = TemporalPolicy::assumed_duration(self.config.history_assumed_duration);
        events.retain(|event| policy.classify(event, now) == TemporalStatus::Past);
        events.sort_by(|a, b| b.start.cmp(&a.start).then_with(|| a.uid.cmp(&b.uid)));
        events
    }

    /// Every merged event starting on the given UTC day, unfiltered,
    /// earliest first. Powers the calendar view.
    pub async fn events_for_date(&self, date: NaiveDate) -> Vec<Event> {
        let (mut events, _failures) = self.merge_events().await;
        let day_start = Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default());
        let day_end = day_start + chrono::Duration::days(1);
        events.retain(|event| event.starts_within(day_start, day_end));
        sort_most_imminent_first(&mut events);
        events
    }

    /// Fetch visible, owned and joined events concurrently and merge them,
    /// de-duplicated by uid with the first occurrence winning.
    async fn merge_events(&self) -> (Vec<Event>, Vec<SourceFailure>) {
        let mut failures = Vec::new();

        let (visible, owned, joined_ids) = tokio::join!(
            self.gateways.events.fetch_visible(),
            self.fetch_owned(),
            self.fetch_joined_ids(),
        );
        let visible = unwrap_or_record(visible, FeedSource::VisibleEvents, &mut failures);
        let owned = unwrap_or_record(owned, FeedSource::OwnedEvents, &mut failures);
        let joined_ids = unwrap_or_record(joined_ids, FeedSource::JoinedEvents, &mut failures);

        let mut by_uid: HashMap<String, Event> = HashMap::new();
        for event in visible.into_iter().chain(owned) {
            by_uid.entry(event.uid.clone()).or_insert(event);
        }
        self.resolve_joined(joined_ids, &mut by_uid, &mut failures)
            .await;

        (by_uid.into_values().collect(), failures)
    }

    /// Merge only the viewer's own slice, owned plus joined, leaving the
    /// visible source out. Feeds the history view.
    async fn merge_viewer_events(&self) -> (Vec<Event>, Vec<SourceFailure>) {
        let mut failures = Vec::new();

        let (owned, joined_ids) = tokio::join!(self.fetch_owned(), self.fetch_joined_ids());
        let owned = unwrap_or_record(owned, FeedSource::OwnedEvents, &mut failures);
        let joined_ids = unwrap_or_record(joined_ids, FeedSource::JoinedEvents, &mut failures);

        let mut by_uid: HashMap<String, Event> = HashMap::new();
        for event in owned {
            by_uid.entry(event.uid.clone()).or_insert(event);
        }
        self.resolve_joined(joined_ids, &mut by_uid, &mut failures)
            .await;

        (by_uid.into_values().collect(), failures)
    }

    /// Joined ids arrive bare and must be resolved to full events, unless
    /// another source already supplied them.
    async fn resolve_joined(
        &self,
        joined_ids: Vec<String>,
        by_uid: &mut HashMap<String, Event>,
        failures: &mut Vec<SourceFailure>,
    ) {
        let missing: Vec<String> = joined_ids
            .into_iter()
            .filter(|id| !by_uid.contains_key(id))
            .collect();
        if missing.is_empty() {
            return;
        }

        let resolved = future::join_all(
            missing
                .iter()
                .map(|id| self.gateways.events.fetch_event(id)),
        )
        .await;
        let mut first_error: Option<GatewayError> = None;
        for (id, result) in missing.iter().zip(resolved) {
            match result {
                Ok(Some(event)) => {
                    by_uid.entry(event.uid.clone()).or_insert(event);
                }
                Ok(None) => {
                    tracing::debug!("joined event {} no longer exists", id);
                }
                Err(e) => {
                    tracing::warn!("resolving joined event {} failed: {}", id, e);
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(cause) = first_error {
            failures.push(SourceFailure {
                source: FeedSource::JoinedEvents,
                message: cause.to_string(),
            });
        }
    }

    /// Fetch and visibility-filter stories for the most imminent surviving
    /// events, up to the configured cap. Skipped entirely for anonymous
    /// viewers, who can never see any story.
    async fn fetch_story_summaries(
        &self,
        events: &[Event],
        friends: &HashSet<String>,
        failures: &mut Vec<SourceFailure>,
    ) -> HashMap<String, StorySummary> {
        let Some(viewer_id) = &self.viewer else {
            return HashMap::new();
        };

        let targets: Vec<&Event> = events.iter().take(self.config.story_fetch_cap).collect();
        let results = future::join_all(
            targets
                .iter()
                .map(|event| self.gateways.stories.fetch_for_event(&event.uid)),
        )
        .await;

        let mut summaries = HashMap::new();
        let mut first_error: Option<GatewayError> = None;
        for (event, result) in targets.iter().zip(results) {
            match result {
                Ok(raw) => {
                    let visible = visible_stories(raw, viewer_id, friends);
                    if !visible.is_empty() {
                        summaries.insert(event.uid.clone(), StorySummary::from_visible(visible));
                    }
                }
                Err(e) => {
                    tracing::warn!("story fetch for event {} failed: {}", event.uid, e);
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(cause) = first_error {
            failures.push(SourceFailure {
                source: FeedSource::Stories,
                message: cause.to_string(),
            });
        }
        summaries
    }

    async fn fetch_owned(&self) -> GatewayResult<Vec<Event>> {
        match &self.viewer {
            Some(viewer_id) => self.gateways.events.fetch_owned(viewer_id).await,
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_joined_ids(&self) -> GatewayResult<Vec<String>> {
        match &self.viewer {
            Some(viewer_id) => self.gateways.events.fetch_joined_ids(viewer_id).await,
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_friend_ids(&self) -> GatewayResult<HashSet<String>> {
        match &self.viewer {
            Some(viewer_id) => self.gateways.friends.fetch_friend_ids(viewer_id).await,
            None => Ok(HashSet::new()),
        }
    }

    /// Publish `snapshot` unless a newer refresh has started since
    /// `generation` was taken. Returns whether the publication happened.
    fn publish_if_current(&self, generation: u64, snapshot: FeedSnapshot) -> bool {
        let _guard = self.publish.lock();
        if self.generation.load(Ordering::SeqCst) == generation {
            self.tx.send_replace(snapshot);
            true
        } else {
            false
        }
    }
}

fn sort_most_imminent_first(events: &mut [Event]) {
    events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.uid.cmp(&b.uid)));
}

fn unwrap_or_record<T: Default>(
    result: GatewayResult<T>,
    source: FeedSource,
    failures: &mut Vec<SourceFailure>,
) -> T {
    match result {
        Ok(value) => value,
        Err(cause) => {
            let message = cause.to_string();
            tracing::warn!(
                "{}",
                EngineError::SourceUnavailable {
                    origin: source,
                    cause: cause.clone()
                }
            );
            failures.push(SourceFailure { source, message });
            T::default()
        }
    }
}
