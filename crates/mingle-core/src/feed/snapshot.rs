use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Event, Organization, StorySummary};

/// The independent sources a refresh pass fans out to.
///
/// Pin and favorite loads are session state owned by the engagement
/// service, not refresh sources, so their failures are logged there
/// instead of being recorded here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedSource {
    VisibleEvents,
    OwnedEvents,
    JoinedEvents,
    Organizations,
    Friends,
    Stories,
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::VisibleEvents => "visible events",
            Self::OwnedEvents => "owned events",
            Self::JoinedEvents => "joined events",
            Self::Organizations => "organizations",
            Self::Friends => "friends",
            Self::Stories => "stories",
        };
        f.write_str(name)
    }
}

/// A source that failed during a pass. The pass still completed; the
/// failed source contributed nothing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source: FeedSource,
    pub message: String,
}

/// One immutable output of a refresh pass.
///
/// Snapshots are fully replaced, never patched: consumers either see the
/// previous complete snapshot or the next one, nothing in between.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedSnapshot {
    /// Events surviving every active filter, most imminent first.
    pub events: Vec<Event>,
    pub organizations: Vec<Organization>,
    /// Story digests keyed by event id, present only for the capped subset
    /// of most imminent events.
    pub stories: HashMap<String, StorySummary>,
    pub favorites: HashSet<String>,
    pub pinned: HashSet<String>,
    pub is_loading: bool,
    /// Sources that failed during this pass, in fan-out order.
    pub failures: Vec<SourceFailure>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl FeedSnapshot {
    /// The placeholder published while the first pass is in flight.
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            ..Default::default()
        }
    }

    /// The most recent source failure, for display as a non-fatal banner.
    pub fn last_error(&self) -> Option<&SourceFailure> {
        self.failures.last()
    }

    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn is_pinned(&self, event_id: &str) -> bool {
        self.pinned.contains(event_id)
    }

    pub fn is_favorite(&self, event_id: &str) -> bool {
        self.favorites.contains(event_id)
    }
}
