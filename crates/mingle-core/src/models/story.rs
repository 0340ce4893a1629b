use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A story attached to one event.
///
/// `seen` is viewer-specific and supplied by the backend together with the
/// story; the engine only counts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    pub event_id: String,
    pub author_id: String,
    pub posted_at: DateTime<Utc>,
    pub media_url: Option<String>,
    pub seen: bool,
}

/// Per-event story digest carried by the feed snapshot.
///
/// Holds only the stories that survived the visibility filter (self +
/// confirmed friends), newest first, annotated with authorship so the
/// caller can render seen/unseen rings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorySummary {
    pub stories: Vec<Story>,
    pub total: usize,
    pub unseen: usize,
}

impl StorySummary {
    /// Build a summary from an already visibility-filtered story list.
    pub fn from_visible(mut stories: Vec<Story>) -> Self {
        stories.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
        let total = stories.len();
        let unseen = stories.iter().filter(|s| !s.seen).count();
        Self {
            stories,
            total,
            unseen,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    pub fn has_unseen(&self) -> bool {
        self.unseen > 0
    }
}
