use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a notification is about.
///
/// Each variant carries the ids the app needs to deep-link from the
/// notification to the thing it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationKind {
    /// Another user asked to become a friend.
    FriendRequest { from_user_id: String },
    /// An event the viewer joined is about to start.
    EventStarting { event_id: String },
    /// The viewer was invited into an organization.
    OrganizationInvite { organization_id: String },
    /// A friend invited the viewer to an event.
    EventInvite {
        event_id: String,
        from_user_id: String,
    },
}

/// One notification as delivered by the backend stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

impl Notification {
    pub fn is_unread(&self) -> bool {
        !self.is_read
    }
}
