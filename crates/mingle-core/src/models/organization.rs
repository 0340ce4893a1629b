use serde::{Deserialize, Serialize};

/// An organization that hosts events. Fetched alongside events on every
/// refresh pass so the feed can render organization cards next to events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub uid: String,
    pub name: String,
    pub admin_id: String,
    pub member_ids: Vec<String>,
    pub description: Option<String>,
}
