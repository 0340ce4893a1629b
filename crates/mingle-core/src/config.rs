use chrono::Duration;

use crate::constants::{
    DEFAULT_SENTINEL_DISTANCE_KM, DEFAULT_STORY_FETCH_CAP, HISTORY_ASSUMED_DURATION_SECS,
};

/// Engine configuration. Plain values, no file I/O; the embedding
/// application decides where these come from.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Stand-in distance for events without a coordinate (see
    /// [`crate::constants::DEFAULT_SENTINEL_DISTANCE_KM`]).
    pub sentinel_distance_km: f64,
    /// How many surviving events get their stories fetched per refresh.
    pub story_fetch_cap: usize,
    /// Assumed duration for no-end events under the history policy.
    pub history_assumed_duration: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sentinel_distance_km: DEFAULT_SENTINEL_DISTANCE_KM,
            story_fetch_cap: DEFAULT_STORY_FETCH_CAP,
            history_assumed_duration: Duration::seconds(HISTORY_ASSUMED_DURATION_SECS),
        }
    }
}
