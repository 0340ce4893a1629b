use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who may see an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Public,
    Private,
}

/// WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A single event as produced by the events gateway.
///
/// Immutable once fetched: the engine classifies and filters events but
/// never mutates one. `end` is optional; how an endless event ages out is
/// a policy decision made by [`crate::feed::TemporalPolicy`], not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub uid: String,
    pub kind: EventKind,
    pub owner_id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    /// Missing for events whose venue has no location yet; the spatial
    /// filter substitutes a sentinel distance for these.
    pub coordinate: Option<GeoPoint>,
    /// Category labels ("music", "sports", ...). Matching is OR semantics.
    pub tags: HashSet<String>,
    /// Entry price in the smallest currency unit. Zero means free.
    pub price: u32,
    /// Spontaneous short-notice event. Carried for the UI; the engine
    /// attaches no behavior to it.
    pub is_flash: bool,
}

impl Event {
    /// Whether the event's start falls inside `[from, to)`.
    pub fn starts_within(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.start >= from && self.start < to
    }
}
