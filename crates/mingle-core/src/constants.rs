//! Application-wide constants
//!
//! Centralized location for magic numbers and default values that are
//! used across multiple modules.

/// Maximum number of events a user may pin at once.
///
/// The cap is enforced locally before any backend call: a toggle that would
/// exceed it is rejected without touching the network.
pub const PIN_LIMIT: usize = 3;

/// Distance (km) substituted for events that carry no coordinate.
///
/// Chosen to sit strictly between the smallest (10 km) and largest (100 km)
/// radius the product's filter UI offers, so a location-less event is
/// included under a generous radius and excluded under a tight one.
pub const DEFAULT_SENTINEL_DISTANCE_KM: f64 = 30.0;

/// How many of the most imminent surviving events get their stories fetched
/// per refresh pass.
pub const DEFAULT_STORY_FETCH_CAP: usize = 10;

/// Assumed duration (seconds) for events without an explicit end when the
/// history view decides whether they are over.
pub const HISTORY_ASSUMED_DURATION_SECS: i64 = 3 * 60 * 60;

// Radius bounds offered by the product's filter UI. The engine itself never
// clamps to these; they document the range the sentinel must sit inside.
pub const MIN_FILTER_RADIUS_KM: f64 = 10.0;
pub const MAX_FILTER_RADIUS_KM: f64 = 100.0;
