use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Event;

/// Where an event sits relative to a reference instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemporalStatus {
    Past,
    Live,
    Upcoming,
}

/// Classifies events as Past, Live or Upcoming.
///
/// The only knob is what to assume for events without an end time. The main
/// feed uses [`point_in_time`](Self::point_in_time): a no-end event is over
/// the instant its start has elapsed. The history view uses
/// [`assumed_duration`](Self::assumed_duration) so a recently started
/// no-end event is not shelved into history while plausibly still running.
/// Same classifier, different parameter, so the two call sites cannot
/// drift apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TemporalPolicy {
    default_duration_if_no_end: Duration,
}

impl TemporalPolicy {
    /// No grace window: a no-end event is Past once `start` has elapsed.
    pub fn point_in_time() -> Self {
        Self {
            default_duration_if_no_end: Duration::zero(),
        }
    }

    /// Synthesize `start + duration` as the end for no-end events.
    pub fn assumed_duration(duration: Duration) -> Self {
        Self {
            default_duration_if_no_end: duration,
        }
    }

    pub fn classify(&self, event: &Event, now: DateTime<Utc>) -> TemporalStatus {
        if event.start > now {
            return TemporalStatus::Upcoming;
        }
        let end = event.end.or_else(|| {
            if self.default_duration_if_no_end > Duration::zero() {
                Some(event.start + self.default_duration_if_no_end)
            } else {
                None
            }
        });
        match end {
            Some(end) if end >= now => TemporalStatus::Live,
            _ => TemporalStatus::Past,
        }
    }

    /// True when the event belongs in the main feed (Live or Upcoming).
    pub fn is_current(&self, event: &Event, now: DateTime<Utc>) -> bool {
        self.classify(event, now) != TemporalStatus::Past
    }
}
