use thiserror::Error;

use crate::feed::FeedSource;

/// Transport-level failure raised by a source gateway.
///
/// Gateways are the only place these originate; the aggregator catches them
/// at the fan-out boundary and degrades the failed source to an empty
/// contribution instead of propagating.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("backend unavailable")]
    Unavailable,
}

/// Engine-level error taxonomy.
///
/// None of these cross the public API as `Err` values: `SourceUnavailable`
/// is recorded on the snapshot, `CapacityExceeded` becomes a
/// [`crate::engagement::PinOutcome::LimitReached`], `ReconciliationRequired`
/// triggers an authoritative reload, and `StaleRefresh` is discarded
/// silently. They exist so the internal control flow names what happened.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A gateway call failed; the source degrades to an empty contribution.
    #[error("{origin} source unavailable: {cause}")]
    SourceUnavailable {
        origin: FeedSource,
        cause: GatewayError,
    },

    /// A pin toggle was rejected locally because it would exceed the cap.
    /// The backend is never called for these.
    #[error("pin limit of {limit} reached")]
    CapacityExceeded { limit: usize },

    /// An optimistic pin/favorite write failed after the local edit was
    /// applied; the authoritative set must be re-fetched.
    #[error("optimistic {operation} failed, reloading authoritative state: {cause}")]
    ReconciliationRequired {
        operation: &'static str,
        cause: GatewayError,
    },

    /// A refresh was superseded by a newer one before completing. Its
    /// result is discarded, not reported.
    #[error("refresh superseded by a newer pass")]
    StaleRefresh,
}
