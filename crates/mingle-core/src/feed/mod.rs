pub mod aggregator;
pub mod filter;
pub mod snapshot;
pub mod spatial;
pub mod temporal;

pub use aggregator::FeedAggregator;
pub use snapshot::{FeedSnapshot, FeedSource, SourceFailure};
pub use spatial::haversine_km;
pub use temporal::{TemporalPolicy, TemporalStatus};
