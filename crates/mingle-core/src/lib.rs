pub mod config;
pub mod constants;
pub mod engagement;
pub mod error;
pub mod feed;
pub mod gateways;
pub mod models;
pub mod notifications;
pub mod runtime;
pub mod store;

// Re-export the session surface at the crate root for convenience
pub use config::EngineConfig;
pub use engagement::PinOutcome;
pub use error::{EngineError, GatewayError};
pub use feed::{FeedSnapshot, FeedSource, SourceFailure};
pub use gateways::Gateways;
pub use models::FilterCriteria;
pub use notifications::NotificationCenter;
pub use runtime::CoreRuntime;
pub use store::NotificationSnapshot;
