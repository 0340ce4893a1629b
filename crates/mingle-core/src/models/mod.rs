pub mod criteria;
pub mod event;
pub mod notification;
pub mod organization;
pub mod story;

pub use criteria::{FilterCriteria, NearFilter, PriceRange};
pub use event::{Event, EventKind, GeoPoint};
pub use notification::{Notification, NotificationKind};
pub use organization::Organization;
pub use story::{Story, StorySummary};
