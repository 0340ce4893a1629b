pub mod favorite_store;
pub mod notification_store;
pub mod pin_store;

pub use favorite_store::FavoriteStore;
pub use notification_store::{NotificationSnapshot, NotificationStore};
pub use pin_store::PinStore;
