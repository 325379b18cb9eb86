pub mod defs;
pub mod recording;

pub use defs::{DeliveryError, Notification, NotificationKind, Notifier};
pub use recording::RecordingNotifier;
