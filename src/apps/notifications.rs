//! Per-user notifications and the fan-out that produces them.
//!
//! Mutations in other apps finish their own writes first and then hand the
//! resulting events to the [`Dispatcher`]. The dispatcher persists
//! notifications and activity rows and pushes live events, but its methods
//! never fail: a broken side effect is logged and dropped so the mutation
//! that triggered it still succeeds.

pub mod dispatch;
pub mod live;
pub mod models;
pub mod services;
pub mod store;
pub mod urls;
pub mod views;

pub use dispatch::{Dispatcher, Notice, recipients};
pub use live::{LivePublisher, LiveSessions};
pub use models::{NewNotification, Notification, NotificationType};
pub use store::{NotificationStore, SqliteNotificationStore};
