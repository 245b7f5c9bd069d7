//! Append-only audit trail of project and task events.

pub mod models;
pub mod services;
pub mod store;
pub mod urls;
pub mod views;

pub use models::{ActivityEntry, NewActivity};
pub use store::{ActivityStore, SqliteActivityStore};
