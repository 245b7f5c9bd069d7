//! Checklist items under a task.

pub mod models;
pub mod services;
pub mod urls;
pub mod views;

pub use models::Subtask;
