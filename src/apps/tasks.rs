//! Tasks, their assignees and labels.

pub mod filters;
pub mod models;
pub mod serializers;
pub mod services;
pub mod urls;
pub mod views;

pub use models::{Task, TaskDetail, TaskPriority, TaskStatus};
