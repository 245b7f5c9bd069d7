//! Free-text search over the tasks and comments a caller can read.

pub mod services;
pub mod urls;
pub mod views;
