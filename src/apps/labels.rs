//! Global task labels.

pub mod models;
pub mod services;
pub mod urls;
pub mod views;

pub use models::Label;
