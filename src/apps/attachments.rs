//! Attachment metadata on tasks. Files themselves live elsewhere; only the
//! URL is stored.

pub mod models;
pub mod services;
pub mod urls;
pub mod views;

pub use models::Attachment;
