//! Task discussion threads with `@email` mentions.

pub mod mentions;
pub mod models;
pub mod services;
pub mod urls;
pub mod views;

pub use models::{Comment, CommentWithAuthor};
