//! # TaskFlow Core
//!
//! Building blocks shared by the TaskFlow HTTP service and live channel:
//!
//! - [`exception`]: the error taxonomy and JSON error envelope
//! - [`pagination`]: page-number pagination with `{ data, meta }` pages
//! - [`permissions`]: pure project role resolution and action gating

pub mod exception;
pub mod pagination;
pub mod permissions;

pub use exception::{Error, Result};
