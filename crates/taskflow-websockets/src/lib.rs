//! # TaskFlow live channels
//!
//! Each authenticated user holds zero or more WebSocket connections. Events
//! addressed to a user are delivered to every connection that user currently
//! holds, and to nobody else.
//!
//! ## Protocol
//!
//! Server to client, one JSON text frame per event:
//!
//! ```json
//! {"event": "newNotification", "data": { ... }}
//! {"event": "unreadCount", "data": {"count": 3}}
//! {"event": "notificationRead", "data": {"notificationId": "..."}}
//! {"event": "pong"}
//! ```
//!
//! Client to server: `{"event": "ping"}`.
//!
//! The bearer token is taken from the `Authorization` header of the upgrade
//! request or, failing that, from a `token` query parameter.

pub mod connection;
pub mod registry;
pub mod server;

pub use connection::{ClientEvent, LiveConnection, LiveEvent, WebSocketError, WebSocketResult};
pub use registry::ChannelRegistry;
pub use server::{LiveServer, SessionAuthenticator, extract_token};
