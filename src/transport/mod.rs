//! RPC transport layer.
//!
//! The [`CliService`] trait is the narrow contract the client core drives;
//! [`WebSocketCliService`] is the bundled implementation speaking JSON over a
//! WebSocket channel.

pub mod messages;
pub mod protocol;
pub mod websocket;

pub use protocol::{CliService, FetchResult};
pub use websocket::WebSocketCliService;
