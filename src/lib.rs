//! # hiveql-rs
//!
//! Async client for HiveServer2-style distributed query engines.
//!
//! The client owns one authenticated RPC session over one transport channel
//! and orchestrates statement execution: submit asynchronously, wait for a
//! terminal state, then fetch bounded row batches until exhaustion. The
//! transport sits behind the [`transport::CliService`] trait; a WebSocket
//! implementation is bundled.
//!
//! ## Example
//!
//! ```no_run
//! use hiveql_rs::{ConnectionParams, HiveClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let params = ConnectionParams::builder()
//!     .host("hive.internal")
//!     .username("etl")
//!     .password("secret")
//!     .build()?;
//!
//! let mut client = HiveClient::new(params);
//! client.connect().await?;
//!
//! let result = client
//!     .query_and_fetch_all("SELECT * FROM events LIMIT 1000")
//!     .await?;
//! println!("fetched {} rows", result.len());
//!
//! client.disconnect().await;
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod client;
pub mod connection;
pub mod error;
pub mod query;
pub mod transport;

// Re-export public API
pub use client::HiveClient;
pub use connection::{ConnectionBuilder, ConnectionParams};
pub use error::{ConnectionError, ErrorCode, HiveError, OperationError, SessionError};
pub use query::{drain_all, Operation, Row, RowSet, DEFAULT_FETCH_SIZE};
pub use transport::{CliService, FetchResult};
