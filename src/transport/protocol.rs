//! CLI service abstraction trait.
//!
//! This module defines the `CliService` trait that abstracts the RPC transport
//! to the query engine. The client core drives it through a narrow contract
//! (open session, submit, poll, fetch, close) and never depends on a concrete
//! wire protocol.

use async_trait::async_trait;

use crate::connection::ConnectionParams;
use crate::error::TransportError;

use super::messages::{
    ExecuteStatementRequest, OpenSessionRequest, OperationHandle, OperationState, Row,
    SessionHandle,
};

/// One batch of fetched rows.
///
/// An empty `rows` vector is the authoritative exhaustion signal; `has_more_rows`
/// is advisory and servers are allowed to over-report it.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Rows in server order, at most `max_rows` of them
    pub rows: Vec<Row>,
    /// Whether the server expects further rows
    pub has_more_rows: bool,
}

/// RPC contract between the client core and the query engine.
///
/// Implementations own connection state, the authentication handshake, and
/// framing. All errors are transport-level; the client wraps them at each
/// call boundary.
#[async_trait]
pub trait CliService: Send + Sync {
    /// Open the channel to the server.
    ///
    /// Applies the configured timeout and, when secure mode is enabled,
    /// performs the authentication handshake before returning.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the channel cannot be opened or the
    /// handshake fails.
    async fn connect(&mut self, params: &ConnectionParams) -> Result<(), TransportError>;

    /// Open a new session.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the RPC fails or the response carries no
    /// session handle.
    async fn open_session(
        &mut self,
        request: OpenSessionRequest,
    ) -> Result<SessionHandle, TransportError>;

    /// Submit a statement for asynchronous execution.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the RPC fails.
    async fn execute_statement(
        &mut self,
        request: ExecuteStatementRequest,
    ) -> Result<OperationHandle, TransportError>;

    /// Poll the current state of an in-flight operation.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the RPC fails.
    async fn operation_status(
        &mut self,
        handle: &OperationHandle,
    ) -> Result<OperationState, TransportError>;

    /// Fetch the next batch of result rows, up to `max_rows`.
    ///
    /// Bounds checking on `max_rows` is owned by the server side of this
    /// contract.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the RPC fails.
    async fn fetch_results(
        &mut self,
        handle: &OperationHandle,
        max_rows: i64,
    ) -> Result<FetchResult, TransportError>;

    /// Close a session on the server.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the RPC fails.
    async fn close_session(&mut self, handle: &SessionHandle) -> Result<(), TransportError>;

    /// Close the channel. Safe to call when already closed.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if teardown fails.
    async fn close(&mut self) -> Result<(), TransportError>;

    /// Check whether the channel is currently open.
    fn is_connected(&self) -> bool;
}
