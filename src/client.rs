//! Client facade: session lifecycle and statement orchestration.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::connection::ConnectionParams;
use crate::error::{ConnectionError, HiveError, SessionError};
use crate::query::results::{drain_all, RowSet, DEFAULT_FETCH_SIZE};
use crate::query::{clean, Operation};
use crate::transport::messages::{
    ExecuteStatementRequest, OpenSessionRequest, SessionHandle,
};
use crate::transport::{CliService, WebSocketCliService};

/// Session state. Connected implies a live channel and a server-issued
/// session handle; there is no in-between.
#[derive(Debug, Clone)]
enum ClientState {
    Disconnected,
    Connected { session: SessionHandle },
}

/// Client for a HiveServer2-style query engine.
///
/// Owns exactly one RPC session over one transport channel. All calls take
/// `&mut self`; concurrent use of one session requires external
/// synchronization.
///
/// # Example
///
/// ```no_run
/// use hiveql_rs::{ConnectionParams, HiveClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let params = ConnectionParams::builder()
///     .host("hive.internal")
///     .username("etl")
///     .password("secret")
///     .timeout_secs(30)
///     .build()?;
///
/// let mut client = HiveClient::new(params);
/// client.connect().await?;
///
/// let result = client
///     .query_and_fetch_all("SELECT id, name FROM users")
///     .await?;
/// for row in result {
///     println!("{:?}", row);
/// }
///
/// client.disconnect().await;
/// # Ok(())
/// # }
/// ```
pub struct HiveClient {
    /// Connection parameters
    params: ConnectionParams,
    /// Transport shared with operations spawned from this session
    transport: Arc<Mutex<dyn CliService>>,
    /// Current session state
    state: ClientState,
}

impl HiveClient {
    /// Create a client using the bundled WebSocket transport.
    pub fn new(params: ConnectionParams) -> Self {
        Self::with_transport(params, Arc::new(Mutex::new(WebSocketCliService::new())))
    }

    /// Create a client over a caller-supplied transport.
    pub fn with_transport(params: ConnectionParams, transport: Arc<Mutex<dyn CliService>>) -> Self {
        Self {
            params,
            transport,
            state: ClientState::Disconnected,
        }
    }

    /// The connection parameters this client was built with.
    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    /// Whether a session is currently open.
    pub fn is_connected(&self) -> bool {
        matches!(self.state, ClientState::Connected { .. })
    }

    /// The current session handle, when connected.
    pub fn session_handle(&self) -> Option<&SessionHandle> {
        match &self.state {
            ClientState::Connected { session } => Some(session),
            ClientState::Disconnected => None,
        }
    }

    /// Open the transport channel and start a session.
    ///
    /// Idempotent: when a session is already open this returns its handle
    /// without issuing any RPC. Credentials are sent with the open-session
    /// request only when both username and password are configured.
    ///
    /// On any failure the client is left disconnected with the channel
    /// closed, so a subsequent call retries from scratch.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError` wrapping the original failure.
    pub async fn connect(&mut self) -> Result<SessionHandle, HiveError> {
        if let ClientState::Connected { session } = &self.state {
            debug!(session = %session, "session already open, reusing");
            return Ok(session.clone());
        }

        let mut transport = self.transport.lock().await;

        transport
            .connect(&self.params)
            .await
            .map_err(|e| ConnectionError::TransportOpen {
                host: self.params.host.clone(),
                port: self.params.port,
                message: e.to_string(),
                source: e,
            })?;

        let request = match (
            self.params.username.clone(),
            self.params.password().map(str::to_string),
        ) {
            (Some(username), Some(password)) => {
                OpenSessionRequest::with_credentials(username, password)
            }
            _ => OpenSessionRequest::anonymous(),
        };

        let session = match transport.open_session(request).await {
            Ok(session) => session,
            Err(e) => {
                // Tear the channel down so the next connect starts clean.
                let _ = transport.close().await;
                return Err(ConnectionError::OpenSession {
                    message: e.to_string(),
                    source: e,
                }
                .into());
            }
        };
        drop(transport);

        debug!(session = %session, host = %self.params.host, "session opened");
        self.state = ClientState::Connected {
            session: session.clone(),
        };
        Ok(session)
    }

    /// Close the session and the underlying channel.
    ///
    /// A failed close-session request is swallowed by design: local cleanup
    /// takes priority over strict close semantics, so the session handle is
    /// always cleared and the channel always closed. Calling this without an
    /// open session issues no RPC, but a channel left open on the transport
    /// (possible with [`HiveClient::with_transport`]) is still torn down.
    pub async fn disconnect(&mut self) {
        let previous = std::mem::replace(&mut self.state, ClientState::Disconnected);
        let mut transport = self.transport.lock().await;

        if let ClientState::Connected { session } = previous {
            if let Err(e) = transport.close_session(&session).await {
                warn!(session = %session, error = %e, "close-session failed; discarding session locally");
            }
            debug!(session = %session, "session closed");
        }

        if transport.is_connected() {
            let _ = transport.close().await;
        }
    }

    /// Submit a statement for asynchronous execution.
    ///
    /// The statement text is normalized before submission. Requires an open
    /// session; no handle is retained when submission fails.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotConnected` without a session, or a wrapped
    /// `SessionError` if the RPC fails.
    pub async fn submit(&mut self, statement: &str) -> Result<Operation, HiveError> {
        let session = match &self.state {
            ClientState::Connected { session } => session.clone(),
            ClientState::Disconnected => return Err(SessionError::NotConnected.into()),
        };

        let statement = clean(statement);
        debug!(session = %session, "submitting statement");

        let handle = {
            let mut transport = self.transport.lock().await;
            transport
                .execute_statement(ExecuteStatementRequest::new(session, statement))
                .await
                .map_err(SessionError::rpc)?
        };

        Ok(Operation::new(
            handle,
            Arc::clone(&self.transport),
            self.params.poll_interval,
            self.params.wait_deadline,
        ))
    }

    /// Submit a statement, wait for completion, and drain all result rows.
    ///
    /// Batches are fetched [`DEFAULT_FETCH_SIZE`] rows at a time and
    /// concatenated in arrival order. A failure from either stage surfaces as
    /// one [`HiveError`] preserving the original error's code and cause.
    ///
    /// # Errors
    ///
    /// Returns the wrapped error of whichever stage failed.
    pub async fn query_and_fetch_all(&mut self, statement: &str) -> Result<RowSet, HiveError> {
        let mut operation = self.submit(statement).await?;
        drain_all(&mut operation, DEFAULT_FETCH_SIZE).await
    }
}

impl std::fmt::Debug for HiveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HiveClient")
            .field("host", &self.params.host)
            .field("port", &self.params.port)
            .field("session", &self.session_handle())
            .finish()
    }
}
