//! Handle for an in-flight statement execution.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{HiveError, OperationError, SessionError};
use crate::transport::messages::{OperationHandle, OperationState, Row};
use crate::transport::CliService;

/// An in-flight statement execution.
///
/// Returned by [`crate::HiveClient::submit`]; drives the remote operation
/// through status polls and bounded row fetches. The remote state machine
/// itself (Submitted → Running → Finished/Error) is owned by the server and
/// only observed here.
pub struct Operation {
    /// Remote operation identifier
    handle: OperationHandle,
    /// Shared transport for status and fetch calls
    transport: Arc<Mutex<dyn CliService>>,
    /// Last state observed from the server
    state: OperationState,
    /// Interval between status polls
    poll_interval: Duration,
    /// Optional bound on the total wait time
    wait_deadline: Option<Duration>,
}

impl Operation {
    pub(crate) fn new(
        handle: OperationHandle,
        transport: Arc<Mutex<dyn CliService>>,
        poll_interval: Duration,
        wait_deadline: Option<Duration>,
    ) -> Self {
        Self {
            handle,
            transport,
            state: OperationState::Submitted,
            poll_interval,
            wait_deadline,
        }
    }

    /// The remote operation identifier.
    pub fn handle(&self) -> &OperationHandle {
        &self.handle
    }

    /// The last state observed from the server.
    pub fn state(&self) -> OperationState {
        self.state
    }

    /// Block until the operation reaches a terminal state.
    ///
    /// Polls the server on the configured interval. A terminal `Error` or
    /// `Canceled` state is a failure distinct from an empty result; when a
    /// wait deadline is configured, exceeding it fails with
    /// [`OperationError::WaitTimeout`] instead of spinning forever.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if a status poll itself fails, or
    /// `OperationError` for a failed operation or an elapsed deadline.
    pub async fn wait(&mut self) -> Result<(), HiveError> {
        if self.state == OperationState::Finished {
            return Ok(());
        }

        let started = Instant::now();
        loop {
            let state = {
                let mut transport = self.transport.lock().await;
                transport
                    .operation_status(&self.handle)
                    .await
                    .map_err(SessionError::rpc)?
            };
            self.state = state;

            match state {
                OperationState::Finished => {
                    debug!(operation = %self.handle, "operation finished");
                    return Ok(());
                }
                OperationState::Error | OperationState::Canceled => {
                    return Err(OperationError::Terminal { state }.into());
                }
                // Submitted, Running, or a state this client does not know:
                // keep polling.
                _ => {}
            }

            if let Some(deadline) = self.wait_deadline {
                let waited = started.elapsed();
                if waited >= deadline {
                    return Err(OperationError::WaitTimeout {
                        waited_ms: waited.as_millis() as u64,
                    }
                    .into());
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Fetch the next batch of rows, up to `max_rows`.
    ///
    /// An empty batch means the result stream is exhausted; it is never an
    /// error. `max_rows` bounds are owned by the server's fetch contract, not
    /// validated here.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the fetch RPC fails.
    pub async fn fetch(&mut self, max_rows: i64) -> Result<Vec<Row>, HiveError> {
        let mut transport = self.transport.lock().await;
        let result = transport
            .fetch_results(&self.handle, max_rows)
            .await
            .map_err(SessionError::rpc)?;
        Ok(result.rows)
    }
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("handle", &self.handle)
            .field("state", &self.state)
            .field("poll_interval", &self.poll_interval)
            .field("wait_deadline", &self.wait_deadline)
            .finish()
    }
}
