//! WebSocket implementation of the CLI service.
//!
//! Speaks the JSON message protocol from [`super::messages`] over a WebSocket
//! channel. Each RPC is one send/receive round trip; the configured timeout
//! bounds both the initial connect and every round trip.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::connection::ConnectionParams;
use crate::error::TransportError;

use super::messages::{
    AuthRequest, AuthResponse, CloseSessionRequest, CloseSessionResponse, ExceptionInfo,
    ExecuteStatementRequest, ExecuteStatementResponse, FetchResultsRequest, FetchResultsResponse,
    OpenSessionRequest, OpenSessionResponse, OperationHandle, OperationState,
    OperationStatusRequest, OperationStatusResponse, SessionHandle,
};
use super::protocol::{CliService, FetchResult};

/// WebSocket transport for the CLI service protocol.
pub struct WebSocketCliService {
    /// WebSocket connection (None if not connected)
    ws_stream: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
    /// Per-round-trip timeout taken from the connection parameters
    io_timeout: Option<Duration>,
    /// Connection state
    state: ChannelState,
}

/// Channel state tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelState {
    /// No channel open
    Disconnected,
    /// Channel open, authentication handshake pending
    Connected,
    /// Channel open and ready for session calls
    Ready,
}

impl WebSocketCliService {
    /// Create a new, unconnected transport.
    pub fn new() -> Self {
        Self {
            ws_stream: None,
            io_timeout: None,
            state: ChannelState::Disconnected,
        }
    }

    /// Adopt the round-trip timeout from the connection parameters, in the
    /// transport's native millisecond unit.
    fn configure_timeout(&mut self, params: &ConnectionParams) {
        self.io_timeout = params.timeout_ms().map(Duration::from_millis);
    }

    /// Send a request and receive its response, honoring the I/O timeout.
    async fn send_receive<T, R>(&mut self, request: &T) -> Result<R, TransportError>
    where
        T: serde::Serialize,
        R: serde::de::DeserializeOwned,
    {
        let request_json = serde_json::to_string(request)?;
        let io_timeout = self.io_timeout;

        let ws_stream = self
            .ws_stream
            .as_mut()
            .ok_or_else(|| TransportError::Protocol("not connected".to_string()))?;

        let send = ws_stream.send(Message::Text(request_json));
        match io_timeout {
            Some(limit) => tokio::time::timeout(limit, send)
                .await
                .map_err(|_| TransportError::Timeout {
                    timeout_ms: limit.as_millis() as u64,
                })?,
            None => send.await,
        }
        .map_err(|e| TransportError::Send(e.to_string()))?;

        let receive = ws_stream.next();
        let response_msg = match io_timeout {
            Some(limit) => tokio::time::timeout(limit, receive)
                .await
                .map_err(|_| TransportError::Timeout {
                    timeout_ms: limit.as_millis() as u64,
                })?,
            None => receive.await,
        }
        .ok_or_else(|| TransportError::Receive("connection closed".to_string()))?
        .map_err(|e| TransportError::Receive(e.to_string()))?;

        let response_text = response_msg
            .to_text()
            .map_err(|e| TransportError::Protocol(format!("invalid message format: {}", e)))?;

        let response: R = serde_json::from_str(response_text)?;

        Ok(response)
    }

    /// Turn a non-ok response status into a remote error.
    fn check_status(
        &self,
        status: &str,
        exception: &Option<ExceptionInfo>,
    ) -> Result<(), TransportError> {
        if status != "ok" {
            let message = exception
                .as_ref()
                .map(|e| match e.sql_state.as_deref() {
                    Some(code) => format!("{} (SQLSTATE {})", e.text, code),
                    None => e.text.clone(),
                })
                .unwrap_or_else(|| "unknown server error".to_string());
            return Err(TransportError::Remote(message));
        }
        Ok(())
    }

    fn ensure_ready(&self) -> Result<(), TransportError> {
        if self.state != ChannelState::Ready {
            return Err(TransportError::Protocol(
                "must connect before issuing session calls".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for WebSocketCliService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CliService for WebSocketCliService {
    async fn connect(&mut self, params: &ConnectionParams) -> Result<(), TransportError> {
        if self.state != ChannelState::Disconnected {
            return Err(TransportError::Protocol("already connected".to_string()));
        }

        let url = params.endpoint_url();
        self.configure_timeout(params);

        let connect_future = connect_async(&url);
        let (ws_stream, _) = match self.io_timeout {
            Some(limit) => tokio::time::timeout(limit, connect_future)
                .await
                .map_err(|_| TransportError::Timeout {
                    timeout_ms: limit.as_millis() as u64,
                })?,
            None => connect_future.await,
        }
        .map_err(|e| TransportError::WebSocket(e.to_string()))?;

        self.ws_stream = Some(ws_stream);
        self.state = ChannelState::Connected;

        // Secure mode performs the handshake up front; whether missing
        // credentials are acceptable is the server's decision.
        if params.secure {
            let request = AuthRequest::new(
                params.username.clone(),
                params.password().map(str::to_string),
            );
            let response: AuthResponse = match self.send_receive(&request).await {
                Ok(response) => response,
                Err(e) => {
                    let _ = self.close_channel().await;
                    return Err(e);
                }
            };
            if let Err(e) = self.check_status(&response.status, &response.exception) {
                let _ = self.close_channel().await;
                return Err(e);
            }
            debug!(host = %params.host, "authentication handshake complete");
        }

        self.state = ChannelState::Ready;
        Ok(())
    }

    async fn open_session(
        &mut self,
        request: OpenSessionRequest,
    ) -> Result<SessionHandle, TransportError> {
        self.ensure_ready()?;

        let response: OpenSessionResponse = self.send_receive(&request).await?;
        self.check_status(&response.status, &response.exception)?;

        let data = response
            .response_data
            .ok_or_else(|| TransportError::InvalidResponse("missing response data".to_string()))?;

        Ok(data.session_handle)
    }

    async fn execute_statement(
        &mut self,
        request: ExecuteStatementRequest,
    ) -> Result<OperationHandle, TransportError> {
        self.ensure_ready()?;

        let response: ExecuteStatementResponse = self.send_receive(&request).await?;
        self.check_status(&response.status, &response.exception)?;

        let data = response
            .response_data
            .ok_or_else(|| TransportError::InvalidResponse("missing response data".to_string()))?;

        Ok(data.operation_handle)
    }

    async fn operation_status(
        &mut self,
        handle: &OperationHandle,
    ) -> Result<OperationState, TransportError> {
        self.ensure_ready()?;

        let request = OperationStatusRequest::new(handle.clone());
        let response: OperationStatusResponse = self.send_receive(&request).await?;
        self.check_status(&response.status, &response.exception)?;

        let data = response
            .response_data
            .ok_or_else(|| TransportError::InvalidResponse("missing response data".to_string()))?;

        Ok(data.state)
    }

    async fn fetch_results(
        &mut self,
        handle: &OperationHandle,
        max_rows: i64,
    ) -> Result<FetchResult, TransportError> {
        self.ensure_ready()?;

        let request = FetchResultsRequest::new(handle.clone(), max_rows);
        let response: FetchResultsResponse = self.send_receive(&request).await?;
        self.check_status(&response.status, &response.exception)?;

        let data = response
            .response_data
            .ok_or_else(|| TransportError::InvalidResponse("missing response data".to_string()))?;

        Ok(FetchResult {
            rows: data.rows,
            has_more_rows: data.has_more_rows,
        })
    }

    async fn close_session(&mut self, handle: &SessionHandle) -> Result<(), TransportError> {
        self.ensure_ready()?;

        let request = CloseSessionRequest::new(handle.clone());
        let response: CloseSessionResponse = self.send_receive(&request).await?;
        self.check_status(&response.status, &response.exception)?;

        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.close_channel().await
    }

    fn is_connected(&self) -> bool {
        matches!(self.state, ChannelState::Connected | ChannelState::Ready)
    }
}

impl WebSocketCliService {
    /// Close the channel and return to the disconnected state so a later
    /// connect starts from scratch.
    async fn close_channel(&mut self) -> Result<(), TransportError> {
        if let Some(mut ws_stream) = self.ws_stream.take() {
            let _ = ws_stream.close(None).await;
        }
        self.state = ChannelState::Disconnected;
        self.io_timeout = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionParams;

    fn params() -> ConnectionParams {
        ConnectionParams::builder().host("localhost").build().unwrap()
    }

    #[test]
    fn test_new_transport_is_disconnected() {
        let transport = WebSocketCliService::new();
        assert!(!transport.is_connected());
        assert_eq!(transport.state, ChannelState::Disconnected);
    }

    #[test]
    fn test_timeout_taken_from_params_in_millis() {
        let mut transport = WebSocketCliService::new();

        let with_timeout = ConnectionParams::builder()
            .host("localhost")
            .timeout_secs(15)
            .build()
            .unwrap();
        transport.configure_timeout(&with_timeout);
        assert_eq!(transport.io_timeout, Some(Duration::from_millis(15_000)));

        transport.configure_timeout(&params());
        assert_eq!(transport.io_timeout, None);
    }

    #[tokio::test]
    async fn test_connect_requires_disconnected_state() {
        let mut transport = WebSocketCliService::new();
        transport.state = ChannelState::Ready;

        let result = transport.connect(&params()).await;

        assert!(matches!(
            result,
            Err(TransportError::Protocol(ref msg)) if msg.contains("already connected")
        ));
    }

    #[tokio::test]
    async fn test_session_calls_require_ready_state() {
        let mut transport = WebSocketCliService::new();

        let result = transport.open_session(OpenSessionRequest::anonymous()).await;
        assert!(matches!(result, Err(TransportError::Protocol(_))));

        let result = transport
            .operation_status(&OperationHandle::new("op-1"))
            .await;
        assert!(matches!(result, Err(TransportError::Protocol(_))));

        let result = transport
            .close_session(&SessionHandle::new("sess-1"))
            .await;
        assert!(matches!(result, Err(TransportError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let mut transport = WebSocketCliService::new();

        assert!(transport.close().await.is_ok());
        assert_eq!(transport.state, ChannelState::Disconnected);

        assert!(transport.close().await.is_ok());
    }

    #[test]
    fn test_check_status_ok() {
        let transport = WebSocketCliService::new();
        assert!(transport.check_status("ok", &None).is_ok());
    }

    #[test]
    fn test_check_status_error_carries_sql_state() {
        let transport = WebSocketCliService::new();
        let exception = Some(ExceptionInfo {
            sql_state: Some("42000".to_string()),
            text: "syntax error".to_string(),
        });

        let result = transport.check_status("error", &exception);

        match result {
            Err(TransportError::Remote(msg)) => {
                assert!(msg.contains("syntax error"));
                assert!(msg.contains("42000"));
            }
            other => panic!("expected Remote error, got {:?}", other),
        }
    }

    #[test]
    fn test_check_status_error_without_exception() {
        let transport = WebSocketCliService::new();
        let result = transport.check_status("error", &None);
        assert!(matches!(
            result,
            Err(TransportError::Remote(ref msg)) if msg.contains("unknown server error")
        ));
    }
}
