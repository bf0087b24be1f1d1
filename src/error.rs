//! Error types for hiveql-rs.
//!
//! Errors are organized by functional area: connecting, session-scoped RPC
//! calls, and the remote operation itself. Underlying transport failures are
//! always wrapped before they cross the client boundary, with the original
//! error kept reachable through `source()`.

use std::fmt;
use thiserror::Error;

use crate::transport::messages::OperationState;

/// Top-level error type encompassing all client errors.
#[derive(Error, Debug)]
pub enum HiveError {
    /// Failure while establishing a connection or opening a session
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// RPC failure on a session-scoped call
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The remote operation itself failed
    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors raised while connecting and opening a session.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Failed to open the transport channel (includes the secure handshake)
    #[error("failed to connect to {host}:{port}: {message}")]
    TransportOpen {
        host: String,
        port: u16,
        message: String,
        #[source]
        source: TransportError,
    },

    /// The open-session request failed; the original message is preserved verbatim
    #[error("{message}")]
    OpenSession {
        message: String,
        #[source]
        source: TransportError,
    },

    /// Invalid construction parameter
    #[error("invalid connection parameter '{parameter}': {message}")]
    InvalidParameter { parameter: String, message: String },
}

/// Errors raised by RPC calls that require an active session.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The call requires a connected client
    #[error("no active session")]
    NotConnected,

    /// A session-scoped RPC call failed
    #[error("{message}")]
    Rpc {
        message: String,
        #[source]
        source: TransportError,
    },
}

impl SessionError {
    pub(crate) fn rpc(source: TransportError) -> Self {
        Self::Rpc {
            message: source.to_string(),
            source,
        }
    }
}

/// Errors describing the remote operation's own failure.
#[derive(Error, Debug)]
pub enum OperationError {
    /// The operation reached a terminal failure state
    #[error("statement execution failed (terminal state {state:?})")]
    Terminal { state: OperationState },

    /// The wait deadline elapsed before a terminal state was observed
    #[error("timed out waiting for statement completion after {waited_ms}ms")]
    WaitTimeout { waited_ms: u64 },
}

/// Errors internal to the transport layer.
///
/// These never reach callers directly; the client wraps them into
/// [`ConnectionError`] or [`SessionError`] at the boundary of each call.
#[derive(Error, Debug)]
pub enum TransportError {
    /// WebSocket connection error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Message serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Message send error
    #[error("failed to send message: {0}")]
    Send(String),

    /// Message receive error
    #[error("failed to receive message: {0}")]
    Receive(String),

    /// Protocol state or framing error
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Response was well-formed but missing required data
    #[error("invalid server response: {0}")]
    InvalidResponse(String),

    /// A configured timeout elapsed during an RPC round trip
    #[error("timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Server-reported failure, message passed through as-is
    #[error("{0}")]
    Remote(String),
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Serialization(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for TransportError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        TransportError::WebSocket(err.to_string())
    }
}

/// Coarse error codes for callers that dispatch without matching variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Unknown error
    Unknown = 0,
    /// Connection or authentication failure
    Connection = 1,
    /// Session-scoped RPC failure
    Session = 2,
    /// Remote operation failure
    Operation = 3,
    /// Invalid argument or parameter
    InvalidArgument = 4,
    /// Timeout
    Timeout = 5,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Unknown => write!(f, "UNKNOWN"),
            ErrorCode::Connection => write!(f, "CONNECTION"),
            ErrorCode::Session => write!(f, "SESSION"),
            ErrorCode::Operation => write!(f, "OPERATION"),
            ErrorCode::InvalidArgument => write!(f, "INVALID_ARGUMENT"),
            ErrorCode::Timeout => write!(f, "TIMEOUT"),
        }
    }
}

impl HiveError {
    /// Map to a coarse error code. Wrapping preserves the inner error's code.
    pub fn code(&self) -> ErrorCode {
        match self {
            HiveError::Connection(e) => e.code(),
            HiveError::Session(e) => e.code(),
            HiveError::Operation(e) => e.code(),
        }
    }
}

impl ConnectionError {
    /// Map to a coarse error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ConnectionError::TransportOpen {
                source: TransportError::Timeout { .. },
                ..
            } => ErrorCode::Timeout,
            ConnectionError::InvalidParameter { .. } => ErrorCode::InvalidArgument,
            _ => ErrorCode::Connection,
        }
    }
}

impl SessionError {
    /// Map to a coarse error code.
    pub fn code(&self) -> ErrorCode {
        ErrorCode::Session
    }
}

impl OperationError {
    /// Map to a coarse error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            OperationError::WaitTimeout { .. } => ErrorCode::Timeout,
            OperationError::Terminal { .. } => ErrorCode::Operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_connection_error_display() {
        let err = ConnectionError::TransportOpen {
            host: "hive.example.com".to_string(),
            port: 10000,
            message: "connection refused".to_string(),
            source: TransportError::WebSocket("connection refused".to_string()),
        };
        assert!(err.to_string().contains("hive.example.com"));
        assert!(err.to_string().contains("10000"));
    }

    #[test]
    fn test_open_session_message_preserved_verbatim() {
        let err = ConnectionError::OpenSession {
            message: "boom".to_string(),
            source: TransportError::Remote("boom".to_string()),
        };
        assert_eq!(err.to_string(), "boom");

        let wrapped = HiveError::from(err);
        assert_eq!(wrapped.to_string(), "boom");
    }

    #[test]
    fn test_session_rpc_source_chain() {
        let err = SessionError::rpc(TransportError::Remote("kaput".to_string()));
        assert_eq!(err.to_string(), "kaput");

        let wrapped = HiveError::from(err);
        let cause = wrapped.source().expect("source chain");
        assert_eq!(cause.to_string(), "kaput");
    }

    #[test]
    fn test_code_mapping() {
        let err = HiveError::Connection(ConnectionError::InvalidParameter {
            parameter: "host".to_string(),
            message: "must not be empty".to_string(),
        });
        assert_eq!(err.code(), ErrorCode::InvalidArgument);

        let err = HiveError::Session(SessionError::NotConnected);
        assert_eq!(err.code(), ErrorCode::Session);

        let err = HiveError::Operation(OperationError::WaitTimeout { waited_ms: 5000 });
        assert_eq!(err.code(), ErrorCode::Timeout);

        let err = HiveError::Operation(OperationError::Terminal {
            state: OperationState::Error,
        });
        assert_eq!(err.code(), ErrorCode::Operation);
    }

    #[test]
    fn test_code_preserved_through_wrapping() {
        let inner = SessionError::rpc(TransportError::Remote("boom".to_string()));
        let inner_code = inner.code();
        let wrapped = HiveError::from(inner);
        assert_eq!(wrapped.code(), inner_code);
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::Connection.to_string(), "CONNECTION");
        assert_eq!(ErrorCode::Timeout.to_string(), "TIMEOUT");
    }

    #[test]
    fn test_remote_transport_error_passthrough() {
        let err = TransportError::Remote("Table not found: t1".to_string());
        assert_eq!(err.to_string(), "Table not found: t1");
    }
}
