//! Wire message types for the CLI service protocol.
//!
//! Requests and responses are JSON messages with camelCase field names. Every
//! response carries a `status` field plus optional exception details; payload
//! fields live under `responseData`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single result row: an ordered tuple of opaque values.
pub type Row = Vec<serde_json::Value>;

/// Opaque session identifier returned by an open-session request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionHandle(String);

impl SessionHandle {
    /// Wrap a raw session identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of an in-flight statement execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationHandle(String);

impl OperationHandle {
    /// Wrap a raw operation identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Remote execution state of a submitted statement.
///
/// The server may report states this client does not know about; those
/// deserialize to [`OperationState::Unknown`] and are treated as still
/// in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationState {
    /// Accepted by the server, not yet scheduled
    Submitted,
    /// Currently executing
    Running,
    /// Completed successfully; results may be fetched
    Finished,
    /// Failed on the server
    Error,
    /// Canceled before completion
    Canceled,
    /// Unrecognized state string
    #[serde(other)]
    Unknown,
}

impl OperationState {
    /// Check whether this state ends the operation's lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OperationState::Finished | OperationState::Error | OperationState::Canceled
        )
    }
}

/// Exception details attached to a failed response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionInfo {
    /// SQLSTATE-style code, when the server provides one
    pub sql_state: Option<String>,
    /// Human-readable failure description
    pub text: String,
}

/// Authentication handshake request, sent first when secure mode is enabled.
///
/// Credentials are optional; validating their presence is the server's job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    /// Command name
    pub command: String,
    /// Username, when configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Password, when configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl AuthRequest {
    /// Create a new authentication request.
    pub fn new(username: Option<String>, password: Option<String>) -> Self {
        Self {
            command: "authenticate".to_string(),
            username,
            password,
        }
    }
}

/// Authentication handshake response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Status of the response
    pub status: String,
    /// Exception information if failed
    pub exception: Option<ExceptionInfo>,
}

/// Open-session request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionRequest {
    /// Command name
    pub command: String,
    /// Username, sent only for authenticated session init
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Password, sent only for authenticated session init
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl OpenSessionRequest {
    /// Create an open-session request without credentials.
    pub fn anonymous() -> Self {
        Self {
            command: "openSession".to_string(),
            username: None,
            password: None,
        }
    }

    /// Create an open-session request carrying credentials.
    pub fn with_credentials(username: String, password: String) -> Self {
        Self {
            command: "openSession".to_string(),
            username: Some(username),
            password: Some(password),
        }
    }
}

/// Open-session response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionResponse {
    /// Status of the response
    pub status: String,
    /// Response data
    pub response_data: Option<OpenSessionResponseData>,
    /// Exception information if failed
    pub exception: Option<ExceptionInfo>,
}

/// Open-session response payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionResponseData {
    /// Identifier of the newly opened session
    pub session_handle: SessionHandle,
}

/// Execute-statement request. Statements always run asynchronously.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteStatementRequest {
    /// Command name
    pub command: String,
    /// Session the statement runs in
    pub session_handle: SessionHandle,
    /// Statement text (already normalized)
    pub statement: String,
    /// Asynchronous execution flag, always true for this client
    pub run_async: bool,
}

impl ExecuteStatementRequest {
    /// Create a new execute-statement request.
    pub fn new(session_handle: SessionHandle, statement: String) -> Self {
        Self {
            command: "executeStatement".to_string(),
            session_handle,
            statement,
            run_async: true,
        }
    }
}

/// Execute-statement response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteStatementResponse {
    /// Status of the response
    pub status: String,
    /// Response data
    pub response_data: Option<ExecuteStatementResponseData>,
    /// Exception information if failed
    pub exception: Option<ExceptionInfo>,
}

/// Execute-statement response payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteStatementResponseData {
    /// Handle of the in-flight operation
    pub operation_handle: OperationHandle,
    /// Execution state at submission time, when reported
    pub state: Option<OperationState>,
}

/// Operation status poll request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatusRequest {
    /// Command name
    pub command: String,
    /// Operation to poll
    pub operation_handle: OperationHandle,
}

impl OperationStatusRequest {
    /// Create a new status poll request.
    pub fn new(operation_handle: OperationHandle) -> Self {
        Self {
            command: "getOperationStatus".to_string(),
            operation_handle,
        }
    }
}

/// Operation status poll response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatusResponse {
    /// Status of the response
    pub status: String,
    /// Response data
    pub response_data: Option<OperationStatusResponseData>,
    /// Exception information if failed
    pub exception: Option<ExceptionInfo>,
}

/// Operation status poll response payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatusResponseData {
    /// Current execution state
    pub state: OperationState,
}

/// Fetch-results request for the next batch of rows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResultsRequest {
    /// Command name
    pub command: String,
    /// Operation to fetch from
    pub operation_handle: OperationHandle,
    /// Upper bound on rows returned in this batch
    pub max_rows: i64,
}

impl FetchResultsRequest {
    /// Create a new fetch-results request.
    pub fn new(operation_handle: OperationHandle, max_rows: i64) -> Self {
        Self {
            command: "fetchResults".to_string(),
            operation_handle,
            max_rows,
        }
    }
}

/// Fetch-results response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResultsResponse {
    /// Status of the response
    pub status: String,
    /// Response data
    pub response_data: Option<FetchResultsResponseData>,
    /// Exception information if failed
    pub exception: Option<ExceptionInfo>,
}

/// Fetch-results response payload. An empty `rows` is the exhaustion signal.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResultsResponseData {
    /// Row batch in server order
    pub rows: Vec<Row>,
    /// Whether the server expects more rows to be available
    pub has_more_rows: bool,
}

/// Close-session request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseSessionRequest {
    /// Command name
    pub command: String,
    /// Session to close
    pub session_handle: SessionHandle,
}

impl CloseSessionRequest {
    /// Create a new close-session request.
    pub fn new(session_handle: SessionHandle) -> Self {
        Self {
            command: "closeSession".to_string(),
            session_handle,
        }
    }
}

/// Close-session response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseSessionResponse {
    /// Status of the response
    pub status: String,
    /// Exception information if failed
    pub exception: Option<ExceptionInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_session_request_serialization() {
        let request =
            OpenSessionRequest::with_credentials("etl".to_string(), "secret".to_string());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["command"], "openSession");
        assert_eq!(json["username"], "etl");
        assert_eq!(json["password"], "secret");
    }

    #[test]
    fn test_anonymous_open_session_omits_credentials() {
        let request = OpenSessionRequest::anonymous();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["command"], "openSession");
        assert!(json.get("username").is_none());
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_execute_statement_request_runs_async() {
        let request = ExecuteStatementRequest::new(
            SessionHandle::new("sess-1"),
            "SELECT * FROM logs".to_string(),
        );
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["command"], "executeStatement");
        assert_eq!(json["sessionHandle"], "sess-1");
        assert_eq!(json["runAsync"], true);
    }

    #[test]
    fn test_fetch_results_response_deserialization() {
        let json = r#"{
            "status": "ok",
            "responseData": {
                "rows": [[1, "a"], [2, "b"]],
                "hasMoreRows": true
            }
        }"#;

        let response: FetchResultsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, "ok");

        let data = response.response_data.unwrap();
        assert_eq!(data.rows.len(), 2);
        assert!(data.has_more_rows);
        assert_eq!(data.rows[0][1], serde_json::json!("a"));
    }

    #[test]
    fn test_operation_state_deserialization() {
        let state: OperationState = serde_json::from_str("\"running\"").unwrap();
        assert_eq!(state, OperationState::Running);
        assert!(!state.is_terminal());

        let state: OperationState = serde_json::from_str("\"finished\"").unwrap();
        assert!(state.is_terminal());

        // Unrecognized states map to Unknown and count as in progress
        let state: OperationState = serde_json::from_str("\"compiling\"").unwrap();
        assert_eq!(state, OperationState::Unknown);
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_error_response_with_exception() {
        let json = r#"{
            "status": "error",
            "exception": {
                "sqlState": "42S02",
                "text": "Table not found: t1"
            }
        }"#;

        let response: OpenSessionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, "error");

        let exception = response.exception.unwrap();
        assert_eq!(exception.sql_state.as_deref(), Some("42S02"));
        assert_eq!(exception.text, "Table not found: t1");
    }

    #[test]
    fn test_session_handle_is_opaque_string() {
        let handle = SessionHandle::new("c9f2-a001");
        assert_eq!(handle.as_str(), "c9f2-a001");
        assert_eq!(serde_json::to_value(&handle).unwrap(), "c9f2-a001");
    }
}
