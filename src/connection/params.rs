//! Connection parameter construction and validation.

use crate::error::ConnectionError;
use std::fmt;
use std::time::Duration;

/// Default server port.
pub const DEFAULT_PORT: u16 = 10000;

/// Default interval between operation status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Connection parameters for establishing a client session.
#[derive(Clone)]
pub struct ConnectionParams {
    /// Server host address
    pub host: String,

    /// Server port (default: 10000)
    pub port: u16,

    /// Username for authenticated session init
    pub username: Option<String>,

    /// Password for authenticated session init (never logged)
    password: Option<String>,

    /// Round-trip timeout, configured in whole seconds. The transport works
    /// in milliseconds; see [`ConnectionParams::timeout_ms`].
    pub timeout: Option<Duration>,

    /// Secure mode: perform the authentication handshake when opening the
    /// channel (default: enabled)
    pub secure: bool,

    /// Interval between operation status polls while waiting for completion
    pub poll_interval: Duration,

    /// Optional upper bound on the total time spent waiting for an operation
    /// to reach a terminal state
    pub wait_deadline: Option<Duration>,
}

impl ConnectionParams {
    /// Get the password (for internal use only, never logged).
    pub(crate) fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Create a new ConnectionBuilder.
    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::new()
    }

    /// The configured timeout in the transport's native millisecond unit.
    pub fn timeout_ms(&self) -> Option<u64> {
        self.timeout.map(|t| t.as_millis() as u64)
    }

    /// The WebSocket endpoint URL for this host and port.
    pub fn endpoint_url(&self) -> String {
        format!("ws://{}:{}/cli", self.host, self.port)
    }
}

// Keep the password out of debug output.
impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("secure", &self.secure)
            .field("poll_interval", &self.poll_interval)
            .field("wait_deadline", &self.wait_deadline)
            .finish()
    }
}

/// Builder for constructing [`ConnectionParams`] with validation.
#[derive(Debug, Clone, Default)]
pub struct ConnectionBuilder {
    host: Option<String>,
    port: Option<u16>,
    username: Option<String>,
    password: Option<String>,
    timeout: Option<Duration>,
    secure: Option<bool>,
    poll_interval: Option<Duration>,
    wait_deadline: Option<Duration>,
}

impl ConnectionBuilder {
    /// Create a new ConnectionBuilder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the server host.
    pub fn host(mut self, host: &str) -> Self {
        self.host = Some(host.to_string());
        self
    }

    /// Set the server port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the username.
    pub fn username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }

    /// Set the password.
    pub fn password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    /// Set the round-trip timeout in seconds.
    pub fn timeout_secs(mut self, seconds: u64) -> Self {
        self.timeout = Some(Duration::from_secs(seconds));
        self
    }

    /// Enable or disable secure mode (authentication handshake on connect).
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    /// Set the interval between operation status polls.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Bound the total time spent waiting for an operation to finish.
    pub fn wait_deadline(mut self, deadline: Duration) -> Self {
        self.wait_deadline = Some(deadline);
        self
    }

    /// Build the parameters, validating required fields.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError::InvalidParameter` if the host is missing or
    /// empty.
    pub fn build(self) -> Result<ConnectionParams, ConnectionError> {
        let host = match self.host {
            Some(h) if !h.trim().is_empty() => h,
            _ => {
                return Err(ConnectionError::InvalidParameter {
                    parameter: "host".to_string(),
                    message: "host is required and must not be empty".to_string(),
                })
            }
        };

        Ok(ConnectionParams {
            host,
            port: self.port.unwrap_or(DEFAULT_PORT),
            username: self.username,
            password: self.password,
            timeout: self.timeout,
            secure: self.secure.unwrap_or(true),
            poll_interval: self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL),
            wait_deadline: self.wait_deadline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let params = ConnectionParams::builder().host("hive.internal").build().unwrap();

        assert_eq!(params.host, "hive.internal");
        assert_eq!(params.port, 10000);
        assert!(params.username.is_none());
        assert!(params.password().is_none());
        assert!(params.timeout.is_none());
        assert!(params.secure);
        assert_eq!(params.poll_interval, DEFAULT_POLL_INTERVAL);
        assert!(params.wait_deadline.is_none());
    }

    #[test]
    fn test_builder_full() {
        let params = ConnectionParams::builder()
            .host("hive.internal")
            .port(10001)
            .username("etl")
            .password("secret")
            .timeout_secs(30)
            .secure(false)
            .poll_interval(Duration::from_millis(50))
            .wait_deadline(Duration::from_secs(600))
            .build()
            .unwrap();

        assert_eq!(params.port, 10001);
        assert_eq!(params.username.as_deref(), Some("etl"));
        assert_eq!(params.password(), Some("secret"));
        assert!(!params.secure);
        assert_eq!(params.wait_deadline, Some(Duration::from_secs(600)));
    }

    #[test]
    fn test_missing_host_is_rejected() {
        let result = ConnectionParams::builder().port(10000).build();
        assert!(matches!(
            result,
            Err(ConnectionError::InvalidParameter { ref parameter, .. }) if parameter == "host"
        ));

        let result = ConnectionParams::builder().host("  ").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_timeout_seconds_to_millis() {
        let params = ConnectionParams::builder()
            .host("hive.internal")
            .timeout_secs(15)
            .build()
            .unwrap();

        assert_eq!(params.timeout_ms(), Some(15_000));
    }

    #[test]
    fn test_endpoint_url() {
        let params = ConnectionParams::builder().host("hive.internal").build().unwrap();
        assert_eq!(params.endpoint_url(), "ws://hive.internal:10000/cli");
    }

    #[test]
    fn test_debug_redacts_password() {
        let params = ConnectionParams::builder()
            .host("hive.internal")
            .username("etl")
            .password("secret")
            .build()
            .unwrap();

        let rendered = format!("{:?}", params);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
