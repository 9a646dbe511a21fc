use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Errors raised by the shared helpers (config files, addresses, logging)
#[derive(Error, Debug)]
pub enum CommonError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Logging error: {0}")]
    Logging(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CommonError>;

impl From<serde_json::Error> for CommonError {
    fn from(err: serde_json::Error) -> Self {
        CommonError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for CommonError {
    fn from(err: config::ConfigError) -> Self {
        CommonError::Config(err.to_string())
    }
}

/// Error reported by the node or the wallet, kept in the shape it arrived in.
///
/// The node answers failed requests with a JSON body such as
/// `{"message": "...", "error_code": "account_not_found", "vm_error_code": null}`;
/// wallets tend to wrap those in their own error and keep the original as `cause`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteError {
    /// HTTP status, when the error came from an HTTP response
    pub status: Option<u16>,
    pub message: Option<String>,
    pub error_code: Option<String>,
    /// Raw response body
    pub body: Option<Value>,
    /// Extra payload attached by the wallet
    pub data: Option<Value>,
    pub cause: Option<Box<RemoteError>>,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Build from an HTTP status and the (possibly non-JSON) response body.
    pub fn from_response(status: u16, body: Value) -> Self {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| body.as_str().map(str::to_string));
        let error_code = body
            .get("error_code")
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            status: Some(status),
            message,
            error_code,
            body: Some(body),
            data: None,
            cause: None,
        }
    }

    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_cause(mut self, cause: RemoteError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.message, self.status) {
            (Some(message), _) => write!(f, "{}", message),
            (None, Some(status)) => write!(f, "request failed with status {}", status),
            (None, None) => write!(f, "unknown remote error"),
        }
    }
}

impl std::error::Error for RemoteError {}

/// Normalized failure of a chain or wallet call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Not found: {0}")]
    NotFound(RemoteError),

    #[error("{0}")]
    Remote(RemoteError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Wallet not connected")]
    NotConnected,

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Transaction {hash} failed: {vm_status}")]
    TransactionFailed { hash: String, vm_status: String },

    #[error("Timed out: {0}")]
    Timeout(String),
}

impl ClientError {
    /// The underlying message without any classification prefix.
    pub fn raw_message(&self) -> Option<String> {
        match self {
            ClientError::NotFound(remote) | ClientError::Remote(remote) => remote.message.clone(),
            ClientError::Transport(msg)
            | ClientError::InvalidResponse(msg)
            | ClientError::Signing(msg)
            | ClientError::Timeout(msg) => Some(msg.clone()),
            ClientError::NotConnected => Some("Wallet not connected".to_string()),
            ClientError::TransactionFailed { vm_status, .. } => Some(vm_status.clone()),
        }
    }

    /// The structured remote error, if there is one.
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            ClientError::NotFound(remote) | ClientError::Remote(remote) => Some(remote),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_remote_error_from_node_body() {
        let body = json!({
            "message": "Account not found by Address(0x1) and Ledger version(42)",
            "error_code": "account_not_found",
            "vm_error_code": null
        });
        let err = RemoteError::from_response(404, body.clone());
        assert_eq!(err.status, Some(404));
        assert_eq!(err.error_code.as_deref(), Some("account_not_found"));
        assert!(err.message.unwrap().starts_with("Account not found"));
        assert_eq!(err.body, Some(body));
    }

    #[test]
    fn test_remote_error_display_falls_back_to_status() {
        let err = RemoteError::from_response(502, json!({}));
        assert_eq!(err.to_string(), "request failed with status 502");
        assert_eq!(RemoteError::default().to_string(), "unknown remote error");
    }

    #[test]
    fn test_raw_message_has_no_prefix() {
        let err = ClientError::Transport("network timeout".to_string());
        assert_eq!(err.to_string(), "Transport error: network timeout");
        assert_eq!(err.raw_message().as_deref(), Some("network timeout"));

        let err = ClientError::Remote(RemoteError::default());
        assert_eq!(err.raw_message(), None);
    }
}
