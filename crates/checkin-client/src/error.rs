//! Client error types.

use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum CheckinError {
    /// The check-in call completed but the server did not answer 200.
    #[error("Check-in rejected (HTTP {status}): {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body as returned by the server.
        body: String,
    },

    /// Connection, timeout or body-read failure.
    #[error("Network error: {0}")]
    Transport(String),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CheckinError {
    /// HTTP status of a rejected check-in.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            CheckinError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, CheckinError::Rejected { status: 401, .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, CheckinError::Rejected { status, .. } if *status >= 500)
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, CheckinError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(status: u16) -> CheckinError {
        CheckinError::Rejected {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_status_classification() {
        assert!(rejected(401).is_auth_error());
        assert!(!rejected(403).is_auth_error());
        assert!(rejected(502).is_server_error());
        assert!(!rejected(404).is_server_error());

        let transport = CheckinError::Transport("refused".to_string());
        assert!(!transport.is_auth_error());
        assert!(!transport.is_server_error());
        assert_eq!(transport.http_status(), None);
        assert_eq!(rejected(418).http_status(), Some(418));
    }
}
