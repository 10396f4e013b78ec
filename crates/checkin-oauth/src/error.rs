//! Error types for the login flow.

use std::fmt;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, OAuthError>;

/// The five exchanges of the login flow, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowStep {
    /// GET the authorization page (JSESSIONID + `lt` token).
    AuthorizationUrl,
    /// POST credentials to the CAS login endpoint (service ticket).
    Login,
    /// Trade the service ticket for the authorization server's session cookie.
    SessionCookie,
    /// Confirm the consent form (authorization code).
    AuthorizeAccess,
    /// Redeem the authorization code at the token endpoint.
    AccessToken,
}

impl FlowStep {
    pub const ALL: [FlowStep; 5] = [
        FlowStep::AuthorizationUrl,
        FlowStep::Login,
        FlowStep::SessionCookie,
        FlowStep::AuthorizeAccess,
        FlowStep::AccessToken,
    ];

    /// Stable name used in error output and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowStep::AuthorizationUrl => "authorization_url",
            FlowStep::Login => "login",
            FlowStep::SessionCookie => "session_cookie",
            FlowStep::AuthorizeAccess => "authorize_access",
            FlowStep::AccessToken => "access_token",
        }
    }
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a step refused the server's response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepCause {
    /// The server answered with a status the step does not accept.
    #[error("expected HTTP {expected}, got {actual}")]
    UnexpectedStatus {
        expected: u16,
        actual: u16,
        /// Response body, kept for diagnostics.
        body: String,
    },

    /// A value the step must extract was absent.
    #[error("{0} not found in response")]
    Missing(&'static str),

    /// The body could not be decoded.
    #[error("invalid response body: {0}")]
    InvalidBody(String),
}

/// Errors that can occur while running the login flow.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// A step completed at the HTTP level but violated its contract.
    #[error("{step} step failed: {cause}")]
    Step {
        step: FlowStep,
        cause: StepCause,
        http_status: Option<u16>,
    },

    /// Connection, TLS, timeout or body-read failure.
    #[error("Network error during {step} step: {message}")]
    Transport { step: FlowStep, message: String },

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),
}

impl OAuthError {
    pub(crate) fn unexpected_status(step: FlowStep, expected: u16, actual: u16, body: String) -> Self {
        OAuthError::Step {
            step,
            cause: StepCause::UnexpectedStatus {
                expected,
                actual,
                body,
            },
            http_status: Some(actual),
        }
    }

    pub(crate) fn missing(step: FlowStep, what: &'static str, status: u16) -> Self {
        OAuthError::Step {
            step,
            cause: StepCause::Missing(what),
            http_status: Some(status),
        }
    }

    pub(crate) fn transport(step: FlowStep, err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else {
            err.to_string()
        };
        OAuthError::Transport { step, message }
    }

    /// The step that failed, if the error came from the flow.
    pub fn failed_step(&self) -> Option<FlowStep> {
        match self {
            OAuthError::Step { step, .. } | OAuthError::Transport { step, .. } => Some(*step),
            OAuthError::Config(_) => None,
        }
    }

    /// HTTP status of the offending response, when there was one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            OAuthError::Step { http_status, .. } => *http_status,
            _ => None,
        }
    }

    /// Check if this is a network-level failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, OAuthError::Transport { .. })
    }
}
