//! OAuth client configuration and authorization-request construction.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Authorization server of the SIMASTER portal.
pub const DEFAULT_OAUTH_BASE_URL: &str = "https://oauth.simaster.ugm.ac.id";

/// CAS single sign-on server.
pub const DEFAULT_SSO_BASE_URL: &str = "https://sso.ugm.ac.id";

/// Redirect URI registered for the student mobile app.
pub const DEFAULT_REDIRECT_URI: &str = "id.ac.ugm.student.vnext.simaster://oauth2";

/// Package name the mobile webview reports in `X-Requested-With`.
pub const DEFAULT_REQUESTED_WITH: &str = "id.ac.ugm.student.vnext.simaster";

/// Scope string requested by the mobile app. The server compares it verbatim
/// across the flow, so it must not be reordered.
pub const DEFAULT_SCOPE: &str = "user.read user.read-write-update userDetail.read alumni.read student pegawai.all.read pegawai.unit.read staff tte notif.create-read ldap parent.read parent.read-write-update mygate.read-write vehicle.read transgama.read";

/// Per-request timeout applied to every exchange.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// OAuth configuration for the SIMASTER portal.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
    pub oauth_base_url: String,
    pub sso_base_url: String,
    pub requested_with: String,
    pub timeout: Duration,
}

impl OAuthConfig {
    /// Config for the production portal with the given client credentials.
    pub fn simaster(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            oauth_base_url: DEFAULT_OAUTH_BASE_URL.to_string(),
            sso_base_url: DEFAULT_SSO_BASE_URL.to_string(),
            requested_with: DEFAULT_REQUESTED_WITH.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Point both servers somewhere else (mock servers, staging).
    pub fn with_base_urls(mut self, oauth: impl Into<String>, sso: impl Into<String>) -> Self {
        self.oauth_base_url = oauth.into();
        self.sso_base_url = sso.into();
        self
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn oauth_origin(&self) -> &str {
        self.oauth_base_url.trim_end_matches('/')
    }

    pub fn sso_origin(&self) -> &str {
        self.sso_base_url.trim_end_matches('/')
    }

    pub fn authorize_endpoint(&self) -> String {
        format!("{}/oauth/authorize", self.oauth_origin())
    }

    pub fn token_endpoint(&self) -> String {
        format!("{}/oauth/token", self.oauth_origin())
    }

    /// CAS login endpoint addressed with the servlet session id as a path parameter.
    pub fn login_endpoint(&self, jsessionid: &str) -> String {
        format!("{}/cas/login;jsessionid={}", self.sso_origin(), jsessionid)
    }
}

/// Query parameters of the authorization request.
///
/// Order is `response_type, client_id, redirect_uri, scope[, ticket]`; the
/// server validates later requests against the first one.
pub fn authorize_params<'a>(
    config: &'a OAuthConfig,
    ticket: Option<&'a str>,
) -> Vec<(&'static str, &'a str)> {
    let mut params = vec![
        ("response_type", "code"),
        ("client_id", config.client_id.as_str()),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("scope", config.scope.as_str()),
    ];
    if let Some(ticket) = ticket {
        params.push(("ticket", ticket));
    }
    params
}

/// The authorization URL written out without percent-encoding.
///
/// Used as the CAS `service` parameter and inside `Referer` headers, where
/// the portal expects the literal string rather than an encoded one.
pub fn build_service_url(config: &OAuthConfig, ticket: Option<&str>) -> String {
    let query = authorize_params(config, ticket)
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", config.authorize_endpoint(), query)
}

/// Tokens returned by the token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}
