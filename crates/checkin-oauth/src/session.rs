//! Session artifacts accumulated across the login flow.
//!
//! Each step hands the next one a typed stage value, so a step can only be
//! called once its predecessor succeeded. [`AuthSessionState`] mirrors those
//! values for inspection and is written only after a step fully succeeds.

/// Output of the authorization page: servlet session and CAS login token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationChallenge {
    jsessionid: String,
    login_token: String,
}

impl AuthorizationChallenge {
    pub(crate) fn new(jsessionid: String, login_token: String) -> Self {
        Self {
            jsessionid,
            login_token,
        }
    }

    pub fn jsessionid(&self) -> &str {
        &self.jsessionid
    }

    pub fn login_token(&self) -> &str {
        &self.login_token
    }
}

/// CAS service ticket issued on successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTicket(String);

impl ServiceTicket {
    pub(crate) fn new(ticket: String) -> Self {
        Self(ticket)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The authorization server's `session` cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie(String);

impl SessionCookie {
    pub(crate) fn new(cookie: String) -> Self {
        Self(cookie)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Authorization code from the consent redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationCode(String);

impl AuthorizationCode {
    pub(crate) fn new(code: String) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Mutable record of one flow run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSessionState {
    jsessionid: Option<String>,
    login_token: Option<String>,
    ticket: Option<String>,
    session_cookie: Option<String>,
    access_token: Option<String>,
}

impl AuthSessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jsessionid(&self) -> Option<&str> {
        self.jsessionid.as_deref()
    }

    pub fn login_token(&self) -> Option<&str> {
        self.login_token.as_deref()
    }

    pub fn ticket(&self) -> Option<&str> {
        self.ticket.as_deref()
    }

    pub fn session_cookie(&self) -> Option<&str> {
        self.session_cookie.as_deref()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// True once the last step has stored an access token.
    pub fn is_complete(&self) -> bool {
        self.access_token.is_some()
    }

    /// Start a new run. Called by the first step before it records anything.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn record_challenge(&mut self, challenge: &AuthorizationChallenge) {
        set_once(&mut self.jsessionid, &challenge.jsessionid);
        set_once(&mut self.login_token, &challenge.login_token);
    }

    pub(crate) fn record_ticket(&mut self, ticket: &ServiceTicket) {
        set_once(&mut self.ticket, &ticket.0);
    }

    pub(crate) fn record_session_cookie(&mut self, cookie: &SessionCookie) {
        set_once(&mut self.session_cookie, &cookie.0);
    }

    pub(crate) fn record_access_token(&mut self, token: &str) {
        set_once(&mut self.access_token, token);
    }
}

/// Each artifact is written at most once per run; later values are dropped.
fn set_once(slot: &mut Option<String>, value: &str) {
    if slot.is_some() {
        tracing::warn!("session artifact already recorded for this run; keeping the first value");
        return;
    }
    *slot = Some(value.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_starts_empty() {
        let state = AuthSessionState::new();
        assert!(state.jsessionid().is_none());
        assert!(state.ticket().is_none());
        assert!(!state.is_complete());
    }

    #[test]
    fn test_state_records_monotonically() {
        let mut state = AuthSessionState::new();
        state.record_challenge(&AuthorizationChallenge::new("JS".into(), "LT".into()));
        state.record_ticket(&ServiceTicket::new("ST".into()));
        assert_eq!(state.jsessionid(), Some("JS"));
        assert_eq!(state.login_token(), Some("LT"));
        assert_eq!(state.ticket(), Some("ST"));
        assert!(state.session_cookie().is_none());

        state.record_session_cookie(&SessionCookie::new("sess".into()));
        state.record_access_token("tok");
        assert!(state.is_complete());
    }

    #[test]
    fn test_repeated_step_keeps_first_value() {
        let mut state = AuthSessionState::new();
        state.record_ticket(&ServiceTicket::new("ST-1".into()));
        state.record_ticket(&ServiceTicket::new("ST-2".into()));
        assert_eq!(state.ticket(), Some("ST-1"));

        state.record_session_cookie(&SessionCookie::new("first".into()));
        state.record_session_cookie(&SessionCookie::new("second".into()));
        assert_eq!(state.session_cookie(), Some("first"));

        state.reset();
        state.record_ticket(&ServiceTicket::new("ST-3".into()));
        assert_eq!(state.ticket(), Some("ST-3"));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut state = AuthSessionState::new();
        state.record_ticket(&ServiceTicket::new("ST".into()));
        state.reset();
        assert_eq!(state, AuthSessionState::default());
    }
}
