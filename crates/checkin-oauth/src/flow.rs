//! The five-step CAS + OAuth 2.0 authorization-code login.
//!
//! ```text
//! authorization_url  GET  /oauth/authorize          200  JSESSIONID + lt
//! login              POST /cas/login;jsessionid=..  302  ticket
//! session_cookie     GET  /oauth/authorize&ticket   302  session cookie
//! authorize_access   POST /oauth/authorize&ticket   302  code
//! access_token       POST /oauth/token              200  access_token
//! ```
//!
//! Steps run strictly in order on one cookie jar and abort on the first
//! failure. Credentials and tokens are never logged.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::redirect::Policy;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url, header};

use crate::error::{FlowStep, OAuthError, Result};
use crate::extract::{
    extract_jsessionid, extract_login_token, extract_query_param, extract_session_cookie,
    parse_token_response,
};
use crate::headers;
use crate::oauth::{OAuthConfig, OAuthTokens, authorize_params, build_service_url};
use crate::session::{
    AuthSessionState, AuthorizationChallenge, AuthorizationCode, ServiceTicket, SessionCookie,
};

/// Drives the login flow against the portal.
///
/// Owns its cookie jar and session state; one instance must not run two
/// flows concurrently.
#[derive(Debug)]
pub struct OAuthFlowClient {
    config: OAuthConfig,
    /// Follows redirects, for the initial page load.
    navigator: Client,
    /// Never follows redirects, so 302 responses can be inspected.
    client: Client,
    jar: Arc<Jar>,
    session: AuthSessionState,
}

impl OAuthFlowClient {
    /// Create a client with a fresh cookie jar.
    pub fn new(config: OAuthConfig) -> Result<Self> {
        let jar = Arc::new(Jar::default());

        let navigator = Client::builder()
            .cookie_provider(jar.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| OAuthError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let client = Client::builder()
            .cookie_provider(jar.clone())
            .redirect(Policy::none())
            .timeout(config.timeout)
            .build()
            .map_err(|e| OAuthError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            navigator,
            client,
            jar,
            session: AuthSessionState::new(),
        })
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Artifacts recorded by the current run.
    pub fn session(&self) -> &AuthSessionState {
        &self.session
    }

    /// Run all five steps and return the issued tokens.
    pub async fn complete_flow(&mut self, username: &str, password: &str) -> Result<OAuthTokens> {
        let result = self.run_steps(username, password).await;
        match &result {
            Ok(_) => tracing::info!("Login flow completed"),
            Err(e) => tracing::warn!(
                step = e.failed_step().map(|s| s.as_str()).unwrap_or("setup"),
                error = %e,
                "Login flow aborted"
            ),
        }
        result
    }

    async fn run_steps(&mut self, username: &str, password: &str) -> Result<OAuthTokens> {
        let challenge = self.request_authorization_page().await?;
        let ticket = self.submit_login(&challenge, username, password).await?;
        let cookie = self.exchange_ticket(&ticket).await?;
        let code = self.confirm_authorization(&ticket, &cookie).await?;
        self.redeem_code(&code).await
    }

    /// Step 1: load the authorization page, which lands on the CAS login form.
    ///
    /// Starts a new run: previously recorded artifacts are discarded.
    pub async fn request_authorization_page(&mut self) -> Result<AuthorizationChallenge> {
        let step = FlowStep::AuthorizationUrl;
        self.session.reset();

        let url = self.config.authorize_endpoint();
        tracing::debug!(step = %step, url = %url, "Requesting authorization page");

        let req = self
            .navigator
            .get(&url)
            .query(&authorize_params(&self.config, None));
        let response = send(step, headers::apply(req, headers::authorization_page(&self.config))).await?;
        let status = response.status();

        // The cookie may have been set by an earlier hop of the redirect chain.
        let jsessionid = set_cookies(&response)
            .find_map(extract_jsessionid)
            .or_else(|| self.jar_jsessionid());
        let body = read_body(step, response).await?;

        if status != StatusCode::OK {
            return Err(OAuthError::unexpected_status(step, 200, status.as_u16(), body));
        }

        let jsessionid =
            jsessionid.ok_or_else(|| OAuthError::missing(step, "JSESSIONID cookie", 200))?;
        let login_token = extract_login_token(&body)
            .ok_or_else(|| OAuthError::missing(step, "login token (lt)", 200))?;

        let challenge = AuthorizationChallenge::new(jsessionid, login_token);
        self.session.record_challenge(&challenge);
        tracing::info!(step = %step, status = status.as_u16(), "Authorization page loaded");
        Ok(challenge)
    }

    /// Step 2: post the credentials to CAS and collect the service ticket.
    pub async fn submit_login(
        &mut self,
        challenge: &AuthorizationChallenge,
        username: &str,
        password: &str,
    ) -> Result<ServiceTicket> {
        let step = FlowStep::Login;

        let url = self.config.login_endpoint(challenge.jsessionid());
        let service = build_service_url(&self.config, None);
        tracing::debug!(step = %step, url = %url, "Submitting credentials");

        let form = [
            ("username", username),
            ("password", password),
            ("lt", challenge.login_token()),
            ("_eventId", "submit"),
            ("submit", "LOGIN"),
        ];
        let req = self.client.post(&url).query(&[("service", service.as_str())]);
        let req = headers::apply(req, headers::login_submit(&self.config, challenge.jsessionid()))
            .form(&form);

        let response = send(step, req).await?;
        let status = response.status();
        if status != StatusCode::FOUND {
            if status == StatusCode::OK {
                tracing::warn!(step = %step, "CAS returned the login form again; credentials were likely rejected");
            }
            let body = read_body(step, response).await?;
            return Err(OAuthError::unexpected_status(step, 302, status.as_u16(), body));
        }

        let ticket = location(&response)
            .and_then(|loc| extract_query_param(loc, "ticket"))
            .ok_or_else(|| OAuthError::missing(step, "ticket", 302))?;

        let ticket = ServiceTicket::new(ticket);
        self.session.record_ticket(&ticket);
        tracing::info!(step = %step, status = status.as_u16(), "Service ticket issued");
        Ok(ticket)
    }

    /// Step 3: present the ticket to the authorization server for its session cookie.
    pub async fn exchange_ticket(&mut self, ticket: &ServiceTicket) -> Result<SessionCookie> {
        let step = FlowStep::SessionCookie;

        let req = self
            .client
            .get(self.config.authorize_endpoint())
            .query(&authorize_params(&self.config, Some(ticket.as_str())));
        let response = send(step, headers::apply(req, headers::authorization_page(&self.config))).await?;
        let status = response.status();
        if status != StatusCode::FOUND {
            let body = read_body(step, response).await?;
            return Err(OAuthError::unexpected_status(step, 302, status.as_u16(), body));
        }

        let cookie = set_cookies(&response)
            .find_map(extract_session_cookie)
            .ok_or_else(|| OAuthError::missing(step, "session cookie", 302))?;

        let cookie = SessionCookie::new(cookie);
        self.session.record_session_cookie(&cookie);
        tracing::info!(step = %step, status = status.as_u16(), "Session cookie obtained");
        Ok(cookie)
    }

    /// Step 4: confirm the consent form and collect the authorization code.
    pub async fn confirm_authorization(
        &mut self,
        ticket: &ServiceTicket,
        cookie: &SessionCookie,
    ) -> Result<AuthorizationCode> {
        let step = FlowStep::AuthorizeAccess;

        let req = self
            .client
            .post(self.config.authorize_endpoint())
            .query(&authorize_params(&self.config, Some(ticket.as_str())));
        let req = headers::apply(
            req,
            headers::authorization_confirm(&self.config, ticket.as_str(), cookie.as_str()),
        )
        .form(&[("confirm", "Izinkan")]);

        let response = send(step, req).await?;
        let status = response.status();
        if status != StatusCode::FOUND {
            let body = read_body(step, response).await?;
            return Err(OAuthError::unexpected_status(step, 302, status.as_u16(), body));
        }

        let code = location(&response)
            .and_then(|loc| extract_query_param(loc, "code"))
            .ok_or_else(|| OAuthError::missing(step, "authorization code", 302))?;

        tracing::info!(step = %step, status = status.as_u16(), "Authorization code issued");
        Ok(AuthorizationCode::new(code))
    }

    /// Step 5: redeem the authorization code for tokens.
    pub async fn redeem_code(&mut self, code: &AuthorizationCode) -> Result<OAuthTokens> {
        let step = FlowStep::AccessToken;

        let form = [
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];
        let req = self.client.post(self.config.token_endpoint());
        let req = headers::apply(req, headers::token_exchange()).form(&form);

        let response = send(step, req).await?;
        let status = response.status();
        let body = read_body(step, response).await?;
        if status != StatusCode::OK {
            return Err(OAuthError::unexpected_status(step, 200, status.as_u16(), body));
        }

        let tokens = parse_token_response(&body).map_err(|cause| OAuthError::Step {
            step,
            cause,
            http_status: Some(200),
        })?;

        self.session.record_access_token(&tokens.access_token);
        tracing::info!(step = %step, status = status.as_u16(), "Access token issued");
        Ok(tokens)
    }

    /// JSESSIONID the jar holds for the CAS login path.
    fn jar_jsessionid(&self) -> Option<String> {
        let url = Url::parse(&format!("{}/cas/login", self.config.sso_origin())).ok()?;
        let cookies = self.jar.cookies(&url)?;
        extract_jsessionid(cookies.to_str().ok()?)
    }
}

async fn send(step: FlowStep, req: RequestBuilder) -> Result<Response> {
    req.send().await.map_err(|e| OAuthError::transport(step, e))
}

async fn read_body(step: FlowStep, response: Response) -> Result<String> {
    response
        .text()
        .await
        .map_err(|e| OAuthError::transport(step, e))
}

fn set_cookies(response: &Response) -> impl Iterator<Item = &str> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
}

fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}
