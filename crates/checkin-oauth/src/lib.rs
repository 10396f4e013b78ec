//! CAS + OAuth 2.0 authorization-code login for the SIMASTER portal.
//!
//! Emulates the student app's webview walking through the portal's single
//! sign-on and consent pages to obtain a bearer access token.
//!
//! # Components
//!
//! - [`oauth`]: client configuration, authorization parameters, token type
//! - [`headers`]: per-step header sets the portal checks
//! - [`extract`]: pure parsers for cookies, form fields, redirects, token JSON
//! - [`session`]: typed stage values and the per-run session record
//! - [`flow`]: [`OAuthFlowClient`], the five sequential exchanges

pub mod error;
pub mod extract;
pub mod flow;
pub mod headers;
pub mod oauth;
pub mod session;

pub use error::{FlowStep, OAuthError, Result, StepCause};
pub use flow::OAuthFlowClient;
pub use oauth::{OAuthConfig, OAuthTokens};
pub use session::{
    AuthSessionState, AuthorizationChallenge, AuthorizationCode, ServiceTicket, SessionCookie,
};
