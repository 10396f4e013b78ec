//! Pure extraction of the values each step pulls out of a response.
//!
//! Every function returns `None` (or a [`StepCause`]) when the value is
//! absent, so the flow can name exactly what was missing.

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use url::Url;

use crate::error::StepCause;
use crate::oauth::OAuthTokens;

/// Servlet session id from a `Set-Cookie` or `Cookie` header value.
pub fn extract_jsessionid(cookie_header: &str) -> Option<String> {
    cookie_header
        .split(';')
        .map(str::trim)
        .filter_map(|part| part.strip_prefix("JSESSIONID="))
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Value of the hidden `lt` input on the CAS login form.
pub fn extract_login_token(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"input[name="lt"][type="hidden"]"#).ok()?;

    document
        .select(&selector)
        .filter_map(|input| input.value().attr("value"))
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// The authorization server's `session=` cookie from a `Set-Cookie` value.
pub fn extract_session_cookie(set_cookie: &str) -> Option<String> {
    let re = Regex::new(r"(?:^|[;,]\s*)session=([^;]+)").ok()?;
    re.captures(set_cookie)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// First non-empty value of `field` in the query string of a `Location` header.
///
/// Relative locations are resolved against a placeholder origin; custom
/// schemes such as the app's redirect URI parse as-is.
pub fn extract_query_param(location: &str, field: &str) -> Option<String> {
    let url = match Url::parse(location) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse("http://localhost/").ok()?.join(location).ok()?
        }
        Err(_) => return None,
    };

    url.query_pairs()
        .find(|(key, value)| key == field && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

/// Decode the token endpoint's JSON body.
pub fn parse_token_response(body: &str) -> Result<OAuthTokens, StepCause> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| StepCause::InvalidBody(e.to_string()))?;

    let has_token = value
        .get("access_token")
        .and_then(Value::as_str)
        .is_some_and(|token| !token.is_empty());
    if !has_token {
        return Err(StepCause::Missing("access_token"));
    }

    serde_json::from_value(value).map_err(|e| StepCause::InvalidBody(e.to_string()))
}
