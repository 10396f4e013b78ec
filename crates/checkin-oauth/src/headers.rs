//! Header sets for each exchange.
//!
//! The portal only accepts the flow when it looks like the student app's
//! Android webview: user agent, `X-Requested-With`, fetch metadata, `Origin`,
//! `Referer` and `Cookie` must agree with each other across steps.

use crate::oauth::{OAuthConfig, build_service_url};

/// Android webview user agent of the student app.
pub const WEBVIEW_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 12; sdk_gphone64_x86_64 Build/SE1A.220826.008; wv) AppleWebKit/537.36 (KHTML, like Gecko) Version/4.0 Chrome/91.0.4472.114 Mobile Safari/537.36";

const WEBVIEW_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.9";

/// User agent of the app's native HTTP client, used for the token call.
pub const NATIVE_USER_AGENT: &str = "Dart/3.1 (dart:io)";

/// Analytics cookies the webview carries alongside the session cookie.
const ANALYTICS_COOKIES: &str = "_ga_B3TESR985X=GS2.1.s1754044819$o1$g0$t1754044819$j60$l0$h0; _ga_L4JC39NX24=GS2.1.s1754044820$o1$g0$t1754044820$j60$l0$h0; _ga=GA1.3.1600030693.1754044819; _gid=GA1.3.1789808150.1754044821";

/// Ordered header name/value pairs.
pub type HeaderSet = Vec<(&'static str, String)>;

fn webview(config: &OAuthConfig) -> HeaderSet {
    vec![
        ("User-Agent", WEBVIEW_USER_AGENT.to_string()),
        ("Accept", WEBVIEW_ACCEPT.to_string()),
        ("Accept-Encoding", "gzip, deflate".to_string()),
        ("Accept-Language", "en-US,en;q=0.9".to_string()),
        ("X-Requested-With", config.requested_with.clone()),
    ]
}

fn navigation(headers: &mut HeaderSet, site: &'static str) {
    headers.extend([
        ("Upgrade-Insecure-Requests", "1".to_string()),
        ("Sec-Fetch-Site", site.to_string()),
        ("Sec-Fetch-Mode", "navigate".to_string()),
        ("Sec-Fetch-User", "?1".to_string()),
        ("Sec-Fetch-Dest", "document".to_string()),
    ]);
}

/// Top-level navigation to the authorization endpoint (steps 1 and 3).
pub fn authorization_page(config: &OAuthConfig) -> HeaderSet {
    let mut headers = webview(config);
    navigation(&mut headers, "none");
    headers
}

/// Submission of the CAS login form (step 2).
pub fn login_submit(config: &OAuthConfig, jsessionid: &str) -> HeaderSet {
    let mut headers = webview(config);
    headers.push(("Cache-Control", "max-age=0".to_string()));
    navigation(&mut headers, "same-origin");
    headers.extend([
        ("Origin", config.sso_origin().to_string()),
        (
            "Referer",
            format!(
                "{}/cas/login?service={}",
                config.sso_origin(),
                build_service_url(config, None)
            ),
        ),
        ("Cookie", format!("JSESSIONID={}", jsessionid)),
    ]);
    headers
}

/// Submission of the consent form on the authorization server (step 4).
pub fn authorization_confirm(config: &OAuthConfig, ticket: &str, session_cookie: &str) -> HeaderSet {
    let mut headers = webview(config);
    headers.push(("Cache-Control", "max-age=0".to_string()));
    navigation(&mut headers, "same-origin");
    headers.extend([
        ("Origin", config.oauth_origin().to_string()),
        ("Referer", build_service_url(config, Some(ticket))),
        (
            "Cookie",
            format!("session={}; {}", session_cookie, ANALYTICS_COOKIES),
        ),
    ]);
    headers
}

/// Native client call to the token endpoint (step 5).
pub fn token_exchange() -> HeaderSet {
    vec![
        ("User-Agent", NATIVE_USER_AGENT.to_string()),
        ("Accept-Encoding", "gzip".to_string()),
        (
            "Content-Type",
            "application/x-www-form-urlencoded".to_string(),
        ),
    ]
}

/// Attach a header set to a request.
pub(crate) fn apply(mut req: reqwest::RequestBuilder, headers: HeaderSet) -> reqwest::RequestBuilder {
    for (name, value) in headers {
        req = req.header(name, value);
    }
    req
}
