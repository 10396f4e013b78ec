//! Check-in client implementation.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use url::Url;

use crate::error::{CheckinError, Result};
use crate::geo::{GeoFence, GeoPoint};
use crate::types::CheckinOutcome;

/// Checkpoint API of the SIMASTER portal.
pub const DEFAULT_BASE_URL: &str = "https://api.simaster.ugm.ac.id/vnext/v1/checkpoint";

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Attendance check-in client.
///
/// # Example
///
/// ```no_run
/// use checkin_client::{CheckinClient, GeoFence, GeoPoint};
///
/// # async fn example() -> checkin_client::Result<()> {
/// let client = CheckinClient::builder().build()?;
/// let fence = GeoFence::new(GeoPoint::new(-7.7707, 110.3777), 50.0);
///
/// let outcome = client.submit("student", "access-token", 123456, &fence).await;
/// println!("succeeded: {}", outcome.succeeded());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CheckinClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl CheckinClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Endpoint for one user and QR code: `{base}/checkin/{username}/{qr_code}`.
    pub fn checkin_url(&self, username: &str, qr_code: u64) -> Url {
        let mut url = self.base_url.clone();
        let qr_code = qr_code.to_string();
        // The builder rejects cannot-be-a-base URLs, so segments are always available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["checkin", username, qr_code.as_str()]);
        }
        url
    }

    /// Sample a point inside `fence` and check in there.
    pub async fn submit(
        &self,
        username: &str,
        access_token: &str,
        qr_code: u64,
        fence: &GeoFence,
    ) -> CheckinOutcome {
        let point = fence.sample();
        tracing::info!(point = %point, radius = fence.radius_meters, "Sampled check-in point");
        self.submit_at(username, access_token, qr_code, point).await
    }

    /// Check in at a specific point.
    pub async fn submit_at(
        &self,
        username: &str,
        access_token: &str,
        qr_code: u64,
        point: GeoPoint,
    ) -> CheckinOutcome {
        let url = self.checkin_url(username, qr_code);
        tracing::debug!(url = %url, "Submitting check-in");

        let result = self
            .http
            .post(url)
            .query(&point.query_pairs())
            .bearer_auth(access_token)
            .timeout(self.timeout)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                let message = describe(&e);
                tracing::warn!(error = %message, "Check-in request failed");
                return CheckinOutcome::TransportError { message, point };
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                let message = describe(&e);
                tracing::warn!(status, error = %message, "Failed to read check-in response");
                return CheckinOutcome::TransportError { message, point };
            }
        };

        if status == 200 {
            tracing::info!(status, "Check-in accepted");
            CheckinOutcome::Accepted {
                status,
                body,
                point,
            }
        } else {
            tracing::warn!(status, "Check-in rejected");
            CheckinOutcome::Rejected {
                status,
                body,
                point,
            }
        }
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {}", err)
    } else {
        err.to_string()
    }
}

/// Builder for creating a CheckinClient.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the base URL of the checkpoint API.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<CheckinClient> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let base_url = Url::parse(&base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(CheckinError::Config(format!(
                "base_url '{}' cannot hold a path",
                base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let user_agent = format!("kkn-checkin/{}", env!("CARGO_PKG_VERSION"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()
            .map_err(|e| CheckinError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(CheckinClient {
            http,
            base_url,
            timeout: self.timeout,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_to_portal() {
        let client = ClientBuilder::new().build().unwrap();
        assert_eq!(client.base_url().as_str(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_builder_rejects_invalid_url() {
        assert!(matches!(
            ClientBuilder::new().base_url("not a url").build(),
            Err(CheckinError::InvalidUrl(_))
        ));
        assert!(matches!(
            ClientBuilder::new().base_url("mailto:someone@example.com").build(),
            Err(CheckinError::Config(_))
        ));
    }

    #[test]
    fn test_checkin_url() {
        let client = ClientBuilder::new().build().unwrap();
        assert_eq!(
            client.checkin_url("budi.s", 482913).as_str(),
            "https://api.simaster.ugm.ac.id/vnext/v1/checkpoint/checkin/budi.s/482913"
        );
    }

    #[test]
    fn test_checkin_url_with_trailing_slash_and_escaping() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8080/checkpoint/")
            .build()
            .unwrap();
        assert_eq!(
            client.checkin_url("a/b", 1).as_str(),
            "http://localhost:8080/checkpoint/checkin/a%2Fb/1"
        );
    }
}
