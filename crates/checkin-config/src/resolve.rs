//! Validation of a merged config into the values the commands need.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::env::{
    CLIENT_ID_ENV, CLIENT_SECRET_ENV, LATITUDE_ENV, LONGITUDE_ENV, QR_CODE_ENV, RADIUS_ENV,
    TIMEOUT_ENV,
};
use crate::{CheckinConfig, ConfigError, Result};

/// Timeout applied when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// OAuth client settings. Endpoint fields left as `None` use the portal
/// defaults.
#[derive(Clone, PartialEq, Serialize)]
pub struct ResolvedOAuth {
    pub client_id: String,
    #[serde(serialize_with = "serialize_masked")]
    pub client_secret: String,
    pub redirect_uri: Option<String>,
    pub scope: Option<String>,
    pub base_url: Option<String>,
    pub sso_base_url: Option<String>,
}

impl fmt::Debug for ResolvedOAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedOAuth")
            .field("client_id", &self.client_id)
            .field("client_secret", &mask_secret(&self.client_secret))
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .field("base_url", &self.base_url)
            .field("sso_base_url", &self.sso_base_url)
            .finish()
    }
}

/// A validated geofence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
}

/// Everything a full login and check-in run needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
    pub oauth: ResolvedOAuth,
    pub location: ResolvedLocation,
    pub qr_code: u64,
    pub checkin_base_url: Option<String>,
    pub username: Option<String>,
    #[serde(serialize_with = "serialize_secs")]
    pub timeout: Duration,
}

impl CheckinConfig {
    /// Validate the whole config.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let checkin = self.checkin.clone().unwrap_or_default();
        Ok(ResolvedConfig {
            oauth: self.resolve_oauth()?,
            location: self.resolve_location()?,
            qr_code: checkin
                .qr_code
                .ok_or_else(|| ConfigError::missing("qr_code", "checkin", QR_CODE_ENV))?,
            checkin_base_url: checkin.base_url,
            username: checkin.username,
            timeout: self.timeout()?,
        })
    }

    /// Validate only the OAuth client settings.
    pub fn resolve_oauth(&self) -> Result<ResolvedOAuth> {
        let oauth = self.oauth.clone().unwrap_or_default();
        Ok(ResolvedOAuth {
            client_id: oauth
                .client_id
                .ok_or_else(|| ConfigError::missing("client_id", "oauth", CLIENT_ID_ENV))?,
            client_secret: oauth
                .client_secret
                .ok_or_else(|| ConfigError::missing("client_secret", "oauth", CLIENT_SECRET_ENV))?,
            redirect_uri: oauth.redirect_uri,
            scope: oauth.scope,
            base_url: oauth.base_url,
            sso_base_url: oauth.sso_base_url,
        })
    }

    /// Validate only the geofence.
    pub fn resolve_location(&self) -> Result<ResolvedLocation> {
        let location = self.location.clone().unwrap_or_default();
        let latitude = location
            .latitude
            .ok_or_else(|| ConfigError::missing("latitude", "location", LATITUDE_ENV))?;
        let longitude = location
            .longitude
            .ok_or_else(|| ConfigError::missing("longitude", "location", LONGITUDE_ENV))?;
        let radius_meters = location
            .radius_meters
            .ok_or_else(|| ConfigError::missing("radius_meters", "location", RADIUS_ENV))?;

        check_range("latitude", latitude, -90.0, 90.0)?;
        check_range("longitude", longitude, -180.0, 180.0)?;
        if !radius_meters.is_finite() || radius_meters < 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "radius_meters".to_string(),
                message: format!("{} must be a non-negative number of meters", radius_meters),
            });
        }

        Ok(ResolvedLocation {
            latitude,
            longitude,
            radius_meters,
        })
    }

    /// Per-request timeout, defaulting to [`DEFAULT_TIMEOUT_SECS`].
    pub fn timeout(&self) -> Result<Duration> {
        let secs = self
            .checkin
            .as_ref()
            .and_then(|c| c.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if secs == 0 {
            return Err(ConfigError::OutOfRange {
                field: "timeout_secs".to_string(),
                message: format!("must be at least 1 second (see {})", TIMEOUT_ENV),
            });
        }
        Ok(Duration::from_secs(secs))
    }
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field: field.to_string(),
            message: format!("{} is not within [{}, {}]", value, min, max),
        })
    }
}

/// Mask a secret for display, keeping the first and last two characters of
/// long values.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len().max(4));
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}...{}", head, tail)
}

fn serialize_masked<S: serde::Serializer>(secret: &str, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&mask_secret(secret))
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> CheckinConfig {
        CheckinConfig::from_toml(
            r#"
[oauth]
client_id = "client-1"
client_secret = "a-long-client-secret"

[checkin]
qr_code = 482913

[location]
latitude = -7.770717
longitude = 110.377724
radius_meters = 50
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_complete() {
        let resolved = complete().resolve().unwrap();
        assert_eq!(resolved.oauth.client_id, "client-1");
        assert_eq!(resolved.qr_code, 482913);
        assert_eq!(resolved.location.radius_meters, 50.0);
        assert_eq!(resolved.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(resolved.checkin_base_url.is_none());
        assert!(resolved.oauth.redirect_uri.is_none());
    }

    #[test]
    fn test_missing_fields_name_env_var() {
        let mut config = complete();
        config.oauth_mut().client_secret = None;
        let err = config.resolve().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { ref field, .. } if field == "client_secret"));
        assert!(err.to_string().contains(CLIENT_SECRET_ENV));

        let mut config = complete();
        config.checkin = None;
        assert!(config.resolve().is_err());
        // Partial resolution still works without the checkin section.
        assert!(config.resolve_oauth().is_ok());
        assert!(config.resolve_location().is_ok());

        assert!(CheckinConfig::new().resolve_location().is_err());
    }

    #[test]
    fn test_location_ranges() {
        let mut config = complete();
        config.location_mut().latitude = Some(91.0);
        assert!(matches!(
            config.resolve_location(),
            Err(ConfigError::OutOfRange { .. })
        ));

        let mut config = complete();
        config.location_mut().longitude = Some(f64::NAN);
        assert!(config.resolve_location().is_err());

        let mut config = complete();
        config.location_mut().radius_meters = Some(-1.0);
        let err = config.resolve_location().unwrap_err();
        assert!(err.to_string().contains("radius_meters"));

        let mut config = complete();
        config.location_mut().radius_meters = Some(0.0);
        assert_eq!(config.resolve_location().unwrap().radius_meters, 0.0);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = complete();
        config.checkin_mut().timeout_secs = Some(0);
        assert!(config.timeout().is_err());
        config.checkin_mut().timeout_secs = Some(5);
        assert_eq!(config.timeout().unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn test_secret_is_masked() {
        assert_eq!(mask_secret("a-long-client-secret"), "a-...et");
        assert_eq!(mask_secret("short"), "*****");
        assert_eq!(mask_secret(""), "****");

        let resolved = complete().resolve().unwrap();
        let debug = format!("{:?}", resolved);
        assert!(!debug.contains("a-long-client-secret"));

        let toml = toml::to_string(&resolved.oauth).unwrap();
        assert!(toml.contains("a-...et"));
    }
}
