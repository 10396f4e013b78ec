//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [oauth]      # client credentials and portal endpoints
//! [checkin]    # checkpoint API, QR code, timeouts
//! [location]   # geofence center and radius
//! ```

use serde::{Deserialize, Serialize};

/// Root configuration structure.
///
/// All sections and fields are optional so that partial layers (a user
/// config with credentials, a project file with the location) can be loaded
/// and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckinConfig {
    pub oauth: Option<OAuthSection>,
    pub checkin: Option<CheckinSection>,
    pub location: Option<LocationSection>,
}

impl CheckinConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Merging is per field, so a later layer only replaces the keys it sets.
    pub fn merge(&mut self, other: CheckinConfig) {
        merge_section(&mut self.oauth, other.oauth, OAuthSection::merge);
        merge_section(&mut self.checkin, other.checkin, CheckinSection::merge);
        merge_section(&mut self.location, other.location, LocationSection::merge);
    }

    /// Whether the `[oauth]` section carries a client secret.
    pub fn has_plaintext_secret(&self) -> bool {
        self.oauth
            .as_ref()
            .is_some_and(|o| o.client_secret.is_some())
    }

    pub(crate) fn oauth_mut(&mut self) -> &mut OAuthSection {
        self.oauth.get_or_insert_with(OAuthSection::default)
    }

    pub(crate) fn checkin_mut(&mut self) -> &mut CheckinSection {
        self.checkin.get_or_insert_with(CheckinSection::default)
    }

    pub(crate) fn location_mut(&mut self) -> &mut LocationSection {
        self.location.get_or_insert_with(LocationSection::default)
    }
}

fn merge_section<T>(base: &mut Option<T>, other: Option<T>, merge: fn(&mut T, T)) {
    if let Some(layer) = other {
        match base {
            Some(existing) => merge(existing, layer),
            None => *base = Some(layer),
        }
    }
}

fn take<T>(base: &mut Option<T>, other: Option<T>) {
    if other.is_some() {
        *base = other;
    }
}

/// `[oauth]` section: the registered client and portal endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthSection {
    pub client_id: Option<String>,
    /// Prefer `SIMASTER_CLIENT_SECRET` over storing this in a file.
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub scope: Option<String>,
    /// Authorization server origin, e.g. `https://oauth.simaster.ugm.ac.id`.
    pub base_url: Option<String>,
    /// CAS server origin, e.g. `https://sso.ugm.ac.id`.
    pub sso_base_url: Option<String>,
}

impl OAuthSection {
    fn merge(&mut self, other: OAuthSection) {
        take(&mut self.client_id, other.client_id);
        take(&mut self.client_secret, other.client_secret);
        take(&mut self.redirect_uri, other.redirect_uri);
        take(&mut self.scope, other.scope);
        take(&mut self.base_url, other.base_url);
        take(&mut self.sso_base_url, other.sso_base_url);
    }
}

/// `[checkin]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckinSection {
    /// Checkpoint API base URL.
    pub base_url: Option<String>,
    /// Portal username; prompted for when absent.
    pub username: Option<String>,
    /// Numeric QR code of the attendance session.
    pub qr_code: Option<u64>,
    /// Per-request timeout for every HTTP call.
    pub timeout_secs: Option<u64>,
}

impl CheckinSection {
    fn merge(&mut self, other: CheckinSection) {
        take(&mut self.base_url, other.base_url);
        take(&mut self.username, other.username);
        take(&mut self.qr_code, other.qr_code);
        take(&mut self.timeout_secs, other.timeout_secs);
    }
}

/// `[location]` section: the geofence to check in from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationSection {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_meters: Option<f64>,
}

impl LocationSection {
    fn merge(&mut self, other: LocationSection) {
        take(&mut self.latitude, other.latitude);
        take(&mut self.longitude, other.longitude);
        take(&mut self.radius_meters, other.radius_meters);
    }
}
