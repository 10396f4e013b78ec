//! CLI command handlers.

pub mod config;
pub mod login;
pub mod run;
pub mod sample;

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use checkin_client::{GeoFence, GeoPoint};
use checkin_config::{LoadedConfig, ResolvedLocation, ResolvedOAuth};
use checkin_oauth::OAuthConfig;
use checkin_oauth::oauth::{DEFAULT_OAUTH_BASE_URL, DEFAULT_SSO_BASE_URL};
use console::style;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
    /// Explicit user config directory.
    pub config_dir: Option<PathBuf>,
    /// Directory searched for `checkin.toml` and `.env`.
    pub project_dir: Option<PathBuf>,
}

impl Context {
    /// Load all config layers and surface their warnings.
    pub fn load_config(&self) -> Result<LoadedConfig> {
        let loaded = checkin_config::load_config_with_options(
            self.project_dir.as_deref(),
            self.config_dir.as_deref(),
        )?;

        for warning in &loaded.warnings {
            tracing::warn!("{}", warning);
        }
        if self.verbose {
            for path in loaded.loaded_from() {
                tracing::debug!(path = %path.display(), "Loaded config layer");
            }
        }

        Ok(loaded)
    }
}

/// Username and password for the portal login.
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Ask for whatever is missing. The password is always read without echo.
    pub fn prompt(username: Option<String>) -> Result<Self> {
        let username = match username.filter(|u| !u.trim().is_empty()) {
            Some(username) => username,
            None => {
                eprint!("Username: ");
                std::io::stderr().flush()?;
                let mut input = String::new();
                std::io::stdin().read_line(&mut input)?;
                input.trim().to_string()
            }
        };
        if username.is_empty() {
            bail!("No username provided, aborting.");
        }

        let password = rpassword::prompt_password("Password: ")?;
        if password.is_empty() {
            bail!("No password provided, aborting.");
        }

        Ok(Self { username, password })
    }
}

/// Build the OAuth client settings, keeping portal defaults for anything unset.
pub fn oauth_config(oauth: &ResolvedOAuth, timeout: Duration) -> OAuthConfig {
    let mut config = OAuthConfig::simaster(&oauth.client_id, &oauth.client_secret)
        .with_timeout(timeout)
        .with_base_urls(
            oauth.base_url.as_deref().unwrap_or(DEFAULT_OAUTH_BASE_URL),
            oauth.sso_base_url.as_deref().unwrap_or(DEFAULT_SSO_BASE_URL),
        );
    if let Some(ref uri) = oauth.redirect_uri {
        config = config.with_redirect_uri(uri);
    }
    if let Some(ref scope) = oauth.scope {
        config = config.with_scope(scope);
    }
    config
}

pub fn geofence(location: &ResolvedLocation) -> GeoFence {
    GeoFence::new(
        GeoPoint::new(location.latitude, location.longitude),
        location.radius_meters,
    )
}

/// Print an error line to stderr unless JSON output is active.
pub fn print_error(ctx: &Context, message: &str) {
    if !ctx.json_output {
        eprintln!("{} {}", style("✗").red().bold(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved_oauth() -> ResolvedOAuth {
        ResolvedOAuth {
            client_id: "client-1".to_string(),
            client_secret: "secret-1".to_string(),
            redirect_uri: None,
            scope: Some("student".to_string()),
            base_url: Some("http://127.0.0.1:9000/".to_string()),
            sso_base_url: None,
        }
    }

    #[test]
    fn test_oauth_config_keeps_defaults() {
        let config = oauth_config(&resolved_oauth(), Duration::from_secs(5));
        assert_eq!(config.client_id, "client-1");
        assert_eq!(config.client_secret, "secret-1");
        assert_eq!(config.scope, "student");
        assert_eq!(
            config.redirect_uri,
            checkin_oauth::oauth::DEFAULT_REDIRECT_URI
        );
        assert_eq!(config.oauth_origin(), "http://127.0.0.1:9000");
        assert_eq!(config.sso_origin(), DEFAULT_SSO_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_geofence_from_location() {
        let fence = geofence(&ResolvedLocation {
            latitude: -7.77,
            longitude: 110.37,
            radius_meters: 40.0,
        });
        assert_eq!(fence.center, GeoPoint::new(-7.77, 110.37));
        assert_eq!(fence.radius_meters, 40.0);
    }
}
