//! Environment variable overrides, including values from a `.env` file.
//!
//! Process environment wins over `.env`, which wins over config files.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use crate::{CheckinConfig, ConfigError, Result};

pub const CLIENT_ID_ENV: &str = "SIMASTER_CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "SIMASTER_CLIENT_SECRET";
pub const REDIRECT_URI_ENV: &str = "SIMASTER_REDIRECT_URI";
pub const SCOPE_ENV: &str = "SIMASTER_SCOPE";
pub const BASE_URL_ENV: &str = "SIMASTER_BASE_URL";
pub const LATITUDE_ENV: &str = "KKN_LOCATION_LATITUDE";
pub const LONGITUDE_ENV: &str = "KKN_LOCATION_LONGITUDE";
pub const RADIUS_ENV: &str = "KKN_LOCATION_RADIUS_METERS";
pub const QR_CODE_ENV: &str = "QR_CODE_VALUE";
pub const TIMEOUT_ENV: &str = "CHECKIN_TIMEOUT_SECS";

/// Every variable consulted, in the order they are applied.
pub const ENV_VARS: [&str; 10] = [
    CLIENT_ID_ENV,
    CLIENT_SECRET_ENV,
    REDIRECT_URI_ENV,
    SCOPE_ENV,
    BASE_URL_ENV,
    LATITUDE_ENV,
    LONGITUDE_ENV,
    RADIUS_ENV,
    QR_CODE_ENV,
    TIMEOUT_ENV,
];

/// Read `KEY=value` pairs from a `.env` file without touching the process
/// environment. A missing file yields an empty map.
pub fn read_dotenv(path: &Path) -> Result<HashMap<String, String>> {
    if !path.is_file() {
        return Ok(HashMap::new());
    }

    let env_error = |e: dotenvy::Error| ConfigError::EnvFile {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    dotenvy::from_path_iter(path)
        .map_err(env_error)?
        .map(|item| item.map_err(env_error))
        .collect()
}

/// Apply overrides from `lookup` onto `config`.
///
/// Empty values are ignored. Returns the names of the variables that were
/// applied.
pub fn apply_env_overrides<F>(config: &mut CheckinConfig, lookup: F) -> Result<Vec<&'static str>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = Vec::new();
    let mut get = |var: &'static str| {
        let value = lookup(var).filter(|v| !v.trim().is_empty());
        if value.is_some() {
            applied.push(var);
        }
        value
    };

    if let Some(v) = get(CLIENT_ID_ENV) {
        config.oauth_mut().client_id = Some(v);
    }
    if let Some(v) = get(CLIENT_SECRET_ENV) {
        config.oauth_mut().client_secret = Some(v);
    }
    if let Some(v) = get(REDIRECT_URI_ENV) {
        config.oauth_mut().redirect_uri = Some(v);
    }
    if let Some(v) = get(SCOPE_ENV) {
        config.oauth_mut().scope = Some(v);
    }
    if let Some(v) = get(BASE_URL_ENV) {
        config.checkin_mut().base_url = Some(v);
    }
    if let Some(v) = get(LATITUDE_ENV) {
        config.location_mut().latitude = Some(parse(LATITUDE_ENV, &v, "a decimal number")?);
    }
    if let Some(v) = get(LONGITUDE_ENV) {
        config.location_mut().longitude = Some(parse(LONGITUDE_ENV, &v, "a decimal number")?);
    }
    if let Some(v) = get(RADIUS_ENV) {
        config.location_mut().radius_meters = Some(parse(RADIUS_ENV, &v, "a number of meters")?);
    }
    if let Some(v) = get(QR_CODE_ENV) {
        config.checkin_mut().qr_code = Some(parse(QR_CODE_ENV, &v, "a non-negative integer")?);
    }
    if let Some(v) = get(TIMEOUT_ENV) {
        config.checkin_mut().timeout_secs = Some(parse(TIMEOUT_ENV, &v, "whole seconds")?);
    }

    Ok(applied)
}

fn parse<T: FromStr>(var: &str, value: &str, expected: &'static str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            var: var.to_string(),
            value: value.to_string(),
            expected,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_overrides_apply_to_sections() {
        let mut config = CheckinConfig::new();
        let applied = apply_env_overrides(
            &mut config,
            lookup(&[
                (CLIENT_ID_ENV, "id"),
                (CLIENT_SECRET_ENV, "secret"),
                (LATITUDE_ENV, "-7.7707"),
                (LONGITUDE_ENV, " 110.3777 "),
                (RADIUS_ENV, "50"),
                (QR_CODE_ENV, "482913"),
            ]),
        )
        .unwrap();

        assert_eq!(applied.len(), 6);
        let oauth = config.oauth.as_ref().unwrap();
        assert_eq!(oauth.client_id.as_deref(), Some("id"));
        assert_eq!(oauth.client_secret.as_deref(), Some("secret"));
        let location = config.location.as_ref().unwrap();
        assert_eq!(location.latitude, Some(-7.7707));
        assert_eq!(location.longitude, Some(110.3777));
        assert_eq!(location.radius_meters, Some(50.0));
        assert_eq!(config.checkin.as_ref().unwrap().qr_code, Some(482913));
    }

    #[test]
    fn test_overrides_win_over_file_values() {
        let mut config =
            CheckinConfig::from_toml("[checkin]\nbase_url = \"http://file\"\nqr_code = 1").unwrap();
        apply_env_overrides(&mut config, lookup(&[(BASE_URL_ENV, "http://env")])).unwrap();

        let checkin = config.checkin.as_ref().unwrap();
        assert_eq!(checkin.base_url.as_deref(), Some("http://env"));
        assert_eq!(checkin.qr_code, Some(1));
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let mut config = CheckinConfig::new();
        let applied =
            apply_env_overrides(&mut config, lookup(&[(QR_CODE_ENV, ""), (SCOPE_ENV, "  ")]))
                .unwrap();
        assert!(applied.is_empty());
        assert_eq!(config, CheckinConfig::new());
    }

    #[test]
    fn test_invalid_number_names_variable() {
        let mut config = CheckinConfig::new();
        let err =
            apply_env_overrides(&mut config, lookup(&[(QR_CODE_ENV, "12ab")])).unwrap_err();
        match err {
            ConfigError::InvalidValue { var, value, .. } => {
                assert_eq!(var, QR_CODE_ENV);
                assert_eq!(value, "12ab");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err =
            apply_env_overrides(&mut config, lookup(&[(LATITUDE_ENV, "south")])).unwrap_err();
        assert!(err.to_string().contains(LATITUDE_ENV));
    }

    #[test]
    fn test_read_dotenv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        fs::write(
            &path,
            "# location\nKKN_LOCATION_LATITUDE=-7.77\nQR_CODE_VALUE=\"99\"\n",
        )
        .unwrap();

        let values = read_dotenv(&path).unwrap();
        assert_eq!(values.get(LATITUDE_ENV).map(String::as_str), Some("-7.77"));
        assert_eq!(values.get(QR_CODE_ENV).map(String::as_str), Some("99"));
        assert!(read_dotenv(&dir.path().join("missing.env")).unwrap().is_empty());
    }
}
