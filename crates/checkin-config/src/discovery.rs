//! Config file discovery and layered merging.
//!
//! Resolution order (later overrides earlier):
//! 1. `~/.config/kkn-checkin/config.toml` (user config)
//! 2. `./checkin.toml` (project-local)
//! 3. `./.env`, then the process environment

use std::path::{Path, PathBuf};

use crate::env::{apply_env_overrides, read_dotenv};
use crate::{CheckinConfig, ConfigError, Result};

/// Default config filename for project-local config.
const PROJECT_CONFIG_FILE: &str = "checkin.toml";

/// Default config filename within the user config directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// Dotenv filename looked up next to the project config.
const ENV_FILE: &str = ".env";

/// Application name for platform directory resolution.
const APP_NAME: &str = "kkn-checkin";

/// Environment variable to override the config directory.
const CONFIG_DIR_ENV: &str = "CHECKIN_CONFIG_DIR";

/// Tracks where each config layer was loaded from.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Path to the config file.
    pub path: PathBuf,
    /// Whether the file was found and loaded.
    pub loaded: bool,
}

/// Result of config discovery and loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged configuration.
    pub config: CheckinConfig,
    /// Sources that were checked, in order of precedence (lowest first).
    pub sources: Vec<ConfigSource>,
    /// Environment variables that overrode file values.
    pub env_overrides: Vec<&'static str>,
    /// Warnings generated during loading (e.g., plaintext secrets).
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Get paths of sources that were actually loaded.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }
}

/// Load configuration with explicit control over the user config directory.
///
/// `config_dir` overrides both `CHECKIN_CONFIG_DIR` and the platform default.
pub fn load_config_with_options(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    load_config_with_env(project_dir, config_dir, |var| std::env::var(var).ok())
}

/// Load configuration, reading environment variables through `lookup`.
///
/// Values from `lookup` take precedence over the `.env` file.
pub fn load_config_with_env<F>(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
    lookup: F,
) -> Result<LoadedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = CheckinConfig::new();
    let mut sources = Vec::new();
    let mut warnings = Vec::new();

    // 1. User config
    let user_config_path = match config_dir {
        Some(dir) => Some(dir.join(USER_CONFIG_FILE)),
        None => user_config_path(),
    };
    if let Some(path) = user_config_path {
        sources.push(load_layer(&mut config, &path, &mut warnings));
    }

    // 2. Project-local config
    let project_root = project_dir.map(Path::to_path_buf).unwrap_or_default();
    let project_path = project_root.join(PROJECT_CONFIG_FILE);
    sources.push(load_layer(&mut config, &project_path, &mut warnings));

    // 3. Environment, falling back to .env
    let env_path = project_root.join(ENV_FILE);
    let dotenv = match read_dotenv(&env_path) {
        Ok(values) => values,
        Err(e) => {
            warnings.push(e.to_string());
            Default::default()
        }
    };
    sources.push(ConfigSource {
        loaded: !dotenv.is_empty(),
        path: env_path,
    });

    let env_overrides = apply_env_overrides(&mut config, |var| {
        lookup(var).or_else(|| dotenv.get(var).cloned())
    })?;

    Ok(LoadedConfig {
        config,
        sources,
        env_overrides,
        warnings,
    })
}

/// Load config from a specific file path (no discovery).
pub fn load_config_file(path: &Path) -> Result<CheckinConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    CheckinConfig::from_toml(&contents)
}

/// Path of the user config file.
pub fn user_config_path() -> Option<PathBuf> {
    user_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// User config directory.
///
/// Checks `CHECKIN_CONFIG_DIR` first, then falls back to the platform default
/// (`~/.config/kkn-checkin` on Linux).
pub fn user_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Try to load a config file and merge it into the existing config.
///
/// Unreadable or malformed files become warnings.
fn load_layer(config: &mut CheckinConfig, path: &Path, warnings: &mut Vec<String>) -> ConfigSource {
    if !path.is_file() {
        return ConfigSource {
            path: path.to_path_buf(),
            loaded: false,
        };
    }

    match load_config_file(path) {
        Ok(layer) => {
            if layer.has_plaintext_secret() {
                warnings.push(format!(
                    "{} contains a plaintext client_secret. \
                     Consider setting {} in the environment or a .env file instead.",
                    path.display(),
                    crate::env::CLIENT_SECRET_ENV
                ));
            }
            config.merge(layer);
            ConfigSource {
                path: path.to_path_buf(),
                loaded: true,
            }
        }
        Err(e) => {
            warnings.push(format!("Failed to load {}: {}", path.display(), e));
            ConfigSource {
                path: path.to_path_buf(),
                loaded: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn load(project: &TempDir, user: &TempDir) -> LoadedConfig {
        load_config_with_env(Some(project.path()), Some(user.path()), no_env).unwrap()
    }

    #[test]
    fn test_user_config_path_shape() {
        if let Some(p) = user_config_path() {
            assert!(p.ends_with("config.toml"));
        }
    }

    #[test]
    fn test_load_config_file_not_found() {
        let err = load_config_file(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_load_no_files() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();

        let loaded = load(&project, &user);
        assert_eq!(loaded.config, CheckinConfig::new());
        assert!(loaded.loaded_from().is_empty());
        assert_eq!(loaded.sources.len(), 3);
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_layered_merge() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        fs::write(
            user.path().join("config.toml"),
            r#"
[oauth]
client_id = "user-id"

[location]
latitude = 1.0
longitude = 2.0
radius_meters = 100
"#,
        )
        .unwrap();
        fs::write(
            project.path().join("checkin.toml"),
            "[location]\nradius_meters = 20\n",
        )
        .unwrap();

        let loaded = load(&project, &user);
        let location = loaded.config.location.as_ref().unwrap();
        assert_eq!(location.latitude, Some(1.0));
        assert_eq!(location.radius_meters, Some(20.0));
        assert_eq!(
            loaded.config.oauth.as_ref().unwrap().client_id.as_deref(),
            Some("user-id")
        );
        assert_eq!(loaded.loaded_from().len(), 2);
    }

    #[test]
    fn test_env_file_and_process_env_precedence() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        fs::write(project.path().join("checkin.toml"), "[checkin]\nqr_code = 1\n").unwrap();
        fs::write(
            project.path().join(".env"),
            "QR_CODE_VALUE=2\nKKN_LOCATION_LATITUDE=-7.5\n",
        )
        .unwrap();

        let loaded = load_config_with_env(Some(project.path()), Some(user.path()), |var| {
            (var == "KKN_LOCATION_LATITUDE").then(|| "-8.25".to_string())
        })
        .unwrap();

        assert_eq!(loaded.config.checkin.as_ref().unwrap().qr_code, Some(2));
        assert_eq!(
            loaded.config.location.as_ref().unwrap().latitude,
            Some(-8.25)
        );
        assert!(loaded.loaded_from().iter().any(|p| p.ends_with(".env")));
        assert!(loaded.env_overrides.contains(&"QR_CODE_VALUE"));
    }

    #[test]
    fn test_plaintext_secret_warning() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        fs::write(
            project.path().join("checkin.toml"),
            "[oauth]\nclient_id = \"id\"\nclient_secret = \"s3cret\"\n",
        )
        .unwrap();

        let loaded = load(&project, &user);
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].contains("plaintext"));
        assert!(loaded.warnings[0].contains("SIMASTER_CLIENT_SECRET"));
    }

    #[test]
    fn test_malformed_config_warns_but_continues() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        fs::write(project.path().join("checkin.toml"), "not valid toml {{{{").unwrap();
        fs::write(user.path().join("config.toml"), "[checkin]\nqr_code = 5\n").unwrap();

        let loaded = load(&project, &user);
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].contains("Failed to load"));
        assert_eq!(loaded.config.checkin.as_ref().unwrap().qr_code, Some(5));
    }

    #[test]
    fn test_invalid_env_value_is_an_error() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        fs::write(project.path().join(".env"), "KKN_LOCATION_RADIUS_METERS=wide\n").unwrap();

        let err = load_config_with_env(Some(project.path()), Some(user.path()), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
