//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the base URL is absent, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `REPAIRHUB_API_BASE_URL`: API base URL including the `/api` prefix
//! - `REPAIRHUB_REQUEST_TIMEOUT_SECS`: per-request timeout (default 30)
//! - `REPAIRHUB_PROBE_TIMEOUT_SECS`: connectivity probe timeout (default 5)
//! - `REPAIRHUB_STORAGE_DIR`: directory for session/preference storage
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml`
//! 2. `./repairhub.json` or `./repairhub.toml`
//! 3. The same names in the parent and grandparent directories
//! 4. Relative to the executable location

use std::path::{Path, PathBuf};
use std::time::Duration;

use repairhub_domain::constants::PROBE_TIMEOUT_SECS;
use repairhub_domain::{RepairHubError, Result};
use serde::Deserialize;
use tracing::{debug, info};

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API base URL including the `/api` prefix.
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    /// Directory for durable session credentials and preferences.
    pub storage_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001/api".to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            probe_timeout_secs: PROBE_TIMEOUT_SECS,
            storage_dir: PathBuf::from(".repairhub"),
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the base URL is not
/// set there, falls back to loading from a config file.
///
/// # Errors
/// Returns `RepairHubError::Config` if neither source yields a configuration.
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            info!("configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            debug!(error = ?e, "environment configuration incomplete, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// `REPAIRHUB_API_BASE_URL` is required; the remaining variables fall back
/// to defaults.
///
/// # Errors
/// Returns `RepairHubError::Config` if the base URL is missing or a numeric
/// variable does not parse.
pub fn load_from_env() -> Result<ClientConfig> {
    let base_url = std::env::var("REPAIRHUB_API_BASE_URL")
        .map_err(|_| RepairHubError::Config("REPAIRHUB_API_BASE_URL not set".to_string()))?;

    let defaults = ClientConfig::default();

    let request_timeout_secs =
        env_u64("REPAIRHUB_REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?;
    let probe_timeout_secs = env_u64("REPAIRHUB_PROBE_TIMEOUT_SECS", defaults.probe_timeout_secs)?;
    let storage_dir = std::env::var("REPAIRHUB_STORAGE_DIR")
        .map(PathBuf::from)
        .unwrap_or(defaults.storage_dir);

    Ok(ClientConfig { base_url, request_timeout_secs, probe_timeout_secs, storage_dir })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `RepairHubError::Config` if no file is found or it fails to parse.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(RepairHubError::Config(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            RepairHubError::Config("no config file found in any of the standard locations".into())
        })?,
    };

    info!(path = %config_path.display(), "loading configuration from file");
    parse_config_file(&config_path)
}

fn parse_config_file(path: &Path) -> Result<ClientConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| RepairHubError::Config(format!("read {}: {e}", path.display())))?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&contents)
            .map_err(|e| RepairHubError::Config(format!("invalid JSON config: {e}"))),
        Some("toml") => toml::from_str(&contents)
            .map_err(|e| RepairHubError::Config(format!("invalid TOML config: {e}"))),
        other => Err(RepairHubError::Config(format!(
            "unsupported config extension {other:?} for {}",
            path.display()
        ))),
    }
}

fn probe_config_paths() -> Option<PathBuf> {
    let names = ["config.json", "config.toml", "repairhub.json", "repairhub.toml"];

    let mut roots: Vec<PathBuf> =
        vec![PathBuf::from("."), PathBuf::from(".."), PathBuf::from("../..")];
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            roots.push(dir.to_path_buf());
        }
    }

    for root in roots {
        for name in names {
            let candidate = root.join(name);
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }
    None
}

fn env_u64(name: &str, default: u64) -> Result<u64> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| RepairHubError::Config(format!("invalid {name}: {e}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;

    use super::*;

    // Env-var tests mutate process state; serialize them.
    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    fn clear_env() {
        for name in [
            "REPAIRHUB_API_BASE_URL",
            "REPAIRHUB_REQUEST_TIMEOUT_SECS",
            "REPAIRHUB_PROBE_TIMEOUT_SECS",
            "REPAIRHUB_STORAGE_DIR",
        ] {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn env_loading_requires_base_url() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        assert!(load_from_env().is_err());

        std::env::set_var("REPAIRHUB_API_BASE_URL", "http://api.example.test/api");
        let config = load_from_env().unwrap();
        assert_eq!(config.base_url, "http://api.example.test/api");
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.probe_timeout_secs, PROBE_TIMEOUT_SECS);

        clear_env();
    }

    #[test]
    fn env_overrides_timeouts() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        std::env::set_var("REPAIRHUB_API_BASE_URL", "http://api.example.test/api");
        std::env::set_var("REPAIRHUB_REQUEST_TIMEOUT_SECS", "10");
        std::env::set_var("REPAIRHUB_PROBE_TIMEOUT_SECS", "2");
        std::env::set_var("REPAIRHUB_STORAGE_DIR", "/tmp/repairhub-test");

        let config = load_from_env().unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.probe_timeout(), Duration::from_secs(2));
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/repairhub-test"));

        clear_env();
    }

    #[test]
    fn invalid_numeric_env_is_a_config_error() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        std::env::set_var("REPAIRHUB_API_BASE_URL", "http://api.example.test/api");
        std::env::set_var("REPAIRHUB_REQUEST_TIMEOUT_SECS", "not-a-number");

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, RepairHubError::Config(_)));

        clear_env();
    }

    #[test]
    fn loads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"base_url": "https://shop.example.test/api", "request_timeout_secs": 15}}"#
        )
        .unwrap();

        let config = load_from_file(Some(path)).unwrap();
        assert_eq!(config.base_url, "https://shop.example.test/api");
        assert_eq!(config.request_timeout_secs, 15);
        // Unspecified fields keep defaults.
        assert_eq!(config.probe_timeout_secs, PROBE_TIMEOUT_SECS);
    }

    #[test]
    fn loads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repairhub.toml");
        std::fs::write(
            &path,
            "base_url = \"https://shop.example.test/api\"\nprobe_timeout_secs = 3\n",
        )
        .unwrap();

        let config = load_from_file(Some(path)).unwrap();
        assert_eq!(config.probe_timeout_secs, 3);
    }

    #[test]
    fn missing_explicit_file_is_a_config_error() {
        let err = load_from_file(Some(PathBuf::from("/nonexistent/config.json"))).unwrap_err();
        assert!(matches!(err, RepairHubError::Config(_)));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "base_url: nope").unwrap();

        assert!(load_from_file(Some(path)).is_err());
    }
}
