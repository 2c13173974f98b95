//! Settings taken from the environment: the API key and where to send requests

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

pub const API_KEY_VAR: &str = "CLOCKIFY_API_KEY";
pub const BASE_URL_VAR: &str = "CLOCKIFY_BASE_URL";
pub const REPORTS_URL_VAR: &str = "CLOCKIFY_REPORTS_URL";

pub const DEFAULT_BASE_URL: &str = "https://api.clockify.me/api/v1";
pub const DEFAULT_REPORTS_URL: &str = "https://reports.api.clockify.me/v1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The API key is not set, or set to an empty string
    #[error("environment variable {0} is not set")]
    MissingCredential(&'static str),
}

/// API key sent with every request
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: api_key.into() }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key.trim())),
            _ => Err(ConfigError::MissingCredential(API_KEY_VAR)),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

// keep the key out of logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").field("api_key", &"***").finish()
    }
}

/// Roots of the two Clockify APIs, without trailing slash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub api: String,
    pub reports: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api: DEFAULT_BASE_URL.to_string(),
            reports: DEFAULT_REPORTS_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Defaults, overridden by `CLOCKIFY_BASE_URL` and `CLOCKIFY_REPORTS_URL` when set
    pub fn from_env() -> Self {
        let read = |var: &str, default: &str| {
            std::env::var(var)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
                .trim_end_matches('/')
                .to_string()
        };
        Self {
            api: read(BASE_URL_VAR, DEFAULT_BASE_URL),
            reports: read(REPORTS_URL_VAR, DEFAULT_REPORTS_URL),
        }
    }
}

/// Add the variables of a `.env` file to the environment
///
/// Without an explicit `file`, `.env` is searched for in the working directory
/// and its parents. Variables that are already set are left untouched.
/// Returns the file that was read, if any.
pub fn load_dotenv(file: Option<&Path>) -> Option<PathBuf> {
    let loaded = match file {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    match loaded {
        Ok(path) => {
            debug!("read environment from {}", path.display());
            Some(path)
        }
        Err(e) if e.not_found() && file.is_none() => {
            debug!("no .env file found");
            None
        }
        Err(e) => {
            warn!("ignoring .env file: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn credential_required() {
        temp_env::with_var_unset(API_KEY_VAR, || {
            assert_eq!(
                Credentials::from_env().unwrap_err(),
                ConfigError::MissingCredential(API_KEY_VAR)
            );
        });
        temp_env::with_var(API_KEY_VAR, Some("  "), || {
            assert!(Credentials::from_env().is_err());
        });
    }

    #[test]
    fn credential_from_env() {
        temp_env::with_var(API_KEY_VAR, Some("secret-key\n"), || {
            let creds = Credentials::from_env().unwrap();
            assert_eq!(creds.api_key(), "secret-key");
            assert!(!format!("{:?}", creds).contains("secret"));
        });
    }

    fn env_file(contents: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), contents).unwrap();
        dir
    }

    #[test]
    fn credential_from_env_file() {
        let dir = env_file("CLOCKIFY_API_KEY=from-file\n");
        let path = dir.path().join(".env");
        temp_env::with_var_unset(API_KEY_VAR, || {
            assert_eq!(load_dotenv(Some(&path)), Some(path.clone()));
            assert_eq!(Credentials::from_env().unwrap().api_key(), "from-file");
        });
    }

    #[test]
    fn environment_wins_over_env_file() {
        let dir = env_file("CLOCKIFY_API_KEY=from-file\n");
        let path = dir.path().join(".env");
        temp_env::with_var(API_KEY_VAR, Some("from-env"), || {
            load_dotenv(Some(&path));
            assert_eq!(Credentials::from_env().unwrap().api_key(), "from-env");
        });
    }

    #[test]
    fn missing_env_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_dotenv(Some(&dir.path().join(".env"))), None);
    }

    #[test]
    fn default_endpoints() {
        temp_env::with_vars_unset([BASE_URL_VAR, REPORTS_URL_VAR], || {
            assert_eq!(Endpoints::from_env(), Endpoints::default());
        });
    }

    #[test]
    fn overridden_endpoints() {
        temp_env::with_vars(
            [
                (BASE_URL_VAR, Some("http://localhost:8080/api/v1/")),
                (REPORTS_URL_VAR, None),
            ],
            || {
                let endpoints = Endpoints::from_env();
                assert_eq!(endpoints.api, "http://localhost:8080/api/v1");
                assert_eq!(endpoints.reports, DEFAULT_REPORTS_URL);
            },
        );
    }
}
