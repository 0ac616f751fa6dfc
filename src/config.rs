// Configuration loading and parsing (config/app.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the betting API, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Path to the session database. `":memory:"` gives an ephemeral store.
    pub db_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api: ApiConfig {
                base_url: "http://127.0.0.1:5500".to_string(),
                timeout_secs: 10,
            },
            session: SessionConfig {
                db_path: default_session_path(),
            },
        }
    }
}

/// Resolve the default session database location in the user's data
/// directory, falling back to a file in the working directory when the
/// platform offers no such directory.
fn default_session_path() -> String {
    directories::ProjectDirs::from("", "", "paddock")
        .map(|dirs| {
            dirs.data_dir()
                .join("session.db")
                .to_string_lossy()
                .into_owned()
        })
        .unwrap_or_else(|| "paddock-session.db".to_string())
}

// ---------------------------------------------------------------------------
// app.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the whole app.toml file. All sections are
/// optional; missing ones fall back to defaults.
#[derive(Debug, Clone, Deserialize)]
struct AppFile {
    api: Option<ApiSection>,
    session: Option<SessionSection>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiSection {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
struct SessionSection {
    db_path: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load configuration from `config/app.toml` relative to `base_dir`.
///
/// A missing file is not an error: the defaults (local API on port 5500,
/// session database in the user data directory) are used. A file that
/// exists but fails to parse or validate is an error.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("app.toml");
    if !path.exists() {
        return Ok(Config::default());
    }

    let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    let file: AppFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    let defaults = Config::default();
    let api_section = file.api.unwrap_or(ApiSection {
        base_url: None,
        timeout_secs: None,
    });
    let session_section = file.session.unwrap_or(SessionSection { db_path: None });

    let config = Config {
        api: ApiConfig {
            base_url: api_section
                .base_url
                .unwrap_or(defaults.api.base_url)
                .trim_end_matches('/')
                .to_string(),
            timeout_secs: api_section.timeout_secs.unwrap_or(defaults.api.timeout_secs),
        },
        session: SessionConfig {
            db_path: session_section.db_path.unwrap_or(defaults.session.db_path),
        },
    };

    validate(&config)?;
    Ok(config)
}

/// Load configuration from the current working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|e| ConfigError::ReadError {
        path: PathBuf::from("."),
        source: e,
    })?;
    load_config_from(&cwd)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.api.base_url.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "api.base_url".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    if config.api.timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "api.timeout_secs".to_string(),
            message: "must be at least 1 second".to_string(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, contents: &str) {
        let config_dir = dir.join("config");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("app.toml"), contents).unwrap();
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("paddock-config-test-{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = temp_dir("missing");
        let config = load_config_from(&dir).unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:5500");
        assert_eq!(config.api.timeout_secs, 10);
        assert!(!config.session.db_path.is_empty());
    }

    #[test]
    fn full_file_parses() {
        let dir = temp_dir("full");
        write_config(
            &dir,
            r#"
            [api]
            base_url = "http://betting.example.com/"
            timeout_secs = 30

            [session]
            db_path = ":memory:"
            "#,
        );
        let config = load_config_from(&dir).unwrap();
        // Trailing slash is stripped so endpoint paths can be appended.
        assert_eq!(config.api.base_url, "http://betting.example.com");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.session.db_path, ":memory:");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = temp_dir("partial");
        write_config(
            &dir,
            r#"
            [api]
            base_url = "http://10.0.0.2:8080"
            "#,
        );
        let config = load_config_from(&dir).unwrap();
        assert_eq!(config.api.base_url, "http://10.0.0.2:8080");
        assert_eq!(config.api.timeout_secs, 10);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = temp_dir("invalid");
        write_config(&dir, "[api\nbase_url = ");
        let err = load_config_from(&dir).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn empty_base_url_fails_validation() {
        let dir = temp_dir("empty-url");
        write_config(
            &dir,
            r#"
            [api]
            base_url = ""
            "#,
        );
        let err = load_config_from(&dir).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let dir = temp_dir("zero-timeout");
        write_config(
            &dir,
            r#"
            [api]
            timeout_secs = 0
            "#,
        );
        let err = load_config_from(&dir).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }
}
