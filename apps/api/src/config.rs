use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_MERGE_TIMEOUT_SECS: u64 = 60;

/// Application configuration loaded from environment variables.
/// Startup fails if a variable is malformed or a remote-backend secret is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub static_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub scratch_dir: PathBuf,
    pub body_limit_bytes: usize,
    /// Browser origin allowed by CORS. `None` allows any origin.
    pub cors_allowed_origin: Option<String>,
    pub merge_backend: MergeBackend,
}

/// Which document-merge implementation serves requests.
#[derive(Debug, Clone)]
pub enum MergeBackend {
    Local,
    Remote(RemoteMergeConfig),
}

/// Connection details for an external document-generation service.
#[derive(Clone)]
pub struct RemoteMergeConfig {
    pub endpoint: String,
    pub client_id: String,
    pub client_secret: String,
    pub timeout: Duration,
}

// Keeps the secret out of logs.
impl std::fmt::Debug for RemoteMergeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteMergeConfig")
            .field("endpoint", &self.endpoint)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let merge_backend = match var("MERGE_BACKEND").as_deref().map(str::trim) {
            None | Some("local") => MergeBackend::Local,
            Some("remote") => MergeBackend::Remote(RemoteMergeConfig {
                endpoint: require(&var, "MERGE_SERVICE_URL")?,
                client_id: require(&var, "MERGE_CLIENT_ID")?,
                client_secret: require(&var, "MERGE_CLIENT_SECRET")?,
                timeout: Duration::from_secs(parse_or(
                    &var,
                    "MERGE_TIMEOUT_SECS",
                    DEFAULT_MERGE_TIMEOUT_SECS,
                )?),
            }),
            Some(other) => bail!("MERGE_BACKEND must be 'local' or 'remote', got '{other}'"),
        };

        Ok(Config {
            port: parse_or(&var, "PORT", 3000)?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            static_dir: var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("frontend")),
            templates_dir: var("TEMPLATES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("templates")),
            scratch_dir: var("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            body_limit_bytes: parse_or(&var, "BODY_LIMIT_BYTES", DEFAULT_BODY_LIMIT_BYTES)?,
            cors_allowed_origin: var("CORS_ALLOWED_ORIGIN"),
            merge_backend,
        })
    }
}

fn require(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.static_dir, PathBuf::from("frontend"));
        assert_eq!(config.templates_dir, PathBuf::from("templates"));
        assert_eq!(config.body_limit_bytes, 10 * 1024 * 1024);
        assert!(config.cors_allowed_origin.is_none());
        assert!(matches!(config.merge_backend, MergeBackend::Local));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("STATIC_DIR", "/srv/www"),
            ("SCRATCH_DIR", "/var/tmp/resumes"),
            ("BODY_LIMIT_BYTES", "1024"),
            ("CORS_ALLOWED_ORIGIN", "http://127.0.0.1:5500"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.static_dir, PathBuf::from("/srv/www"));
        assert_eq!(config.scratch_dir, PathBuf::from("/var/tmp/resumes"));
        assert_eq!(config.body_limit_bytes, 1024);
        assert_eq!(
            config.cors_allowed_origin.as_deref(),
            Some("http://127.0.0.1:5500")
        );
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("PORT", "70000")]).is_err());
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[("PORT", "  "), ("CORS_ALLOWED_ORIGIN", "")]).unwrap();
        assert_eq!(config.port, 3000);
        assert!(config.cors_allowed_origin.is_none());
    }

    #[test]
    fn test_remote_backend_requires_credentials() {
        let err = config_from(&[
            ("MERGE_BACKEND", "remote"),
            ("MERGE_SERVICE_URL", "https://merge.example/v1/merge"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("MERGE_CLIENT_ID"));
    }

    #[test]
    fn test_remote_backend() {
        let config = config_from(&[
            ("MERGE_BACKEND", "remote"),
            ("MERGE_SERVICE_URL", "https://merge.example/v1/merge"),
            ("MERGE_CLIENT_ID", "id"),
            ("MERGE_CLIENT_SECRET", "s3cret"),
            ("MERGE_TIMEOUT_SECS", "15"),
        ])
        .unwrap();
        match config.merge_backend {
            MergeBackend::Remote(remote) => {
                assert_eq!(remote.endpoint, "https://merge.example/v1/merge");
                assert_eq!(remote.timeout, Duration::from_secs(15));
                let debug = format!("{remote:?}");
                assert!(!debug.contains("s3cret"));
            }
            MergeBackend::Local => panic!("expected remote backend"),
        }
    }

    #[test]
    fn test_unknown_backend_is_an_error() {
        assert!(config_from(&[("MERGE_BACKEND", "adobe")]).is_err());
    }
}
