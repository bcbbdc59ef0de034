use std::path::PathBuf;

use crate::limits::DEFAULT_EMAIL_DOMAIN;

/// Process configuration, read from `ROOMRES_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// JSON store file; `None` keeps everything in memory for the session.
    pub data_file: Option<PathBuf>,
    /// Required email suffix, always starting with `@`.
    pub email_domain: String,
    pub metrics_port: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: None,
            email_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
            metrics_port: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_file = lookup("ROOMRES_DATA_FILE")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        let email_domain = lookup("ROOMRES_EMAIL_DOMAIN")
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .map(|s| if s.starts_with('@') { s } else { format!("@{s}") })
            .unwrap_or_else(|| DEFAULT_EMAIL_DOMAIN.to_string());
        let metrics_port = lookup("ROOMRES_METRICS_PORT").and_then(|s| s.parse().ok());
        Self {
            data_file,
            email_domain,
            metrics_port,
        }
    }
}
