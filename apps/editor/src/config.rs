use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::models::resume::{ResumeId, StyleId};
use crate::session::SessionOptions;

/// Editor configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_token: String,
    pub resume_id: Option<ResumeId>,
    pub autosave_interval: Duration,
    pub request_timeout: Duration,
    pub download_dir: PathBuf,
    pub style: StyleId,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };
        let seconds = |key: &str, default: u64| -> Result<Duration> {
            let secs = match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("{key} must be a whole number of seconds"))?,
                None => default,
            };
            if secs == 0 {
                bail!("{key} must be greater than zero");
            }
            Ok(Duration::from_secs(secs))
        };

        Ok(Config {
            api_url: require("EDITOR_API_URL")?,
            api_token: require("EDITOR_API_TOKEN")?,
            resume_id: lookup("EDITOR_RESUME_ID")
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .map(ResumeId::new),
            autosave_interval: seconds("EDITOR_AUTOSAVE_SECS", 30)?,
            request_timeout: seconds("EDITOR_REQUEST_TIMEOUT_SECS", 30)?,
            download_dir: lookup("EDITOR_DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            style: lookup("EDITOR_STYLE")
                .map(|name| StyleId::from_name(&name))
                .unwrap_or_default(),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            autosave_interval: self.autosave_interval,
            style: self.style,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("EDITOR_API_URL", "http://localhost:5000"),
        ("EDITOR_API_TOKEN", "token"),
    ];

    #[test]
    fn test_defaults() {
        let config = load(&REQUIRED).unwrap();
        assert_eq!(config.autosave_interval, Duration::from_secs(30));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.download_dir, PathBuf::from("."));
        assert_eq!(config.style, StyleId::Modern);
        assert!(config.resume_id.is_none());
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_missing_required_variable_is_named() {
        let err = load(&[("EDITOR_API_URL", "http://localhost:5000")]).unwrap_err();
        assert!(err.to_string().contains("EDITOR_API_TOKEN"));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("EDITOR_RESUME_ID", "42"),
            ("EDITOR_AUTOSAVE_SECS", "5"),
            ("EDITOR_STYLE", "ats"),
        ]);
        let config = load(&pairs).unwrap();
        assert_eq!(config.resume_id, Some(ResumeId::from("42")));
        assert_eq!(config.session_options().autosave_interval, Duration::from_secs(5));
        assert_eq!(config.style, StyleId::Ats);
    }

    #[test]
    fn test_zero_or_garbage_interval_is_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("EDITOR_AUTOSAVE_SECS", "0"));
        assert!(load(&pairs).is_err());

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("EDITOR_REQUEST_TIMEOUT_SECS", "soon"));
        let err = load(&pairs).unwrap_err();
        assert!(err.to_string().contains("EDITOR_REQUEST_TIMEOUT_SECS"));
    }
}
