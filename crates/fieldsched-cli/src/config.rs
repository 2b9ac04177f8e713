//! Configuration file and environment overrides.
//!
//! Settings live in `config.toml` in the platform config folder (or the file
//! passed with `--config`):
//! - macOS: ~/Library/Application Support/com.fieldsched.fieldsched/
//! - Windows: %APPDATA%/fieldsched/fieldsched/config/
//! - Linux: ~/.config/fieldsched/
//!
//! Every setting can be overridden with a `FIELDSCHED_*` environment variable.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use fieldsched_catalog::DEFAULT_CATALOG_TTL;
use fieldsched_match::{CONFIDENT_MATCH_THRESHOLD, FingerprintMatcher, SelectionPolicy};
use fieldsched_services::{DEFAULT_TIMEOUT, HttpSettings};
use serde::{Deserialize, Serialize};

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "fieldsched";
const APP_NAME: &str = "fieldsched";
const CONFIG_FILENAME: &str = "config.toml";
const PROFILES_FILENAME: &str = "profiles.json";

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
}

/// Default location of the config file.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub workflow: WorkflowConfig,
    pub catalog: CatalogConfig,
    pub matching: MatchingConfig,
}

/// Hosted backend: relational store, auth and payments functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    /// Defaults to `<url>/functions/v1`.
    pub functions_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            functions_url: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub ingest_url: Option<String>,
    pub route_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Local profile catalog. Defaults to `profiles.json` in the data folder.
    pub profiles_file: Option<PathBuf>,
    pub ttl_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            profiles_file: None,
            ttl_secs: DEFAULT_CATALOG_TTL.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub threshold: f64,
    pub policy: SelectionPolicy,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: CONFIDENT_MATCH_THRESHOLD,
            policy: SelectionPolicy::default(),
        }
    }
}

impl Config {
    /// Load the config file, then apply environment overrides.
    ///
    /// An explicit path must exist. A missing file at the default location
    /// means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::read(path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::read(&path)?,
                Some(path) => {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    Self::default()
                }
                None => {
                    tracing::warn!("could not determine config path, using defaults");
                    Self::default()
                }
            },
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("parse config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `FIELDSCHED_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(value) = var("FIELDSCHED_BACKEND_URL") {
            self.backend.url = Some(value);
        }
        if let Some(value) = var("FIELDSCHED_API_KEY") {
            self.backend.api_key = Some(value);
        }
        if let Some(value) = var("FIELDSCHED_FUNCTIONS_URL") {
            self.backend.functions_url = Some(value);
        }
        if let Some(value) = var("FIELDSCHED_TIMEOUT_SECS") {
            self.backend.timeout_secs = parse_env("FIELDSCHED_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = var("FIELDSCHED_WORKFLOW_INGEST_URL") {
            self.workflow.ingest_url = Some(value);
        }
        if let Some(value) = var("FIELDSCHED_WORKFLOW_ROUTE_URL") {
            self.workflow.route_url = Some(value);
        }
        if let Some(value) = var("FIELDSCHED_PROFILES_FILE") {
            self.catalog.profiles_file = Some(PathBuf::from(value));
        }
        if let Some(value) = var("FIELDSCHED_CATALOG_TTL_SECS") {
            self.catalog.ttl_secs = parse_env("FIELDSCHED_CATALOG_TTL_SECS", &value)?;
        }
        if let Some(value) = var("FIELDSCHED_MATCH_THRESHOLD") {
            self.matching.threshold = parse_env("FIELDSCHED_MATCH_THRESHOLD", &value)?;
        }
        if let Some(value) = var("FIELDSCHED_MATCH_POLICY") {
            self.matching.policy = parse_policy(&value)?;
        }
        Ok(())
    }

    pub fn backend_url(&self) -> Result<&str> {
        match self.backend.url.as_deref() {
            Some(url) => Ok(url),
            None => bail!("backend URL is not configured (set backend.url or FIELDSCHED_BACKEND_URL)"),
        }
    }

    pub fn functions_url(&self) -> Result<String> {
        match &self.backend.functions_url {
            Some(url) => Ok(url.clone()),
            None => Ok(format!(
                "{}/functions/v1",
                self.backend_url()?.trim_end_matches('/')
            )),
        }
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            api_key: self.backend.api_key.clone(),
            timeout: Duration::from_secs(self.backend.timeout_secs),
        }
    }

    pub fn catalog_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog.ttl_secs)
    }

    pub fn profiles_file(&self) -> Result<PathBuf> {
        if let Some(path) = &self.catalog.profiles_file {
            return Ok(path.clone());
        }
        match project_dirs() {
            Some(dirs) => Ok(dirs.data_dir().join(PROFILES_FILENAME)),
            None => bail!("could not determine data folder; set catalog.profiles_file"),
        }
    }

    pub fn matcher(&self) -> FingerprintMatcher {
        FingerprintMatcher::new()
            .with_threshold(self.matching.threshold)
            .with_policy(self.matching.policy)
    }
}

fn parse_env<T>(name: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("invalid {name}: {value:?}"))
}

pub fn parse_policy(value: &str) -> Result<SelectionPolicy> {
    match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "first_match" | "first" => Ok(SelectionPolicy::FirstMatch),
        "best_ratio" | "best" => Ok(SelectionPolicy::BestRatio),
        other => bail!("unknown match policy {other:?} (expected first_match or best_ratio)"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [backend]
            url = "https://example.supabase.co"

            [matching]
            policy = "best_ratio"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.catalog.ttl_secs, 60);
        assert_eq!(config.matching.threshold, 0.9);
        assert_eq!(config.matching.policy, SelectionPolicy::BestRatio);
        assert_eq!(
            config.functions_url().unwrap(),
            "https://example.supabase.co/functions/v1"
        );
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            ("FIELDSCHED_BACKEND_URL", "http://localhost:54321"),
            ("FIELDSCHED_MATCH_THRESHOLD", "0.75"),
            ("FIELDSCHED_MATCH_POLICY", "best-ratio"),
            ("FIELDSCHED_WORKFLOW_ROUTE_URL", ""),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        config.workflow.route_url = Some("http://hooks/route".to_string());

        config
            .apply_env(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.backend_url().unwrap(), "http://localhost:54321");
        assert_eq!(config.matching.threshold, 0.75);
        assert_eq!(config.matching.policy, SelectionPolicy::BestRatio);
        assert_eq!(config.workflow.route_url.as_deref(), Some("http://hooks/route"));
    }

    #[test]
    fn bad_env_value_is_an_error() {
        let mut config = Config::default();
        let err = config
            .apply_env(|name| (name == "FIELDSCHED_TIMEOUT_SECS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("FIELDSCHED_TIMEOUT_SECS"));
    }

    #[test]
    fn missing_backend_url_is_reported() {
        let err = Config::default().backend_url().unwrap_err();
        assert!(err.to_string().contains("FIELDSCHED_BACKEND_URL"));
    }
}
