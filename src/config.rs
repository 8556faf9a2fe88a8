//! Configuration for the report tool.
//!
//! Layers, later ones overriding earlier ones:
//!
//! 1. Built-in defaults ([`ReportConfig::default`])
//! 2. A TOML file: the path given with `--config`, or `./jobmarket.toml`
//! 3. `JOBMARKET_*` environment variables
//! 4. Command-line flags (applied by the binary)
//!
//! ```toml
//! [service]
//! api_base_url = "http://localhost:8000"
//! timeout_secs = 10
//!
//! [report]
//! location = "US"
//! top_k = 10
//! ```

use crate::errors::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

pub const PROJECT_CONFIG_FILE: &str = "jobmarket.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub service: ServiceConfig,
    pub report: ReportSettings,
}

/// `[service]`: where the data service lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub api_base_url: String,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            timeout_secs: 10,
        }
    }
}

/// `[report]`: view options and display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// `US`, `CA`, or empty for all locations.
    pub location: String,
    pub top_k: usize,
    /// Character budget for labels in narrow columns.
    pub label_width: usize,
    pub preview_rows: usize,
    pub output_dir: PathBuf,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            location: "US".to_string(),
            top_k: 10,
            label_width: 20,
            preview_rows: 5,
            output_dir: PathBuf::from("."),
        }
    }
}

/// Resolve the configuration from defaults, file and process environment.
///
/// A file named explicitly must exist and parse. The implicit project file
/// is optional, and a malformed one is skipped with a warning.
pub fn load(explicit: Option<&Path>) -> Result<ReportConfig> {
    let mut config = match explicit {
        Some(path) => read_file(path)?,
        None => {
            let path = Path::new(PROJECT_CONFIG_FILE);
            if path.exists() {
                read_file(path).unwrap_or_else(|e| {
                    warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                    ReportConfig::default()
                })
            } else {
                ReportConfig::default()
            }
        }
    };
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    Ok(config)
}

pub fn read_file(path: &Path) -> Result<ReportConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ReportError::Config(format!("cannot read {}: {}", path.display(), e)))?;
    parse(&content).map_err(|e| match e {
        ReportError::Config(msg) => ReportError::Config(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

pub fn parse(content: &str) -> Result<ReportConfig> {
    toml::from_str(content).map_err(|e| ReportError::Config(e.to_string()))
}

/// Apply `JOBMARKET_*` overrides read through `lookup`.
///
/// - `JOBMARKET_API_URL` - data service base URL
/// - `JOBMARKET_TIMEOUT_SECS` - request timeout
/// - `JOBMARKET_LOCATION` - location filter (may be empty for all)
/// - `JOBMARKET_TOP_K` - number of skills to rank
///
/// Values that fail to parse are ignored.
pub fn apply_env_overrides<F>(config: &mut ReportConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("JOBMARKET_API_URL").filter(|v| !v.is_empty()) {
        config.service.api_base_url = url;
    }
    if let Some(secs) = lookup("JOBMARKET_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        config.service.timeout_secs = secs;
    }
    if let Some(location) = lookup("JOBMARKET_LOCATION") {
        config.report.location = location;
    }
    if let Some(top_k) = lookup("JOBMARKET_TOP_K").and_then(|v| v.parse().ok()) {
        config.report.top_k = top_k;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = parse("[report]\ntop_k = 15\n").unwrap();
        assert_eq!(config.report.top_k, 15);
        assert_eq!(config.report.location, "US");
        assert_eq!(config.service, ServiceConfig::default());
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        assert!(matches!(parse("[report\n"), Err(ReportError::Config(_))));
        assert!(matches!(parse("[report]\ntop_k = \"ten\"\n"), Err(ReportError::Config(_))));
    }

    #[test]
    fn env_overrides_win_and_bad_values_are_ignored() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("JOBMARKET_API_URL", "http://analytics.internal:9000"),
            ("JOBMARKET_TIMEOUT_SECS", "soon"),
            ("JOBMARKET_LOCATION", ""),
            ("JOBMARKET_TOP_K", "20"),
        ]);
        let mut config = ReportConfig::default();
        apply_env_overrides(&mut config, |name| env.get(name).map(|v| v.to_string()));
        assert_eq!(config.service.api_base_url, "http://analytics.internal:9000");
        assert_eq!(config.service.timeout_secs, 10);
        assert_eq!(config.report.location, "");
        assert_eq!(config.report.top_k, 20);
    }

    #[test]
    fn explicit_missing_file_fails() {
        let err = load(Some(Path::new("/nonexistent/jobmarket.toml"))).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }

    #[test]
    fn explicit_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[service]\ntimeout_secs = 3\n").unwrap();
        assert_eq!(read_file(&path).unwrap().service.timeout_secs, 3);
    }
}
