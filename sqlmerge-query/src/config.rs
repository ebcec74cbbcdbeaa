//! Composition settings, loadable from `sqlmerge.toml`.
//!
//! ```toml
//! [compose]
//! join_conflict = "reject"
//!
//! [logging]
//! level = "debug"
//! format = "pretty"
//! ```
//!
//! Environment variables override file values:
//! - `SQLMERGE_JOIN_CONFLICT=first_wins|reject`
//! - `SQLMERGE_LOG_LEVEL=trace|debug|info|warn|error`
//! - `SQLMERGE_LOG_FORMAT=json|pretty|compact`

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use crate::error::{ComposeError, ComposeResult};

/// What to do when a table is joined again with a different condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinConflictPolicy {
    /// Keep the condition from the filter that joined the table first.
    #[default]
    FirstWins,
    /// Fail the composition.
    Reject,
}

impl FromStr for JoinConflictPolicy {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first_wins" | "first-wins" => Ok(Self::FirstWins),
            "reject" | "error" => Ok(Self::Reject),
            other => Err(ComposeError::invalid_configuration(format!(
                "unknown join conflict policy '{}'",
                other
            ))),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Structured JSON lines.
    #[default]
    Json,
    /// Multi-line human readable output.
    Pretty,
    /// Single-line human readable output.
    Compact,
}

impl LogFormat {
    /// The format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
            Self::Compact => "compact",
        }
    }
}

impl FromStr for LogFormat {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(ComposeError::invalid_configuration(format!(
                "unknown log format '{}'",
                other
            ))),
        }
    }
}

/// Composition behaviour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ComposeSettings {
    /// Handling of conflicting join conditions.
    #[serde(default)]
    pub join_conflict: JoinConflictPolicy,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level filter.
    #[serde(default = "default_level")]
    pub level: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ComposeConfig {
    /// Composition behaviour.
    #[serde(default)]
    pub compose: ComposeSettings,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl ComposeConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> ComposeResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ComposeError::config_io(path.display().to_string(), e))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> ComposeResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            ComposeError::invalid_configuration(format!("invalid sqlmerge.toml: {}", e.message()))
                .with_source(e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `SQLMERGE_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> ComposeResult<Self> {
        self.with_overrides_from(&StdEnvSource)
    }

    /// Apply `SQLMERGE_*` overrides from `source`.
    pub fn with_overrides_from(mut self, source: &impl EnvSource) -> ComposeResult<Self> {
        if let Some(policy) = source.get("SQLMERGE_JOIN_CONFLICT") {
            self.compose.join_conflict = policy.parse()?;
        }
        if let Some(level) = source.get("SQLMERGE_LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }
        if let Some(format) = source.get("SQLMERGE_LOG_FORMAT") {
            self.logging.format = format.parse()?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Set the join conflict policy.
    pub fn join_conflict(mut self, policy: JoinConflictPolicy) -> Self {
        self.compose.join_conflict = policy;
        self
    }

    fn validate(&self) -> ComposeResult<()> {
        if !LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ComposeError::invalid_configuration(format!(
                "unknown log level '{}'",
                self.logging.level
            ))
            .with_suggestion(format!("Use one of: {}", LEVELS.join(", "))));
        }
        Ok(())
    }
}

/// Source for environment variables.
pub trait EnvSource: Send + Sync {
    /// Get an environment variable value.
    fn get(&self, name: &str) -> Option<String>;
}

/// Default environment source using std::env.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Environment source backed by a HashMap.
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: HashMap<String, String>,
}

impl MapEnvSource {
    /// Create a new map-based environment source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvSource for MapEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ComposeConfig::from_str("").unwrap();
        assert_eq!(config.compose.join_conflict, JoinConflictPolicy::FirstWins);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_parse_full() {
        let config = ComposeConfig::from_str(
            r#"
            [compose]
            join_conflict = "reject"

            [logging]
            level = "debug"
            format = "compact"
            "#,
        )
        .unwrap();
        assert_eq!(config.compose.join_conflict, JoinConflictPolicy::Reject);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ComposeConfig::from_str("[compose]\nplaceholder = \"$\"\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);
    }

    #[test]
    fn test_bad_level_rejected() {
        let err = ComposeConfig::from_str("[logging]\nlevel = \"loud\"\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);
        assert!(err.message.contains("loud"));
    }

    #[test]
    fn test_env_overrides() {
        let env = MapEnvSource::new()
            .set("SQLMERGE_JOIN_CONFLICT", "reject")
            .set("SQLMERGE_LOG_LEVEL", "TRACE")
            .set("SQLMERGE_LOG_FORMAT", "pretty");
        let config = ComposeConfig::default().with_overrides_from(&env).unwrap();
        assert_eq!(config.compose.join_conflict, JoinConflictPolicy::Reject);
        assert_eq!(config.logging.level, "trace");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_bad_env_override() {
        let env = MapEnvSource::new().set("SQLMERGE_JOIN_CONFLICT", "sometimes");
        let err = ComposeConfig::default().with_overrides_from(&env).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[compose]\njoin_conflict = \"first_wins\"").unwrap();
        let config = ComposeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.compose.join_conflict, JoinConflictPolicy::FirstWins);
    }

    #[test]
    fn test_missing_file() {
        let err = ComposeConfig::from_file("/nonexistent/sqlmerge.toml").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigIo);
    }
}
