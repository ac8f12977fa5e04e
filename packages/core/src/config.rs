//! Configuration for the graph walker
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default hop budget per planned path.
/// The longest standard chain has 14 fixed hops; the rest is headroom for
/// nested template content spaces
pub const DEFAULT_MAX_HOPS: usize = 24;

/// Upper bound accepted for `max_hops`
const MAX_SUPPORTED_HOPS: usize = 256;

pub const ENV_MAX_HOPS: &str = "OWNERGRAPH_MAX_HOPS";
pub const ENV_EVALUATION: &str = "OWNERGRAPH_EVALUATION";
pub const ENV_VERBOSE_TRACE: &str = "OWNERGRAPH_VERBOSE_TRACE";

/// A configuration rejected by `ResolverConfig::validate`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid resolver configuration: {0}")]
pub struct ConfigError(pub String);

/// How the planned paths of one resolve are evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationMode {
    /// One path after another, stopping at the first success
    #[default]
    Sequential,
    /// All paths at once; the first-declared success still wins
    Concurrent,
}

impl FromStr for EvaluationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(EvaluationMode::Sequential),
            "concurrent" => Ok(EvaluationMode::Concurrent),
            other => Err(format!(
                "unknown evaluation mode '{}' (expected 'sequential' or 'concurrent')",
                other
            )),
        }
    }
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationMode::Sequential => f.write_str("sequential"),
            EvaluationMode::Concurrent => f.write_str("concurrent"),
        }
    }
}

/// Configuration for ownership resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Hops one planned path may take, climbs included
    pub max_hops: usize,

    /// Sequential or concurrent path evaluation
    pub evaluation: EvaluationMode,

    /// Attach the hop trace of every attempted path to `NotFound` errors
    pub verbose_trace: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_hops: DEFAULT_MAX_HOPS,
            evaluation: EvaluationMode::Sequential,
            verbose_trace: false,
        }
    }
}

impl ResolverConfig {
    /// Defaults overridden by `OWNERGRAPH_*` environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns per variable name
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_MAX_HOPS) {
            config.max_hops = value
                .trim()
                .parse()
                .map_err(|e| format!("{} must be an integer: {}", ENV_MAX_HOPS, e))?;
        }

        if let Some(value) = lookup(ENV_EVALUATION) {
            config.evaluation = value.parse()?;
        }

        if let Some(value) = lookup(ENV_VERBOSE_TRACE) {
            config.verbose_trace = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                other => {
                    return Err(format!(
                        "{} must be a boolean, got '{}'",
                        ENV_VERBOSE_TRACE, other
                    ))
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_hops == 0 {
            return Err("max_hops must be greater than 0".to_string());
        }

        if self.max_hops > MAX_SUPPORTED_HOPS {
            return Err(format!(
                "max_hops cannot exceed {}",
                MAX_SUPPORTED_HOPS
            ));
        }

        Ok(())
    }
}
