//! Numeric configuration for a protocol run.
//!
//! Threaded explicitly through every call instead of living in ambient
//! global state, so concurrent runs and tests cannot interfere.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::protocol::DivisionError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Grid mesh on the normalized cake; smaller means a finer valuation
    /// approximation and more bisection rounds.
    #[serde(default = "ProtocolConfig::default_epsilon")]
    pub epsilon: f64,
    /// Termination slack for searches and value-equality checks.
    #[serde(default = "ProtocolConfig::default_tolerance")]
    pub tolerance: f64,
    /// Iteration cap for a single binary search.
    #[serde(default = "ProtocolConfig::default_max_search_iterations")]
    pub max_search_iterations: u32,
}

impl ProtocolConfig {
    fn default_epsilon() -> f64 {
        1e-4
    }
    fn default_tolerance() -> f64 {
        1e-10
    }
    fn default_max_search_iterations() -> u32 {
        1000
    }

    pub fn validate(&self) -> Result<(), DivisionError> {
        let bad = |reason: String| DivisionError::InvalidInput { agent: 0, reason };
        if !(self.epsilon > 0.0 && self.epsilon < 0.25) {
            return Err(bad(format!("epsilon must lie in (0, 0.25), got {}", self.epsilon)));
        }
        if !(self.tolerance > 0.0 && self.tolerance < self.epsilon) {
            return Err(bad(format!(
                "tolerance must lie in (0, epsilon), got {}",
                self.tolerance
            )));
        }
        if self.max_search_iterations == 0 {
            return Err(bad("max_search_iterations must be positive".into()));
        }
        Ok(())
    }

    /// Read a TOML config, falling back to defaults when the file is absent
    /// or malformed.
    pub fn load_or_default(path: &str) -> Self {
        let path_obj = Path::new(path);
        if !path_obj.exists() {
            return Self::default();
        }
        match fs::read_to_string(path_obj) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    eprintln!("Failed to parse config {path}: {err}. Using defaults.");
                    Self::default()
                }
            },
            Err(err) => {
                eprintln!("Failed to read config {path}: {err}. Using defaults.");
                Self::default()
            }
        }
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            epsilon: Self::default_epsilon(),
            tolerance: Self::default_tolerance(),
            max_search_iterations: Self::default_max_search_iterations(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ProtocolConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: ProtocolConfig = toml::from_str("epsilon = 0.01").unwrap();
        assert_eq!(cfg.epsilon, 0.01);
        assert_eq!(cfg.tolerance, ProtocolConfig::default_tolerance());
        assert_eq!(cfg.max_search_iterations, 1000);
    }

    #[test]
    fn bad_epsilon_is_rejected() {
        let cfg = ProtocolConfig {
            epsilon: 0.5,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = ProtocolConfig::load_or_default("/nonexistent/fairslice.toml");
        assert_eq!(cfg.epsilon, ProtocolConfig::default_epsilon());
    }
}
