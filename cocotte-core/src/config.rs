//! Configuration from environment variables.

use crate::references::MAX_REFERENCE_DISTANCE;
use crate::timing::{TimingOptions, DEFAULT_FALLBACK_STEP_MINUTES};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Default directory holding `{slug}.recipe.json` files.
pub const DEFAULT_RECIPES_DIR: &str = "recipes";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}'")]
    InvalidValue { var: String, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CocotteConfig {
    /// Directory of recipe documents.
    pub recipes_dir: PathBuf,
    /// Enrichment cache file.
    pub cache_path: PathBuf,
    /// Minutes assumed for a step with inputs but no duration.
    pub fallback_step_minutes: f64,
    /// Largest edit distance accepted when repairing references.
    pub max_reference_distance: usize,
    /// Translator and matcher backend for nutrition; unset disables nutrition.
    pub nutrition_provider: Option<String>,
}

impl Default for CocotteConfig {
    fn default() -> Self {
        Self {
            recipes_dir: PathBuf::from(DEFAULT_RECIPES_DIR),
            cache_path: Self::default_cache_path(),
            fallback_step_minutes: DEFAULT_FALLBACK_STEP_MINUTES,
            max_reference_distance: MAX_REFERENCE_DISTANCE,
            nutrition_provider: None,
        }
    }
}

impl CocotteConfig {
    /// Load configuration from environment variables.
    ///
    /// All optional:
    /// - `COCOTTE_RECIPES_DIR`: recipe directory (default: "recipes")
    /// - `COCOTTE_CACHE_PATH`: cache file (default: "~/.cocotte/enrichment-cache.json")
    /// - `COCOTTE_FALLBACK_STEP_MINUTES`: default step duration (default: 5)
    /// - `COCOTTE_MAX_REFERENCE_DISTANCE`: fuzzy match threshold (default: 3)
    /// - `COCOTTE_NUTRITION_PROVIDER`: "fake" (default: unset, no nutrition)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let recipes_dir = env::var("COCOTTE_RECIPES_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.recipes_dir);

        let cache_path = env::var("COCOTTE_CACHE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.cache_path);

        let fallback_step_minutes = parse_var(
            "COCOTTE_FALLBACK_STEP_MINUTES",
            defaults.fallback_step_minutes,
        )?;
        if !(fallback_step_minutes >= 0.0 && fallback_step_minutes.is_finite()) {
            return Err(ConfigError::InvalidValue {
                var: "COCOTTE_FALLBACK_STEP_MINUTES".to_string(),
                value: fallback_step_minutes.to_string(),
            });
        }

        let max_reference_distance = parse_var(
            "COCOTTE_MAX_REFERENCE_DISTANCE",
            defaults.max_reference_distance,
        )?;

        let nutrition_provider = env::var("COCOTTE_NUTRITION_PROVIDER")
            .ok()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        Ok(Self {
            recipes_dir,
            cache_path,
            fallback_step_minutes,
            max_reference_distance,
            nutrition_provider,
        })
    }

    pub fn default_cache_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cocotte")
            .join("enrichment-cache.json")
    }

    pub fn timing_options(&self) -> TimingOptions {
        TimingOptions {
            fallback_step_minutes: self.fallback_step_minutes,
        }
    }
}

fn parse_var<T: std::str::FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            var: var.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}
