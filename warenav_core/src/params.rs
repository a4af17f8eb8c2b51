//! Runtime parameters for planners and the fleet simulation
//!
//! Parameters are a plain serde struct. Files ending in `.yaml`/`.yml` are
//! read as YAML, `.toml` as TOML; missing keys fall back to defaults.

use crate::error::{NavError, NavResult};
use crate::pathfinding::PlanningAlgorithm;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project-local parameter file picked up by [`NavParams::init`]
pub const DEFAULT_PARAMS_PATH: &str = ".warenav/params.yaml";

/// Typed runtime parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavParams {
    /// Planner the facade starts with
    pub algorithm: PlanningAlgorithm,
    /// Largest square radius searched for a substitute target when a goal is unreachable
    pub fallback_search_radius: u32,
    /// Replan robots whose remaining path became obstructed
    pub replan_on_block: bool,
    /// Upper bound on simulation ticks
    pub max_ticks: u32,
}

impl Default for NavParams {
    fn default() -> Self {
        Self {
            algorithm: PlanningAlgorithm::AStar,
            fallback_search_radius: 5,
            replan_on_block: true,
            max_ticks: 500,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Yaml,
    Toml,
}

fn format_of(path: &Path) -> NavResult<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => Ok(Format::Yaml),
        Some("toml") => Ok(Format::Toml),
        _ => Err(NavError::config(format!(
            "unsupported parameter file {:?} (expected .yaml, .yml or .toml)",
            path
        ))),
    }
}

impl NavParams {
    /// Load `.warenav/params.yaml` from the current project if present,
    /// defaults otherwise
    pub fn init() -> NavResult<Self> {
        let params_file = PathBuf::from(DEFAULT_PARAMS_PATH);
        if params_file.exists() {
            Self::load(&params_file)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse parameters from YAML text
    pub fn from_yaml_str(text: &str) -> NavResult<Self> {
        let params: Self = serde_yaml::from_str(text)?;
        params.validate()?;
        Ok(params)
    }

    /// Parse parameters from TOML text
    pub fn from_toml_str(text: &str) -> NavResult<Self> {
        let params: Self = toml::from_str(text)?;
        params.validate()?;
        Ok(params)
    }

    /// Load parameters from a YAML or TOML file
    pub fn load(path: &Path) -> NavResult<Self> {
        let format = format_of(path)?;
        let text = std::fs::read_to_string(path)?;
        let params = match format {
            Format::Yaml => Self::from_yaml_str(&text)?,
            Format::Toml => Self::from_toml_str(&text)?,
        };
        tracing::debug!(path = ?path, algorithm = %params.algorithm, "loaded navigation params");
        Ok(params)
    }

    /// Save parameters, picking the format from the file extension
    pub fn save(&self, path: &Path) -> NavResult<()> {
        let text = match format_of(path)? {
            Format::Yaml => serde_yaml::to_string(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Reject values the simulation cannot work with
    pub fn validate(&self) -> NavResult<()> {
        if self.fallback_search_radius == 0 {
            return Err(NavError::config("fallback_search_radius must be at least 1"));
        }
        if self.max_ticks == 0 {
            return Err(NavError::config("max_ticks must be at least 1"));
        }
        Ok(())
    }
}
