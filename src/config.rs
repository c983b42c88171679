//! Configuration for codeflow generation runs
//!
//! Layered: built-in defaults, then an optional TOML file, then
//! `CODEFLOW_*` environment variables. The CLI applies its flags last.

use crate::domain::label::LabelLevel;
use crate::domain::node_manager::CollectionLimits;
use crate::domain::theme::ColorScheme;
use crate::domain::validator::DiagramLimits;
use crate::error::{CodeflowError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DIRECTIONS: &[&str] = &["TD", "TB", "BT", "LR", "RL"];

/// Policy knobs for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub max_entry_points: usize,
    pub max_nodes: usize,
    pub max_collection_depth: usize,
    pub max_calls_per_function: usize,
    pub max_functions_per_class: usize,
    /// `auto` or a label level name
    pub label_format: String,
    pub theme: String,
    pub direction: String,
    pub title: String,
    /// Prefix stripped from symbol paths before grouping
    pub source_root: Option<PathBuf>,
    pub limits: DiagramLimits,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_entry_points: 10,
            max_nodes: 100,
            max_collection_depth: 5,
            max_calls_per_function: 5,
            max_functions_per_class: 50,
            label_format: "auto".to_string(),
            theme: "default".to_string(),
            direction: "TD".to_string(),
            title: "Code Flow".to_string(),
            source_root: None,
            limits: DiagramLimits::default(),
        }
    }
}

impl GenerationConfig {
    /// Defaults, overlaid with `path` (if given) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| CodeflowError::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml(&content).map_err(|e| CodeflowError::Config {
            message: format!("{}: {}", path.display(), e),
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply `CODEFLOW_*` overrides from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let numeric: [(&str, &mut usize); 5] = [
            ("CODEFLOW_MAX_ENTRY_POINTS", &mut self.max_entry_points),
            ("CODEFLOW_MAX_NODES", &mut self.max_nodes),
            ("CODEFLOW_MAX_DEPTH", &mut self.max_collection_depth),
            ("CODEFLOW_MAX_CALLS", &mut self.max_calls_per_function),
            ("CODEFLOW_MAX_FUNCTIONS_PER_CLASS", &mut self.max_functions_per_class),
        ];
        for (key, slot) in numeric {
            if let Some(raw) = lookup(key) {
                *slot = raw.trim().parse().map_err(|_| CodeflowError::Config {
                    message: format!("{} must be a non-negative integer, got '{}'", key, raw),
                })?;
            }
        }

        if let Some(format) = lookup("CODEFLOW_LABEL_FORMAT") {
            self.label_format = format;
        }
        if let Some(theme) = lookup("CODEFLOW_THEME") {
            self.theme = theme;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let caps = [
            ("max_entry_points", self.max_entry_points),
            ("max_nodes", self.max_nodes),
            ("max_collection_depth", self.max_collection_depth),
            ("max_calls_per_function", self.max_calls_per_function),
            ("max_functions_per_class", self.max_functions_per_class),
        ];
        if let Some((name, _)) = caps.iter().find(|(_, value)| *value == 0) {
            return Err(CodeflowError::Config {
                message: format!("{} must be greater than zero", name),
            });
        }
        if ColorScheme::from_name(&self.theme).is_none() {
            return Err(CodeflowError::Config {
                message: format!(
                    "unknown theme '{}' (expected one of {})",
                    self.theme,
                    ColorScheme::NAMES.join(", ")
                ),
            });
        }
        if !DIRECTIONS.contains(&self.direction.as_str()) {
            return Err(CodeflowError::Config {
                message: format!(
                    "unknown direction '{}' (expected one of {})",
                    self.direction,
                    DIRECTIONS.join(", ")
                ),
            });
        }
        Ok(())
    }

    pub fn collection_limits(&self) -> CollectionLimits {
        CollectionLimits {
            max_depth: self.max_collection_depth,
            max_nodes: self.max_nodes,
            max_calls_per_function: self.max_calls_per_function,
        }
    }

    /// Fixed label level, or None when the level is picked from density.
    pub fn label_level(&self) -> Option<LabelLevel> {
        if self.label_format.trim().eq_ignore_ascii_case("auto") {
            None
        } else {
            Some(LabelLevel::parse(&self.label_format))
        }
    }

    pub fn color_scheme(&self) -> ColorScheme {
        ColorScheme::from_name(&self.theme).unwrap_or_default()
    }
}
