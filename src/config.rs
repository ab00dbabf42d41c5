//! Configuration loading
//!
//! Configuration comes from an optional TOML or YAML file; every field has a
//! default so an empty file (or none at all) is valid. CLI flags override
//! file values in `main`.

use crate::error::{AuditError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File names probed in the project folder when no `--config` is given
const DEFAULT_LOCATIONS: &[&str] = &[".scenesweep.toml", "scenesweep.toml", ".scenesweep.yml"];

/// Where the list of scenes comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SceneSource {
    /// Every scene file under the asset directory
    #[default]
    Scan,
    /// Only scenes listed in the build settings document
    BuildSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of documents processed concurrently
    pub workers: usize,
    /// Supertype that makes a declared type an attachable component
    pub capability_marker: String,
    pub scene_extension: String,
    pub prefab_extension: String,
    pub script_extension: String,
    /// Appended to a file's full name to find its companion identity file
    pub companion_suffix: String,
    /// Whether prefab documents count as usage evidence
    pub sweep_prefabs: bool,
    pub scene_source: SceneSource,
    /// Name of the unused-components report inside the output folder
    pub report_file: String,
    /// Indentation marker of the hierarchy dumps
    pub dump_marker: String,
    /// Glob patterns (relative to the asset directory) to skip
    pub exclude: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: 16,
            capability_marker: "MonoBehaviour".to_string(),
            scene_extension: "unity".to_string(),
            prefab_extension: "prefab".to_string(),
            script_extension: "cs".to_string(),
            companion_suffix: ".meta".to_string(),
            sweep_prefabs: true,
            scene_source: SceneSource::Scan,
            report_file: "UnusedScripts.csv".to_string(),
            dump_marker: crate::hierarchy::DEFAULT_MARKER.to_string(),
            exclude: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML or YAML file, chosen by extension
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| AuditError::io(path, e))?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yml") | Some("yaml")
        );

        let config: Config = if is_yaml {
            serde_yaml::from_str(&text)
                .map_err(|e| AuditError::config(format!("{}: {}", path.display(), e)))?
        } else {
            toml::from_str(&text)
                .map_err(|e| AuditError::config(format!("{}: {}", path.display(), e)))?
        };

        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from the first default location that exists, or use defaults
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        match Self::find_default(project_root) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    fn find_default(project_root: &Path) -> Option<PathBuf> {
        DEFAULT_LOCATIONS
            .iter()
            .map(|name| project_root.join(name))
            .find(|p| p.is_file())
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(AuditError::config("workers must be at least 1"));
        }
        if self.capability_marker.trim().is_empty() {
            return Err(AuditError::config("capability_marker must not be empty"));
        }
        if self.report_file.trim().is_empty() {
            return Err(AuditError::config("report_file must not be empty"));
        }
        Ok(())
    }
}
