//! Project file discovery
//!
//! Walks the asset directory once and sorts what it finds into scenes,
//! prefabs and scripts. Results are sorted so every later stage sees the
//! same order on every run.

use crate::config::{Config, SceneSource};
use crate::error::{AuditError, Result};
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Asset directory inside a project
pub const ASSETS_DIR: &str = "Assets";

/// Legacy list of scenes included in a build
pub const BUILD_SETTINGS: &str = "ProjectSettings/EditorBuildSettings.asset";

/// Files of interest in a project
#[derive(Debug, Clone, Default)]
pub struct ProjectFiles {
    /// Scenes that get a hierarchy dump
    pub scenes: Vec<PathBuf>,
    /// Extra documents that only feed the usage sweep
    pub prefabs: Vec<PathBuf>,
    /// Component declaration sources
    pub scripts: Vec<PathBuf>,
}

impl ProjectFiles {
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty() && self.prefabs.is_empty() && self.scripts.is_empty()
    }
}

/// What discovery found plus what it could not use
#[derive(Debug, Default)]
pub struct Discovery {
    pub files: ProjectFiles,
    pub diagnostics: Vec<AuditError>,
}

/// Finds scenes, prefabs and scripts below a project folder
pub struct FileFinder<'a> {
    config: &'a Config,
}

impl<'a> FileFinder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn asset_dir(project_root: &Path) -> PathBuf {
        project_root.join(ASSETS_DIR)
    }

    /// Whether the folder looks like a project we can analyze
    pub fn is_project(project_root: &Path) -> bool {
        Self::asset_dir(project_root).is_dir()
    }

    pub fn find_files(&self, project_root: &Path) -> Result<Discovery> {
        let assets = Self::asset_dir(project_root);
        let mut discovery = Discovery::default();
        let mut scanned_scenes = Vec::new();

        for path in self.walk(&assets)? {
            let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            if ext == self.config.scene_extension {
                scanned_scenes.push(path);
            } else if ext == self.config.prefab_extension {
                if self.config.sweep_prefabs {
                    discovery.files.prefabs.push(path);
                }
            } else if ext == self.config.script_extension {
                discovery.files.scripts.push(path);
            }
        }

        discovery.files.scenes = match self.config.scene_source {
            SceneSource::Scan => scanned_scenes,
            SceneSource::BuildSettings => {
                let listed = self.listed_scenes(project_root)?;
                let mut scenes = Vec::with_capacity(listed.len());
                for path in listed {
                    if path.is_file() {
                        scenes.push(path);
                    } else {
                        warn!("Listed scene not found: {}", path.display());
                        discovery.diagnostics.push(AuditError::io(
                            path,
                            std::io::Error::from(std::io::ErrorKind::NotFound),
                        ));
                    }
                }
                scenes
            }
        };

        discovery.files.scenes.sort();
        discovery.files.scenes.dedup();
        discovery.files.prefabs.sort();
        discovery.files.scripts.sort();

        debug!(
            "Discovered {} scenes, {} prefabs, {} scripts",
            discovery.files.scenes.len(),
            discovery.files.prefabs.len(),
            discovery.files.scripts.len()
        );

        Ok(discovery)
    }

    fn walk(&self, assets: &Path) -> Result<Vec<PathBuf>> {
        let mut overrides = OverrideBuilder::new(assets);
        for pattern in &self.config.exclude {
            overrides
                .add(&format!("!{}", pattern))
                .map_err(|e| AuditError::config(format!("exclude pattern '{}': {}", pattern, e)))?;
        }
        let overrides = overrides
            .build()
            .map_err(|e| AuditError::config(format!("exclude patterns: {}", e)))?;

        let mut files = Vec::new();
        for entry in WalkBuilder::new(assets).overrides(overrides).build() {
            match entry {
                Ok(entry) => {
                    if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => warn!("Skipping unreadable entry: {}", e),
            }
        }
        Ok(files)
    }

    /// Scenes listed in the build settings document, resolved against the project
    fn listed_scenes(&self, project_root: &Path) -> Result<Vec<PathBuf>> {
        let path = project_root.join(BUILD_SETTINGS);
        let text = std::fs::read_to_string(&path).map_err(|e| AuditError::io(&path, e))?;
        Ok(parse_build_settings(&text)
            .into_iter()
            .map(|scene| project_root.join(scene))
            .collect())
    }
}

/// Scene paths from a build settings document
///
/// Every line containing `path: ` contributes its second whitespace-separated
/// field.
pub fn parse_build_settings(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| line.contains("path: "))
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
        .collect()
}
