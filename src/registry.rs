//! Registry of declared components (scripts) and their usage state
//!
//! The registry is built once, before any sweep runs. Afterwards only the
//! per-record `unused` flag changes; it is an atomic so sweeps running on
//! many workers can clear it without locking. A flag only ever goes from
//! unused to used, so concurrent writers cannot lose an update.

use crate::error::{AuditError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// A declared reusable component
#[derive(Debug)]
pub struct ComponentRecord {
    /// Stable id as written in the companion file
    pub stable_id: String,
    /// Project-relative path with `/` separators
    pub relative_path: String,
    /// File stem of the declaration, e.g. `PlayerController`
    pub short_name: String,
    unused: AtomicBool,
}

impl ComponentRecord {
    pub fn new(
        stable_id: impl Into<String>,
        relative_path: impl Into<String>,
        short_name: impl Into<String>,
    ) -> Self {
        Self {
            stable_id: stable_id.into(),
            relative_path: relative_path.into(),
            short_name: short_name.into(),
            unused: AtomicBool::new(true),
        }
    }

    pub fn is_unused(&self) -> bool {
        self.unused.load(Ordering::Relaxed)
    }

    fn mark_used(&self) {
        self.unused.store(false, Ordering::Relaxed);
    }
}

/// Bidirectional index of component records
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    records: Vec<ComponentRecord>,
    /// Lowercased stable id -> record slot
    by_stable_id: HashMap<String, usize>,
    /// Short name -> record slot
    by_short_name: HashMap<String, usize>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record, keeping the first one on stable id or short name clashes
    ///
    /// Returns the clash diagnostics. A record whose stable id clashes is
    /// dropped entirely; one whose short name clashes stays reachable by id.
    pub fn insert(&mut self, record: ComponentRecord) -> Vec<AuditError> {
        let mut diagnostics = Vec::new();
        let key = record.stable_id.to_ascii_lowercase();

        if let Some(&slot) = self.by_stable_id.get(&key) {
            diagnostics.push(AuditError::DuplicateIdentity {
                guid: record.stable_id.clone(),
                kept: self.records[slot].relative_path.clone(),
                ignored: record.relative_path.clone(),
            });
            return diagnostics;
        }

        let slot = self.records.len();
        self.by_stable_id.insert(key, slot);

        match self.by_short_name.get(&record.short_name) {
            Some(&existing) => diagnostics.push(AuditError::DuplicateShortName {
                name: record.short_name.clone(),
                kept: self.records[existing].relative_path.clone(),
                ignored: record.relative_path.clone(),
            }),
            None => {
                self.by_short_name.insert(record.short_name.clone(), slot);
            }
        }

        self.records.push(record);
        diagnostics
    }

    /// Build the registry from declaration files and their companion files
    ///
    /// Files are processed in the given order, which decides who wins a
    /// clash. Missing or malformed companions skip that one declaration.
    pub fn build(project_root: &Path, sources: &[PathBuf], companion_suffix: &str) -> RegistryBuild {
        let mut registry = Self::new();
        let mut diagnostics = Vec::new();

        for source in sources {
            match read_companion(source, companion_suffix) {
                Ok(stable_id) => {
                    let record = ComponentRecord::new(
                        stable_id,
                        relative_path(project_root, source),
                        short_name(source),
                    );
                    for diagnostic in registry.insert(record) {
                        warn!("{}", diagnostic);
                        diagnostics.push(diagnostic);
                    }
                }
                Err(e) => {
                    warn!("Skipping declaration: {}", e);
                    diagnostics.push(e);
                }
            }
        }

        debug!("Registered {} components", registry.len());
        RegistryBuild {
            registry,
            diagnostics,
        }
    }

    pub fn get_by_stable_id(&self, stable_id: &str) -> Option<&ComponentRecord> {
        self.by_stable_id
            .get(&stable_id.to_ascii_lowercase())
            .map(|&slot| &self.records[slot])
    }

    pub fn get_by_short_name(&self, name: &str) -> Option<&ComponentRecord> {
        self.by_short_name.get(name).map(|&slot| &self.records[slot])
    }

    /// Mark the record with this stable id (case-insensitive) as used
    ///
    /// Returns false when no record has that id.
    pub fn mark_used_by_stable_id(&self, stable_id: &str) -> bool {
        match self.get_by_stable_id(stable_id) {
            Some(record) => {
                record.mark_used();
                true
            }
            None => false,
        }
    }

    /// Mark the record with this short name as used
    pub fn mark_used_by_short_name(&self, name: &str) -> bool {
        match self.get_by_short_name(name) {
            Some(record) => {
                record.mark_used();
                true
            }
            None => false,
        }
    }

    /// All records, one per declaration
    pub fn records(&self) -> impl Iterator<Item = &ComponentRecord> {
        self.records.iter()
    }

    /// Records still flagged unused, sorted by relative path
    pub fn unused(&self) -> Vec<&ComponentRecord> {
        let mut unused: Vec<_> = self.records.iter().filter(|r| r.is_unused()).collect();
        unused.sort_by(|a, b| {
            a.relative_path
                .cmp(&b.relative_path)
                .then_with(|| a.stable_id.cmp(&b.stable_id))
        });
        unused
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A freshly built registry plus what went wrong building it
#[derive(Debug)]
pub struct RegistryBuild {
    pub registry: ComponentRegistry,
    pub diagnostics: Vec<AuditError>,
}

fn guid_line() -> &'static Regex {
    static GUID_LINE: OnceLock<Regex> = OnceLock::new();
    GUID_LINE.get_or_init(|| Regex::new(r"^\s*guid:\s+([0-9A-Fa-f]+)\s*$").expect("valid regex"))
}

/// Parse the stable id out of a companion file's text (line 2)
pub fn parse_companion(text: &str) -> Option<&str> {
    let line = text.lines().nth(1)?;
    guid_line()
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Companion path for a declaration: the same name plus a suffix
pub fn companion_path(source: &Path, suffix: &str) -> PathBuf {
    let mut name = source.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn read_companion(source: &Path, suffix: &str) -> Result<String> {
    let path = companion_path(source, suffix);
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AuditError::MissingCompanionFile {
                path: source.to_path_buf(),
            })
        }
        Err(e) => return Err(AuditError::io(path, e)),
    };

    parse_companion(&text)
        .map(str::to_string)
        .ok_or(AuditError::MalformedCompanionFile { path })
}

/// Project-relative path with `/` separators
pub fn relative_path(project_root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(project_root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn short_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
