//! Usage analysis over a whole project
//!
//! The pipeline runs in three phases with a hard barrier between each:
//! 1. **Registry** - index every declared component (sequential, sorted input)
//! 2. **Documents** - per document: parse, dump the hierarchy, sweep links
//! 3. **Sources** - per script: parse, sweep fields of component types
//!
//! Phases 2 and 3 run on a bounded rayon pool and share the registry by
//! reference; the registry's per-record atomic flags make that safe.

mod data_sweep;
mod source_sweep;

pub use data_sweep::sweep_component_refs;
pub use source_sweep::{sweep_declared_types, sweep_source_file};

use crate::config::Config;
use crate::discovery::ProjectFiles;
use crate::document::Document;
use crate::error::{AuditError, Result};
use crate::hierarchy::Forest;
use crate::parser::{CSharpParser, SourceParser};
use crate::registry::{ComponentRecord, ComponentRegistry};
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of processing one document
#[derive(Debug)]
pub struct DocumentReport {
    pub path: PathBuf,
    /// Dump file written for this document, if any
    pub dump: Option<PathBuf>,
    /// Whether a dump was requested for this document
    pub dump_requested: bool,
    /// Hierarchy nodes written to the dump
    pub nodes: usize,
    pub records: usize,
    /// Component links that matched a registered component
    pub links: usize,
    pub errors: Vec<AuditError>,
}

impl DocumentReport {
    fn failed(path: &Path, dump_requested: bool, error: AuditError) -> Self {
        Self {
            path: path.to_path_buf(),
            dump: None,
            dump_requested,
            nodes: 0,
            records: 0,
            links: 0,
            errors: vec![error],
        }
    }

    pub fn dump_failed(&self) -> bool {
        self.dump_requested && self.dump.is_none()
    }

    /// The error that stopped this document's hierarchy dump, if any
    pub fn hierarchy_error(&self) -> Option<&AuditError> {
        self.errors.iter().find(|e| e.is_hierarchy_failure())
    }
}

/// Everything a run produced
#[derive(Debug)]
pub struct Analysis {
    pub documents: Vec<DocumentReport>,
    pub registry: ComponentRegistry,
    /// Project-level diagnostics (registry, sources, dump names)
    pub diagnostics: Vec<AuditError>,
    pub scripts_scanned: usize,
    /// Fields of component types that matched a registered component
    pub field_links: usize,
}

impl Analysis {
    pub fn dumps_written(&self) -> usize {
        self.documents.iter().filter(|d| d.dump.is_some()).count()
    }

    pub fn dumps_failed(&self) -> usize {
        self.documents.iter().filter(|d| d.dump_failed()).count()
    }

    pub fn unused(&self) -> Vec<&ComponentRecord> {
        self.registry.unused()
    }

    /// Every diagnostic of the run, project-level first
    pub fn all_diagnostics(&self) -> impl Iterator<Item = &AuditError> {
        self.diagnostics
            .iter()
            .chain(self.documents.iter().flat_map(|d| d.errors.iter()))
    }
}

struct DocumentJob<'a> {
    path: &'a Path,
    dump_name: Option<String>,
}

/// Runs the full usage analysis for a project
pub struct ProjectAnalyzer {
    config: Config,
    /// Source parser; the C# parser is loaded at the start of a run when unset
    parser: Option<Arc<dyn SourceParser>>,
    progress: ProgressBar,
}

impl ProjectAnalyzer {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            parser: None,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn SourceParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Progress bar advanced once per document and once per script
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Analyze the project and write one dump per scene into `output_dir`
    pub fn analyze(
        &self,
        project_root: &Path,
        files: &ProjectFiles,
        output_dir: &Path,
    ) -> Result<Analysis> {
        // A grammar that does not load is fatal for the run, not per script
        let parser: Arc<dyn SourceParser> = match &self.parser {
            Some(parser) => Arc::clone(parser),
            None => Arc::new(CSharpParser::new()?),
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()?;

        // Phase 1: registry, fully built before any sweep
        info!("Indexing {} scripts...", files.scripts.len());
        let build = ComponentRegistry::build(
            project_root,
            &files.scripts,
            &self.config.companion_suffix,
        );
        let registry = build.registry;
        let mut diagnostics = build.diagnostics;
        info!("Registered {} components", registry.len());

        // Phase 2: documents
        let jobs = self.document_jobs(files, &mut diagnostics);
        self.progress
            .set_length((jobs.len() + files.scripts.len()) as u64);

        info!(
            "Processing {} documents on {} workers...",
            jobs.len(),
            self.config.workers
        );
        let documents: Vec<DocumentReport> = pool.install(|| {
            jobs.par_iter()
                .map(|job| {
                    let report = self.process_document(job, &registry, output_dir);
                    self.progress.inc(1);
                    report
                })
                .collect()
        });

        // Phase 3: sources
        info!("Sweeping {} scripts...", files.scripts.len());
        let marker = self.config.capability_marker.as_str();
        let source_results: Vec<Result<usize>> = pool.install(|| {
            files
                .scripts
                .par_iter()
                .map(|path| {
                    let result = sweep_source_file(&registry, parser.as_ref(), path, marker);
                    self.progress.inc(1);
                    result
                })
                .collect()
        });
        self.progress.finish_and_clear();

        let mut field_links = 0;
        for result in source_results {
            match result {
                Ok(hits) => field_links += hits,
                Err(e) => {
                    warn!("Source sweep skipped: {}", e);
                    diagnostics.push(e);
                }
            }
        }

        Ok(Analysis {
            documents,
            registry,
            diagnostics,
            scripts_scanned: files.scripts.len(),
            field_links,
        })
    }

    /// Scenes first (each with a unique dump name), then prefabs
    fn document_jobs<'a>(
        &self,
        files: &'a ProjectFiles,
        diagnostics: &mut Vec<AuditError>,
    ) -> Vec<DocumentJob<'a>> {
        let mut taken = HashSet::new();
        let mut jobs = Vec::with_capacity(files.scenes.len() + files.prefabs.len());

        for scene in &files.scenes {
            let name = dump_name(scene);
            let dump_name = if taken.insert(name.clone()) {
                Some(name)
            } else {
                let collision = AuditError::DumpCollision {
                    path: scene.clone(),
                    name,
                };
                warn!("{}", collision);
                diagnostics.push(collision);
                None
            };
            jobs.push(DocumentJob {
                path: scene,
                dump_name,
            });
        }

        jobs.extend(files.prefabs.iter().map(|path| DocumentJob {
            path,
            dump_name: None,
        }));

        jobs
    }

    fn process_document(
        &self,
        job: &DocumentJob<'_>,
        registry: &ComponentRegistry,
        output_dir: &Path,
    ) -> DocumentReport {
        let dump_requested = job.dump_name.is_some();
        let document = match Document::load(job.path) {
            Ok(document) => document,
            Err(e) => {
                warn!("Skipping document: {}", e);
                return DocumentReport::failed(job.path, dump_requested, e);
            }
        };

        let links = sweep_component_refs(registry, &document.component_refs);
        let mut errors = document.skipped;
        let mut dump = None;
        let mut nodes = 0;

        if let Some(name) = &job.dump_name {
            let forest = document
                .hierarchy
                .and_then(|hierarchy| Forest::build(&document.path, &hierarchy));

            match forest {
                Ok(forest) => {
                    if let Some(&first) = forest.detached().first() {
                        let detached = AuditError::DetachedNodes {
                            document: document.path.clone(),
                            count: forest.detached().len(),
                            first,
                        };
                        warn!("{}", detached);
                        errors.push(detached);
                    }

                    let out = output_dir.join(name);
                    match std::fs::write(&out, forest.render(&self.config.dump_marker)) {
                        Ok(()) => {
                            nodes = forest.len();
                            dump = Some(out);
                        }
                        Err(e) => {
                            let error = AuditError::io(out, e);
                            warn!("Failed to write dump: {}", error);
                            errors.push(error);
                        }
                    }
                }
                Err(e) => {
                    warn!("Hierarchy dump skipped: {}", e);
                    errors.push(e);
                }
            }
        }

        DocumentReport {
            path: document.path,
            dump,
            dump_requested,
            nodes,
            records: document.record_count,
            links,
            errors,
        }
    }
}

/// Dump file name for a scene: its file name plus `.dump`
pub fn dump_name(scene: &Path) -> String {
    let file_name = scene
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}.dump", file_name)
}
