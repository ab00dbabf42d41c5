//! Flat scene/prefab document parsing
//!
//! Parsing happens in three layers:
//! 1. **Splitting** - find record boundaries (`splitter`)
//! 2. **Classification** - read the type tag and identity (`header`)
//! 3. **Extraction** - pull typed fields out of the records we use (`extract`)

mod extract;
mod fields;
mod header;
mod splitter;

pub use extract::{ComponentInstance, Entity, ExtractError, HierarchyNode, Record};
pub use fields::{inline_pairs, inline_value, reference, references_in, Field, FieldSet};
pub use header::{MissingHeader, RecordHeader, RecordKind};
pub use splitter::{split_records, RecordSplitter};

use crate::error::AuditError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Hierarchy records of one document
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    pub nodes: Vec<HierarchyNode>,
    pub entities: Vec<Entity>,
}

/// Result of parsing one document
#[derive(Debug)]
pub struct Document {
    pub path: PathBuf,
    /// Hierarchy records, or the error that invalidates this document's tree
    pub hierarchy: Result<Hierarchy, AuditError>,
    /// Stable ids linked by component-instance records, in document order
    pub component_refs: Vec<String>,
    /// Non-hierarchy records that were skipped
    pub skipped: Vec<AuditError>,
    /// Number of records found (preamble excluded)
    pub record_count: usize,
}

impl Document {
    /// Parse document text into typed records
    ///
    /// A malformed hierarchy record only invalidates the hierarchy; the
    /// component links of the remaining records are still collected.
    pub fn parse(path: &Path, text: &str) -> Self {
        let mut hierarchy = Hierarchy::default();
        let mut hierarchy_error: Option<AuditError> = None;
        let mut component_refs = Vec::new();
        let mut skipped = Vec::new();
        let mut record_count = 0;

        for (position, segment) in split_records(text).enumerate() {
            let header = match RecordHeader::classify(segment, position) {
                Ok(Some(header)) => header,
                Ok(None) => continue,
                Err(MissingHeader) => {
                    skipped.push(AuditError::MalformedRecord {
                        document: path.to_path_buf(),
                        identity: 0,
                        reason: format!("segment {} has no record header", position),
                    });
                    continue;
                }
            };
            record_count += 1;

            match extract::extract(&header, segment) {
                Ok(Record::Node(node)) => hierarchy.nodes.push(node),
                Ok(Record::Entity(entity)) => hierarchy.entities.push(entity),
                Ok(Record::ComponentInstance(instance)) => {
                    component_refs.push(instance.stable_id)
                }
                Ok(Record::Ignored) => {}
                Err(e) => {
                    let error = AuditError::MalformedRecord {
                        document: path.to_path_buf(),
                        identity: header.identity,
                        reason: e.to_string(),
                    };
                    if header.kind().is_hierarchy() {
                        if hierarchy_error.is_none() {
                            hierarchy_error = Some(error);
                        }
                    } else {
                        debug!("Skipping record: {}", error);
                        skipped.push(error);
                    }
                }
            }
        }

        Self {
            path: path.to_path_buf(),
            hierarchy: match hierarchy_error {
                Some(e) => Err(e),
                None => Ok(hierarchy),
            },
            component_refs,
            skipped,
            record_count,
        }
    }

    /// Read and parse a document from disk
    pub fn load(path: &Path) -> Result<Self, AuditError> {
        let text = std::fs::read_to_string(path).map_err(|e| AuditError::io(path, e))?;
        Ok(Self::parse(path, &text))
    }
}
