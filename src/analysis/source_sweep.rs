//! Usage evidence from source: fields of attachable component types
//!
//! A component referenced through a serialized field of another component
//! counts as used. The check is syntactic: field types are looked up by the
//! text written in the source, so qualified names, generic wrappers, arrays
//! and inherited fields never match. Components only referenced dynamically
//! (`AddComponent`, reflection) are reported unused.

use crate::error::{AuditError, Result};
use crate::parser::{DeclaredType, SourceParser};
use crate::registry::ComponentRegistry;
use std::path::Path;
use tracing::trace;

/// Mark registered components used as field types of marker-derived types
///
/// Returns the number of fields that matched a record.
pub fn sweep_declared_types(
    registry: &ComponentRegistry,
    types: &[DeclaredType],
    capability_marker: &str,
) -> usize {
    let mut hits = 0;

    for declared in types.iter().filter(|t| t.has_supertype(capability_marker)) {
        for field in &declared.fields {
            if registry.mark_used_by_short_name(&field.type_name) {
                trace!(
                    "{}.{} uses component {}",
                    declared.name,
                    field.name,
                    field.type_name
                );
                hits += 1;
            }
        }
    }

    hits
}

/// Read, parse and sweep one source file
pub fn sweep_source_file(
    registry: &ComponentRegistry,
    parser: &dyn SourceParser,
    path: &Path,
    capability_marker: &str,
) -> Result<usize> {
    let source = std::fs::read_to_string(path).map_err(|e| AuditError::io(path, e))?;
    let types = parser.declared_types(path, &source)?;
    Ok(sweep_declared_types(registry, &types, capability_marker))
}
