//! Usage evidence from documents: attached component instances

use crate::registry::ComponentRegistry;
use tracing::trace;

/// Mark every registered component linked by a component-instance record
///
/// Ids without a registry entry are ignored: documents may link scripts that
/// live outside the scanned tree (packages, built-in modules). Returns the
/// number of links that matched a record.
pub fn sweep_component_refs(registry: &ComponentRegistry, stable_ids: &[String]) -> usize {
    stable_ids
        .iter()
        .filter(|id| {
            let hit = registry.mark_used_by_stable_id(id);
            if !hit {
                trace!("Unregistered component link {}", id);
            }
            hit
        })
        .count()
}
