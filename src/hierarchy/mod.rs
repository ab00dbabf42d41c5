//! Scene hierarchy reconstruction
//!
//! Hierarchy nodes reference each other by identity. The forest resolves
//! those references into indices of a flat arena once, validates them, and
//! computes a depth-first visiting order with an explicit stack, so deep
//! hierarchies never recurse.

use crate::document::{Hierarchy, HierarchyNode};
use crate::error::{AuditError, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Default indentation marker, repeated once per depth level
pub const DEFAULT_MARKER: &str = "--";

/// Resolved hierarchy of one document
#[derive(Debug, Clone)]
pub struct Forest {
    /// Display label per arena slot
    labels: Vec<String>,
    /// Depth-first visiting order: (arena slot, depth)
    order: Vec<(usize, usize)>,
    roots: usize,
    /// Identities of nodes no root reaches, in document order
    detached: Vec<i64>,
}

impl Forest {
    /// Resolve all references of a document's hierarchy
    ///
    /// Fails with `DanglingReference` when a child or owner reference does not
    /// resolve, and with `MalformedRecord` when a root is listed as someone's
    /// child or a node is reachable twice.
    pub fn build(document: &Path, hierarchy: &Hierarchy) -> Result<Self> {
        let nodes = &hierarchy.nodes;

        let mut slots: HashMap<i64, usize> = HashMap::with_capacity(nodes.len());
        for (slot, node) in nodes.iter().enumerate() {
            if slots.insert(node.identity, slot).is_some() {
                return Err(malformed(document, node.identity, "duplicate identity"));
            }
        }

        let names: HashMap<i64, &str> = hierarchy
            .entities
            .iter()
            .map(|e| (e.identity, e.display_name.as_str()))
            .collect();

        let mut labels = Vec::with_capacity(nodes.len());
        let mut children: Vec<Vec<usize>> = Vec::with_capacity(nodes.len());
        let mut listed = vec![false; nodes.len()];

        for node in nodes {
            labels.push(Self::label(document, node, &names)?);

            let mut resolved = Vec::with_capacity(node.child_refs.len());
            for &child_ref in &node.child_refs {
                let slot = *slots
                    .get(&child_ref)
                    .ok_or_else(|| AuditError::DanglingReference {
                        document: document.to_path_buf(),
                        from: node.identity,
                        to: child_ref,
                        target: "node",
                    })?;
                if is_root(&nodes[slot]) {
                    return Err(malformed(
                        document,
                        child_ref,
                        &format!(
                            "declared root is also listed as a child of &{}",
                            node.identity
                        ),
                    ));
                }
                listed[slot] = true;
                resolved.push(slot);
            }
            children.push(resolved);
        }

        // Objects added under a nested prefab instance name the stripped
        // placeholder as their parent, but the placeholder lists no children
        for (slot, node) in nodes.iter().enumerate() {
            if node.stripped || node.parent_ref == 0 || listed[slot] {
                continue;
            }
            if let Some(&parent) = slots.get(&node.parent_ref) {
                if nodes[parent].stripped {
                    children[parent].push(slot);
                }
            }
        }

        let roots: Vec<usize> = nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| is_root(node))
            .map(|(slot, _)| slot)
            .collect();

        let order = Self::visit_order(document, nodes, &roots, &children)?;

        let mut reached = vec![false; nodes.len()];
        for &(slot, _) in &order {
            reached[slot] = true;
        }
        let detached: Vec<i64> = nodes
            .iter()
            .zip(&reached)
            .filter(|(_, &seen)| !seen)
            .map(|(node, _)| node.identity)
            .collect();
        if !detached.is_empty() {
            debug!(
                "{}: {} hierarchy nodes not reachable from any root",
                document.display(),
                detached.len()
            );
        }

        Ok(Self {
            labels,
            order,
            roots: roots.len(),
            detached,
        })
    }

    fn label(document: &Path, node: &HierarchyNode, names: &HashMap<i64, &str>) -> Result<String> {
        if node.stripped {
            return Ok(format!("<prefab instance &{}>", node.identity));
        }
        names
            .get(&node.owner_ref)
            .map(|name| name.to_string())
            .ok_or_else(|| AuditError::DanglingReference {
                document: document.to_path_buf(),
                from: node.identity,
                to: node.owner_ref,
                target: "entity",
            })
    }

    /// Depth-first pre-order, children in declared order
    fn visit_order(
        document: &Path,
        nodes: &[HierarchyNode],
        roots: &[usize],
        children: &[Vec<usize>],
    ) -> Result<Vec<(usize, usize)>> {
        let mut visited = vec![false; nodes.len()];
        let mut order = Vec::with_capacity(nodes.len());

        for &root in roots {
            let mut stack = vec![(root, 0usize)];
            while let Some((slot, depth)) = stack.pop() {
                if visited[slot] {
                    return Err(malformed(
                        document,
                        nodes[slot].identity,
                        "node is reachable more than once (cycle or shared child)",
                    ));
                }
                visited[slot] = true;
                order.push((slot, depth));

                for &child in children[slot].iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
        }

        Ok(order)
    }

    /// Number of root trees
    pub fn root_count(&self) -> usize {
        self.roots
    }

    /// Nodes left out of the dump because no root reaches them
    pub fn detached(&self) -> &[i64] {
        &self.detached
    }

    /// Number of nodes reachable from the roots
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Render every tree as an indented text block
    ///
    /// Roots are printed bare; a node at depth `d` is prefixed with the
    /// marker repeated `d` times.
    pub fn render(&self, marker: &str) -> String {
        let mut out = String::new();
        for &(slot, depth) in &self.order {
            for _ in 0..depth {
                out.push_str(marker);
            }
            out.push_str(&self.labels[slot]);
            out.push('\n');
        }
        out
    }
}

fn is_root(node: &HierarchyNode) -> bool {
    !node.stripped && node.parent_ref == 0
}

fn malformed(document: &Path, identity: i64, reason: &str) -> AuditError {
    AuditError::MalformedRecord {
        document: document.to_path_buf(),
        identity,
        reason: reason.to_string(),
    }
}
