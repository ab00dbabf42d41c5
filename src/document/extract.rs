//! Typed extraction of the records the analysis cares about

use super::fields::{inline_value, reference, references_in, FieldSet};
use super::header::{RecordHeader, RecordKind};
use thiserror::Error;

const OWNER_FIELD: &str = "m_GameObject";
const PARENT_FIELD: &str = "m_Father";
const CHILDREN_FIELD: &str = "m_Children";
const NAME_FIELD: &str = "m_Name";
const SCRIPT_FIELD: &str = "m_Script";

/// A positional node (Transform or RectTransform)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyNode {
    pub identity: i64,
    /// Owning entity; 0 for stripped placeholders
    pub owner_ref: i64,
    /// Parent node; 0 means this node is a root
    pub parent_ref: i64,
    pub child_refs: Vec<i64>,
    /// Placeholder for a node owned by a nested prefab instance
    pub stripped: bool,
}

/// A named object (GameObject)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub identity: i64,
    pub display_name: String,
}

/// An attached script instance linking to a component declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentInstance {
    pub identity: i64,
    pub stable_id: String,
}

/// A classified record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Node(HierarchyNode),
    Entity(Entity),
    ComponentInstance(ComponentInstance),
    /// Record kinds that contribute nothing
    Ignored,
}

/// Why a record could not be extracted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("missing field {0}")]
    MissingField(&'static str),

    #[error("field {field} is not a reference: '{value}'")]
    NotAReference { field: &'static str, value: String },
}

/// Extract a typed record from a segment whose header is already known
pub fn extract(header: &RecordHeader, segment: &str) -> Result<Record, ExtractError> {
    match header.kind() {
        RecordKind::Transform | RecordKind::RectTransform => {
            extract_node(header, segment).map(Record::Node)
        }
        RecordKind::Entity if !header.stripped => extract_entity(header, segment).map(Record::Entity),
        // Stripped instances point back into the nested prefab, whose own
        // document carries the component link
        RecordKind::ComponentInstance if !header.stripped => {
            Ok(extract_component(header, segment)
                .map(Record::ComponentInstance)
                .unwrap_or(Record::Ignored))
        }
        _ => Ok(Record::Ignored),
    }
}

fn extract_node(header: &RecordHeader, segment: &str) -> Result<HierarchyNode, ExtractError> {
    let fields = FieldSet::scan(segment);

    let child_refs = fields
        .get(CHILDREN_FIELD)
        .map(|f| {
            let mut refs = references_in(f.value);
            for item in &f.items {
                refs.extend(references_in(item));
            }
            refs
        })
        .unwrap_or_default();

    if header.stripped {
        // Placeholders only carry their prefab linkage
        return Ok(HierarchyNode {
            identity: header.identity,
            owner_ref: 0,
            parent_ref: 0,
            child_refs,
            stripped: true,
        });
    }

    let owner_ref = required_reference(&fields, OWNER_FIELD)?;
    let parent_ref = required_reference(&fields, PARENT_FIELD)?;

    Ok(HierarchyNode {
        identity: header.identity,
        owner_ref,
        parent_ref,
        child_refs,
        stripped: false,
    })
}

fn required_reference(fields: &FieldSet<'_>, label: &'static str) -> Result<i64, ExtractError> {
    let field = fields.get(label).ok_or(ExtractError::MissingField(label))?;
    reference(field.value).ok_or_else(|| ExtractError::NotAReference {
        field: label,
        value: field.value.to_string(),
    })
}

fn extract_entity(header: &RecordHeader, segment: &str) -> Result<Entity, ExtractError> {
    let fields = FieldSet::scan(segment);
    let name = fields
        .get(NAME_FIELD)
        .ok_or(ExtractError::MissingField(NAME_FIELD))?;

    Ok(Entity {
        identity: header.identity,
        display_name: name.value.to_string(),
    })
}

/// Component links without a guid (built-in or missing scripts) yield nothing
fn extract_component(header: &RecordHeader, segment: &str) -> Option<ComponentInstance> {
    let fields = FieldSet::scan(segment);
    let script = fields.get(SCRIPT_FIELD)?;
    let guid = inline_value(script.value, "guid")?;
    if guid.is_empty() || !guid.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    Some(ComponentInstance {
        identity: header.identity,
        stable_id: guid.to_string(),
    })
}
