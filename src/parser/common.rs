use crate::error::Result;
use std::path::Path;

/// A field declared directly inside a type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDeclaration {
    pub name: String,
    /// Declared type as written in the source, e.g. `Rigidbody` or `List<Enemy>`
    pub type_name: String,
}

/// A type declaration with its supertypes and direct fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredType {
    pub name: String,
    /// Supertypes as written in the base list
    pub supertypes: Vec<String>,
    pub fields: Vec<FieldDeclaration>,
}

impl DeclaredType {
    /// Whether any supertype names the marker, bare or qualified
    pub fn has_supertype(&self, marker: &str) -> bool {
        self.supertypes.iter().any(|s| {
            s == marker
                || s.rsplit_once('.')
                    .map(|(_, last)| last == marker)
                    .unwrap_or(false)
        })
    }
}

/// Common trait for source parsers
pub trait SourceParser: Send + Sync {
    /// Parse source text and list every declared type, nested ones included
    fn declared_types(&self, path: &Path, source: &str) -> Result<Vec<DeclaredType>>;
}
