//! C# source parser using tree-sitter
//!
//! Only the shape the usage sweep needs is extracted: type declarations,
//! their base lists, and the fields declared directly in their bodies.

use super::common::{DeclaredType, FieldDeclaration, SourceParser};
use crate::error::{AuditError, Result};
use std::path::Path;
use tree_sitter::{Language, Node, Parser};

const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "struct_declaration",
    "record_declaration",
];

/// C# parser built on tree-sitter-c-sharp
#[derive(Debug, Clone)]
pub struct CSharpParser {
    language: Language,
}

impl CSharpParser {
    /// Load the grammar and check it against the linked tree-sitter runtime
    ///
    /// A grammar built for another ABI fails here once instead of on every
    /// source file.
    pub fn new() -> Result<Self> {
        let language: Language = tree_sitter_c_sharp::LANGUAGE.into();
        Parser::new()
            .set_language(&language)
            .map_err(|e| AuditError::ParserSetup(e.to_string()))?;
        Ok(Self { language })
    }

    fn declared_type(node: Node, source: &[u8]) -> Option<DeclaredType> {
        let name = node
            .child_by_field_name("name")
            .and_then(|n| n.utf8_text(source).ok())?
            .to_string();

        let mut supertypes = Vec::new();
        let mut fields = Vec::new();

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "base_list" => supertypes.extend(Self::base_types(child, source)),
                "declaration_list" => fields.extend(Self::fields(child, source)),
                _ => {}
            }
        }

        Some(DeclaredType {
            name,
            supertypes,
            fields,
        })
    }

    fn base_types(base_list: Node, source: &[u8]) -> Vec<String> {
        let mut cursor = base_list.walk();
        base_list
            .named_children(&mut cursor)
            .filter(|n| n.kind() != "argument_list")
            .filter_map(|n| {
                // Primary-constructor bases wrap the type: `Base(arg)`
                let type_node = if n.kind() == "primary_constructor_base_type" {
                    n.named_child(0)?
                } else {
                    n
                };
                type_node.utf8_text(source).ok().map(str::to_string)
            })
            .collect()
    }

    /// Fields declared directly in a type body (nested types excluded)
    fn fields(body: Node, source: &[u8]) -> Vec<FieldDeclaration> {
        let mut fields = Vec::new();

        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            if member.kind() != "field_declaration" {
                continue;
            }

            let mut member_cursor = member.walk();
            let declarations: Vec<_> = member
                .named_children(&mut member_cursor)
                .filter(|n| n.kind() == "variable_declaration")
                .collect();

            for declaration in declarations {
                let Some(type_name) = declaration
                    .child_by_field_name("type")
                    .and_then(|n| n.utf8_text(source).ok())
                else {
                    continue;
                };

                let mut decl_cursor = declaration.walk();
                for declarator in declaration.named_children(&mut decl_cursor) {
                    if declarator.kind() != "variable_declarator" {
                        continue;
                    }
                    if let Some(name) = Self::declarator_name(declarator, source) {
                        fields.push(FieldDeclaration {
                            name,
                            type_name: type_name.to_string(),
                        });
                    }
                }
            }
        }

        fields
    }

    fn declarator_name(declarator: Node, source: &[u8]) -> Option<String> {
        let name_node = declarator.child_by_field_name("name").or_else(|| {
            let mut cursor = declarator.walk();
            let first = declarator
                .named_children(&mut cursor)
                .find(|n| n.kind() == "identifier");
            first
        })?;
        name_node.utf8_text(source).ok().map(str::to_string)
    }
}

impl SourceParser for CSharpParser {
    fn declared_types(&self, path: &Path, source: &str) -> Result<Vec<DeclaredType>> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| AuditError::source_parse(path, format!("Failed to set language: {e}")))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| AuditError::source_parse(path, "Failed to parse source code"))?;

        let bytes = source.as_bytes();
        let mut types = Vec::new();
        let mut stack = vec![tree.root_node()];

        while let Some(node) = stack.pop() {
            if TYPE_DECLARATIONS.contains(&node.kind()) {
                if let Some(declared) = Self::declared_type(node, bytes) {
                    types.push(declared);
                }
            }

            let mut cursor = node.walk();
            let children: Vec<_> = node.named_children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }

        Ok(types)
    }
}
