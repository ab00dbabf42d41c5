//! SceneSweep - Fast hierarchy dumps and unused-script detection for Unity
//!
//! This library reconstructs object hierarchies from Unity's flat scene
//! format and finds MonoBehaviour scripts that nothing in the project uses.
//!
//! # Architecture
//!
//! The analysis pipeline consists of:
//! 1. **File Discovery** - Find scenes, prefabs and C# scripts
//! 2. **Registry** - Index every script by guid and by name
//! 3. **Document Parsing** - Split scenes into typed records
//! 4. **Hierarchy Dumps** - Resolve parent/child references into trees
//! 5. **Usage Sweeps** - Mark scripts attached in documents or referenced by
//!    fields of other components (parsed with tree-sitter)
//! 6. **Reporting** - Write the unused-scripts report

pub mod analysis;
pub mod config;
pub mod discovery;
pub mod document;
pub mod error;
pub mod hierarchy;
pub mod parser;
pub mod registry;
pub mod report;

pub use analysis::{Analysis, DocumentReport, ProjectAnalyzer};
pub use config::{Config, SceneSource};
pub use discovery::{FileFinder, ProjectFiles};
pub use document::Document;
pub use error::{AuditError, Result, Severity};
pub use hierarchy::Forest;
pub use parser::{CSharpParser, DeclaredType, SourceParser};
pub use registry::{ComponentRecord, ComponentRegistry};
pub use report::{ReportFormat, Reporter, UsageReport};
