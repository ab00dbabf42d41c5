use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for scenesweep operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Errors that can occur while analyzing a project
///
/// Most variants are recoverable: they are logged, collected on the
/// analysis outcome, and only abort the unit of work they belong to
/// (one record, one document, one script).
#[derive(Error, Diagnostic, Debug)]
pub enum AuditError {
    /// A record header or a required field is absent
    #[error("{}: record &{identity}: {reason}", document.display())]
    #[diagnostic(code(scenesweep::malformed_record))]
    MalformedRecord {
        document: PathBuf,
        identity: i64,
        reason: String,
    },

    /// A reference field points to an identity absent from the document
    #[error("{}: record &{from} references missing {target} &{to}", document.display())]
    #[diagnostic(
        code(scenesweep::dangling_reference),
        help("the hierarchy dump for this document was skipped")
    )]
    DanglingReference {
        document: PathBuf,
        from: i64,
        to: i64,
        target: &'static str,
    },

    /// Hierarchy nodes that no root reaches; they are missing from the dump
    #[error("{}: {count} hierarchy node(s) not reachable from any root, first &{first}", document.display())]
    #[diagnostic(code(scenesweep::detached_nodes))]
    DetachedNodes {
        document: PathBuf,
        count: usize,
        first: i64,
    },

    /// Two component declarations share a stable id
    #[error("duplicate guid {guid}: keeping {kept}, ignoring {ignored}")]
    #[diagnostic(code(scenesweep::duplicate_identity))]
    DuplicateIdentity {
        guid: String,
        kept: String,
        ignored: String,
    },

    /// Two component declarations share a short name
    #[error("duplicate script name '{name}': keeping {kept}, {ignored} is only reachable by guid")]
    #[diagnostic(code(scenesweep::duplicate_short_name))]
    DuplicateShortName {
        name: String,
        kept: String,
        ignored: String,
    },

    /// A declaration file has no companion identity file
    #[error("{}: companion file not found", path.display())]
    #[diagnostic(code(scenesweep::missing_companion))]
    MissingCompanionFile { path: PathBuf },

    /// A companion identity file carries no usable guid
    #[error("{}: no guid on line 2", path.display())]
    #[diagnostic(code(scenesweep::malformed_companion))]
    MalformedCompanionFile { path: PathBuf },

    /// Two scenes would write the same dump file
    #[error("{}: dump name {name} already taken by another scene", path.display())]
    #[diagnostic(code(scenesweep::dump_collision))]
    DumpCollision { path: PathBuf, name: String },

    /// Reading or writing a file failed
    #[error("{}: {source}", path.display())]
    #[diagnostic(code(scenesweep::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source parser rejected a file
    #[error("{}: {message}", path.display())]
    #[diagnostic(code(scenesweep::source_parse))]
    SourceParse { path: PathBuf, message: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(scenesweep::config))]
    Config(String),

    /// The C# grammar does not fit the linked tree-sitter runtime
    #[error("Failed to load the C# grammar: {0}")]
    #[diagnostic(
        code(scenesweep::parser_setup),
        help("the tree-sitter and tree-sitter-c-sharp versions must share a language ABI")
    )]
    ParserSetup(String),

    /// The worker pool could not be started
    #[error("Failed to start worker pool: {0}")]
    #[diagnostic(code(scenesweep::worker_pool))]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl AuditError {
    /// Create an I/O error tied to a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a source parse error
    pub fn source_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::SourceParse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            AuditError::Io { .. }
            | AuditError::SourceParse { .. }
            | AuditError::Config(_)
            | AuditError::ParserSetup(_)
            | AuditError::WorkerPool(_) => Severity::Error,
            AuditError::DuplicateShortName { .. } => Severity::Info,
            _ => Severity::Warning,
        }
    }

    /// Whether this error aborted a document's hierarchy dump
    pub fn is_hierarchy_failure(&self) -> bool {
        matches!(
            self,
            AuditError::MalformedRecord { .. } | AuditError::DanglingReference { .. }
        )
    }
}

/// Severity levels for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
