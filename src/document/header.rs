//! Record header classification

/// Prefix every record header line starts with
const HEADER_PREFIX: &str = "--- !u!";

/// Kind of record, derived from its numeric type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// A named object (GameObject)
    Entity,
    /// A positional node (Transform)
    Transform,
    /// A positional node with layout data (RectTransform)
    RectTransform,
    /// An attached script instance (MonoBehaviour)
    ComponentInstance,
    /// Anything else; ignored by the analysis
    Other(u32),
}

impl RecordKind {
    pub const ENTITY_TAG: u32 = 1;
    pub const TRANSFORM_TAG: u32 = 4;
    pub const COMPONENT_INSTANCE_TAG: u32 = 114;
    pub const RECT_TRANSFORM_TAG: u32 = 224;

    pub fn from_tag(tag: u32) -> Self {
        match tag {
            Self::ENTITY_TAG => RecordKind::Entity,
            Self::TRANSFORM_TAG => RecordKind::Transform,
            Self::COMPONENT_INSTANCE_TAG => RecordKind::ComponentInstance,
            Self::RECT_TRANSFORM_TAG => RecordKind::RectTransform,
            other => RecordKind::Other(other),
        }
    }

    /// Transform and RectTransform carry the same hierarchy fields
    pub fn is_hierarchy(&self) -> bool {
        matches!(self, RecordKind::Transform | RecordKind::RectTransform)
    }
}

/// A segment past the preamble did not start with a record header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingHeader;

/// Type tag and identity extracted from a record's header line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub tag: u32,
    pub identity: i64,
    /// Placeholder record standing in for an object owned by a nested prefab
    pub stripped: bool,
}

impl RecordHeader {
    /// Parse a single header line such as `--- !u!4 &1234 stripped`
    pub fn parse_line(line: &str) -> Option<Self> {
        let rest = line.trim_end().strip_prefix(HEADER_PREFIX)?;
        let mut tokens = rest.split_whitespace();

        let tag = tokens.next()?.parse::<u32>().ok()?;
        let identity = tokens.next()?.strip_prefix('&')?.parse::<i64>().ok()?;
        let stripped = match tokens.next() {
            None => false,
            Some("stripped") => true,
            Some(_) => return None,
        };
        if tokens.next().is_some() {
            return None;
        }

        Some(Self {
            tag,
            identity,
            stripped,
        })
    }

    pub fn is_header(line: &str) -> bool {
        Self::parse_line(line).is_some()
    }

    /// Classify a segment produced by the splitter
    ///
    /// Returns `Ok(None)` for the preamble (the first segment when it has no
    /// header), and `Err(MissingHeader)` when any later segment lacks one.
    pub fn classify(segment: &str, position: usize) -> Result<Option<Self>, MissingHeader> {
        let first_line = segment.lines().next().unwrap_or("");
        match Self::parse_line(first_line) {
            Some(header) => Ok(Some(header)),
            None if position == 0 => Ok(None),
            None => Err(MissingHeader),
        }
    }

    pub fn kind(&self) -> RecordKind {
        RecordKind::from_tag(self.tag)
    }
}
