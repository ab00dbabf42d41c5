//! Field scanning inside a single record
//!
//! Record bodies are indented `label: value` lines. A field's value may
//! continue on following lines that are either indented deeper or are list
//! items (`- ...`) at the field's own indentation. Only top-level fields are
//! exposed, so labels that repeat inside nested blocks never shadow them.

/// One top-level field of a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field<'a> {
    pub label: &'a str,
    /// Inline value on the label's line, trimmed (may be empty)
    pub value: &'a str,
    /// Continuation lines, trimmed, with any list marker removed
    pub items: Vec<&'a str>,
}

/// Top-level fields of a record, in document order
#[derive(Debug, Clone, Default)]
pub struct FieldSet<'a> {
    fields: Vec<Field<'a>>,
}

impl<'a> FieldSet<'a> {
    /// Scan a record segment (header line included)
    pub fn scan(segment: &'a str) -> Self {
        let mut fields: Vec<Field<'a>> = Vec::new();
        let mut field_indent: Option<usize> = None;

        // Header line, then the unindented class line (`Transform:`)
        for line in segment.lines().skip(1) {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let indent = line.len() - line.trim_start().len();
            if indent == 0 {
                continue;
            }

            let base = *field_indent.get_or_insert(indent);
            let is_item = trimmed.starts_with("- ") || trimmed == "-";

            if indent > base || (indent == base && is_item) {
                if let Some(current) = fields.last_mut() {
                    let item = trimmed.strip_prefix('-').unwrap_or(trimmed).trim();
                    current.items.push(item);
                }
                continue;
            }

            if indent < base {
                // Malformed indentation; treat as a new field level
                field_indent = Some(indent);
            }

            if let Some((label, value)) = trimmed.split_once(':') {
                fields.push(Field {
                    label: label.trim(),
                    value: value.trim(),
                    items: Vec::new(),
                });
            }
        }

        Self { fields }
    }

    /// First top-level field with the given label
    pub fn get(&self, label: &str) -> Option<&Field<'a>> {
        self.fields.iter().find(|f| f.label == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field<'a>> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Iterate the `key: value` pairs of an inline map such as
/// `{fileID: 11500000, guid: 0a1b, type: 3}`
pub fn inline_pairs(value: &str) -> impl Iterator<Item = (&str, &str)> {
    let inner = value
        .trim()
        .strip_prefix('{')
        .and_then(|v| v.strip_suffix('}'))
        .unwrap_or("");

    inner.split(',').filter_map(|pair| {
        let (key, value) = pair.split_once(':')?;
        Some((key.trim(), value.trim()))
    })
}

/// Value of one key inside an inline map
pub fn inline_value<'v>(value: &'v str, key: &str) -> Option<&'v str> {
    inline_pairs(value).find(|(k, _)| *k == key).map(|(_, v)| v)
}

/// The `fileID` of a reference value, if it is one
pub fn reference(value: &str) -> Option<i64> {
    inline_value(value, "fileID")?.parse().ok()
}

/// Every `fileID` found in the inline maps of a text fragment, in order
pub fn references_in(text: &str) -> Vec<i64> {
    let mut refs = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        if let Some(id) = reference(&rest[open..open + close + 1]) {
            refs.push(id);
        }
        rest = &rest[open + close + 1..];
    }

    refs
}
