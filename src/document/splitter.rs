//! Record boundary detection
//!
//! A document is a flat sequence of records, each starting on a line of the
//! form `--- !u!<tag> &<identity>`. The splitter only finds those boundaries;
//! it never looks inside a record.

use super::header::RecordHeader;

/// Lazily splits a document into record segments, in original order
///
/// Each yielded segment holds exactly one record (its header line plus
/// body), except possibly the first, which holds whatever preamble precedes
/// the first header. Text without any header comes back as one segment.
/// The iterator is `Clone`, so a split can be restarted from any point.
#[derive(Debug, Clone)]
pub struct RecordSplitter<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> RecordSplitter<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for RecordSplitter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.pos >= self.text.len() {
            return None;
        }

        let start = self.pos;
        let mut offset = start;

        for (i, line) in self.text[start..].split_inclusive('\n').enumerate() {
            if i > 0 && RecordHeader::is_header(line) {
                self.pos = offset;
                return Some(&self.text[start..offset]);
            }
            offset += line.len();
        }

        self.pos = self.text.len();
        Some(&self.text[start..])
    }
}

/// Split a document into record segments
pub fn split_records(text: &str) -> RecordSplitter<'_> {
    RecordSplitter::new(text)
}
