//! Markdown archive parsing.
//!
//! An archive is a sequence of sections separated by delimiter lines (four
//! or more hyphens). Each section holds the post text as quote lines plus a
//! status link carrying the timestamp and URL. Parsing is lazy: records are
//! produced one section at a time, and [`ArchiveParser::records`] can be
//! called again to restart from the top.

use crate::status_link::find_status_link;
use crate::types::{Record, RecordFormat};

/// Minimum run of hyphens that forms a section delimiter.
const DELIMITER_MIN_LEN: usize = 4;

/// Prefix of positional ids given to sections without a status link.
pub const FALLBACK_ID_PREFIX: &str = "md_";

/// Parser over the text of one markdown archive.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveParser<'a> {
    text: &'a str,
    source_file: &'a str,
}

impl<'a> ArchiveParser<'a> {
    /// Create a parser for `text`, attributing records to `source_file`.
    pub fn new(text: &'a str, source_file: &'a str) -> Self {
        Self { text, source_file }
    }

    /// Iterate over the records of the archive, from the start.
    pub fn records(&self) -> Records<'a> {
        Records {
            sections: Sections::new(self.text),
            index: 0,
            source_file: self.source_file,
        }
    }
}

/// Lazy record iterator returned by [`ArchiveParser::records`].
#[derive(Debug, Clone)]
pub struct Records<'a> {
    sections: Sections<'a>,
    index: usize,
    source_file: &'a str,
}

impl Iterator for Records<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        loop {
            let section = self.sections.next()?;
            // Positional ids count every section, including dropped ones
            let index = self.index;
            self.index += 1;

            if let Some(record) = parse_section(section, index, self.source_file) {
                return Some(record);
            }
        }
    }
}

/// Iterator over the raw sections of an archive.
#[derive(Debug, Clone)]
struct Sections<'a> {
    rest: Option<&'a str>,
}

impl<'a> Sections<'a> {
    fn new(text: &'a str) -> Self {
        Self { rest: Some(text) }
    }
}

impl<'a> Iterator for Sections<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = self.rest?;

        let mut offset = 0;
        for line in rest.split_inclusive('\n') {
            if is_delimiter(line) {
                self.rest = Some(&rest[offset + line.len()..]);
                return Some(&rest[..offset]);
            }
            offset += line.len();
        }

        self.rest = None;
        Some(rest)
    }
}

fn is_delimiter(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= DELIMITER_MIN_LEN && trimmed.bytes().all(|b| b == b'-')
}

/// Turn one section into a record, or `None` when it holds no quoted text.
fn parse_section(section: &str, index: usize, source_file: &str) -> Option<Record> {
    if section.trim().is_empty() {
        return None;
    }

    let content = quoted_text(section)?;

    let (id, timestamp, url) = match find_status_link(section) {
        Some(link) => (
            link.status_id.to_string(),
            Some(link.timestamp.to_string()),
            Some(link.url.to_string()),
        ),
        None => (format!("{}{}", FALLBACK_ID_PREFIX, index), None, None),
    };

    Some(Record {
        content,
        id,
        timestamp,
        url,
        source_file: source_file.to_string(),
        format: RecordFormat::Markdown,
    })
}

/// Join the text of every quote line, or `None` if there is none.
fn quoted_text(section: &str) -> Option<String> {
    let pieces: Vec<&str> = section
        .lines()
        .filter_map(|line| line.trim().strip_prefix('>'))
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect();

    if pieces.is_empty() {
        None
    } else {
        Some(pieces.join(" "))
    }
}
