//! Line classification for INI-style text.
//!
//! The document parser never tokenizes by hand; every raw line goes
//! through these patterns to decide whether it is a comment, a section
//! header, or a key line. Comments are checked first by the caller since
//! they may contain delimiters and brackets.

use regex::Regex;

/// Classifies raw lines into comments, section headers, and key lines.
pub(crate) struct LineMatcher {
    comment: Regex,
    section: Regex,
    option: Regex,
}

impl LineMatcher {
    pub(crate) fn new() -> Self {
        Self {
            // One space after the marker is part of the marker, the rest
            // of the line is comment text.
            comment: Regex::new(r"^\s*[#;]\s?(.*)$").unwrap(),
            section: Regex::new(r"^\s*\[([^\]]+)\]\s*$").unwrap(),
            option: Regex::new(r"^\s*([^\s\[=:#;][^=:]*?)\s*[=:]\s*(.*)$").unwrap(),
        }
    }

    pub(crate) fn is_blank(line: &str) -> bool {
        line.trim().is_empty()
    }

    /// Comment text without its marker, if the line is a comment.
    pub(crate) fn comment_text<'h>(&self, line: &'h str) -> Option<&'h str> {
        self.comment.captures(line).map(|caps| {
            caps.get(1)
                .map(|text| text.as_str())
                .unwrap_or_default()
        })
    }

    /// Section name, if the line is a section header.
    pub(crate) fn section_name<'h>(&self, line: &'h str) -> Option<&'h str> {
        self.section
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|name| name.as_str().trim())
    }

    /// `(key, value)` pair, if the line is a key line.
    pub(crate) fn key_value<'h>(&self, line: &'h str) -> Option<(&'h str, &'h str)> {
        let caps = self.option.captures(line)?;
        let name = caps.get(1)?.as_str();
        let value = caps.get(2)?.as_str().trim_end();
        Some((name, value))
    }
}
