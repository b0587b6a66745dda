//! Comment-aware document model.
//!
//! A [`Document`] holds sections, keys, raw values, and the comment block
//! attached to each of them, in authored order. Parsing captures the
//! comments; serializing writes them back, so a load/edit/save cycle keeps
//! what people wrote. Raw values are stored uninterpolated, exactly as
//! authored or set; resolution happens on read through
//! [`crate::interpolate::Interpolator`] and never mutates the stored text.

mod matcher;

use std::{fs, path::Path};

use crate::{
    error::{ConfigError, Result},
    interpolate::Interpolator,
};

use matcher::LineMatcher;

/// Case handling for section and key lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CasePolicy {
    /// Names match exactly as authored.
    #[default]
    Sensitive,
    /// Names match ignoring ASCII case.
    Insensitive,
}

impl CasePolicy {
    fn matches(&self, a: &str, b: &str) -> bool {
        match self {
            CasePolicy::Sensitive => a == b,
            CasePolicy::Insensitive => a.eq_ignore_ascii_case(b),
        }
    }
}

/// A comment block: ordered text lines without their marker prefix.
///
/// Absence is modeled as `Option<Comment>` at the attachment point.
/// A present comment with one empty line serializes as a bare `#` marker,
/// which keeps "present but empty" distinct from "never set".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    lines: Vec<String>,
}

impl Comment {
    /// A present-but-empty comment: one blank marker line.
    pub fn empty() -> Self {
        Self {
            lines: vec![String::new()],
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// All lines joined with newlines.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }
}

impl From<&str> for Comment {
    fn from(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(str::to_string).collect(),
        }
    }
}

impl From<String> for Comment {
    fn from(text: String) -> Self {
        Comment::from(text.as_str())
    }
}

/// A key line: name, raw value, optional comment block.
#[derive(Debug, Clone)]
pub struct Key {
    name: String,
    value: String,
    comment: Option<Comment>,
}

impl Key {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw, uninterpolated value.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn comment(&self) -> Option<&Comment> {
        self.comment.as_ref()
    }
}

/// A named section with ordered keys and an optional comment block.
#[derive(Debug, Clone)]
pub struct Section {
    name: String,
    comment: Option<Comment>,
    keys: Vec<Key>,
}

impl Section {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comment(&self) -> Option<&Comment> {
        self.comment.as_ref()
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    fn key(&self, name: &str, case: CasePolicy) -> Option<&Key> {
        self.keys.iter().find(|k| case.matches(&k.name, name))
    }

    fn key_mut(&mut self, name: &str, case: CasePolicy) -> Option<&mut Key> {
        self.keys.iter_mut().find(|k| case.matches(&k.name, name))
    }
}

/// Full in-memory model of a configuration file.
///
/// Sections keep insertion order; keys keep insertion order within their
/// section. A comment block before the first section (separated from it
/// by a blank line) and a trailing block at the end of the file are
/// preserved as document-level comments.
#[derive(Debug, Clone, Default)]
pub struct Document {
    sections: Vec<Section>,
    top_comment: Option<Comment>,
    end_comment: Option<Comment>,
    case: CasePolicy,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_case_policy(case: CasePolicy) -> Self {
        Self {
            case,
            ..Self::default()
        }
    }

    pub fn case_policy(&self) -> CasePolicy {
        self.case
    }

    /// Parse INI-style text with the default (case-sensitive) policy.
    ///
    /// A run of contiguous comment lines directly above a section header
    /// or key line becomes that entity's comment. An indented line under
    /// a key continues that key's value.
    ///
    /// # Errors
    ///
    /// Fails on lines that are neither comments, headers, keys, nor
    /// continuations, on keys before any section header, and on duplicate
    /// section or key names.
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with(text, CasePolicy::default())
    }

    /// Parse with an explicit case policy for lookups and duplicates.
    pub fn parse_with(text: &str, case: CasePolicy) -> Result<Self> {
        let matcher = LineMatcher::new();
        let mut doc = Document::with_case_policy(case);
        let mut pending: Vec<String> = Vec::new();
        let mut seen_structure = false;
        let mut after_key = false;

        for (idx, line) in text.lines().enumerate() {
            if LineMatcher::is_blank(line) {
                // A block separated from all structure by a blank line is
                // the document-leading comment.
                if !pending.is_empty() && !seen_structure && doc.top_comment.is_none() {
                    doc.top_comment = Some(Comment::from_lines(std::mem::take(&mut pending)));
                }
                pending.clear();
                continue;
            }

            if let Some(comment_line) = matcher.comment_text(line) {
                pending.push(comment_line.to_string());
                continue;
            }

            if let Some(name) = matcher.section_name(line) {
                if doc.find_section(name).is_some() {
                    return Err(ConfigError::DuplicateSection {
                        name: name.to_string(),
                    });
                }
                let comment = if pending.is_empty() {
                    None
                } else {
                    Some(Comment::from_lines(std::mem::take(&mut pending)))
                };
                doc.sections.push(Section {
                    name: name.to_string(),
                    comment,
                    keys: Vec::new(),
                });
                seen_structure = true;
                after_key = false;
                continue;
            }

            if after_key && line.starts_with([' ', '\t']) {
                // Continuation of the previous key's value.
                let key = doc
                    .sections
                    .last_mut()
                    .and_then(|s| s.keys.last_mut())
                    .expect("after_key implies a current key");
                key.value.push('\n');
                key.value.push_str(line.trim());
                continue;
            }

            if let Some((name, value)) = matcher.key_value(line) {
                let comment = if pending.is_empty() {
                    None
                } else {
                    Some(Comment::from_lines(std::mem::take(&mut pending)))
                };
                let Some(section) = doc.sections.last_mut() else {
                    return Err(ConfigError::Parse {
                        line: idx + 1,
                        reason: "key before any section header".to_string(),
                        content: line.to_string(),
                    });
                };
                if section.key(name, case).is_some() {
                    return Err(ConfigError::DuplicateKey {
                        section: section.name.clone(),
                        key: name.to_string(),
                    });
                }
                section.keys.push(Key {
                    name: name.to_string(),
                    value: value.to_string(),
                    comment,
                });
                seen_structure = true;
                after_key = true;
                continue;
            }

            return Err(ConfigError::Parse {
                line: idx + 1,
                reason: "expected a section header, key line, or comment".to_string(),
                content: line.to_string(),
            });
        }

        if !pending.is_empty() {
            if !seen_structure && doc.top_comment.is_none() {
                doc.top_comment = Some(Comment::from_lines(pending));
            } else {
                doc.end_comment = Some(Comment::from_lines(pending));
            }
        }

        Ok(doc)
    }

    /// Read and parse the file at `path` in one full read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Serialize and persist to `path` with a single write.
    ///
    /// The full text is built first; on failure the destination content
    /// is untouched.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.serialize();
        fs::write(path, text).map_err(|source| ConfigError::FileAccess {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Render the document back to INI-style text.
    ///
    /// Comment lines precede their section or key, sections are separated
    /// by blank lines, and multi-line values are indented with a tab.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        if let Some(comment) = &self.top_comment {
            push_comment(&mut out, comment);
            out.push('\n');
        }
        for section in &self.sections {
            if let Some(comment) = &section.comment {
                push_comment(&mut out, comment);
            }
            out.push('[');
            out.push_str(&section.name);
            out.push_str("]\n");
            for key in &section.keys {
                if let Some(comment) = &key.comment {
                    push_comment(&mut out, comment);
                }
                out.push_str(&key.name);
                out.push_str(" = ");
                out.push_str(&key.value.replace('\n', "\n\t"));
                out.push('\n');
            }
            out.push('\n');
        }
        if let Some(comment) = &self.end_comment {
            push_comment(&mut out, comment);
        }
        out
    }

    /// Section names in document order.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.find_section(name)
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.find_section(name).is_some()
    }

    /// Key names of `section` in document order.
    pub fn keys(&self, section: &str) -> Option<impl Iterator<Item = &str>> {
        self.find_section(section)
            .map(|s| s.keys.iter().map(|k| k.name.as_str()))
    }

    pub fn has_key(&self, section: &str, key: &str) -> bool {
        self.get(section, key).is_some()
    }

    /// The raw, uninterpolated value of `section:key`.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.find_section(section)?
            .key(key, self.case)
            .map(|k| k.value.as_str())
    }

    /// The value of `section:key` with all references resolved against a
    /// fresh process-environment snapshot.
    pub fn get_interpolated(&self, section: &str, key: &str) -> Result<String> {
        self.interpolated_with(&Interpolator::new(), section, key)
    }

    /// The value of `section:key` resolved through `interpolator`.
    pub fn interpolated_with(
        &self,
        interpolator: &Interpolator,
        section: &str,
        key: &str,
    ) -> Result<String> {
        let raw = self.get(section, key).ok_or_else(|| ConfigError::MissingKey {
            section: section.to_string(),
            key: key.to_string(),
        })?;
        interpolator.resolve(self, section, raw)
    }

    /// Set `section:key` to `value`, creating the section and key as
    /// needed (new entries are appended, preserving insertion order).
    ///
    /// With `Some(comment)` the key's comment is replaced in the same
    /// step; with `None` an existing comment is left untouched.
    pub fn set(
        &mut self,
        section: &str,
        key: &str,
        value: impl Into<String>,
        comment: Option<Comment>,
    ) {
        let case = self.case;
        let pos = self
            .sections
            .iter()
            .position(|s| case.matches(&s.name, section));
        let section = match pos {
            Some(i) => &mut self.sections[i],
            None => {
                self.sections.push(Section {
                    name: section.to_string(),
                    comment: None,
                    keys: Vec::new(),
                });
                self.sections.last_mut().expect("just pushed")
            }
        };
        match section.key_mut(key, case) {
            Some(k) => {
                k.value = value.into();
                if let Some(comment) = comment {
                    k.comment = Some(comment);
                }
            }
            None => section.keys.push(Key {
                name: key.to_string(),
                value: value.into(),
                comment,
            }),
        }
    }

    /// Add an empty section at the end of the document.
    ///
    /// # Errors
    ///
    /// Fails with [`ConfigError::DuplicateSection`] when the name is
    /// already present.
    pub fn add_section(&mut self, name: &str, comment: Option<Comment>) -> Result<()> {
        if self.has_section(name) {
            return Err(ConfigError::DuplicateSection {
                name: name.to_string(),
            });
        }
        self.sections.push(Section {
            name: name.to_string(),
            comment,
            keys: Vec::new(),
        });
        Ok(())
    }

    pub fn remove_section(&mut self, name: &str) -> bool {
        let case = self.case;
        let before = self.sections.len();
        self.sections.retain(|s| !case.matches(&s.name, name));
        self.sections.len() != before
    }

    pub fn remove_key(&mut self, section: &str, key: &str) -> bool {
        let case = self.case;
        let Some(section) = self.find_section_mut(section) else {
            return false;
        };
        let before = section.keys.len();
        section.keys.retain(|k| !case.matches(&k.name, key));
        section.keys.len() != before
    }

    /// The section's comment block; `None` when none was ever set.
    pub fn section_comment(&self, name: &str) -> Option<&Comment> {
        self.find_section(name)?.comment.as_ref()
    }

    /// The key's comment block; `None` when none was ever set.
    pub fn key_comment(&self, section: &str, key: &str) -> Option<&Comment> {
        self.find_section(section)?
            .key(key, self.case)?
            .comment
            .as_ref()
    }

    /// Replace (or with `None`, unset) a section's comment.
    pub fn set_section_comment(&mut self, name: &str, comment: Option<Comment>) -> Result<()> {
        let section = self
            .find_section_mut(name)
            .ok_or_else(|| ConfigError::MissingSection {
                name: name.to_string(),
            })?;
        section.comment = comment;
        Ok(())
    }

    /// Replace (or with `None`, unset) a key's comment.
    pub fn set_key_comment(
        &mut self,
        section: &str,
        key: &str,
        comment: Option<Comment>,
    ) -> Result<()> {
        let case = self.case;
        let section_name = section.to_string();
        let section = self
            .find_section_mut(section)
            .ok_or_else(|| ConfigError::MissingSection {
                name: section_name.clone(),
            })?;
        let key_entry = section
            .key_mut(key, case)
            .ok_or_else(|| ConfigError::MissingKey {
                section: section_name,
                key: key.to_string(),
            })?;
        key_entry.comment = comment;
        Ok(())
    }

    /// Free comment block preserved before the first section.
    pub fn top_comment(&self) -> Option<&Comment> {
        self.top_comment.as_ref()
    }

    pub fn set_top_comment(&mut self, comment: Option<Comment>) {
        self.top_comment = comment;
    }

    /// Trailing comment block preserved at the end of the file.
    pub fn end_comment(&self) -> Option<&Comment> {
        self.end_comment.as_ref()
    }

    pub fn set_end_comment(&mut self, comment: Option<Comment>) {
        self.end_comment = comment;
    }

    fn find_section(&self, name: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| self.case.matches(&s.name, name))
    }

    fn find_section_mut(&mut self, name: &str) -> Option<&mut Section> {
        let case = self.case;
        self.sections
            .iter_mut()
            .find(|s| case.matches(&s.name, name))
    }
}

fn push_comment(out: &mut String, comment: &Comment) {
    for line in comment.lines() {
        if line.is_empty() {
            out.push_str("#\n");
        } else {
            out.push_str("# ");
            out.push_str(line);
            out.push('\n');
        }
    }
}
