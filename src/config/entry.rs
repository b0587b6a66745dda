//! Entry descriptors and typed value kinds.
//!
//! A [`ConfigEntry`] is a typed view over one document key: it owns a
//! (section, key) coordinate, a default, the prompt metadata, and the
//! current raw and typed state. The kind-specific behavior lives in
//! [`EntryValue`], one variant per entry kind, with a single dispatch
//! point for coercion and prompting.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    rc::Rc,
    str::FromStr,
};

use crate::{
    document::Comment,
    error::{ConfigError, Result},
    prompt::{PromptAnswer, PromptKind, PromptRequest},
};

use super::Configuration;

/// Predicate deciding whether an entry takes part in interactive
/// prompting.
pub type InquireWhen = Rc<dyn Fn(&Configuration) -> bool>;

/// Kind-specific default and typed value cache for an entry.
#[derive(Debug, Clone)]
pub enum EntryValue {
    /// Free-form string value.
    Text {
        value: Option<String>,
        default: String,
    },
    /// Boolean stored as `true`/`false`.
    Confirm { value: Option<bool>, default: bool },
    /// Exactly one of a fixed set of choices.
    Select {
        choices: Vec<String>,
        value: Option<String>,
        default: String,
    },
    /// Ordered subset of choices, joined with `delimiter` in raw form.
    MultiSelect {
        choices: Vec<String>,
        value: Option<Vec<String>>,
        default: Vec<String>,
        delimiter: String,
    },
    /// Path whose directory is created on demand.
    Directory {
        value: Option<PathBuf>,
        default: PathBuf,
    },
}

/// A typed configuration entry bound to one `(section, key)` coordinate.
///
/// The typed cache holds the interpolated, coerced value; the raw string
/// keeps the uninterpolated text so that writing the entry back never
/// bakes resolved references into the file.
#[derive(Clone)]
pub struct ConfigEntry {
    section: String,
    key: String,
    message: String,
    long_instruction: Option<String>,
    value: EntryValue,
    /// Current uninterpolated text; `None` until loaded or set.
    raw: Option<String>,
    when: Option<InquireWhen>,
}

impl ConfigEntry {
    fn new(
        section: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
        value: EntryValue,
    ) -> Self {
        Self {
            section: section.into(),
            key: key.into(),
            message: message.into(),
            long_instruction: None,
            value,
            raw: None,
            when: None,
        }
    }

    /// Free-text entry.
    pub fn text(
        section: impl Into<String>,
        key: impl Into<String>,
        default: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            section,
            key,
            message,
            EntryValue::Text {
                value: None,
                default: default.into(),
            },
        )
    }

    /// Yes/no entry, stored as `true`/`false`.
    pub fn confirm(
        section: impl Into<String>,
        key: impl Into<String>,
        default: bool,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            section,
            key,
            message,
            EntryValue::Confirm {
                value: None,
                default,
            },
        )
    }

    /// Single-choice entry over a fixed set.
    pub fn select(
        section: impl Into<String>,
        key: impl Into<String>,
        choices: Vec<String>,
        default: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            section,
            key,
            message,
            EntryValue::Select {
                choices,
                value: None,
                default: default.into(),
            },
        )
    }

    /// Multi-choice entry; the raw form joins picks with `", "` unless
    /// changed via [`ConfigEntry::with_delimiter`].
    pub fn multi_select(
        section: impl Into<String>,
        key: impl Into<String>,
        choices: Vec<String>,
        default: Vec<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            section,
            key,
            message,
            EntryValue::MultiSelect {
                choices,
                value: None,
                default,
                delimiter: ", ".to_string(),
            },
        )
    }

    /// Directory-producing entry; [`ConfigEntry::dir`] guarantees the
    /// target exists.
    pub fn directory(
        section: impl Into<String>,
        key: impl Into<String>,
        default: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            section,
            key,
            message,
            EntryValue::Directory {
                value: None,
                default: default.into(),
            },
        )
    }

    /// Attach longer help text, shown at the prompt and written into the
    /// entry's comment.
    pub fn with_long_instruction(mut self, text: impl Into<String>) -> Self {
        self.long_instruction = Some(text.into());
        self
    }

    /// Change the raw-form delimiter of a multi-select entry. Has no
    /// effect on other kinds.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        if let EntryValue::MultiSelect { delimiter: d, .. } = &mut self.value {
            *d = delimiter.into();
        }
        self
    }

    /// Only prompt for this entry when `predicate` holds at inquire time.
    pub fn ask_if(mut self, predicate: impl Fn(&Configuration) -> bool + 'static) -> Self {
        self.when = Some(Rc::new(predicate));
        self
    }

    /// Never prompt for this entry.
    pub fn no_prompt(self) -> Self {
        self.ask_if(|_| false)
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn long_instruction(&self) -> Option<&str> {
        self.long_instruction.as_deref()
    }

    pub fn value(&self) -> &EntryValue {
        &self.value
    }

    /// Whether this entry participates in the next `inquire` run.
    pub fn should_prompt(&self, config: &Configuration) -> bool {
        match &self.when {
            Some(predicate) => predicate(config),
            None => true,
        }
    }

    /// Current text of a [`EntryValue::Text`] entry (or its default).
    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            EntryValue::Text { value, default } => {
                Some(value.as_deref().unwrap_or(default.as_str()))
            }
            _ => None,
        }
    }

    /// Current state of a [`EntryValue::Confirm`] entry (or its default).
    pub fn as_bool(&self) -> Option<bool> {
        match &self.value {
            EntryValue::Confirm { value, default } => Some(value.unwrap_or(*default)),
            _ => None,
        }
    }

    /// Current pick of a [`EntryValue::Select`] entry (or its default).
    pub fn as_choice(&self) -> Option<&str> {
        match &self.value {
            EntryValue::Select { value, default, .. } => {
                Some(value.as_deref().unwrap_or(default.as_str()))
            }
            _ => None,
        }
    }

    /// Current picks of a [`EntryValue::MultiSelect`] entry (or its
    /// default).
    pub fn as_choices(&self) -> Option<&[String]> {
        match &self.value {
            EntryValue::MultiSelect { value, default, .. } => {
                Some(value.as_deref().unwrap_or(default.as_slice()))
            }
            _ => None,
        }
    }

    /// Current path of a [`EntryValue::Directory`] entry without touching
    /// the filesystem.
    pub fn as_dir_path(&self) -> Option<&Path> {
        match &self.value {
            EntryValue::Directory { value, default } => {
                Some(value.as_deref().unwrap_or(default.as_path()))
            }
            _ => None,
        }
    }

    /// The directory of a [`EntryValue::Directory`] entry, created (with
    /// parents) if missing.
    pub fn dir(&self) -> Option<Result<PathBuf>> {
        let path = self.as_dir_path()?;
        Some(
            fs::create_dir_all(path)
                .map(|_| path.to_path_buf())
                .map_err(|source| ConfigError::FileAccess {
                    path: path.to_path_buf(),
                    source,
                }),
        )
    }

    /// Coerce the entry's current string form with `FromStr`.
    ///
    /// # Errors
    ///
    /// Fails with [`ConfigError::Coercion`] naming the coordinate and the
    /// offending value.
    pub fn parsed<T: FromStr>(&self) -> Result<T> {
        let raw = self.value_str();
        raw.parse().map_err(|_| ConfigError::Coercion {
            section: self.section.clone(),
            key: self.key.clone(),
            raw,
            expected: std::any::type_name::<T>().to_string(),
        })
    }

    /// Set a text entry from any `ToString` value.
    pub fn set_value<T: ToString>(&mut self, value: T) -> Result<()> {
        self.set_text(value.to_string())
    }

    pub fn set_text(&mut self, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        match &mut self.value {
            EntryValue::Text { value: v, .. } => {
                *v = Some(value.clone());
                self.raw = Some(value);
                Ok(())
            }
            _ => Err(self.kind_mismatch("a text value")),
        }
    }

    pub fn set_bool(&mut self, value: bool) -> Result<()> {
        match &mut self.value {
            EntryValue::Confirm { value: v, .. } => {
                *v = Some(value);
                self.raw = Some(bool_str(value).to_string());
                Ok(())
            }
            _ => Err(self.kind_mismatch("a confirmation value")),
        }
    }

    pub fn set_choice(&mut self, choice: impl Into<String>) -> Result<()> {
        let choice = choice.into();
        let (section, key) = (self.section.clone(), self.key.clone());
        match &mut self.value {
            EntryValue::Select {
                choices, value: v, ..
            } => {
                if !choices.contains(&choice) {
                    return Err(ConfigError::Coercion {
                        section,
                        key,
                        raw: choice,
                        expected: format!("one of {choices:?}"),
                    });
                }
                *v = Some(choice.clone());
                self.raw = Some(choice);
                Ok(())
            }
            _ => Err(self.kind_mismatch("a selection value")),
        }
    }

    pub fn set_choices(&mut self, picks: Vec<String>) -> Result<()> {
        let (section, key) = (self.section.clone(), self.key.clone());
        match &mut self.value {
            EntryValue::MultiSelect {
                choices,
                value: v,
                delimiter,
                ..
            } => {
                if let Some(unknown) = picks.iter().find(|p| !choices.contains(p)) {
                    return Err(ConfigError::Coercion {
                        section,
                        key,
                        raw: unknown.clone(),
                        expected: format!("one of {choices:?}"),
                    });
                }
                self.raw = Some(picks.join(delimiter));
                *v = Some(picks);
                Ok(())
            }
            _ => Err(self.kind_mismatch("a multi-selection value")),
        }
    }

    pub fn set_dir(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        match &mut self.value {
            EntryValue::Directory { value: v, .. } => {
                self.raw = Some(path.display().to_string());
                *v = Some(path);
                Ok(())
            }
            _ => Err(self.kind_mismatch("a directory value")),
        }
    }

    /// String rendering of the current typed value (or default).
    pub fn value_str(&self) -> String {
        match &self.value {
            EntryValue::Text { value, default } => {
                value.clone().unwrap_or_else(|| default.clone())
            }
            EntryValue::Confirm { value, default } => {
                bool_str(value.unwrap_or(*default)).to_string()
            }
            EntryValue::Select { value, default, .. } => {
                value.clone().unwrap_or_else(|| default.clone())
            }
            EntryValue::MultiSelect {
                value,
                default,
                delimiter,
                ..
            } => value.as_ref().unwrap_or(default).join(delimiter),
            EntryValue::Directory { value, default } => {
                value.as_ref().unwrap_or(default).display().to_string()
            }
        }
    }

    /// The uninterpolated text pushed into the document on write.
    pub(crate) fn raw_for_write(&self) -> String {
        self.raw.clone().unwrap_or_else(|| self.value_str())
    }

    /// Record the raw document text at load time without touching the
    /// typed cache.
    pub(crate) fn set_loaded_raw(&mut self, raw: String) {
        self.raw = Some(raw);
    }

    /// Coerce an interpolated string into the typed cache.
    pub(crate) fn assign_resolved(&mut self, resolved: &str) -> Result<()> {
        let (section, key) = (self.section.clone(), self.key.clone());
        match &mut self.value {
            EntryValue::Text { value, .. } => {
                *value = Some(resolved.to_string());
            }
            EntryValue::Confirm { value, .. } => match parse_bool(resolved) {
                Some(flag) => *value = Some(flag),
                None => {
                    return Err(ConfigError::Coercion {
                        section,
                        key,
                        raw: resolved.to_string(),
                        expected: "a boolean (true/yes/1 or false/no/0)".to_string(),
                    });
                }
            },
            EntryValue::Select {
                choices, value, ..
            } => {
                if !choices.iter().any(|c| c == resolved) {
                    return Err(ConfigError::Coercion {
                        section,
                        key,
                        raw: resolved.to_string(),
                        expected: format!("one of {choices:?}"),
                    });
                }
                *value = Some(resolved.to_string());
            }
            EntryValue::MultiSelect {
                choices,
                value,
                delimiter,
                ..
            } => {
                let picks = split_list(resolved, delimiter);
                if let Some(unknown) = picks.iter().find(|p| !choices.contains(p)) {
                    return Err(ConfigError::Coercion {
                        section,
                        key,
                        raw: unknown.clone(),
                        expected: format!("one of {choices:?}"),
                    });
                }
                *value = Some(picks);
            }
            EntryValue::Directory { value, .. } => {
                *value = Some(PathBuf::from(resolved));
            }
        }
        Ok(())
    }

    /// Build the question for this entry, seeded with its current state.
    ///
    /// Text and directory entries seed the raw (uninterpolated) form so
    /// the user edits what the file will contain.
    pub(crate) fn prompt_request(&self) -> PromptRequest {
        let kind = match &self.value {
            EntryValue::Text { .. } | EntryValue::Directory { .. } => PromptKind::Text {
                default: self.raw_for_write(),
            },
            EntryValue::Confirm { value, default } => PromptKind::Confirm {
                default: value.unwrap_or(*default),
            },
            EntryValue::Select {
                choices,
                value,
                default,
            } => PromptKind::Select {
                choices: choices.clone(),
                default: value.clone().unwrap_or_else(|| default.clone()),
            },
            EntryValue::MultiSelect {
                choices,
                value,
                default,
                ..
            } => PromptKind::MultiSelect {
                choices: choices.clone(),
                selected: value.clone().unwrap_or_else(|| default.clone()),
            },
        };
        PromptRequest {
            message: prompt_message(&self.message),
            long_instruction: self.long_instruction.clone(),
            kind,
        }
    }

    /// Store a prompt answer through the matching typed setter.
    pub(crate) fn apply_answer(&mut self, answer: PromptAnswer) -> Result<()> {
        match answer {
            PromptAnswer::Text(text) => {
                if matches!(self.value, EntryValue::Directory { .. }) {
                    self.set_dir(text)
                } else {
                    self.set_text(text)
                }
            }
            PromptAnswer::Confirm(flag) => self.set_bool(flag),
            PromptAnswer::Choice(choice) => self.set_choice(choice),
            PromptAnswer::Choices(picks) => self.set_choices(picks),
        }
    }

    /// Comment written above the entry's key: the message, plus the long
    /// instruction when declared.
    pub(crate) fn comment(&self) -> Comment {
        let mut comment = Comment::from(self.message.as_str());
        if let Some(instruction) = &self.long_instruction {
            comment.push_line(format!("Long Instruction: {instruction}"));
        }
        comment
    }

    fn kind_mismatch(&self, expected: &str) -> ConfigError {
        ConfigError::Coercion {
            section: self.section.clone(),
            key: self.key.clone(),
            raw: self.value_str(),
            expected: expected.to_string(),
        }
    }
}

impl fmt::Debug for ConfigEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigEntry")
            .field("section", &self.section)
            .field("key", &self.key)
            .field("value", &self.value)
            .field("raw", &self.raw)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ConfigEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} = {}", self.section, self.key, self.value_str())
    }
}

/// Prompt message normalization: trimmed, trailing `.`/`:` replaced with
/// a single `:`.
fn prompt_message(message: &str) -> String {
    let trimmed = message.trim().trim_end_matches([':', '.']);
    format!("{trimmed}:")
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn split_list(raw: &str, delimiter: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(delimiter)
        .map(|item| item.trim().to_string())
        .collect()
}
