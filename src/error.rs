//! Error types and result definitions.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised by document, interpolation, and entry operations.
///
/// Interpolation errors are raised when a value is read, never while
/// parsing; parsing only reports structural problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A line could not be classified while parsing a document.
    #[error("parse error at line {line}: {reason}: `{content}`")]
    Parse {
        /// 1-based line number in the source text.
        line: usize,
        /// What the parser expected at this point.
        reason: String,
        /// The offending line.
        content: String,
    },

    /// A section name appeared twice.
    #[error("duplicate section `{name}`")]
    DuplicateSection { name: String },

    /// A key appeared twice within one section.
    #[error("duplicate key `{key}` in section `{section}`")]
    DuplicateKey { section: String, key: String },

    /// A referenced section does not exist.
    #[error("no section `{name}`")]
    MissingSection { name: String },

    /// A referenced key does not exist.
    #[error("no key `{key}` in section `{section}`")]
    MissingKey { section: String, key: String },

    /// An interpolation referenced an unset environment variable.
    #[error("environment variable `{name}` is not set")]
    MissingEnv { name: String },

    /// Interpolation entered a reference cycle.
    #[error("interpolation cycle: {chain}")]
    InterpolationCycle { chain: String },

    /// An interpolation token was malformed.
    #[error("bad interpolation reference in `{value}`: {reason}")]
    InterpolationSyntax { value: String, reason: String },

    /// A raw value could not be coerced into an entry's typed form.
    #[error("cannot read `{section}:{key}` value `{raw}` as {expected}")]
    Coercion {
        section: String,
        key: String,
        raw: String,
        expected: String,
    },

    /// Reading or writing a backing file or directory failed.
    #[error("cannot access {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
