//! # iniq
//!
//! Comment-preserving INI configuration with variable interpolation and
//! interactive setup.
//!
//! `iniq` reads, mutates, and writes section/key-value configuration text
//! without losing the comments people wrote into it, resolves `${...}`
//! references across keys, sections, and environment variables, and can
//! drive a terminal prompting flow to fill in missing values.
//!
//! ## Features
//!
//! - Comment-aware document model: every section and key keeps its comment block through parse, edit, and serialize
//! - Recursive interpolation: `${key}`, `${section:key}`, `$ENV_VAR`, with cycle detection
//! - Typed entry descriptors: text, confirmation, single/multi select, directory-producing
//! - Interactive population through a pluggable [`prompt::Prompter`] capability
//! - Round-trip guarantee: parsing the serialized form preserves order, values, and comments
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use iniq::{ConfigSection, Configuration};
//!
//! let dirs = ConfigSection::new("Dirs");
//! let entries = vec![
//!     dirs.text("data_root_dir", "${HOME}/data/", "Root directory for all data"),
//!     dirs.confirm("enable_cache", true, "Enable the on-disk cache?"),
//! ];
//!
//! let mut config = Configuration::new("app.cfg", entries);
//! config.load().unwrap();
//!
//! let root = config.entry("Dirs", "data_root_dir").unwrap();
//! println!("data root: {}", root.as_text().unwrap());
//! ```
//!
//! ## Modules
//!
//! - [`document`] - Comment-aware document model (parse, mutate, serialize)
//! - [`interpolate`] - Variable interpolation resolver
//! - [`config`] - Typed entries and the load/inquire/write workflow
//! - [`prompt`] - Prompting capability boundary
//! - [`error`] - Error types and result definitions

/// Typed configuration entries and the load/inquire/write workflow.
pub mod config;

/// Comment-aware document model (parse, mutate, serialize).
pub mod document;

/// Error types and result definitions.
pub mod error;

/// Variable interpolation resolver.
pub mod interpolate;

/// Prompting capability boundary.
pub mod prompt;

pub use config::{ConfigEntry, ConfigSection, Configuration, EntryCollection, EntryValue};
pub use document::{CasePolicy, Comment, Document};
pub use error::{ConfigError, Result};
pub use interpolate::{Interpolator, MissingEnvPolicy};
pub use prompt::{PromptAnswer, PromptKind, PromptRequest, Prompter};
