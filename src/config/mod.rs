//! Typed configuration entries and the load/inquire/write workflow.
//!
//! A [`Configuration`] binds an explicit, ordered list of
//! [`ConfigEntry`] values to one backing file. `load` merges file
//! contents into the entries, `inquire` fills them interactively through
//! a [`Prompter`], and `write` serializes them back with their message
//! comments. The internal [`Document`] is the source of truth for
//! persisted raw values and comments; entries are typed views over it.

/// Entry descriptors and typed value kinds.
pub mod entry;

/// Entry grouping helpers (sections and collections).
pub mod section;

pub use entry::{ConfigEntry, EntryValue, InquireWhen};
pub use section::{ConfigSection, EntryCollection};

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;

use crate::{
    document::Document,
    error::ConfigError,
    interpolate::Interpolator,
    prompt::Prompter,
};

/// An ordered set of typed entries bound to one configuration file.
pub struct Configuration {
    path: PathBuf,
    doc: Document,
    entries: Vec<ConfigEntry>,
    interpolator: Interpolator,
}

impl Configuration {
    /// Bind `entries` (in declaration order) to the file at `path`.
    ///
    /// Nothing is read yet; entries answer with their defaults until
    /// [`Configuration::load`] runs.
    pub fn new(path: impl Into<PathBuf>, entries: Vec<ConfigEntry>) -> Self {
        Self {
            path: path.into(),
            doc: Document::new(),
            entries,
            interpolator: Interpolator::new(),
        }
    }

    /// Replace the interpolator (environment snapshot and policy).
    pub fn with_interpolator(mut self, interpolator: Interpolator) -> Self {
        self.interpolator = interpolator;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The backing document in its current state.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Declared entries in declaration order.
    pub fn entries(&self) -> &[ConfigEntry] {
        &self.entries
    }

    /// The declared entry at `(section, key)`, if any.
    pub fn entry(&self, section: &str, key: &str) -> Option<&ConfigEntry> {
        self.entries
            .iter()
            .find(|e| e.section() == section && e.key() == key)
    }

    pub fn entry_mut(&mut self, section: &str, key: &str) -> Option<&mut ConfigEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.section() == section && e.key() == key)
    }

    /// Resolved value of `section:key` from the backing document.
    pub fn get(&self, section: &str, key: &str) -> crate::Result<String> {
        self.doc.interpolated_with(&self.interpolator, section, key)
    }

    /// Raw, uninterpolated value of `section:key` from the backing
    /// document.
    pub fn get_raw(&self, section: &str, key: &str) -> Option<&str> {
        self.doc.get(section, key)
    }

    /// A confirmation entry's current value, for use in `ask_if`
    /// predicates.
    pub fn flag(&self, section: &str, key: &str) -> Option<bool> {
        self.entry(section, key)?.as_bool()
    }

    /// Merge the backing file into the declared entries.
    ///
    /// A missing file is not an error: every entry keeps its default. A
    /// present file is parsed into the internal document, and every
    /// declared entry found there records its raw value and caches the
    /// interpolated, coerced form.
    ///
    /// # Errors
    ///
    /// Propagates parse, interpolation, and coercion errors.
    pub fn load(&mut self) -> anyhow::Result<()> {
        if self.path.exists() {
            self.doc = Document::from_path(&self.path)?;
        } else {
            debug!(
                "configuration file {} not found, using defaults",
                self.path.display()
            );
        }
        for entry in &mut self.entries {
            let Some(raw) = self
                .doc
                .get(entry.section(), entry.key())
                .map(str::to_string)
            else {
                continue;
            };
            let resolved = self.interpolator.resolve(&self.doc, entry.section(), &raw)?;
            entry.set_loaded_raw(raw);
            entry.assign_resolved(&resolved)?;
        }
        Ok(())
    }

    /// Ask the user for every eligible entry, in declaration order.
    ///
    /// Entries whose `ask_if` predicate returns false are skipped and
    /// keep their current value. Predicates run right before each
    /// question, so answers given earlier in the same run are visible.
    /// Performs no file I/O; blocks on the prompter.
    ///
    /// # Errors
    ///
    /// Propagates prompter failures and answers of a mismatched kind.
    pub fn inquire(&mut self, prompter: &mut dyn Prompter) -> anyhow::Result<()> {
        debug!("inquire configuration @ {}", self.path.display());
        for idx in 0..self.entries.len() {
            if !self.entries[idx].should_prompt(self) {
                debug!("skipping {}", self.entries[idx]);
                continue;
            }
            let request = self.entries[idx].prompt_request();
            let answer = prompter.ask(request)?;
            self.entries[idx].apply_answer(answer)?;
        }
        debug!("configuration of {} completed", self.path.display());
        Ok(())
    }

    /// Push every entry into the document and persist the full text.
    ///
    /// Each entry contributes its raw (uninterpolated) value and its
    /// message as the key's comment, creating sections and keys as
    /// needed. Directory-producing entries get their resolved targets
    /// created. The file content is built completely before a single
    /// write; on error the destination is left untouched.
    pub fn write(&mut self) -> anyhow::Result<()> {
        for entry in &self.entries {
            self.doc.set(
                entry.section(),
                entry.key(),
                entry.raw_for_write(),
                Some(entry.comment()),
            );
        }
        for entry in &self.entries {
            if matches!(entry.value(), EntryValue::Directory { .. }) {
                let raw = entry.raw_for_write();
                let resolved = self.interpolator.resolve(&self.doc, entry.section(), &raw)?;
                fs::create_dir_all(&resolved).map_err(|source| ConfigError::FileAccess {
                    path: PathBuf::from(&resolved),
                    source,
                })?;
            }
        }
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|source| ConfigError::FileAccess {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        self.doc.save(&self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use crate::prompt::{PromptAnswer, ScriptedPrompter};

    use super::*;

    fn test_interpolator(vars: &[(&str, &str)]) -> Interpolator {
        Interpolator::with_env(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        )
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let dirs = ConfigSection::new("Dirs");
        let entries = vec![
            dirs.text("root", "/default/root", "Root directory"),
            dirs.confirm("enabled", true, "Enabled"),
        ];

        let mut config = Configuration::new(dir.path().join("missing.cfg"), entries);
        config.load().unwrap();

        assert_eq!(config.entry("Dirs", "root").unwrap().as_text(), Some("/default/root"));
        assert_eq!(config.entry("Dirs", "enabled").unwrap().as_bool(), Some(true));
    }

    #[test]
    fn load_interpolates_but_write_keeps_raw() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.cfg");
        std::fs::write(&path, "[Dirs]\nroot = ${ROOT}/data\n").unwrap();

        let dirs = ConfigSection::new("Dirs");
        let entries = vec![dirs.text("root", "/fallback", "Root directory")];
        let mut config = Configuration::new(&path, entries)
            .with_interpolator(test_interpolator(&[("ROOT", "/srv")]));

        config.load().unwrap();
        assert_eq!(config.entry("Dirs", "root").unwrap().as_text(), Some("/srv/data"));
        assert_eq!(config.get("Dirs", "root").unwrap(), "/srv/data");
        assert_eq!(config.get_raw("Dirs", "root"), Some("${ROOT}/data"));

        config.write().unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("root = ${ROOT}/data"), "written:\n{written}");
        assert!(!written.contains("/srv/data"));
    }

    #[test]
    fn malformed_file_propagates_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.cfg");
        std::fs::write(&path, "[S]\nwhat is this\n").unwrap();

        let entries = vec![ConfigEntry::text("S", "x", "d", "X")];
        let mut config = Configuration::new(&path, entries);
        let err = config.load().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn interpolation_errors_surface_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.cfg");
        std::fs::write(&path, "[S]\nx = ${MISSING_ONE}\n").unwrap();

        let entries = vec![ConfigEntry::text("S", "x", "d", "X")];
        let mut config =
            Configuration::new(&path, entries).with_interpolator(test_interpolator(&[]));
        let err = config.load().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingEnv { name }) if name == "MISSING_ONE"
        ));
    }

    #[test]
    fn inquire_walks_entries_in_declaration_order() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile::tempdir().unwrap();
        let features = ConfigSection::new("Features");
        let entries = vec![
            features.text("name", "engine", "Feature name"),
            features.confirm("enabled", false, "Enable the feature"),
            features.multi_select(
                "parts",
                vec!["a".to_string(), "b".to_string(), "c".to_string()],
                vec!["a".to_string()],
                "Parts to build",
            ),
        ];

        let mut config = Configuration::new(dir.path().join("app.cfg"), entries);
        let mut prompter = ScriptedPrompter::new([
            PromptAnswer::Text("turbine".to_string()),
            PromptAnswer::Confirm(true),
            PromptAnswer::Choices(vec!["a".to_string(), "c".to_string()]),
        ]);
        config.inquire(&mut prompter).unwrap();

        assert_eq!(
            prompter.asked,
            ["Feature name:", "Enable the feature:", "Parts to build:"]
        );
        assert_eq!(config.entry("Features", "name").unwrap().as_text(), Some("turbine"));
        assert_eq!(config.entry("Features", "enabled").unwrap().as_bool(), Some(true));
        assert_eq!(
            config.entry("Features", "parts").unwrap().as_choices(),
            Some(["a".to_string(), "c".to_string()].as_slice())
        );
    }

    #[test]
    fn conditional_entries_are_skipped_when_their_gate_is_off() {
        let dir = tempfile::tempdir().unwrap();
        let features = ConfigSection::new("Features");
        let entries = vec![
            features.confirm("enabled", true, "Enable extra features"),
            features
                .text("name", "default", "Feature name")
                .ask_if(|cfg| cfg.flag("Features", "enabled").unwrap_or(false)),
        ];

        let mut config = Configuration::new(dir.path().join("app.cfg"), entries);
        let mut prompter = ScriptedPrompter::new([PromptAnswer::Confirm(false)]);
        config.inquire(&mut prompter).unwrap();

        // The gate was answered off, so the dependent entry was never asked.
        assert_eq!(prompter.asked, ["Enable extra features:"]);
        assert_eq!(config.entry("Features", "name").unwrap().as_text(), Some("default"));
    }

    #[test]
    fn no_prompt_entries_are_never_asked() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![
            ConfigEntry::text("S", "internal", "v1", "Internal value").no_prompt(),
            ConfigEntry::text("S", "visible", "v2", "Visible value"),
        ];

        let mut config = Configuration::new(dir.path().join("app.cfg"), entries);
        let mut prompter = ScriptedPrompter::new([PromptAnswer::Text("answered".to_string())]);
        config.inquire(&mut prompter).unwrap();

        assert_eq!(prompter.asked, ["Visible value:"]);
        assert_eq!(config.entry("S", "internal").unwrap().as_text(), Some("v1"));
        assert_eq!(config.entry("S", "visible").unwrap().as_text(), Some("answered"));
    }

    #[test]
    fn conditional_entries_see_answers_from_the_same_run() {
        let dir = tempfile::tempdir().unwrap();
        let features = ConfigSection::new("Features");
        let entries = vec![
            features.confirm("enabled", false, "Enable extra features"),
            features
                .text("name", "default", "Feature name")
                .ask_if(|cfg| cfg.flag("Features", "enabled").unwrap_or(false)),
        ];

        let mut config = Configuration::new(dir.path().join("app.cfg"), entries);
        let mut prompter = ScriptedPrompter::new([
            PromptAnswer::Confirm(true),
            PromptAnswer::Text("turbine".to_string()),
        ]);
        config.inquire(&mut prompter).unwrap();

        assert_eq!(prompter.asked.len(), 2);
        assert_eq!(config.entry("Features", "name").unwrap().as_text(), Some("turbine"));
    }

    #[test]
    fn write_lays_out_messages_as_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_config.cfg");

        let dirs = ConfigSection::new("Dirs");
        let subdirs = ConfigSection::new("Subdirs");
        let entries = vec![
            dirs.text("data_root_dir", "${HOME}/test/", "Root directory for all data")
                .with_long_instruction("This is a longer description of what you have to do."),
            subdirs.text("sub_dir", "${Dirs:data_root_dir}/subdir/", "Main subdirectory."),
            ConfigEntry::text("Test", "foo", "Bla", "Test entry"),
        ];

        let mut config = Configuration::new(&path, entries);
        config.load().unwrap();
        config.write().unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let expected = "\
[Dirs]
# Root directory for all data
# Long Instruction: This is a longer description of what you have to do.
data_root_dir = ${HOME}/test/

[Subdirs]
# Main subdirectory.
sub_dir = ${Dirs:data_root_dir}/subdir/

[Test]
# Test entry
foo = Bla

";
        assert_eq!(written, expected);
    }

    #[test]
    fn write_keeps_undeclared_keys_and_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.cfg");
        std::fs::write(
            &path,
            "[Other]\n# hand-written note\nkept = yes\n\n[Dirs]\nroot = /old\n",
        )
        .unwrap();

        let dirs = ConfigSection::new("Dirs");
        let entries = vec![dirs.text("root", "/default", "Root directory")];
        let mut config = Configuration::new(&path, entries);
        config.load().unwrap();
        config.entry_mut("Dirs", "root").unwrap().set_text("/new").unwrap();
        config.write().unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("# hand-written note\nkept = yes"), "written:\n{written}");
        assert!(written.contains("# Root directory\nroot = /new"), "written:\n{written}");
    }

    #[test]
    fn write_creates_directory_entry_targets() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("data").join("cache");
        let entries = vec![ConfigEntry::directory(
            "Dirs",
            "cache_dir",
            &target,
            "Cache directory",
        )];

        let mut config = Configuration::new(dir.path().join("app.cfg"), entries);
        config.load().unwrap();
        assert!(!target.exists());
        config.write().unwrap();
        assert!(target.is_dir());
    }

    #[test]
    fn write_creates_the_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("app.cfg");

        let entries = vec![ConfigEntry::text("S", "k", "v", "K")];
        let mut config = Configuration::new(&path, entries);
        config.write().unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn load_then_write_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.cfg");

        let entries = || vec![ConfigEntry::text("S", "k", "${HOME_LIKE}/x", "The key")];
        let interp = || test_interpolator(&[("HOME_LIKE", "/home/me")]);

        let mut config = Configuration::new(&path, entries()).with_interpolator(interp());
        config.load().unwrap();
        config.write().unwrap();
        let first = std::fs::read_to_string(&path).unwrap();

        let mut config = Configuration::new(&path, entries()).with_interpolator(interp());
        config.load().unwrap();
        assert_eq!(config.entry("S", "k").unwrap().as_text(), Some("/home/me/x"));
        config.write().unwrap();
        let second = std::fs::read_to_string(&path).unwrap();
        assert_eq!(first, second);
    }
}
