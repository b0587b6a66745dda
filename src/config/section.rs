//! Entry grouping helpers (sections and collections).

use std::path::PathBuf;

use super::entry::ConfigEntry;

/// Factory for entries that share one section name.
///
/// ```rust
/// use iniq::ConfigSection;
///
/// let dirs = ConfigSection::new("Dirs");
/// let root = dirs.text("data_root_dir", "${HOME}/data/", "Root directory for all data");
/// assert_eq!(root.section(), "Dirs");
/// ```
#[derive(Debug, Clone)]
pub struct ConfigSection {
    name: String,
}

impl ConfigSection {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-text entry in this section.
    pub fn text(
        &self,
        key: impl Into<String>,
        default: impl Into<String>,
        message: impl Into<String>,
    ) -> ConfigEntry {
        ConfigEntry::text(self.name.as_str(), key, default, message)
    }

    /// Yes/no entry in this section.
    pub fn confirm(
        &self,
        key: impl Into<String>,
        default: bool,
        message: impl Into<String>,
    ) -> ConfigEntry {
        ConfigEntry::confirm(self.name.as_str(), key, default, message)
    }

    /// Single-choice entry in this section.
    pub fn select(
        &self,
        key: impl Into<String>,
        choices: Vec<String>,
        default: impl Into<String>,
        message: impl Into<String>,
    ) -> ConfigEntry {
        ConfigEntry::select(self.name.as_str(), key, choices, default, message)
    }

    /// Multi-choice entry in this section.
    pub fn multi_select(
        &self,
        key: impl Into<String>,
        choices: Vec<String>,
        default: Vec<String>,
        message: impl Into<String>,
    ) -> ConfigEntry {
        ConfigEntry::multi_select(self.name.as_str(), key, choices, default, message)
    }

    /// Directory-producing entry in this section.
    pub fn directory(
        &self,
        key: impl Into<String>,
        default: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> ConfigEntry {
        ConfigEntry::directory(self.name.as_str(), key, default, message)
    }
}

/// Named, ordered grouping of entries.
///
/// Collections are purely organizational: they let a set of related
/// entries be built once and reused across configurations. Nested
/// collections flatten in declaration order.
pub struct EntryCollection {
    name: String,
    entries: Vec<ConfigEntry>,
}

impl EntryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append one entry, keeping declaration order.
    pub fn push(&mut self, entry: ConfigEntry) -> &mut Self {
        self.entries.push(entry);
        self
    }

    /// Append all entries of another collection, flattening it.
    pub fn extend_with(&mut self, collection: EntryCollection) -> &mut Self {
        self.entries.extend(collection.entries);
        self
    }

    /// Builder-style [`EntryCollection::push`].
    pub fn with(mut self, entry: ConfigEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ConfigEntry] {
        &self.entries
    }

    /// Consume the collection into its flat, ordered entry list.
    pub fn into_entries(self) -> Vec<ConfigEntry> {
        self.entries
    }
}
