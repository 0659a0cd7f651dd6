//! The root document type and its accessor/mutator API.

use crate::options::{IniBuilder, MergePolicy};
use crate::section::{Item, Pair, Section, eq_ident};

/// An INI document: the implicit global section plus named sections, in
/// order of appearance.
///
/// Configuration (comment prefix, case sensitivity, merge policy,
/// separators) is fixed at construction through [`Ini::builder`];
/// [`reset`](Ini::reset) clears content but keeps it.
///
/// ```
/// use initext::Ini;
///
/// let mut ini = Ini::new();
/// ini.set("server", "host", "localhost");
/// ini.set("server", "port", "8080");
/// assert_eq!(ini.get("server", "port"), Some("8080"));
///
/// let mut out = Vec::new();
/// ini.write_to(&mut out).unwrap();
/// assert_eq!(out, b"[server]\nhost = localhost\nport = 8080\n");
/// ```
pub struct Ini {
    pub(crate) comment: String,
    pub(crate) case_sensitive: bool,
    pub(crate) merge_policy: MergePolicy,
    pub(crate) list_sep: char,
    pub(crate) map_key_sep: char,

    /// The unnamed section holding keys that appear before any header.
    pub(crate) global: Section,
    pub(crate) sections: Vec<Section>,
}

impl Default for Ini {
    fn default() -> Self {
        Self::new()
    }
}

impl Ini {
    /// An empty document with default options.
    pub fn new() -> Self {
        IniBuilder::new().build()
    }

    pub fn builder() -> IniBuilder {
        IniBuilder::new()
    }

    /// Clear all sections, keys, and comments. Options are retained.
    pub fn reset(&mut self) {
        self.global = Section::global();
        self.sections.clear();
    }

    /// Fetch the value of `key` in `section` (empty name = global section).
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section_for(section)?
            .pair(key, self.case_sensitive)
            .map(|pair| pair.value.as_str())
    }

    /// Whether the section (if `key` is empty) or the key exists.
    pub fn has(&self, section: &str, key: &str) -> bool {
        match self.section_for(section) {
            None => false,
            Some(sec) => key.is_empty() || sec.pair(key, self.case_sensitive).is_some(),
        }
    }

    /// Add `key` with `value` to `section`, creating the section if needed.
    ///
    /// An existing key is overwritten in place, keeping its comments and
    /// position; the stored key and section spelling are updated to the
    /// caller's. An empty key appends a blank-line block separator instead,
    /// unless the section is empty or already ends with one.
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        let case_sensitive = self.case_sensitive;
        let sec = self.section_for_mut_or_insert(section);

        if key.is_empty() {
            if sec.data.last().is_some_and(|item| !item.is_blank()) {
                sec.data.push(Item::Blank);
            }
            return;
        }

        if let Some(pair) = sec.pair_mut(key, case_sensitive) {
            pair.key = key.to_string();
            pair.value = value.to_string();
            return;
        }
        sec.data.push(Item::Pair(Pair {
            comments: Vec::new(),
            key: key.to_string(),
            value: value.to_string(),
        }));
    }

    /// The comments attached to a section (empty `key`) or to a key.
    /// Missing sections or keys yield an empty slice.
    pub fn comments(&self, section: &str, key: &str) -> &[String] {
        let Some(sec) = self.section_for(section) else {
            return &[];
        };
        if key.is_empty() {
            return &sec.comments;
        }
        match sec.pair(key, self.case_sensitive) {
            Some(pair) => &pair.comments,
            None => &[],
        }
    }

    /// Replace the comments of a section (empty `key`, creating the section
    /// if needed) or of an existing key. Setting comments on a missing key
    /// is a no-op.
    pub fn set_comments<I, S>(&mut self, section: &str, key: &str, comments: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let comments: Vec<String> = comments.into_iter().map(Into::into).collect();
        let case_sensitive = self.case_sensitive;

        if key.is_empty() {
            self.section_for_mut_or_insert(section).comments = comments;
            return;
        }
        if let Some(pair) = self
            .section_for_mut(section)
            .and_then(|sec| sec.pair_mut(key, case_sensitive))
        {
            pair.comments = comments;
        }
    }

    /// Remove a key, or a whole section when `key` is empty (the global
    /// section is cleared rather than removed). Returns whether anything
    /// was deleted; the document is untouched otherwise.
    pub fn del(&mut self, section: &str, key: &str) -> bool {
        if key.is_empty() {
            if section.is_empty() {
                self.global = Section::global();
                return true;
            }
            let Some(idx) = self.section_index(section) else {
                return false;
            };
            self.sections.remove(idx);
            return true;
        }

        let case_sensitive = self.case_sensitive;
        match self.section_for_mut(section) {
            Some(sec) => sec.remove(key, case_sensitive),
            None => false,
        }
    }

    /// The named section names, in document order.
    pub fn sections(&self) -> Vec<&str> {
        self.sections.iter().map(|sec| sec.name.as_str()).collect()
    }

    /// The keys of a section, in order, with an empty string at each
    /// blank-line block separator so callers can reconstruct layout.
    pub fn keys(&self, section: &str) -> Vec<&str> {
        let Some(sec) = self.section_for(section) else {
            return Vec::new();
        };
        sec.data
            .iter()
            .map(|item| item.as_pair().map(|pair| pair.key.as_str()).unwrap_or(""))
            .collect()
    }

    pub(crate) fn section_index(&self, name: &str) -> Option<usize> {
        self.sections
            .iter()
            .position(|sec| eq_ident(self.case_sensitive, &sec.name, name))
    }

    pub(crate) fn section_for(&self, name: &str) -> Option<&Section> {
        if name.is_empty() {
            return Some(&self.global);
        }
        self.section_index(name).map(|idx| &self.sections[idx])
    }

    fn section_for_mut(&mut self, name: &str) -> Option<&mut Section> {
        if name.is_empty() {
            return Some(&mut self.global);
        }
        self.section_index(name)
            .map(|idx| &mut self.sections[idx])
    }

    /// Like [`section_for_mut`](Self::section_for_mut), but creates the
    /// section when missing and re-spells an existing name to the caller's
    /// casing.
    fn section_for_mut_or_insert(&mut self, name: &str) -> &mut Section {
        if name.is_empty() {
            return &mut self.global;
        }
        match self.section_index(name) {
            Some(idx) => {
                let sec = &mut self.sections[idx];
                sec.name = name.to_string();
                sec
            }
            None => {
                self.sections.push(Section::named(name, Vec::new()));
                self.sections.last_mut().unwrap()
            }
        }
    }
}
