//! Construction-time options: comment prefix, case sensitivity, section
//! merge policy, and the separators used by the schema layer.

use crate::ini::Ini;
use crate::section::Section;

/// Default comment prefix.
pub const DEFAULT_COMMENT: &str = ";";
/// Default separator for list values.
pub const DEFAULT_LIST_SEPARATOR: char = ',';
/// Default separator between a map key and its value.
pub const DEFAULT_MAP_KEY_SEPARATOR: char = ':';

/// What happens when a section name reappears while reading.
///
/// Only relevant during [`Ini::read_from`]; the accessor API always keeps
/// one section per name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// The new occurrence fully replaces the previous section, keys
    /// included. Last one wins.
    #[default]
    Replace,
    /// Keys merge into the existing section (incoming keys win); the
    /// re-encountered header's comments are discarded.
    Merge,
    /// Like [`Merge`](Self::Merge), but section comments accumulate.
    MergeWithComments,
    /// Like [`Merge`](Self::Merge), but section comments are replaced by
    /// the most recently parsed header's.
    MergeWithLastComments,
}

/// Builder for an [`Ini`] document's configuration.
///
/// All knobs are fixed at construction; [`Ini::reset`] clears content but
/// retains them.
///
/// ```
/// use initext::{Ini, MergePolicy};
///
/// let ini = Ini::builder()
///     .comment_prefix("#")
///     .case_sensitive()
///     .merge_policy(MergePolicy::Merge)
///     .build();
/// assert!(ini.sections().is_empty());
/// ```
pub struct IniBuilder {
    comment: String,
    case_sensitive: bool,
    merge_policy: MergePolicy,
    list_sep: char,
    map_key_sep: char,
}

impl Default for IniBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IniBuilder {
    pub fn new() -> Self {
        Self {
            comment: DEFAULT_COMMENT.to_string(),
            case_sensitive: false,
            merge_policy: MergePolicy::default(),
            list_sep: DEFAULT_LIST_SEPARATOR,
            map_key_sep: DEFAULT_MAP_KEY_SEPARATOR,
        }
    }

    /// Set the comment prefix (default `";"`). An empty prefix is ignored
    /// and the default kept.
    pub fn comment_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if !prefix.is_empty() {
            self.comment = prefix;
        }
        self
    }

    /// Make section and key lookups case sensitive. By default names are
    /// compared lowercased.
    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    /// Set the section merge policy (default: [`MergePolicy::Replace`]).
    pub fn merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    /// Set the separator used to split and join list values (default `,`).
    pub fn list_separator(mut self, sep: char) -> Self {
        self.list_sep = sep;
        self
    }

    /// Set the separator between a map key and its value (default `:`).
    pub fn map_key_separator(mut self, sep: char) -> Self {
        self.map_key_sep = sep;
        self
    }

    pub fn build(self) -> Ini {
        Ini {
            comment: self.comment,
            case_sensitive: self.case_sensitive,
            merge_policy: self.merge_policy,
            list_sep: self.list_sep,
            map_key_sep: self.map_key_sep,
            global: Section::global(),
            sections: Vec::new(),
        }
    }
}
