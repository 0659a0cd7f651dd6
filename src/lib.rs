//! Read, edit, and write INI-style configuration files without destroying
//! the way their authors laid them out.
//!
//! Initext parses an INI document into a structured model, lets you get,
//! set, and delete sections and keys, and writes the result back with
//! comments, key ordering, and blank-line grouping intact. A schema layer
//! maps sections and keys onto the fields of your own types.
//!
//! ```
//! use initext::Ini;
//!
//! let text = "; tuning\n[server]\nhost = localhost\n";
//!
//! let mut ini = Ini::new();
//! ini.read_from(text.as_bytes())?;
//! assert_eq!(ini.get("server", "host"), Some("localhost"));
//! assert_eq!(ini.comments("server", ""), [" tuning"]);
//!
//! let mut out = Vec::new();
//! ini.write_to(&mut out)?;
//! assert_eq!(out, text.as_bytes());
//! # Ok::<(), initext::IniError>(())
//! ```
//!
//! # The format
//!
//! The grammar is line-oriented:
//!
//! - **Comment lines** start with a configurable prefix (default `;`) and
//!   attach to whatever follows them: a key, a section header, or the
//!   document itself.
//! - **Section headers** are `[name]`; anything after the `]` is ignored.
//!   Keys before the first header belong to the implicit *global section*.
//! - **Key/value lines** are `key = value`. Keys are trimmed on both
//!   sides; values are left-trimmed and may be quoted with `'` or `"`,
//!   with backslash escapes inside the quotes. Unquoted values run
//!   verbatim to end of line, so values may contain `=`, spaces, or `#`.
//! - **Blank lines** group keys into blocks. The grouping is part of the
//!   document model and survives a round trip.
//!
//! Line endings may be `\n` or `\r\n` on input; output always uses `\n`.
//!
//! # Layout preservation
//!
//! Most INI libraries flatten a file into a map and lose everything that
//! made it readable. Initext keeps a layered model instead: each section
//! holds an ordered sequence of entries and block separators, and every
//! entry and section carries its own comments. Writing normalizes only
//! presentation details (keys within a block are padded so the `=` signs
//! align, and blocks are separated by exactly one blank line), so a second
//! round trip reproduces the first byte for byte.
//!
//! # Duplicate keys and sections
//!
//! Within a section the last occurrence of a key wins. When a section
//! *name* reappears in the input, the configured [`MergePolicy`] decides:
//! [`Replace`](MergePolicy::Replace) (the default) keeps only the last
//! occurrence wholesale, while the merge variants fold the new keys into
//! the existing section and differ only in what they do with the
//! re-encountered header's comments.
//!
//! Name comparisons fold to lowercase unless the document is built with
//! [`case_sensitive()`](IniBuilder::case_sensitive).
//!
//! # Typed access
//!
//! The [`Schema`] type maps `(section, key)` pairs to the fields of a
//! record: register each field once with a pair of accessors, then
//! [`decode`](Ini::decode) fills your struct from a document and
//! [`encode`](Ini::encode) writes it back. Scalars go through
//! `FromStr`/`Display`; lists and maps use the document's configured
//! separators; anything else plugs in through
//! [`field_with`](Schema::field_with). There is no reflection and no
//! derive: the schema is plain data built by plain code.
//!
//! # Errors
//!
//! All fallible operations return [`IniError`]. Parse errors (missing
//! `]`, missing `=`, an unterminated quoted literal, an empty section
//! name) carry the 1-based line number and abort the read, leaving the
//! document with everything parsed up to that point. I/O errors carry the
//! byte count processed before the failure. Schema errors carry the
//! offending `section.key` path.

pub mod error;

mod ini;
mod options;
mod read;
mod schema;
mod section;
mod write;

pub use error::IniError;
pub use ini::Ini;
pub use options::{
    DEFAULT_COMMENT, DEFAULT_LIST_SEPARATOR, DEFAULT_MAP_KEY_SEPARATOR, IniBuilder, MergePolicy,
};
pub use schema::Schema;
