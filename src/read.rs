//! Streaming line parser: consumes raw bytes and incrementally populates
//! the document model.

use std::io::{BufRead, BufReader, Read};
use std::mem;

use memchr::{memchr, memchr_iter};

use crate::error::IniError;
use crate::ini::Ini;
use crate::options::MergePolicy;
use crate::section::{Pair, Section};

/// Where the pending batch of pairs will be flushed. `None` targets the
/// global section.
type Cursor = Option<usize>;

impl Ini {
    /// Populate the document from `reader`, returning the number of bytes
    /// consumed.
    ///
    /// Lines end with `\n` or `\r\n`. Leading whitespace is ignored, key
    /// names are trimmed on both sides, values are left-trimmed and may be
    /// quoted with `'` or `"` (backslash escapes). Blank lines group keys
    /// into blocks that the printer keeps apart. What happens when a
    /// section name reappears is governed by the configured
    /// [`MergePolicy`]; within one section the last occurrence of a key
    /// wins.
    ///
    /// On error the document retains everything parsed before the failure.
    pub fn read_from<R: Read>(&mut self, reader: R) -> Result<u64, IniError> {
        let mut input = BufReader::new(reader);
        let mut read: u64 = 0;
        let mut line_num = 0usize;
        let mut raw = Vec::new();

        // Comments parsed but not yet attached; they belong to the next
        // pair, section header, or to the global section.
        let mut comments: Vec<String> = Vec::new();
        // The current uncommitted block of pairs.
        let mut items: Vec<Pair> = Vec::new();
        let mut cursor: Cursor = None;

        loop {
            line_num += 1;
            raw.clear();
            let n = input
                .read_until(b'\n', &mut raw)
                .map_err(|source| IniError::Read { read, source })?;
            read += n as u64;
            if n == 0 {
                self.flush_items(&mut items, cursor);
                return Ok(read);
            }

            let line = String::from_utf8_lossy(strip_eol(&raw));
            let line = line.trim_start();

            if line.is_empty() {
                match cursor {
                    Some(_) => {
                        // Keep pending comments: they may belong to the
                        // next section header.
                        self.flush_items(&mut items, cursor);
                    }
                    None => {
                        if items.is_empty() && comments.is_empty() {
                            continue;
                        }
                        if !comments.is_empty() {
                            self.promote_global_comments(mem::take(&mut comments));
                        }
                        self.flush_items(&mut items, None);
                    }
                }
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                cursor = self.enter_section(rest, line_num, &mut comments, &mut items, cursor)?;
                continue;
            }

            if let Some(text) = line.strip_prefix(self.comment.as_str()) {
                comments.push(text.to_string());
                continue;
            }

            // Key/value line.
            let eq = first_unescaped_eq(line).ok_or(IniError::MissingEquals { line: line_num })?;
            let key = line[..eq].trim_end();
            let value = unquote(line[eq + 1..].trim_start())
                .ok_or(IniError::UnterminatedString { line: line_num })?;

            // Last occurrence within the uncommitted block wins.
            let case_sensitive = self.case_sensitive;
            items.retain(|pair| !crate::section::eq_ident(case_sensitive, &pair.key, key));
            items.push(Pair {
                comments: mem::take(&mut comments),
                key: key.to_string(),
                value,
            });
        }
    }

    /// Handle a `[name]` header: resolve it against the merge policy and
    /// return the new cursor.
    fn enter_section(
        &mut self,
        after_bracket: &str,
        line_num: usize,
        comments: &mut Vec<String>,
        items: &mut Vec<Pair>,
        cursor: Cursor,
    ) -> Result<Cursor, IniError> {
        let close = memchr(b']', after_bracket.as_bytes())
            .ok_or(IniError::MissingBracket { line: line_num })?;
        let name = &after_bracket[..close];
        if name.is_empty() {
            return Err(IniError::EmptySectionName { line: line_num });
        }

        if self.merge_policy == MergePolicy::Replace {
            let mut cursor = cursor;
            if let Some(removed) = self.section_index(name) {
                self.sections.remove(removed);
                match cursor {
                    // The evicted section owned the pending batch; it goes
                    // down with it.
                    Some(at) if at == removed => {
                        items.clear();
                        cursor = None;
                    }
                    Some(at) if at > removed => cursor = Some(at - 1),
                    _ => {}
                }
            }
            self.flush_items(items, cursor);
            self.sections
                .push(Section::named(name, mem::take(comments)));
            return Ok(Some(self.sections.len() - 1));
        }

        match self.section_index(name) {
            Some(existing) => {
                let pending = mem::take(comments);
                match self.merge_policy {
                    MergePolicy::MergeWithComments => {
                        self.sections[existing].comments.extend(pending);
                    }
                    MergePolicy::MergeWithLastComments => {
                        self.sections[existing].comments = pending;
                    }
                    // Plain merge keeps the original comments.
                    _ => {}
                }
                self.flush_items(items, cursor);
                Ok(Some(existing))
            }
            None => {
                self.flush_items(items, cursor);
                self.sections
                    .push(Section::named(name, mem::take(comments)));
                Ok(Some(self.sections.len() - 1))
            }
        }
    }

    /// Merge the pending batch into the cursor's section (global when
    /// `None`) and clear it. Empty batches are a no-op.
    fn flush_items(&mut self, items: &mut Vec<Pair>, cursor: Cursor) {
        if items.is_empty() {
            return;
        }
        let batch = mem::take(items);
        let case_sensitive = self.case_sensitive;
        let section = match cursor {
            Some(idx) => &mut self.sections[idx],
            None => &mut self.global,
        };
        section.merge_items(batch, case_sensitive);
    }

    /// Attach comments parsed before any section header to the global
    /// section, honoring the merge policy.
    fn promote_global_comments(&mut self, pending: Vec<String>) {
        match self.merge_policy {
            MergePolicy::MergeWithComments => self.global.comments.extend(pending),
            MergePolicy::Merge => {
                if self.global.comments.is_empty() {
                    self.global.comments = pending;
                }
            }
            MergePolicy::Replace | MergePolicy::MergeWithLastComments => {
                self.global.comments = pending;
            }
        }
    }
}

/// Strip a trailing `\n` or `\r\n`.
fn strip_eol(buf: &[u8]) -> &[u8] {
    match buf {
        [head @ .., b'\r', b'\n'] => head,
        [head @ .., b'\n'] => head,
        _ => buf,
    }
}

/// Position of the first `=` not preceded by a backslash.
fn first_unescaped_eq(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    memchr_iter(b'=', bytes).find(|&idx| idx == 0 || bytes[idx - 1] != b'\\')
}

/// Resolve string-literal quoting on a raw value.
///
/// Values not starting with `'` or `"` (including empty and one-character
/// values) pass through verbatim. Quoted values run to the matching
/// unescaped quote; a backslash escapes the following character (the
/// backslash is removed, the character kept); anything after the closing
/// quote is discarded. Returns `None` when the closing quote is missing.
fn unquote(raw: &str) -> Option<String> {
    if raw.len() < 2 {
        return Some(raw.to_string());
    }
    let quote = raw.as_bytes()[0];
    if quote != b'"' && quote != b'\'' {
        return Some(raw.to_string());
    }
    let quote = quote as char;

    let mut value = String::with_capacity(raw.len());
    let mut chars = raw[1..].chars();
    loop {
        match chars.next() {
            None => return None,
            Some(c) if c == quote => return Some(value),
            Some('\\') => match chars.next() {
                None => return None,
                Some(escaped) => value.push(escaped),
            },
            Some(c) => value.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(data: &str) -> Ini {
        let mut ini = Ini::new();
        ini.read_from(data.as_bytes()).unwrap();
        ini
    }

    #[test]
    fn unquote_passes_plain_values_through() {
        assert_eq!(unquote("").unwrap(), "");
        assert_eq!(unquote("'").unwrap(), "'");
        assert_eq!(unquote("abc").unwrap(), "abc");
        assert_eq!(unquote("a 'quoted' tail").unwrap(), "a 'quoted' tail");
    }

    #[test]
    fn unquote_resolves_quotes_and_escapes() {
        assert_eq!(unquote("\"abc\"").unwrap(), "abc");
        assert_eq!(unquote("'abc'").unwrap(), "abc");
        assert_eq!(unquote("\"\"").unwrap(), "");
        assert_eq!(unquote("\"a\\\"b\\\"c\"").unwrap(), "a\"b\"c");
        assert_eq!(unquote("'a\\\\b'").unwrap(), "a\\b");
        // Bytes after the closing quote are discarded.
        assert_eq!(unquote("'abc' trailing").unwrap(), "abc");
    }

    #[test]
    fn unquote_rejects_unterminated_literals() {
        assert_eq!(unquote("'xyz"), None);
        assert_eq!(unquote("\"xyz\\\""), None);
        assert_eq!(unquote("\"abc\\"), None);
    }

    #[test]
    fn structural_errors_abort_the_read() {
        for data in ["[sectionA", "[]", "key", "key='xyz"] {
            let mut ini = Ini::new();
            assert!(
                ini.read_from(data.as_bytes()).is_err(),
                "expected error for {data:?}"
            );
        }
    }

    #[test]
    fn structural_errors_name_the_line() {
        let mut ini = Ini::new();
        let err = ini.read_from("a=1\nb=2\n[bad\n".as_bytes()).unwrap_err();
        assert!(matches!(err, IniError::MissingBracket { line: 3 }));

        let mut ini = Ini::new();
        let err = ini.read_from("a=1\nkey\n".as_bytes()).unwrap_err();
        assert!(matches!(err, IniError::MissingEquals { line: 2 }));

        let mut ini = Ini::new();
        let err = ini.read_from("[s]\nkey='v\n".as_bytes()).unwrap_err();
        assert!(matches!(err, IniError::UnterminatedString { line: 2 }));

        let mut ini = Ini::new();
        let err = ini.read_from("[]\n".as_bytes()).unwrap_err();
        assert!(matches!(err, IniError::EmptySectionName { line: 1 }));
    }

    #[test]
    fn a_failed_read_keeps_everything_before_the_failure() {
        let mut ini = Ini::new();
        assert!(ini.read_from("[s]\nk=v\n\n[broken\n".as_bytes()).is_err());
        assert_eq!(ini.get("s", "k"), Some("v"));
    }

    #[test]
    fn byte_count_covers_the_whole_input() {
        let data = "a=1\r\n[s]\nk = v";
        let mut ini = Ini::new();
        assert_eq!(ini.read_from(data.as_bytes()).unwrap(), data.len() as u64);
    }

    #[test]
    fn crlf_and_lf_parse_identically() {
        let data = "g=1\n\n[s]\n; note\nk = v\n";
        let lf = parse(data);
        let crlf = parse(&data.replace('\n', "\r\n"));

        assert_eq!(lf.get("", "g"), crlf.get("", "g"));
        assert_eq!(lf.get("s", "k"), crlf.get("s", "k"));
        assert_eq!(lf.comments("s", "k"), crlf.comments("s", "k"));
    }

    #[test]
    fn whitespace_around_keys_and_values_is_trimmed() {
        let ini = parse("[s]\n  spaced key   =   padded value\n");
        assert_eq!(ini.get("s", "spaced key"), Some("padded value"));
    }

    #[test]
    fn value_is_everything_after_the_first_equals() {
        let ini = parse("k = a=b=c\n");
        assert_eq!(ini.get("", "k"), Some("a=b=c"));
    }

    #[test]
    fn escaped_equals_is_not_a_delimiter() {
        let ini = parse("a\\=b = v\n");
        assert_eq!(ini.get("", "a\\=b"), Some("v"));
    }

    #[test]
    fn text_after_the_closing_bracket_is_ignored() {
        let ini = parse("[s] trailing junk\nk=v\n");
        assert_eq!(ini.sections(), ["s"]);
        assert_eq!(ini.get("s", "k"), Some("v"));
    }

    #[test]
    fn comments_attach_to_the_following_entity() {
        let ini = parse(
            "; global one\n; global two\n\ng = 1\n\n; about s\n[s]\n; about k\nk = v\n",
        );
        assert_eq!(ini.comments("", ""), [" global one", " global two"]);
        assert_eq!(ini.comments("s", ""), [" about s"]);
        assert_eq!(ini.comments("s", "k"), [" about k"]);
    }

    #[test]
    fn comments_survive_blank_lines_inside_a_section() {
        let ini = parse("[a]\nk = v\n; about b\n\n[b]\nx = 1\n");
        assert_eq!(ini.comments("b", ""), [" about b"]);
    }

    #[test]
    fn custom_comment_prefix_is_matched_in_full() {
        let mut ini = Ini::builder().comment_prefix("//").build();
        ini.read_from("// note\nk = v\n".as_bytes()).unwrap();
        assert_eq!(ini.comments("", "k"), [" note"]);
    }

    #[test]
    fn last_key_occurrence_wins_within_a_block() {
        let ini = parse("[s]\nk1 = old\nk2 = kept\nK1 = new\n");
        assert_eq!(ini.get("s", "k1"), Some("new"));
        assert_eq!(ini.keys("s"), ["k2", "K1", ""]);
    }

    #[test]
    fn replace_policy_keeps_only_the_last_section() {
        let ini = parse("[sectionA]\nkey1 = abc\nkey2 = xyz\n\n[sectionA]\nkey1 = v1.1\n");
        assert_eq!(ini.sections(), ["sectionA"]);
        assert_eq!(ini.get("sectionA", "key1"), Some("v1.1"));
        assert_eq!(ini.get("sectionA", "key2"), None);
    }

    #[test]
    fn merge_policy_merges_sections_with_last_key_winning() {
        let mut ini = Ini::builder().merge_policy(MergePolicy::Merge).build();
        ini.read_from(
            "[sectionA]\nkey1 = abc\nkey2 = xyz\n\n[sectionA]\nkey1 = v1.1\n".as_bytes(),
        )
        .unwrap();

        assert_eq!(ini.sections(), ["sectionA"]);
        assert_eq!(ini.get("sectionA", "key2"), Some("xyz"));
        assert_eq!(ini.get("sectionA", "key1"), Some("v1.1"));
        assert_eq!(ini.keys("sectionA"), ["key2", "", "key1", ""]);
    }

    #[test]
    fn faulty_reader_reports_bytes_consumed() {
        struct Faulty {
            fed: bool,
        }
        impl Read for Faulty {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if self.fed {
                    return Err(std::io::Error::other("timeout"));
                }
                self.fed = true;
                let data = b"a=1\n";
                buf[..data.len()].copy_from_slice(data);
                Ok(data.len())
            }
        }

        let mut ini = Ini::new();
        let err = ini.read_from(Faulty { fed: false }).unwrap_err();
        match err {
            IniError::Read { read, .. } => assert_eq!(read, 4),
            other => panic!("expected Read error, got {other:?}"),
        }
    }
}
