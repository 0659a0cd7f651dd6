//! Printer: serializes the document model back to text, aligning keys
//! within each block.

use std::io::{self, Write};

use crate::error::IniError;
use crate::ini::Ini;
use crate::section::{Item, Section};

impl Ini {
    /// Write the document to `writer`, returning the number of bytes
    /// written.
    ///
    /// The global section comes first, then named sections in document
    /// order, separated by single blank lines. Within a block, keys are
    /// padded to the block's longest key so the `=` signs align. The first
    /// write failure aborts; the error carries the bytes written so far.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<u64, IniError> {
        let mut out = CountingWriter {
            inner: writer,
            written: 0,
        };
        match self.print_document(&mut out) {
            Ok(()) => Ok(out.written),
            Err(source) => Err(IniError::Write {
                written: out.written,
                source,
            }),
        }
    }

    fn print_document<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.print_section(out, &self.global)?;

        let mut separated = !self.global.data.is_empty() || !self.global.comments.is_empty();
        for section in &self.sections {
            if separated {
                writeln!(out)?;
            }
            separated = true;
            self.print_section(out, section)?;
        }
        Ok(())
    }

    fn print_section<W: Write>(&self, out: &mut W, section: &Section) -> io::Result<()> {
        self.print_comments(out, &section.comments)?;

        if section.name.is_empty() {
            // A blank line keeps the global comments apart from the keys.
            if !section.comments.is_empty() && !section.data.is_empty() {
                writeln!(out)?;
            }
        } else {
            writeln!(out, "[{}]", section.name)?;
        }

        // The data never starts with a blank; a trailing blank just closes
        // the final block.
        let mut items = section.data.as_slice();
        while !items.is_empty() {
            let block = match items.iter().position(Item::is_blank) {
                Some(at) => {
                    let block = &items[..at];
                    items = &items[at + 1..];
                    block
                }
                None => {
                    let block = items;
                    items = &[];
                    block
                }
            };

            // Width in characters, to match what the padding counts.
            let width = block
                .iter()
                .filter_map(Item::as_pair)
                .map(|pair| pair.key.chars().count())
                .max()
                .unwrap_or(0);

            for pair in block.iter().filter_map(Item::as_pair) {
                self.print_comments(out, &pair.comments)?;
                writeln!(out, "{:<width$} = {}", pair.key, pair.value)?;
            }

            // One blank line between blocks, none after the last.
            if !items.is_empty() {
                writeln!(out)?;
            }
        }
        Ok(())
    }

    fn print_comments<W: Write>(&self, out: &mut W, comments: &[String]) -> io::Result<()> {
        for comment in comments {
            writeln!(out, "{}{comment}", self.comment)?;
        }
        Ok(())
    }
}

struct CountingWriter<W> {
    inner: W,
    written: u64,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::options::MergePolicy;

    fn parse(data: &str) -> Ini {
        let mut ini = Ini::new();
        ini.read_from(data.as_bytes()).unwrap();
        ini
    }

    fn render(ini: &Ini) -> String {
        let mut out = Vec::new();
        ini.write_to(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn formatting_normalizes_alignment_and_spacing() {
        let data = "
; Global section comment1
; Global section comment2

Gk1 = gv1

; sectionA comment1
; sectionA comment2
[sectionA]
; A.k1 comment
k1   = xyz



[sectionAA]
  myKey   =  myValue
myKeyBis   =  myValueBis


  mySecondKey   =  myValue
mySecondKeyBis   =  myValueBis


; sectionB comment1
; sectionB comment2
[sectionB]
; B.k1 comment
k1 = abc
";
        let want = "; Global section comment1
; Global section comment2

Gk1 = gv1

; sectionA comment1
; sectionA comment2
[sectionA]
; A.k1 comment
k1 = xyz

[sectionAA]
myKey    = myValue
myKeyBis = myValueBis

mySecondKey    = myValue
mySecondKeyBis = myValueBis

; sectionB comment1
; sectionB comment2
[sectionB]
; B.k1 comment
k1 = abc
";
        assert_eq!(render(&parse(data)), want);
    }

    #[test]
    fn alignment_counts_characters_not_bytes() {
        let data = "[s]\nnaïve = 1\nk = 2\n";
        let want = "[s]\nnaïve = 1\nk     = 2\n";
        assert_eq!(render(&parse(data)), want);
    }

    #[test]
    fn replace_policy_round_trip() {
        let data = "a=b

x=y

[sectionA]
key1 = abc
key2 = xyz

[sectionA]
key1 = v1.1
k2   = v1.2
";
        let want = "a = b

x = y

[sectionA]
key1 = v1.1
k2   = v1.2
";
        assert_eq!(render(&parse(data)), want);
    }

    #[test]
    fn merge_policy_round_trip() {
        let data = "
[sectionA]
key1 = abc
key2 = xyz

[sectionA]
key1 = v1.1
k2   = v1.2
";
        let want = "[sectionA]
key2 = xyz

key1 = v1.1
k2   = v1.2
";
        let mut ini = Ini::builder().merge_policy(MergePolicy::Merge).build();
        ini.read_from(data.as_bytes()).unwrap();
        assert_eq!(render(&ini), want);
    }

    #[test]
    fn merge_with_comments_accumulates() {
        let mut ini = Ini::builder()
            .comment_prefix("#")
            .merge_policy(MergePolicy::MergeWithComments)
            .build();
        ini.set_comments("", "", [" global comment"]);
        ini.set("", "key1", "value1");
        ini.set_comments("sectionA", "", [" section comment"]);
        ini.set("sectionA", "keyA", "valueA");

        let data = "# second global comment

key2 = value2

# second section comment
[sectionA]
keyA2 = 2
";
        ini.read_from(data.as_bytes()).unwrap();

        let want = "# global comment
# second global comment

key1 = value1
key2 = value2

# section comment
# second section comment
[sectionA]
keyA  = valueA
keyA2 = 2
";
        assert_eq!(render(&ini), want);
    }

    #[test]
    fn merge_with_last_comments_replaces() {
        let mut ini = Ini::builder()
            .comment_prefix("#")
            .merge_policy(MergePolicy::MergeWithLastComments)
            .build();
        ini.set_comments("", "", [" global comment"]);
        ini.set("", "key1", "value1");
        ini.set_comments("sectionA", "", [" section comment"]);
        ini.set("sectionA", "keyA", "valueA");

        let data = "# second global comment

key2 = value2

# second section comment
[sectionA]
keyA2 = 2
";
        ini.read_from(data.as_bytes()).unwrap();

        let want = "# second global comment

key1 = value1
key2 = value2

# second section comment
[sectionA]
keyA  = valueA
keyA2 = 2
";
        assert_eq!(render(&ini), want);
    }

    #[test]
    fn comments_set_after_parsing_are_emitted() {
        let data = "k0 = 123

[sectionA]
k1 = xyz
";
        let want = "#Global section comment

k0 = 123

#sectionA comment
[sectionA]
#A.k1 comment
k1 = xyz

#sectionB comment
[sectionB]
";
        let mut ini = Ini::builder().comment_prefix("#").build();
        ini.read_from(data.as_bytes()).unwrap();

        ini.set_comments("", "", ["Global section comment"]);
        ini.set_comments("sectionA", "", ["sectionA comment"]);
        ini.set_comments("sectionA", "k1", ["A.k1 comment"]);
        ini.set_comments("sectionA", "k", ["missing key comment"]);
        ini.set_comments("sectionB", "", ["sectionB comment"]);

        assert_eq!(render(&ini), want);
    }

    #[test]
    fn write_read_write_is_idempotent() {
        let data = "; top\n\ng = 1\n\n[a]\nlong_key = 1\nk = 2\n\n\n[b]\nx = y\n";
        let once = render(&parse(data));
        let twice = render(&parse(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn byte_count_matches_output_length() {
        let ini = parse("[s]\nkey = value\n");
        let mut out = Vec::new();
        let n = ini.write_to(&mut out).unwrap();
        assert_eq!(n, out.len() as u64);
    }

    #[test]
    fn failing_writer_reports_bytes_written() {
        struct Faulty {
            budget: usize,
        }
        impl Write for Faulty {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                if self.budget == 0 {
                    return Err(io::Error::other("full"));
                }
                let n = buf.len().min(self.budget);
                self.budget -= n;
                Ok(n)
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut ini = Ini::new();
        ini.set_comments("", "", [""]);
        ini.set("", "gk", "gv");
        ini.set("s", "k", "v");
        ini.set("s", "", "");
        ini.set_comments("s", "k", [""]);
        ini.set("s", "kk", "vv");

        // Output: ";\n\ngk = gv\n\n[s]\n;\nk = v\n\nkk = vv\n" (33 bytes).
        for budget in [1, 3, 4, 12, 13, 17, 19, 25] {
            let err = ini.write_to(Faulty { budget }).unwrap_err();
            match err {
                IniError::Write { written, .. } => assert_eq!(written, budget as u64),
                other => panic!("expected Write error, got {other:?}"),
            }
        }
    }

    #[test]
    fn round_trips_through_a_file_on_disk() {
        let data = "; saved\n\n[db]\nurl  = postgres://localhost\npool = 5\n";
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.ini");

        let ini = parse(data);
        let mut file = std::fs::File::create(&path).unwrap();
        ini.write_to(&mut file).unwrap();

        let mut reread = Ini::new();
        reread
            .read_from(std::fs::File::open(&path).unwrap())
            .unwrap();
        assert_eq!(reread.get("db", "url"), Some("postgres://localhost"));

        let mut text = String::new();
        std::fs::File::open(&path)
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(render(&reread), text);
    }
}
