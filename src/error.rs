use thiserror::Error;

/// Errors produced while parsing, printing, or mapping an INI document.
///
/// Structural parse errors are fatal for the current read and carry the
/// 1-based line number they were detected on. The document keeps everything
/// that was successfully parsed before the failure point.
#[derive(Debug, Error)]
pub enum IniError {
    #[error("line {line}: missing ']' in section header")]
    MissingBracket { line: usize },

    #[error("line {line}: empty section name")]
    EmptySectionName { line: usize },

    #[error("line {line}: missing '=' in key/value line")]
    MissingEquals { line: usize },

    #[error("line {line}: string literal not terminated")]
    UnterminatedString { line: usize },

    /// A non-EOF read failure. `read` is the number of bytes consumed
    /// before the failure.
    #[error("read failed after {read} bytes: {source}")]
    Read { read: u64, source: std::io::Error },

    /// A write failure. `written` is the number of bytes the writer
    /// accepted before the failure.
    #[error("write failed after {written} bytes: {source}")]
    Write { written: u64, source: std::io::Error },

    #[error("decode {section}.{key}: {reason}")]
    Decode {
        section: String,
        key: String,
        reason: String,
    },

    #[error("encode {section}.{key}: {reason}")]
    Encode {
        section: String,
        key: String,
        reason: String,
    },
}
