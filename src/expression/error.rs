use std::fmt;

/// A script that the tokenizer or parser could not match against the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Byte offset into the script where matching stopped.
    pub offset: usize,
    /// What the parser expected or found.
    pub message: String,
    /// The unconsumed input starting at `offset`.
    pub remainder: String,
}

impl SyntaxError {
    pub(crate) fn new(src: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(src.len());
        Self {
            offset,
            message: message.into(),
            remainder: src.get(offset..).unwrap_or_default().to_owned(),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "syntax error at byte {}: {} (unparsed: {:?})",
            self.offset,
            self.message,
            self.remainder.trim_end()
        )
    }
}

impl std::error::Error for SyntaxError {}
