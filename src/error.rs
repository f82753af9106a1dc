//! Errors raised while interpreting a pattern.
//!
//! Every error carries a kind, a chain of messages and (usually) an absolute
//! position into the top-level pattern plus the width of the offending span.

use std::fmt;

use itertools::Itertools;

/// Broad classification of a [`PatternError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed grammar: unterminated brackets/parens/braces, illegal nesting.
    Syntax,
    /// A function called with too few or structurally wrong arguments.
    Argument,
    /// Well-formed but meaningless: unknown class or function, bad number,
    /// invalid group reference, malformed encoder input.
    Value,
    /// Internal invariant violation.
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Argument => write!(f, "argument"),
            Self::Value => write!(f, "value"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// An error produced while generating from a pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternError {
    kind: ErrorKind,
    msgs: Vec<String>,
    pos: Option<usize>,
    mark_len: usize,
}

impl PatternError {
    /// Create an error with no position.
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msgs: vec![msg.into()],
            pos: None,
            mark_len: 1,
        }
    }

    /// Create an error at an absolute position, underlining `mark_len` characters.
    pub fn at(kind: ErrorKind, pos: usize, mark_len: usize, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msgs: vec![msg.into()],
            pos: Some(pos),
            mark_len: mark_len.max(1),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Absolute position in the top-level pattern, if any.
    pub fn pos(&self) -> Option<usize> {
        self.pos
    }

    pub fn mark_len(&self) -> usize {
        self.mark_len
    }

    pub fn messages(&self) -> &[String] {
        &self.msgs
    }

    /// Add a message in front of the existing chain.
    pub fn prepend(mut self, msg: impl Into<String>) -> Self {
        self.msgs.insert(0, msg.into());
        self
    }

    /// Add a message after the existing chain.
    pub fn append(mut self, msg: impl Into<String>) -> Self {
        self.msgs.push(msg.into());
        self
    }

    /// Render the pattern with a caret ruler underneath the offending span.
    ///
    /// ```text
    /// (abc) \2
    ///       ^^ value error: invalid group id '2'
    /// ```
    pub fn render(&self, pattern: &str) -> String {
        match self.pos {
            Some(pos) => format!(
                "{}\n{}{} {} error: {}",
                pattern,
                " ".repeat(pos),
                "^".repeat(self.mark_len),
                self.kind,
                self.msgs.iter().join(": ")
            ),
            None => format!("{} error: {}", self.kind, self.msgs.iter().join(": ")),
        }
    }
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pos {
            Some(pos) => write!(
                f,
                "{} error near index {}: {}",
                self.kind,
                pos,
                self.msgs.iter().join(": ")
            ),
            None => write!(f, "{} error: {}", self.kind, self.msgs.iter().join(": ")),
        }
    }
}

impl std::error::Error for PatternError {}

/// Map a position local to a sub-pattern back to the top-level pattern.
///
/// `enclosing` holds, outermost first, the offset at which each nested
/// sub-pattern starts within its parent.
pub fn resolve_position(local_pos: usize, enclosing: &[usize]) -> usize {
    local_pos + enclosing.iter().sum::<usize>()
}
