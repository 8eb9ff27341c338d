//! The single tagged error StoneMark raises at its boundary.
//!
//! Every failure mode in this crate is fatal: there is no recovery path, so
//! there is only one error type rather than one per subsystem. See
//! `spec.md` §7 for the taxonomy this mirrors.

use std::fmt;

/// The four ways a document can fail to be StoneMark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A structural violation: unterminated fence, invalid table shape,
    /// marker change mid-list, unknown heading underline character, and so
    /// on.
    BadFormat,
    /// A construct that could be two different things and the author must
    /// disambiguate (heading underline vs. thematic break).
    AmbiguousFormat,
    /// Content appears at an indent column the enclosing block does not
    /// accept.
    IndentError,
    /// An inline link or footnote reference was never given a matching
    /// definition.
    MissingLink,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::BadFormat => "bad format",
            ErrorKind::AmbiguousFormat => "ambiguous format",
            ErrorKind::IndentError => "indent error",
            ErrorKind::MissingLink => "missing link",
        };
        f.write_str(s)
    }
}

/// A fatal StoneMark diagnostic, naming the offending line.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind} at line {line}: {message}")]
pub struct StoneMarkError {
    pub kind: ErrorKind,
    pub line: u32,
    pub message: String,
}

impl StoneMarkError {
    pub fn new(kind: ErrorKind, line: u32, message: impl Into<String>) -> Self {
        let err = StoneMarkError {
            kind,
            line,
            message: message.into(),
        };
        log::warn!("{err}");
        err
    }

    pub fn bad_format(line: u32, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadFormat, line, message)
    }

    pub fn ambiguous_format(line: u32, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AmbiguousFormat, line, message)
    }

    pub fn indent_error(line: u32, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IndentError, line, message)
    }

    pub fn missing_link(line: u32, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingLink, line, message)
    }
}

pub type Result<T> = std::result::Result<T, StoneMarkError>;
