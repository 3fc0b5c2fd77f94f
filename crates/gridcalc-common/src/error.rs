//! Spreadsheet error representation.
//!
//! - **`ErrorKind`**  : the closed set of spreadsheet error codes
//! - **`CalcError`**  : kind plus an optional human explanation
//!
//! Errors are values: a failed operation produces a `CalcError` that the
//! caller wraps into `ScalarValue::Error` and keeps propagating. `Display`
//! renders the canonical code (`#VALUE!`, `#DIV/0!`, …).

use std::{error::Error, fmt};

use crate::ScalarValue;

/// All recognised spreadsheet error codes.
///
/// Names are CamelCase (idiomatic Rust) while `Display` renders them the
/// way the host application shows them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// `#VALUE!`, incompatible value; the default catch-all failure.
    IncompatibleValue,
    /// `#DIV/0!`
    DivisionByZero,
    /// `#N/A`
    NoValueAvailable,
    /// `#NUM!`, numeric overflow, distinct from malformed input.
    NumberInvalid,
    /// `#NAME?`
    NameNotRecognized,
    /// `#NULL!`
    NullValue,
    /// `#REF!`
    InvalidReference,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::IncompatibleValue => "#VALUE!",
            Self::DivisionByZero => "#DIV/0!",
            Self::NoValueAvailable => "#N/A",
            Self::NumberInvalid => "#NUM!",
            Self::NameNotRecognized => "#NAME?",
            Self::NullValue => "#NULL!",
            Self::InvalidReference => "#REF!",
        })
    }
}

/// The error value the engine passes around: the mandatory code plus an
/// optional explanation for diagnostics. Two errors compare equal when
/// their kinds match; the message is advisory only.
#[derive(Debug, Clone, Eq, Hash)]
pub struct CalcError {
    pub kind: ErrorKind,
    pub message: Option<String>,
}

impl CalcError {
    /// Basic constructor (no message).
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// Attach a human-readable explanation.
    pub fn with_message<S: Into<String>>(mut self, msg: S) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Shorthand for the `#VALUE!` catch-all.
    pub fn value() -> Self {
        Self::new(ErrorKind::IncompatibleValue)
    }
}

impl From<ErrorKind> for CalcError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl PartialEq for CalcError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(ref msg) = self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

impl Error for CalcError {}

impl From<CalcError> for ScalarValue {
    fn from(error: CalcError) -> Self {
        ScalarValue::Error(error)
    }
}

impl PartialEq<ErrorKind> for CalcError {
    fn eq(&self, other: &ErrorKind) -> bool {
        self.kind == *other
    }
}
