use serde::Serialize;
use std::fmt;
use std::io::{self, ErrorKind};
use std::num::{ParseFloatError, ParseIntError};
use std::time::TryFromFloatSecsError;
use thiserror::Error;

// =============================================================================
// Fault taxonomy
// =============================================================================

/// The kind of fault a scenario ran into.
/// Each variant is one distinct failure mode the demo can surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FaultKind {
    ResourceNotFound,
    EndOfStream,
    ConnectionFailure,
    LookupFailure,
    #[serde(rename = "invalid-arithmetic-operation")]
    InvalidArithmetic,
    NullReference,
    BoundsViolation,
    TypeMismatch,
    InvalidArgument,
    ParseFailure,
    /// Any other I/O failure.
    Io,
    /// A panic caught at the scenario boundary.
    Panic,
}

impl FaultKind {
    pub const ALL: [FaultKind; 12] = [
        FaultKind::ResourceNotFound,
        FaultKind::EndOfStream,
        FaultKind::ConnectionFailure,
        FaultKind::LookupFailure,
        FaultKind::InvalidArithmetic,
        FaultKind::NullReference,
        FaultKind::BoundsViolation,
        FaultKind::TypeMismatch,
        FaultKind::InvalidArgument,
        FaultKind::ParseFailure,
        FaultKind::Io,
        FaultKind::Panic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FaultKind::ResourceNotFound => "resource-not-found",
            FaultKind::EndOfStream => "end-of-stream",
            FaultKind::ConnectionFailure => "connection-failure",
            FaultKind::LookupFailure => "lookup-failure",
            FaultKind::InvalidArithmetic => "invalid-arithmetic-operation",
            FaultKind::NullReference => "null-reference",
            FaultKind::BoundsViolation => "bounds-violation",
            FaultKind::TypeMismatch => "type-mismatch",
            FaultKind::InvalidArgument => "invalid-argument",
            FaultKind::ParseFailure => "parse-failure",
            FaultKind::Io => "io",
            FaultKind::Panic => "panic",
        }
    }

    /// Kinds that mark a scenario running to its natural end rather than breaking.
    pub fn is_natural_end(&self) -> bool {
        matches!(self, FaultKind::EndOfStream)
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Fault value
// =============================================================================

/// A fault observed inside a scenario: what kind, and what it said.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct Fault {
    kind: FaultKind,
    message: String,
}

impl Fault {
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Prefix the message with where the fault happened, keeping the kind.
    pub fn context(self, context: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{context}: {}", self.message),
        }
    }
}

impl From<io::Error> for Fault {
    fn from(err: io::Error) -> Self {
        let kind = match err.kind() {
            ErrorKind::NotFound => FaultKind::ResourceNotFound,
            ErrorKind::UnexpectedEof => FaultKind::EndOfStream,
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::TimedOut => FaultKind::ConnectionFailure,
            ErrorKind::InvalidInput => FaultKind::InvalidArgument,
            ErrorKind::InvalidData => FaultKind::ParseFailure,
            _ => FaultKind::Io,
        };
        Fault::new(kind, err.to_string())
    }
}

impl From<ParseIntError> for Fault {
    fn from(err: ParseIntError) -> Self {
        Fault::new(FaultKind::ParseFailure, err.to_string())
    }
}

impl From<ParseFloatError> for Fault {
    fn from(err: ParseFloatError) -> Self {
        Fault::new(FaultKind::ParseFailure, err.to_string())
    }
}

impl From<TryFromFloatSecsError> for Fault {
    fn from(err: TryFromFloatSecsError) -> Self {
        Fault::new(FaultKind::InvalidArgument, err.to_string())
    }
}

impl From<rusqlite::Error> for Fault {
    fn from(err: rusqlite::Error) -> Self {
        Fault::new(FaultKind::ConnectionFailure, err.to_string())
    }
}
