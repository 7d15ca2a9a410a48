//! Error handling for SDP bandwidth negotiation
//!
//! Fatal conditions are modelled by [`Error`]; anything recoverable (an
//! out-of-range port, an unreadable bandwidth value, mismatched media
//! counts) is reported as a warning value instead and never aborts a run.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A type alias for handling `Result`s with `Error`
pub type Result<T> = std::result::Result<T, Error>;

/// Exit code used when a session document cannot be read
pub const EXIT_DOCUMENT_ACCESS: i32 = 2;

/// Exit code used when a document is structurally unacceptable
pub const EXIT_MALFORMED_INPUT: i32 = 3;

/// Exit code used when the configuration is invalid
pub const EXIT_CONFIG: i32 = 4;

/// Fatal errors raised while obtaining or parsing a session document
#[derive(Error, Debug)]
pub enum Error {
    /// The document could not be opened or read
    #[error("Failed to read session document {}: {source}", .path.display())]
    DocumentAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// More media descriptions than the parser accepts
    #[error("Too many media descriptions: at most {limit} are supported")]
    CapacityExceeded { limit: usize },

    /// A line exceeded the configured maximum and the policy is `reject`
    #[error("Line {line_number} is {length} characters long (limit {limit})")]
    LineTooLong {
        line_number: usize,
        length: usize,
        limit: usize,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Create a document access error for `path`
    pub fn document_access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::DocumentAccess {
            path: path.into(),
            source,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Error::DocumentAccess { path, source } => {
                format!("Cannot read {}: {}", path.display(), source)
            }
            Error::CapacityExceeded { limit } => format!(
                "Session document has more than {} media descriptions",
                limit
            ),
            Error::LineTooLong {
                line_number,
                length,
                limit,
            } => format!(
                "Line {} is too long ({} characters, limit {})",
                line_number, length, limit
            ),
            Error::Config(msg) => format!("Configuration problem: {}", msg),
        }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::DocumentAccess { .. } => EXIT_DOCUMENT_ACCESS,
            Error::CapacityExceeded { .. } | Error::LineTooLong { .. } => EXIT_MALFORMED_INPUT,
            Error::Config(_) => EXIT_CONFIG,
        }
    }
}

/// Recoverable problems found while parsing a document
///
/// `document` is the file the line came from, `None` for in-memory input.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    /// An `m=` port outside 0..=65535; the entry is stored as rejected
    PortOutOfRange {
        #[serde(skip_serializing_if = "Option::is_none")]
        document: Option<PathBuf>,
        line_number: usize,
        port: String,
    },

    /// A `b=` value that is not an unsigned 32-bit integer; the line is ignored
    InvalidBandwidthValue {
        #[serde(skip_serializing_if = "Option::is_none")]
        document: Option<PathBuf>,
        line_number: usize,
        line: String,
    },
}

impl ParseWarning {
    /// File the warning refers to, if the document was read from disk
    pub fn document(&self) -> Option<&Path> {
        match self {
            ParseWarning::PortOutOfRange { document, .. }
            | ParseWarning::InvalidBandwidthValue { document, .. } => document.as_deref(),
        }
    }
}

/// ` in <path>` when the document has one
struct Origin<'a>(Option<&'a Path>);

impl fmt::Display for Origin<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(path) => write!(f, " in {}", path.display()),
            None => Ok(()),
        }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origin = Origin(self.document());
        match self {
            ParseWarning::PortOutOfRange {
                line_number, port, ..
            } => write!(
                f,
                "invalid port {}{} on line {} - treating as rejected (port=0)",
                port, origin, line_number
            ),
            ParseWarning::InvalidBandwidthValue {
                line_number, line, ..
            } => write!(
                f,
                "ignoring malformed bandwidth line {}{}: {}",
                line_number, origin, line
            ),
        }
    }
}

/// Offer and answer disagree on the number of media descriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MediaCountMismatch {
    pub offer: usize,
    pub answer: usize,
}

impl fmt::Display for MediaCountMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "m-line count mismatch: offer={} answer={}",
            self.offer, self.answer
        )
    }
}
