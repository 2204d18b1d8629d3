//! Error types
//!
//! Library code returns these `thiserror` enums; the binary wraps them in
//! `anyhow` for context.

use std::path::PathBuf;

/// The source text could not be split into blocks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// 1-based line where the problem starts
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// No schema exists for the requested role
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown document role '{0}'")]
pub struct UnknownRoleError(pub String);

/// A rule file could not be loaded
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to read rule file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid rule file {origin}: {source}")]
    Toml {
        origin: String,
        source: toml::de::Error,
    },

    #[error("invalid pattern '{pattern}' in rule file: {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },
}

/// Fatal failure of a validation run
#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
    /// The lesson root could not be enumerated
    #[error("cannot read lesson directory {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The rule set could not be loaded or compiled
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ValidateError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
