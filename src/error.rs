//! Error types for winsconf.

use std::fmt;

/// Top-level error enum for WINS configuration runs.
#[derive(Debug, thiserror::Error)]
pub enum WinsError {
    #[error("invalid value '{value}' for '{field}': {reason}")]
    InvalidArgument {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("adapter(s) not found: {}", .names.join(", "))]
    AdapterNotFound { names: Vec<String> },

    #[error("failed to apply {item} (already applied: {}): {reason}", AppliedItems(.applied))]
    ApplyError {
        item: String,
        applied: Vec<String>,
        reason: String,
    },

    #[error("host query failed: {0}")]
    Host(String),

    #[error("failed to read back host state after applying {}: {reason}", AppliedItems(.applied))]
    ReadBack {
        applied: Vec<String>,
        reason: String,
    },

    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl WinsError {
    pub(crate) fn invalid(field: &'static str, value: &str, reason: impl Into<String>) -> Self {
        WinsError::InvalidArgument {
            field,
            value: value.to_owned(),
            reason: reason.into(),
        }
    }
}

impl From<figment::Error> for WinsError {
    fn from(err: figment::Error) -> Self {
        WinsError::Config(Box::new(err))
    }
}

struct AppliedItems<'a>(&'a [String]);

impl fmt::Display for AppliedItems<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("nothing")
        } else {
            f.write_str(&self.0.join(", "))
        }
    }
}

pub type WinsResult<T> = Result<T, WinsError>;
