//! Error types and their exit codes.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::format::sniff::Signature;

/// Represents a user input error (invalid flags, malformed overrides, etc.).
#[derive(Debug, Error)]
#[error("{0}")]
pub struct UserInputError(pub String);

impl UserInputError {
    /// Convenience constructor.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Reasons an extraction is refused or could not be started.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("'{0}' is not a valid file!")]
    InvalidPath(Utf8PathBuf),
    #[error("don't know how to extract '{0}'...")]
    UnrecognizedFormat(Utf8PathBuf),
    #[error("'{0}' is not a directory")]
    InvalidDirectory(Utf8PathBuf),
    #[error("'{path}' does not look like {expected} data (found {})", detected_label(.detected))]
    ContentMismatch {
        path: Utf8PathBuf,
        expected: Signature,
        detected: Option<Signature>,
    },
    #[error("{program}: command not found")]
    ToolNotFound { program: String },
    #[error("failed to run {program}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to read {path}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

fn detected_label(detected: &Option<Signature>) -> String {
    detected.map_or_else(|| "unknown".to_owned(), |signature| signature.to_string())
}

impl ExtractError {
    /// Process exit code reported for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidPath(_) | Self::UnrecognizedFormat(_) | Self::InvalidDirectory(_) => 2,
            Self::ContentMismatch { .. } => 3,
            Self::ToolNotFound { .. } => 127,
            Self::Spawn { .. } | Self::Read { .. } => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_name_the_path() {
        assert_eq!(
            ExtractError::InvalidPath("missing.rar".into()).to_string(),
            "'missing.rar' is not a valid file!"
        );
        assert_eq!(
            ExtractError::UnrecognizedFormat("data.xyz".into()).to_string(),
            "don't know how to extract 'data.xyz'..."
        );
    }

    #[test]
    fn mismatch_reports_both_signatures() {
        let err = ExtractError::ContentMismatch {
            path: "photo.gz".into(),
            expected: Signature::Gzip,
            detected: Some(Signature::Zip),
        };
        assert_eq!(
            err.to_string(),
            "'photo.gz' does not look like gzip data (found zip)"
        );
        let err = ExtractError::ContentMismatch {
            path: "a.rar".into(),
            expected: Signature::Rar,
            detected: None,
        };
        assert!(err.to_string().ends_with("(found unknown)"));
        assert_eq!(err.exit_code(), 3);
    }
}
