//! Error handling for ANM parsing and writing

use std::io;
use thiserror::Error;

/// Errors that can occur when working with ANM files
#[derive(Debug, Error)]
pub enum AnmError {
    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Stream ended in the middle of a field or a declared length
    #[error("unexpected end of stream")]
    UnexpectedEof,

    /// A tagged string held bytes that are not valid UTF-8
    #[error("invalid UTF-8 in string field")]
    InvalidEncoding,

    /// Write-time only: a string's UTF-8 byte length exceeds the u16 prefix
    #[error("string size cannot exceed the u16 limit")]
    StringTooLong,

    /// A clone-from-previous-frame flag was set in the first frame
    #[error("bone duplication in first animation frame")]
    BoneDuplicationInFirstFrame,

    /// A clone-from-previous-frame flag referenced a bone index the
    /// previous frame does not have
    #[error("bone duplication without matching bone in previous frame")]
    BoneDuplicationWithoutMatch,

    /// An in-frame sharing flag was set on the first bone of a frame
    #[error("bone {field} sharing flag set with no preceding bone in frame")]
    MissingPredecessor {
        /// Which field group the flag referred to ("transform" or "position")
        field: &'static str,
    },

    /// Write-time only: a sub-frame index does not fit the narrow override
    /// field of the latest grammar
    #[error("sub-frame index {0} does not fit the 8-bit frame override")]
    FrameOutOfRange(i16),

    /// Header value not recognized by the version dispatcher
    #[error("unsupported ANM version header: {0}")]
    UnsupportedVersion(i32),

    /// An error wrapped with the entity path it occurred under
    #[error("{path}: {source}")]
    Context {
        /// Entity path segment, e.g. `class 'a__AnimationHero'` or `bone 3`
        path: String,
        /// The underlying error
        #[source]
        source: Box<AnmError>,
    },
}

impl AnmError {
    /// Wraps the error with one entity-path segment.
    pub(crate) fn context(self, path: impl Into<String>) -> Self {
        AnmError::Context {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// Innermost error, with any entity-path context stripped.
    pub fn root_cause(&self) -> &AnmError {
        match self {
            AnmError::Context { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Type alias for Results from ANM operations
pub type Result<T> = std::result::Result<T, AnmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = AnmError::UnsupportedVersion(-3);
        assert_eq!(format!("{}", error), "unsupported ANM version header: -3");

        let error = AnmError::MissingPredecessor { field: "transform" };
        assert_eq!(
            format!("{}", error),
            "bone transform sharing flag set with no preceding bone in frame"
        );
    }

    #[test]
    fn test_context_display_and_root_cause() {
        let error = AnmError::UnexpectedEof
            .context("bone 3")
            .context("frame 12")
            .context("animation 'walk'");
        assert_eq!(
            format!("{}", error),
            "animation 'walk': frame 12: bone 3: unexpected end of stream"
        );
        assert!(matches!(error.root_cause(), AnmError::UnexpectedEof));
    }
}
