use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the textqr library.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// Configuration is invalid (unknown error-correction level, bad sizes).
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Detailed error message
        message: String,
    },

    /// Input text is empty or whitespace-only.
    #[error("Input text is empty")]
    EmptyInput,

    /// A text source could not be read.
    #[error("Failed to read text from {source_name}: {message}")]
    SourceRead {
        /// Human-readable name of the source (file path or "standard input")
        source_name: String,
        /// Error message
        message: String,
    },

    /// The QR encoder rejected a segment.
    #[error("Failed to encode segment {segment}: {message}")]
    Encoding {
        /// 1-based index of the rejected segment
        segment: usize,
        /// Error message from the encoder
        message: String,
    },

    /// Writing an output file failed.
    #[error("Failed to write '{path}': {message}")]
    Persist {
        /// Path that could not be written
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Scanned parts cannot be joined back into a text.
    #[error("Invalid segment set: {message}")]
    InvalidSegment {
        /// Reason the parts were rejected
        message: String,
    },

    /// JSON serialization error.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message
        message: String,
    },
}

impl Error {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Creates a source read error.
    #[must_use]
    pub fn source_read(source_name: impl Into<String>, source: &std::io::Error) -> Self {
        Self::SourceRead {
            source_name: source_name.into(),
            message: source.to_string(),
        }
    }

    /// Creates an encoding error for the given 1-based segment.
    #[must_use]
    pub fn encoding(segment: usize, message: impl Into<String>) -> Self {
        Self::Encoding {
            segment,
            message: message.into(),
        }
    }

    /// Creates a persist error with path context.
    #[must_use]
    pub fn persist(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Persist {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Creates an invalid segment error.
    #[must_use]
    pub fn invalid_segment(message: impl Into<String>) -> Self {
        Self::InvalidSegment {
            message: message.into(),
        }
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::InvalidConfiguration { .. })
    }

    /// Returns true if the input text was blank.
    #[must_use]
    pub const fn is_empty_input(&self) -> bool {
        matches!(self, Self::EmptyInput)
    }

    /// Returns true if this is an encoder rejection.
    #[must_use]
    pub const fn is_encoding(&self) -> bool {
        matches!(self, Self::Encoding { .. })
    }

    /// Returns true if an output file could not be written.
    #[must_use]
    pub const fn is_persist(&self) -> bool {
        matches!(self, Self::Persist { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization {
            message: e.to_string(),
        }
    }
}
