//! Error types for asset file I/O.

use thiserror::Error;

/// Result type for asset file I/O operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur while opening or parsing asset files.
#[derive(Debug, Error)]
pub enum IoError {
    /// File was found neither in the virtual file system nor on disk.
    #[error("file not found: {path}")]
    NotFound {
        /// Path that was looked up.
        path: String,
    },

    /// File exists but holds zero bytes.
    #[error("file is empty: {path}")]
    Empty {
        /// Path of the empty file.
        path: String,
    },

    /// File extension is not one of the supported formats.
    #[error("unknown asset file extension: {path}")]
    UnknownExtension {
        /// Path with the unrecognized extension.
        path: String,
    },

    /// Header is missing or self-inconsistent.
    #[error("malformed header: {message}")]
    MalformedHeader {
        /// Description of what was wrong.
        message: String,
    },

    /// Buffer length disagrees with the length implied by the header.
    #[error("unexpected file size: expected {expected} bytes, got {got}")]
    SizeMismatch {
        /// Length the header implies.
        expected: usize,
        /// Actual buffer length.
        got: usize,
    },

    /// Buffer ended before a required block.
    #[error("unexpected end of data at byte {offset}")]
    UnexpectedEof {
        /// Byte offset where more data was required.
        offset: usize,
    },

    /// STL triangle count outside the supported range.
    #[error(
        "face count {count} outside supported range 1..=200000; \
         perhaps this is an ASCII STL file?"
    )]
    FaceCountOutOfRange {
        /// Count read from the header.
        count: u32,
    },

    /// A vertex coordinate is NaN or infinite.
    #[error("invalid float in {context}")]
    InvalidFloat {
        /// Where the bad value was found.
        context: String,
    },

    /// A vertex coordinate exceeds the maximum representable magnitude.
    #[error("vertex coordinate {value} exceeds maximum magnitude 2^30")]
    CoordOverflow {
        /// The offending coordinate.
        value: f32,
    },

    /// An OBJ face with fewer than 3 or more than 4 corners.
    #[error("only triangle and quad faces are supported, found a face with {count} vertices")]
    OnlyTrisAndQuads {
        /// Corner count of the offending face.
        count: usize,
    },

    /// Any other parse failure.
    #[error("invalid file content: {message}")]
    InvalidContent {
        /// Description of what was invalid.
        message: String,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IoError {
    /// Create an `InvalidContent` error with the given message.
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }

    /// Create a `MalformedHeader` error with the given message.
    #[must_use]
    pub fn malformed_header(message: impl Into<String>) -> Self {
        Self::MalformedHeader {
            message: message.into(),
        }
    }
}
