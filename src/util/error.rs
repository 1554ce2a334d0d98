//! Error types for the imgpack pipeline.

use thiserror::Error;

/// Main error type for pipeline operations.
///
/// Every failure is fatal to a run: nothing is retried and no partial ZIP
/// is written. [`Error::category`] maps a variant onto the coarse taxonomy
/// used in log output.
#[derive(Error, Debug)]
pub enum Error {
    /// Server answered with a status other than 200 or a followable redirect
    #[error("HTTP status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// 3xx response without a usable Location header
    #[error("Redirect without Location header from {url}")]
    MissingRedirectLocation { url: String },

    /// Redirect chain longer than the configured bound
    #[error("Too many redirects (limit {limit}) starting at {url}")]
    TooManyRedirects { url: String, limit: usize },

    /// Transport-level HTTP failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Malformed gzip / deflate stream
    #[error("Decode failed: {0}")]
    Decode(String),

    /// IDX magic number mismatch
    #[error("Bad magic number: expected {expected}, got {got}")]
    BadMagic { expected: u32, got: u32 },

    /// Buffer shorter than its header declares
    #[error("Truncated {what}: need {needed} bytes, have {available}")]
    Truncated {
        what: &'static str,
        needed: usize,
        available: usize,
    },

    /// IDX header dimensions whose product does not fit in memory
    #[error("IDX dimensions overflow: {count}x{rows}x{cols}")]
    DimensionOverflow {
        count: usize,
        rows: usize,
        cols: usize,
    },

    /// Class label outside the dataset's class list
    #[error("Label {label} out of range (classes: {classes})")]
    LabelOutOfRange { label: u8, classes: usize },

    /// Image with zero width or height
    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Image and label files disagree on the number of items
    #[error("Image/label count mismatch: {images} images, {labels} labels")]
    CountMismatch { images: usize, labels: usize },

    /// Tar entry data runs past the end of the buffer
    #[error("Tar entry {name} ends at byte {end}, buffer has {len}")]
    ArchiveOverrun { name: String, end: usize, len: usize },

    /// Tar header checksum mismatch (strict mode only)
    #[error("Tar header checksum mismatch for {name}: stored {stored}, computed {computed}")]
    TarChecksum {
        name: String,
        stored: u32,
        computed: u32,
    },

    /// Expected file absent from an archive
    #[error("Archive entry not found: {0}")]
    MissingEntry(String),

    /// ZIP writer failure
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

/// Coarse error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Decode,
    Format,
    Consistency,
    Archive,
    Io,
    Other,
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create a truncation error.
    pub fn truncated(what: &'static str, needed: usize, available: usize) -> Self {
        Self::Truncated { what, needed, available }
    }

    /// Which part of the taxonomy this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::HttpStatus { .. }
            | Self::MissingRedirectLocation { .. }
            | Self::TooManyRedirects { .. }
            | Self::Request(_) => ErrorCategory::Network,
            Self::Decode(_) => ErrorCategory::Decode,
            Self::BadMagic { .. }
            | Self::Truncated { .. }
            | Self::DimensionOverflow { .. }
            | Self::LabelOutOfRange { .. }
            | Self::InvalidDimensions { .. } => ErrorCategory::Format,
            Self::CountMismatch { .. } => ErrorCategory::Consistency,
            Self::ArchiveOverrun { .. }
            | Self::TarChecksum { .. }
            | Self::MissingEntry(_)
            | Self::Zip(_) => ErrorCategory::Archive,
            Self::Io(_) => ErrorCategory::Io,
            Self::Other(_) => ErrorCategory::Other,
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::BadMagic { expected: 2051, got: 7 };
        assert!(e.to_string().contains("2051"));
        assert!(e.to_string().contains('7'));

        let e = Error::CountMismatch { images: 5, labels: 3 };
        assert!(e.to_string().contains('5'));
        assert!(e.to_string().contains('3'));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.category(), ErrorCategory::Io);
    }

    #[test]
    fn test_categories() {
        let e = Error::HttpStatus { status: 404, url: "http://x".into() };
        assert_eq!(e.category(), ErrorCategory::Network);
        assert_eq!(Error::Decode("bad".into()).category(), ErrorCategory::Decode);
        assert_eq!(Error::truncated("idx", 16, 3).category(), ErrorCategory::Format);
        assert_eq!(
            Error::MissingEntry("test_batch.bin".into()).category(),
            ErrorCategory::Archive
        );
    }
}
