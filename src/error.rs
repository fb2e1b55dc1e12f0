//! Crate error types.

use thiserror::Error;

/// Errors surfaced by the walk engine and its adapters.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed CLI token (a bare word where a `--flag` was expected)
    #[error("invalid argument: {0:?}")]
    InvalidArgument(String),

    /// A `--flag` with no value following it
    #[error("missing value for argument: {0:?}")]
    MissingValue(String),

    /// I/O error from the env-file adapter
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure signalled by an opaque value codec
    #[error("codec error: {0}")]
    Codec(String),
}

/// Result type for walk and adapter operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error came from malformed external input rather than
    /// the walk engine itself.
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::InvalidArgument(_) | Error::MissingValue(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_usage() {
        assert!(Error::InvalidArgument("oops".to_string()).is_usage());
        assert!(Error::MissingValue("--port".to_string()).is_usage());
        assert!(!Error::Codec("bad der".to_string()).is_usage());
    }

    #[test]
    fn test_error_display() {
        let err = Error::MissingValue("--listen-port".to_string());
        assert_eq!(
            err.to_string(),
            "missing value for argument: \"--listen-port\""
        );
    }
}
