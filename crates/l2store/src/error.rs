//! Error types for l2store

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by a cache or one of its decorators
///
/// A miss is never an error: lookups return `Ok(None)`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Failure inside a backing store (I/O, serialization, ...)
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Invalid decorator configuration
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap any backend failure
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Backend(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_backend_keeps_source() {
        let err = Error::backend(io::Error::new(io::ErrorKind::Other, "disk gone"));
        assert_eq!(err.to_string(), "backend error: disk gone");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_config_message() {
        let err = Error::Config("soft_capacity must be greater than 0".to_string());
        assert_eq!(
            err.to_string(),
            "config error: soft_capacity must be greater than 0"
        );
    }
}
