//! Unified error type.

use std::fmt;

/// A failure value raised during request handling.
///
/// Handlers raise by returning `Err(failure)`. The router never inspects the
/// value — it hands it to the error-response handler, and if that handler
/// raises too, to the top-level error callback.
pub type Failure = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by switchboard's fallible operations.
///
/// Application-level errors (404, 500) are expressed as HTTP
/// [`Response`](crate::Response) values produced by the configured fallback
/// handlers, not as `Error`s. This type surfaces registry contract violations
/// and infrastructure failures.
#[derive(Debug)]
pub enum Error {
    /// [`add_handler`](crate::Router::add_handler) called for a path that
    /// already has a handler. Carries the offending path key.
    DuplicateHandler(String),
    /// [`remove_handler_for_url`](crate::Router::remove_handler_for_url)
    /// called for a path with no registered handler.
    HandlerNotFound(String),
    /// A URL string that could not be parsed.
    InvalidUrl(String),
    /// Binding a listener or socket I/O failed.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateHandler(path) => {
                write!(f, "a handler is already registered for `{path}`")
            }
            Self::HandlerNotFound(path) => {
                write!(f, "no handler registered for `{path}`")
            }
            Self::InvalidUrl(url) => write!(f, "invalid url `{url}`"),
            Self::Io(e) => write!(f, "io: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
