//! Incoming HTTP request type.

use http::Method;

/// An incoming HTTP request, fully buffered before dispatch.
///
/// `Clone` on purpose: when a handler raises, the error-response handler
/// receives the same request the failing handler saw.
#[derive(Clone)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) target: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        path: String,
        target: String,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    ) -> Self {
        Self { method, path, target, headers, body }
    }

    pub fn method(&self) -> &Method { &self.method }

    /// The registry key this request was dispatched on: the path component
    /// of the request target, query and fragment stripped.
    pub fn path(&self) -> &str { &self.path }

    /// The raw request target as it arrived, query string included.
    pub fn target(&self) -> &str { &self.target }

    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
