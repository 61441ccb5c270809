//! Incoming HTTP request type.

use http::Method;

/// The request line of an incoming HTTP request.
///
/// Headers, query and body are dropped: only the path picks a route, and
/// no route looks at anything else. Leaving the body on the wire keeps a
/// large upload from being buffered for nothing.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
}

impl Request {
    pub(crate) fn from_parts(parts: http::request::Parts) -> Self {
        Self {
            method: parts.method,
            path: parts.uri.path().to_owned(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}
