//! Radix-tree request router.
//!
//! One tree for every method: a route answers whatever method it is called
//! with, and only the path picks the handler. Exact matches only, so `/`
//! does not swallow `/hello/extra`.

use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};

/// The application router.
///
/// Build it once at startup and hand it to [`Server::start`](crate::Server::start).
/// Each [`Router::route`] call returns `self` so registrations chain.
pub struct Router {
    tree: MatchitRouter<BoxedHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            tree: MatchitRouter::new(),
        }
    }

    /// Register a handler for `path`, for every method.
    ///
    /// # Panics
    ///
    /// Panics on a malformed or conflicting path. Routes are fixed at
    /// startup, so this is a programming error rather than a runtime one.
    pub fn route(mut self, path: &str, handler: impl Handler) -> Self {
        self.tree
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub(crate) fn lookup(&self, path: &str) -> Option<BoxedHandler> {
        let matched = self.tree.at(path).ok()?;
        Some(Arc::clone(matched.value))
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
