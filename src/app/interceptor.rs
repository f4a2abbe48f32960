//! Cookie-inspecting interceptor.
//!
//! Runs as middleware in front of every route and the fallback. For requests
//! whose path matches the configured pattern it logs the length of the named
//! cookie, or that it is missing. It only observes: the request is handed to
//! the next service as received, never modified, blocked or rejected.

use super::matcher::PathPattern;
use axum::extract::{Request, State};
use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use cookie::Cookie;
use std::sync::Arc;
use tracing::info;

/// What the interceptor saw on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Cookie present; length in characters.
    Present { length: usize },
    Absent,
}

#[derive(Debug, Clone)]
pub struct CookieInspector {
    name: String,
    matcher: PathPattern,
}

impl CookieInspector {
    pub fn new(name: impl Into<String>, matcher: PathPattern) -> Self {
        CookieInspector {
            name: name.into(),
            matcher,
        }
    }

    pub fn matcher(&self) -> &PathPattern {
        &self.matcher
    }

    /// Inspect a request. Returns `None` when the path is outside the matcher.
    pub fn inspect(&self, path: &str, headers: &HeaderMap) -> Option<Observation> {
        if !self.matcher.matches(path) {
            return None;
        }

        let observation = match self.find(headers) {
            Some(length) => {
                info!(path, "Cookie length: {}", length);
                Observation::Present { length }
            }
            None => {
                info!(path, "Cookie not found");
                Observation::Absent
            }
        };

        Some(observation)
    }

    /// Length of the first cookie with our name across all `Cookie` headers.
    ///
    /// Header values are read as bytes: a non-ASCII byte elsewhere in the
    /// header must not hide our cookie.
    fn find(&self, headers: &HeaderMap) -> Option<usize> {
        headers
            .get_all(COOKIE)
            .iter()
            .flat_map(|value| {
                Cookie::split_parse(String::from_utf8_lossy(value.as_bytes()).into_owned())
            })
            .filter_map(Result::ok)
            .find(|c| c.name() == self.name)
            .map(|c| c.value().chars().count())
    }
}

/// Middleware entry point for `axum::middleware::from_fn_with_state`.
pub async fn intercept(
    State(inspector): State<Arc<CookieInspector>>,
    request: Request,
    next: Next,
) -> Response {
    inspector.inspect(request.uri().path(), request.headers());
    next.run(request).await
}
