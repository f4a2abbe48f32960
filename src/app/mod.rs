//! Application layer: the route table with the cookie interceptor in front.
//!
//! The interceptor is installed as a router-wide layer, so it sees every
//! request, including ones that end in 404 or 405.

pub mod interceptor;
pub mod matcher;
pub mod set_cookie;

use crate::config::Config;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{middleware, Json, Router};
use interceptor::CookieInspector;
use matcher::{PathPattern, PatternError};
use serde_json::json;
use set_cookie::SetCookie;
use std::sync::Arc;
use tower::limit::GlobalConcurrencyLimitLayer;

/// Build the router for `config`.
pub fn router(config: &Config) -> Result<Router, PatternError> {
    let matcher = PathPattern::parse(&config.matcher)?;
    let inspector = Arc::new(CookieInspector::new(config.cookie.name.clone(), matcher));
    let endpoint = Arc::new(SetCookie::new(config.cookie.clone()));

    let router = Router::new()
        .route(set_cookie::PATH, get(set_cookie::handle))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            inspector,
            interceptor::intercept,
        ))
        .layer(GlobalConcurrencyLimitLayer::new(
            config.max_concurrent_requests,
        ))
        .with_state(endpoint);

    Ok(router)
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not Found" })))
}
