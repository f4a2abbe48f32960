//! The cookie-setting endpoint.
//!
//! Every call manufactures a fixed-pattern value of `CookieConfig::length`
//! characters and attaches it to the response, so the client echoes an
//! oversized `Cookie` header on its next request.

use crate::config::CookieConfig;
use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use cookie::time::{Duration, OffsetDateTime};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

pub const PATH: &str = "/set-cookie";

/// JSON acknowledgment body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCookieBody {
    pub message: &'static str,
    pub cookie_length: usize,
}

/// Builds the oversized cookie and its acknowledgment.
#[derive(Debug, Clone)]
pub struct SetCookie {
    config: CookieConfig,
}

impl SetCookie {
    pub fn new(config: CookieConfig) -> Self {
        SetCookie { config }
    }

    /// The fill character repeated `length` times.
    pub fn value(&self) -> String {
        std::iter::repeat(self.config.fill)
            .take(self.config.length)
            .collect()
    }

    /// The cookie with its attributes applied.
    pub fn cookie(&self) -> Cookie<'static> {
        let max_age = Duration::seconds(self.config.max_age);
        Cookie::build((self.config.name.clone(), self.value()))
            .path(self.config.path.clone())
            .max_age(max_age)
            .expires(OffsetDateTime::now_utc() + max_age)
            .http_only(self.config.http_only)
            .build()
    }
}

/// `GET /set-cookie`. Always succeeds; the incoming jar is ignored apart
/// from carrying the new cookie out.
pub async fn handle(
    State(endpoint): State<Arc<SetCookie>>,
    jar: CookieJar,
) -> (CookieJar, Json<SetCookieBody>) {
    let cookie = endpoint.cookie();
    let cookie_length = cookie.value().chars().count();
    debug!(name = cookie.name(), cookie_length, "Setting cookie");

    let body = SetCookieBody {
        message: "Cookie set successfully",
        cookie_length,
    };

    (jar.add(cookie), Json(body))
}
