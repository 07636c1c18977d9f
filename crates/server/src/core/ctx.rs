//! Caller identity carried in the `X-Authorization` cookie.
//!
//! The cookie value is trusted as-is: it is the username the client
//! registered or logged in with.

use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use headers::{Cookie, HeaderMapExt};
use std::convert::Infallible;

pub const IDENTITY_COOKIE: &str = "X-Authorization";

#[derive(Clone, Debug, Default)]
pub struct Ctx {
    identity: Option<String>,
}

impl Ctx {
    pub fn new(identity: Option<String>) -> Self {
        Self { identity }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::new(identity_from_headers(headers))
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }
}

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Infallible> {
        Ok(Self::from_headers(&parts.headers))
    }
}

/// Non-empty identity cookie value, if any
pub fn identity_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Cookie>()
        .and_then(|cookie| cookie.get(IDENTITY_COOKIE).map(str::to_string))
        .filter(|value| !value.is_empty())
}

pub fn set_identity_cookie(value: &str) -> String {
    format!("{}={}; HttpOnly; Path=/; SameSite=Lax", IDENTITY_COOKIE, value)
}

pub fn clear_identity_cookie() -> String {
    format!(
        "{}=; HttpOnly; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
        IDENTITY_COOKIE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue};

    #[test]
    fn test_reads_identity_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; X-Authorization=alice"),
        );
        assert_eq!(identity_from_headers(&headers).as_deref(), Some("alice"));
    }

    #[test]
    fn test_missing_or_empty_cookie_is_none() {
        let headers = HeaderMap::new();
        assert!(identity_from_headers(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("X-Authorization="));
        assert!(identity_from_headers(&headers).is_none());
    }
}
