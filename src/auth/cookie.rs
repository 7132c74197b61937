// Session cookie: carries the session token between server and browser

use axum::http::{header, HeaderMap, HeaderValue};

use crate::auth::error::AuthError;

/// Name of the session cookie
pub const SESSION_COOKIE_NAME: &str = "jwt";

/// Builds and reads the HTTP-only session cookie
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    max_age_secs: i64,
    secure: bool,
}

impl SessionCookie {
    pub fn new(max_age_secs: i64, secure: bool) -> Self {
        Self {
            name: SESSION_COOKIE_NAME.to_string(),
            max_age_secs,
            secure,
        }
    }

    /// `Set-Cookie` value attaching `token` for the whole site
    pub fn issue(&self, token: &str) -> Result<HeaderValue, AuthError> {
        self.build(token, self.max_age_secs)
    }

    /// `Set-Cookie` value telling the browser to drop the session immediately
    pub fn clear(&self) -> Result<HeaderValue, AuthError> {
        self.build("", 0)
    }

    fn build(&self, value: &str, max_age: i64) -> Result<HeaderValue, AuthError> {
        let mut parts = vec![
            format!("{}={}", self.name, value),
            "Path=/".to_string(),
            "HttpOnly".to_string(),
            "SameSite=Strict".to_string(),
            format!("Max-Age={}", max_age),
        ];

        if self.secure {
            parts.push("Secure".to_string());
        }

        HeaderValue::from_str(&parts.join("; "))
            .map_err(|e| AuthError::TokenGeneration(format!("invalid cookie header: {}", e)))
    }

    /// Session token from the request `Cookie` header(s), if present and non-empty
    pub fn extract(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|raw| raw.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}
