//! Session cookie encoding.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, InvalidHeaderValue},
};
use textcal::SessionToken;

/// Default session cookie name
pub const DEFAULT_COOKIE_NAME: &str = "tc_session";

/// How the session token travels in cookies.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    /// Add the `Secure` attribute (HTTPS only)
    pub secure: bool,
    /// `Max-Age` in seconds, normally the session TTL
    pub max_age_secs: i64,
}

impl CookieSettings {
    /// Session token from the request's `Cookie` headers, if present.
    pub fn session_token(&self, headers: &HeaderMap) -> Option<SessionToken> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| *name == self.name && !value.is_empty())
            .map(|(_, value)| SessionToken::from_client(value))
    }

    fn attributes(&self) -> &'static str {
        if self.secure {
            "HttpOnly; Secure; SameSite=Lax; Path=/"
        } else {
            "HttpOnly; SameSite=Lax; Path=/"
        }
    }

    /// `Set-Cookie` value delivering `token`.
    pub fn set_cookie(&self, token: &SessionToken) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&format!(
            "{}={}; Max-Age={}; {}",
            self.name,
            token,
            self.max_age_secs,
            self.attributes()
        ))
    }

    /// `Set-Cookie` value removing the session cookie.
    pub fn clear_cookie(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&format!(
            "{}=; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; {}",
            self.name,
            self.attributes()
        ))
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_string(),
            secure: false,
            max_age_secs: textcal::session::DEFAULT_SESSION_TTL_SECS,
        }
    }
}
