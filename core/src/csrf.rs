//! CSRF token sourcing.
//!
//! The token is injected into `RequestClient` rather than read from page
//! state. These helpers find it where a host usually has it: the hidden
//! `csrfmiddlewaretoken` form field or the `csrftoken` cookie.

use std::fmt;

pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const CSRF_FORM_FIELD: &str = "csrfmiddlewaretoken";
pub const CSRF_COOKIE: &str = "csrftoken";

/// A non-empty CSRF token echoed back in the `X-CSRFToken` header.
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// Returns `None` for an empty or whitespace-only value, so a missing
    /// field and an empty one behave the same. Any other value is kept
    /// verbatim.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Pick the token out of submitted form fields.
    pub fn from_form_fields<'a, I>(fields: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        fields
            .into_iter()
            .find(|(name, _)| *name == CSRF_FORM_FIELD)
            .and_then(|(_, value)| Self::new(value))
    }

    /// Pick the token out of a `Cookie` header value (`a=1; csrftoken=xyz`).
    pub fn from_cookie_header(header: &str) -> Option<Self> {
        header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| name.trim() == CSRF_COOKIE)
            .and_then(|(_, value)| Self::new(value.trim().trim_matches('"')))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens end up in logs via `Debug` on `Request`; keep them out.
impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CsrfToken(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_value_is_no_token() {
        assert!(CsrfToken::new("").is_none());
        assert!(CsrfToken::new("   ").is_none());
        assert_eq!(CsrfToken::new(" abc ").unwrap().as_str(), " abc ");
    }

    #[test]
    fn form_field_lookup() {
        let fields = [("title", "x"), ("csrfmiddlewaretoken", "tok123")];
        assert_eq!(CsrfToken::from_form_fields(fields).unwrap().as_str(), "tok123");
        assert!(CsrfToken::from_form_fields([("title", "x")]).is_none());
    }

    #[test]
    fn cookie_header_lookup() {
        let token = CsrfToken::from_cookie_header("sessionid=s1; csrftoken=abc; theme=dark").unwrap();
        assert_eq!(token.as_str(), "abc");
        assert!(CsrfToken::from_cookie_header("sessionid=s1").is_none());
        assert!(CsrfToken::from_cookie_header("csrftoken=").is_none());
    }

    #[test]
    fn debug_hides_value() {
        let token = CsrfToken::new("hunter2").unwrap();
        assert!(!format!("{token:?}").contains("hunter2"));
    }
}
