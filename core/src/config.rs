//! Client configuration loaded from the environment.

use crate::csrf::CsrfToken;

pub const BASE_URL_VAR: &str = "REQUEST_BASE_URL";
pub const CSRF_TOKEN_VAR: &str = "CSRF_TOKEN";

/// Settings injected into `RequestClient`. Empty variables count as unset.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub base_url: Option<String>,
    pub csrf_token: Option<CsrfToken>,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(BASE_URL_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let csrf_token = lookup(CSRF_TOKEN_VAR).and_then(CsrfToken::new);
        Self { base_url, csrf_token }
    }
}
