//! Plaintext session tokens
//!
//! A session token is the account name itself, carried in the `session`
//! cookie. There is no signature, no expiry and no server-side session table:
//! whoever presents the cookie is that account.

use crate::cookie::SetCookie;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(account: impl Into<String>) -> Self {
        Self(account.into())
    }

    /// The account this token stands for
    pub fn account(&self) -> &str {
        &self.0
    }

    /// Look the token up in a parsed cookie map. An empty value counts as absent.
    pub fn from_cookies(cookies: &HashMap<String, String>) -> Option<Self> {
        cookies
            .get(SESSION_COOKIE)
            .filter(|value| !value.is_empty())
            .map(|value| Self(value.clone()))
    }

    /// `session=<account>` with no attributes; callers add flags per scenario
    pub fn to_cookie(&self) -> SetCookie {
        SetCookie::new(SESSION_COOKIE, self.0.clone())
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
