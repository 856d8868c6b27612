//! `Set-Cookie` values with verbatim attributes
//!
//! Attributes are stored exactly as the scenario wrote them. Nothing is
//! normalized, reordered or added, because the presence or absence of a flag
//! such as `SameSite` is what a scenario demonstrates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cookie SameSite attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    /// Attribute text as it appears in the header
    pub fn as_attribute(&self) -> &'static str {
        match self {
            SameSite::Strict => "SameSite=Strict",
            SameSite::Lax => "SameSite=Lax",
            SameSite::None => "SameSite=None",
        }
    }
}

/// A single `Set-Cookie` header value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    attributes: Vec<String>,
}

impl SetCookie {
    /// Bare `name=value` cookie with no attributes
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            attributes: Vec::new(),
        }
    }

    /// Append an attribute verbatim, e.g. `httpOnly=true`
    pub fn attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.push(attribute.into());
        self
    }

    pub fn same_site(self, same_site: SameSite) -> Self {
        self.attribute(same_site.as_attribute())
    }

    /// Render the header value: `name=value` followed by `; attr` per attribute
    pub fn header_value(&self) -> String {
        let mut out = format!("{}={}", self.name, self.value);
        for attr in &self.attributes {
            out.push_str("; ");
            out.push_str(attr);
        }
        out
    }
}

impl fmt::Display for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header_value())
    }
}
