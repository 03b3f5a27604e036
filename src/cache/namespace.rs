//! Cache namespaces.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CacheError;

/// One of the three independent cache partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Template objects
    Template,
    /// Rendered markup
    Markup,
    /// Rendered stylesheets
    Stylesheet,
}

impl Namespace {
    pub const ALL: [Namespace; 3] = [Namespace::Template, Namespace::Markup, Namespace::Stylesheet];

    pub fn as_str(self) -> &'static str {
        match self {
            Namespace::Template => "template",
            Namespace::Markup => "markup",
            Namespace::Stylesheet => "stylesheet",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Namespace {
    type Err = CacheError;

    /// Accepts the namespace names plus the `html`/`css` aliases used by
    /// `clearCache` callers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "template" => Ok(Namespace::Template),
            "markup" | "html" => Ok(Namespace::Markup),
            "stylesheet" | "css" => Ok(Namespace::Stylesheet),
            _ => Err(CacheError::InvalidNamespace(s.to_string())),
        }
    }
}
