//! Application and pea identifiers
//!
//! An application owns one or more running instances ("peas"). Both are
//! identified by opaque names handed out by the platform; peapod never
//! parses or interprets them beyond equality.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Name of a deployed application
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AppName(String);

impl AppName {
    /// Create an application name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AppName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Name of one running instance of an application
///
/// A pea belongs to exactly one application. The back-reference is
/// carried by [`PeaBinding`]; peas never own their application.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeaName(String);

impl PeaName {
    /// Create a pea name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PeaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeaName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PeaName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A pea resolved to its owning application
///
/// Produced by [`crate::AppRegistry::find_pea`] when a log stream opens,
/// and fixed for the lifetime of that stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeaBinding {
    /// The owning application
    pub app: AppName,
    /// The pea that produced the stream
    pub pea: PeaName,
}

impl PeaBinding {
    /// Create a binding
    pub fn new(app: impl Into<AppName>, pea: impl Into<PeaName>) -> Self {
        Self {
            app: app.into(),
            pea: pea.into(),
        }
    }
}

impl Display for PeaBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.pea, self.app)
    }
}
