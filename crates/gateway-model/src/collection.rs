//! Admin API resource collections and list envelopes

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the five top-level admin API collections this engine manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// `services`
    Services,
    /// `routes`
    Routes,
    /// `plugins`
    Plugins,
    /// `consumers`
    Consumers,
    /// `certificates`
    Certificates,
}

impl Collection {
    /// Path segment of the collection, relative to the admin base URL
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Services => "services",
            Self::Routes => "routes",
            Self::Plugins => "plugins",
            Self::Consumers => "consumers",
            Self::Certificates => "certificates",
        }
    }

    /// Path of a single item in the collection
    #[must_use]
    pub fn item_path(self, id: &str) -> String {
        format!("{}/{id}", self.path())
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Identifier of a listed resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceId {
    /// Admin-API assigned id
    pub id: String,
}

/// One page of a collection listing: `{"data": [{"id": ...}], "next": ...}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    /// Items on this page
    #[serde(default)]
    pub data: Vec<ResourceId>,
    /// Link to the next page, if any
    #[serde(default)]
    pub next: Option<String>,
    /// Opaque cursor for the next page, if any
    #[serde(default)]
    pub offset: Option<String>,
}
