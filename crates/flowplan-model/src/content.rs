//! Flow attachments: documents and links

use serde::{Deserialize, Serialize};

/// Document variant tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentVariant {
    /// Project charter, the only variant kept on promotion to Ready
    Charter,
    /// Reference material
    Reference,
    /// Scope document
    Scope,
    /// Anything else
    Other,
}

/// A document attached to a flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub title: String,
    pub variant: ContentVariant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ContentItem {
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>, variant: ContentVariant) -> Self {
        Self {
            title: title.into(),
            variant,
            body: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_charter(&self) -> bool {
        self.variant == ContentVariant::Charter
    }
}

/// An external link attached to a flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Link {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            description: None,
        }
    }
}
