//! Link objects carried in a resource's `_links`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A hypermedia link. Only `href` is required; the remaining members are the
/// optional RFC 5988 / HAL attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templated: Option<bool>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hreflang: Option<String>,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Self::default()
        }
    }
}

/// One link or several under the same relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkValue {
    One(Link),
    Many(Vec<Link>),
}

impl LinkValue {
    pub fn first(&self) -> Option<&Link> {
        match self {
            LinkValue::One(link) => Some(link),
            LinkValue::Many(links) => links.first(),
        }
    }
}

/// Link relation name to link(s).
pub type Links = BTreeMap<String, LinkValue>;
