//! Anchor search requests

use serde::{Deserialize, Serialize};

use super::id::AnchorId;

/// One anchor to locate, optionally with the image that marks it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorArgs {
    pub id: AnchorId,
    /// Encoded image bytes, for image-tracking providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Vec<u8>>,
    #[serde(default, rename = "source-url", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl AnchorArgs {
    pub fn new(id: AnchorId) -> Self {
        Self {
            id,
            image: None,
            source_url: None,
        }
    }

    pub fn with_image(mut self, image: Vec<u8>) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }
}

/// Provider-defined search strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
    /// Everything the provider can see around the device
    Nearby,
}

/// What to look for; exactly one variant per search call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorSearch {
    Ids(Vec<AnchorId>),
    Args(Vec<AnchorArgs>),
    Mode(SearchMode),
}

impl AnchorSearch {
    pub fn ids(ids: impl IntoIterator<Item = AnchorId>) -> Self {
        Self::Ids(ids.into_iter().collect())
    }

    pub fn nearby() -> Self {
        Self::Mode(SearchMode::Nearby)
    }

    /// Identifiers named by the request; empty for mode searches
    pub fn anchor_ids(&self) -> Vec<AnchorId> {
        match self {
            Self::Ids(ids) => ids.clone(),
            Self::Args(args) => args.iter().map(|a| a.id).collect(),
            Self::Mode(_) => Vec::new(),
        }
    }

    /// True for the identifier-set variants, which must never be empty
    pub fn is_identifier_set(&self) -> bool {
        matches!(self, Self::Ids(_) | Self::Args(_))
    }

    /// Number of identifiers carried, `None` for mode searches
    pub fn id_count(&self) -> Option<usize> {
        match self {
            Self::Ids(ids) => Some(ids.len()),
            Self::Args(args) => Some(args.len()),
            Self::Mode(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ids(_) => "ids",
            Self::Args(_) => "args",
            Self::Mode(_) => "mode",
        }
    }
}
