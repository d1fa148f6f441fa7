//! Tracked image definitions for image-tracking providers

use serde::{Deserialize, Serialize};

use crate::domain::{AnchorArgs, AnchorId};

/// Where a tracked image's pixels come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageSource {
    /// Downloaded from its URL before tracking
    Remote,
    /// Loaded from the payload carried with the request
    Local,
    /// Already known to the tracking engine; nothing to load
    BuiltIn,
}

/// Progress of an image-tracking provider's reference image library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageTrackingState {
    #[default]
    NoImagesAdded,
    AddingImages,
    Done,
    Error,
}

fn default_physical_size() -> f32 {
    1.0
}

/// A reference image an image-tracking provider can recognise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedImage {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Vec<u8>>,
    /// Physical width of the printed marker in meters
    #[serde(default = "default_physical_size", rename = "physical-size")]
    pub physical_size: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Identifier used by the requesting caller
    #[serde(rename = "source-id")]
    pub source_id: AnchorId,
    /// Identifier assigned by the tracking engine
    #[serde(default, rename = "reference-id")]
    pub reference_id: AnchorId,
    #[serde(default, rename = "is-local")]
    pub is_local: bool,
}

impl TrackedImage {
    pub fn new(name: impl Into<String>, source_id: AnchorId) -> Self {
        Self {
            name: name.into(),
            image: None,
            physical_size: default_physical_size(),
            url: None,
            source_id,
            reference_id: AnchorId::EMPTY,
            is_local: false,
        }
    }

    /// Build from search args; `None` when the args carry neither payload nor URL
    pub fn from_args(args: &AnchorArgs) -> Option<Self> {
        if args.image.is_none() && args.source_url.as_deref().is_none_or(str::is_empty) {
            return None;
        }
        let mut image = Self::new(args.id.to_string(), args.id);
        image.image = args.image.clone();
        image.url = args.source_url.clone();
        Some(image)
    }

    /// Classify how the image must be loaded
    ///
    /// A URL marked local is treated as bundled with the engine.
    pub fn source(&self) -> ImageSource {
        match self.url.as_deref() {
            Some(url) if !url.is_empty() => {
                if self.is_local {
                    ImageSource::BuiltIn
                } else {
                    ImageSource::Remote
                }
            }
            _ => {
                if self.image.is_some() {
                    ImageSource::Local
                } else {
                    ImageSource::BuiltIn
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_classification() {
        let id = AnchorId::new();

        let mut image = TrackedImage::new("poster", id);
        assert_eq!(image.source(), ImageSource::BuiltIn);

        image.image = Some(vec![0x89, b'P', b'N', b'G']);
        assert_eq!(image.source(), ImageSource::Local);

        image.url = Some("https://cdn.example.com/poster.png".to_string());
        assert_eq!(image.source(), ImageSource::Remote);

        image.is_local = true;
        assert_eq!(image.source(), ImageSource::BuiltIn);
    }

    #[test]
    fn test_empty_url_is_ignored() {
        let mut image = TrackedImage::new("poster", AnchorId::new());
        image.url = Some(String::new());
        image.image = Some(vec![1, 2, 3]);
        assert_eq!(image.source(), ImageSource::Local);
    }

    #[test]
    fn test_from_args_requires_payload_or_url() {
        let id = AnchorId::new();
        assert!(TrackedImage::from_args(&AnchorArgs::new(id)).is_none());
        assert!(TrackedImage::from_args(&AnchorArgs::new(id).with_source_url("")).is_none());

        let image = TrackedImage::from_args(&AnchorArgs::new(id).with_image(vec![7])).unwrap();
        assert_eq!(image.source_id, id);
        assert_eq!(image.physical_size, 1.0);
        assert_eq!(image.source(), ImageSource::Local);
    }

    #[test]
    fn test_tracked_image_yaml_defaults() {
        let yaml = format!("name: door\nsource-id: {}\nurl: https://example.com/door.jpg\n", AnchorId::new());
        let image: TrackedImage = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(image.physical_size, 1.0);
        assert!(image.reference_id.is_empty());
        assert_eq!(image.source(), ImageSource::Remote);
    }
}
