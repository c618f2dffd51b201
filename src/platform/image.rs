// ABOUTME: Resolution of the configured image into pod spec image details.
// ABOUTME: The default resolver validates and normalizes the image reference.

use async_trait::async_trait;

use crate::podspec::ImageDetails;
use crate::types::{ImageRef, ParseImageRefError};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("invalid image reference {image:?}: {source}")]
    InvalidReference {
        image: String,
        source: ParseImageRefError,
    },
}

/// Turns the configured image value into image details.
#[async_trait]
pub trait ImageResolver: Send + Sync {
    async fn resolve(&self, image: &str) -> Result<ImageDetails, ResolveError>;
}

/// Resolver that trusts the configured reference once it parses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigImageResolver;

#[async_trait]
impl ImageResolver for ConfigImageResolver {
    async fn resolve(&self, image: &str) -> Result<ImageDetails, ResolveError> {
        let reference = ImageRef::parse(image).map_err(|source| ResolveError::InvalidReference {
            image: image.to_string(),
            source,
        })?;

        Ok(ImageDetails {
            image_path: reference.to_string(),
        })
    }
}
