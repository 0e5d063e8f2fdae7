//! Backend seam between the studio and the image-generation API.

use crate::error::Result;
use crate::types::{AspectRatio, GeneratedImage, ModelTier};
use crate::upload::UploadedImage;
use async_trait::async_trait;

/// The two operations a studio submission dispatches to.
///
/// [`GeminiClient`](crate::GeminiClient) is the production implementation;
/// tests drive the studio through scripted stand-ins behind this trait.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Creates an image from a text prompt.
    async fn generate(
        &self,
        prompt: &str,
        model: ModelTier,
        aspect_ratio: AspectRatio,
    ) -> Result<GeneratedImage>;

    /// Transforms an uploaded photo according to a text prompt.
    async fn edit(
        &self,
        prompt: &str,
        image: &UploadedImage,
        model: ModelTier,
        aspect_ratio: AspectRatio,
    ) -> Result<GeneratedImage>;
}
