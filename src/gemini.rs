//! Gemini image-generation client.

use crate::backend::ImageBackend;
use crate::error::{classify_status, Result, StudioError};
use crate::types::{AspectRatio, GeneratedImage, GenerationMetadata, ImageFormat, ModelTier};
use crate::upload::UploadedImage;
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Environment variable consulted when no explicit API key is configured.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const NO_GENERATED_IMAGE: &str = "The API response did not contain an image.";
const NO_EDITED_IMAGE: &str = "The API response did not contain an edited image.";

/// Client for the Gemini `generateContent` image endpoint.
///
/// The API key is resolved per request - an explicitly configured key wins,
/// otherwise `GEMINI_API_KEY` is read at call time so a key selected
/// mid-session is honored on the next submission.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    /// Creates a client that resolves its key from the environment.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Creates a client with an explicit API key.
    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
            ..Self::new()
        }
    }

    /// Overrides the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn resolve_key(&self) -> Result<String> {
        if let Some(ref key) = self.api_key {
            return Ok(key.clone());
        }
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(StudioError::Auth(format!(
                "{API_KEY_ENV} is not set and no API key was provided"
            ))),
        }
    }

    async fn invoke(
        &self,
        model: ModelTier,
        parts: Vec<RequestPart>,
        aspect_ratio: AspectRatio,
        missing_message: &str,
    ) -> Result<GeneratedImage> {
        let api_key = self.resolve_key()?;
        let started = Instant::now();

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model.as_str(),
        );
        let body = GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE"],
                image_config: ImageConfig { aspect_ratio },
            },
        };

        tracing::debug!(
            model = model.as_str(),
            aspect_ratio = %aspect_ratio,
            "sending generateContent request"
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "generateContent request failed");
            return Err(classify_status(status.as_u16(), &text));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let inline = first_inline_image(parsed)
            .ok_or_else(|| StudioError::NoImage(missing_message.to_string()))?;

        let data = base64::engine::general_purpose::STANDARD
            .decode(&inline.data)
            .map_err(|e| StudioError::Decode(e.to_string()))?;
        let format = ImageFormat::from_mime(&inline.mime_type).unwrap_or(ImageFormat::Png);
        let duration_ms = started.elapsed().as_millis() as u64;

        tracing::debug!(bytes = data.len(), duration_ms, "image extracted");

        Ok(GeneratedImage::new(
            data,
            format,
            GenerationMetadata {
                model: model.as_str().to_string(),
                duration_ms: Some(duration_ms),
            },
        ))
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageBackend for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        model: ModelTier,
        aspect_ratio: AspectRatio,
    ) -> Result<GeneratedImage> {
        let parts = vec![RequestPart::text(prompt)];
        self.invoke(model, parts, aspect_ratio, NO_GENERATED_IMAGE)
            .await
    }

    async fn edit(
        &self,
        prompt: &str,
        image: &UploadedImage,
        model: ModelTier,
        aspect_ratio: AspectRatio,
    ) -> Result<GeneratedImage> {
        // The photo leads, the instruction follows.
        let parts = vec![RequestPart::inline(image), RequestPart::text(prompt)];
        self.invoke(model, parts, aspect_ratio, NO_EDITED_IMAGE).await
    }
}

// Request/response wire types.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<RequestPart>,
}

/// A request part - either text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

impl RequestPart {
    fn text(text: &str) -> Self {
        Self::Text {
            text: text.to_string(),
        }
    }

    fn inline(image: &UploadedImage) -> Self {
        Self::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type().to_string(),
                data: image.base64().to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
    image_config: ImageConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: AspectRatio,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

/// Walks the first candidate's parts and returns the first inline image.
///
/// Further candidates are never consulted.
fn first_inline_image(response: GenerateContentResponse) -> Option<InlineData> {
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .find_map(|p| p.inline_data)
}
