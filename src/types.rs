//! Core types: tools, model tiers, aspect ratios, formats, and results.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Attempts to detect format from a MIME type string.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// Aspect ratios accepted by the generation config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 1:1 square aspect ratio.
    #[default]
    #[serde(rename = "1:1")]
    Square,
    /// 16:9 landscape (widescreen) aspect ratio.
    #[serde(rename = "16:9")]
    Landscape,
    /// 9:16 portrait (tall) aspect ratio.
    #[serde(rename = "9:16")]
    Portrait,
    /// 4:3 standard landscape aspect ratio.
    #[serde(rename = "4:3")]
    Standard,
    /// 3:4 standard portrait aspect ratio.
    #[serde(rename = "3:4")]
    StandardPortrait,
}

impl AspectRatio {
    /// Every supported ratio, in display order.
    pub const ALL: [Self; 5] = [
        Self::Square,
        Self::Landscape,
        Self::Portrait,
        Self::Standard,
        Self::StandardPortrait,
    ];

    /// Returns the aspect ratio as a string (e.g. "16:9").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
            Self::Standard => "4:3",
            Self::StandardPortrait => "3:4",
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "1:1" => Ok(Self::Square),
            "16:9" => Ok(Self::Landscape),
            "9:16" => Ok(Self::Portrait),
            "4:3" => Ok(Self::Standard),
            "3:4" => Ok(Self::StandardPortrait),
            other => Err(format!(
                "unknown aspect ratio '{other}' (expected one of 1:1, 16:9, 9:16, 4:3, 3:4)"
            )),
        }
    }
}

/// Model tiers offered by the studio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Gemini 2.5 Flash Image - fast, no key selection required.
    #[default]
    Flash,
    /// Gemini 3 Pro Image - highest quality, needs a selected paid key.
    Pro,
}

impl ModelTier {
    /// Every tier, in display order.
    pub const ALL: [Self; 2] = [Self::Flash, Self::Pro];

    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flash => "gemini-2.5-flash-image",
            Self::Pro => "gemini-3-pro-image-preview",
        }
    }

    /// Returns the human-facing model name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Flash => "Nano Banana (Fast)",
            Self::Pro => "Gemini Pro (Quality)",
        }
    }

    /// Returns true if this tier is usable only with an explicitly
    /// selected API key from a paid project.
    pub fn requires_selected_key(&self) -> bool {
        matches!(self, Self::Pro)
    }
}

impl std::fmt::Display for ModelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which of the two submission paths a tool routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// Text-to-image: the request carries the prompt only.
    Generation,
    /// Image-plus-text: the request carries an uploaded photo and the prompt.
    Editing,
}

impl ToolKind {
    /// Returns the kind as a lowercase word for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generation => "generation",
            Self::Editing => "editing",
        }
    }

    /// Suggested filename when downloading a result from this path.
    pub fn download_filename(&self) -> &'static str {
        match self {
            Self::Generation => "generated-image.png",
            Self::Editing => "edited-image.png",
        }
    }
}

/// Studio tools a user can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Free-form photo generation from a prompt.
    Generate,
    /// Rework an uploaded photo into a styled portrait.
    Portrait,
    /// Generate a stylized avatar from a prompt.
    Avatar,
    /// Staged photoshoot of an uploaded subject.
    Photoshoot,
    /// Free-form edits to an uploaded photo.
    Edit,
    /// Quality enhancement of an uploaded photo.
    Enhance,
}

impl Tool {
    /// Every tool, in display order.
    pub const ALL: [Self; 6] = [
        Self::Generate,
        Self::Portrait,
        Self::Avatar,
        Self::Photoshoot,
        Self::Edit,
        Self::Enhance,
    ];

    /// Returns the human-facing tool label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Generate => "Photo generation",
            Self::Portrait => "Portrait adapter",
            Self::Avatar => "Avatar creation",
            Self::Photoshoot => "Photoshoot",
            Self::Edit => "Editing",
            Self::Enhance => "Photo enhancement",
        }
    }

    /// Routes the tool to its submission path.
    ///
    /// A fixed classification table: Portrait, Photoshoot, Edit and Enhance
    /// work on an uploaded photo, everything else generates from text alone.
    pub fn kind(&self) -> ToolKind {
        match self {
            Self::Portrait | Self::Photoshoot | Self::Edit | Self::Enhance => ToolKind::Editing,
            Self::Generate | Self::Avatar => ToolKind::Generation,
        }
    }

    /// Placeholder prompt this tool would show on the given path, if the
    /// tool has an entry in that path's table.
    ///
    /// Photoshoot carries an entry in both tables; `kind()` sends it to the
    /// editor, which leaves its generation entry unreachable through default
    /// routing.
    pub fn placeholder_in(&self, kind: ToolKind) -> Option<&'static str> {
        match kind {
            ToolKind::Generation => match self {
                Self::Generate => {
                    Some("A photorealistic cat in a spacesuit sitting on the moon...")
                }
                Self::Avatar => Some("A cyberpunk samurai avatar, neon lights, front view..."),
                Self::Photoshoot => {
                    Some("A vintage-style model photoshoot, Paris street, golden hour...")
                }
                _ => None,
            },
            ToolKind::Editing => match self {
                Self::Portrait => {
                    Some("Turn this photo into a professional corporate portrait...")
                }
                Self::Photoshoot => {
                    Some("Shoot this person in a 90s style against a graffiti backdrop...")
                }
                Self::Edit => {
                    Some("Remove the person in the background and make the sky more dramatic...")
                }
                Self::Enhance => {
                    Some("Improve this photo: sharpen it, fix the colors and the lighting.")
                }
                _ => None,
            },
        }
    }

    /// Placeholder prompt shown for this tool on its routed path.
    pub fn placeholder(&self) -> &'static str {
        let fallback = match self.kind() {
            ToolKind::Generation => "Describe the image you want to create...",
            ToolKind::Editing => "Describe what should change...",
        };
        self.placeholder_in(self.kind()).unwrap_or(fallback)
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Metadata about a completed generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Model identifier that produced the image.
    pub model: String,
    /// Wall-clock duration of the API call in milliseconds.
    pub duration_ms: Option<u64>,
}

/// A generated or edited image with its data and metadata.
#[derive(Debug, Clone)]
#[must_use = "generated image should be saved or rendered"]
pub struct GeneratedImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// Image format.
    pub format: ImageFormat,
    /// Generation metadata.
    pub metadata: GenerationMetadata,
}

impl GeneratedImage {
    /// Creates a new generated image.
    pub fn new(data: Vec<u8>, format: ImageFormat, metadata: GenerationMetadata) -> Self {
        Self {
            data,
            format,
            metadata,
        }
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Saves the image to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }

    /// Encodes the image data as base64.
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Returns the image as a displayable data URL.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            self.to_base64()
        )
    }
}
