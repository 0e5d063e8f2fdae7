#![warn(missing_docs)]
//! FotoGen - AI photo studio engine.
//!
//! This crate drives a small photo studio over the Gemini image API: pick a
//! tool and a model, type a prompt, optionally attach a photo, submit, and
//! get a generated or edited image back. Premium-tier models are guarded by
//! a credential gate that prompts for an API key before any request is made.
//!
//! # Quick Start - Generation
//!
//! ```no_run
//! use fotogen::{GeminiClient, Studio};
//!
//! #[tokio::main]
//! async fn main() -> fotogen::Result<()> {
//!     let mut studio = Studio::new(GeminiClient::new());
//!     studio.set_prompt("A golden retriever puppy in the snow");
//!     let image = studio.submit().await?;
//!     image.save("puppy.png")?;
//!     Ok(())
//! }
//! ```
//!
//! # Quick Start - Editing
//!
//! ```no_run
//! use fotogen::{GeminiClient, Studio, Tool};
//!
//! #[tokio::main]
//! async fn main() -> fotogen::Result<()> {
//!     let mut studio = Studio::new(GeminiClient::new());
//!     studio.select_tool(Tool::Enhance);
//!     studio.upload_file("photo.jpg")?;
//!     studio.set_prompt("Sharpen the photo and fix the white balance");
//!     let image = studio.submit().await?;
//!     image.save("enhanced.png")?;
//!     Ok(())
//! }
//! ```
//!
//! # Tools
//!
//! - [`Tool::Generate`]: photo generation from a text prompt
//! - [`Tool::Portrait`]: portrait adapter (works on an uploaded photo)
//! - [`Tool::Avatar`]: avatar creation from a text prompt
//! - [`Tool::Photoshoot`]: staged photoshoot from an uploaded photo
//! - [`Tool::Edit`]: free-form editing of an uploaded photo
//! - [`Tool::Enhance`]: photo enhancement of an uploaded photo
//!
//! # Models
//!
//! - [`ModelTier::Flash`]: Nano Banana (Fast), usable with an environment key
//! - [`ModelTier::Pro`]: Gemini Pro (Quality), requires a selected API key

mod error;

pub mod backend;
pub mod gemini;
pub mod keygate;
pub mod studio;
pub mod types;
pub mod upload;

pub use error::{Result, StudioError};

pub use backend::ImageBackend;
pub use gemini::GeminiClient;
pub use keygate::{CredentialHost, EnvCredentialHost, GateState, KeyGate};
pub use studio::{ActiveView, Studio, Surface, GENERIC_FAILURE};
pub use types::{
    AspectRatio, GeneratedImage, GenerationMetadata, ImageFormat, ModelTier, Tool, ToolKind,
};
pub use upload::{UploadedImage, MAX_UPLOAD_BYTES};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::backend::ImageBackend;
    pub use crate::error::{Result, StudioError};
    pub use crate::gemini::GeminiClient;
    pub use crate::keygate::EnvCredentialHost;
    pub use crate::studio::Studio;
    pub use crate::types::{AspectRatio, GeneratedImage, ModelTier, Tool};
    pub use crate::upload::UploadedImage;
}
