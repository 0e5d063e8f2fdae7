//! Orchestration of tools, models, uploads and the credential gate.

use crate::backend::ImageBackend;
use crate::error::{Result, StudioError};
use crate::keygate::{CredentialHost, GateState, KeyGate};
use crate::types::{AspectRatio, GeneratedImage, ModelTier, Tool, ToolKind};
use crate::upload::UploadedImage;
use std::path::Path;
use std::sync::Arc;

/// Shown when a failure carries no message of its own.
pub const GENERIC_FAILURE: &str = "An unknown error occurred.";

const EMPTY_PROMPT_GENERATE: &str = "Please enter a text description.";
const EMPTY_PROMPT_EDIT: &str = "Please describe the edit you want to make.";
const MISSING_IMAGE: &str = "Please upload an image first.";
const AUTH_INLINE: &str = "The API key is not valid. Please select a different key.";
const KEY_REQUIRED: &str = "An API key must be selected before submitting.";
const NO_UPLOAD_SLOT: &str = "The active tool does not accept an uploaded image.";

/// Which view currently occupies the content area.
///
/// The key prompt and the tool surface are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveView {
    /// The key-selection prompt is displayed.
    KeyGate,
    /// The active tool's surface is displayed.
    Surface,
}

/// Per-tool working state, recreated whenever the active tool changes.
#[derive(Debug, Default)]
pub struct Surface {
    prompt: String,
    aspect_ratio: AspectRatio,
    upload: Option<UploadedImage>,
    result: Option<GeneratedImage>,
    error: Option<String>,
    loading: bool,
}

impl Surface {
    /// Editing surfaces start with the tool's suggested prompt filled in,
    /// generation surfaces start empty.
    fn for_tool(tool: Tool) -> Self {
        let prompt = match tool.kind() {
            ToolKind::Editing => tool.placeholder_in(ToolKind::Editing).unwrap_or(""),
            ToolKind::Generation => "",
        };
        Self {
            prompt: prompt.to_string(),
            ..Self::default()
        }
    }

    /// Current prompt text.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Aspect ratio to request.
    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    /// The attached source image, if any.
    pub fn upload(&self) -> Option<&UploadedImage> {
        self.upload.as_ref()
    }

    /// The image produced by the last successful submission.
    pub fn result(&self) -> Option<&GeneratedImage> {
        self.result.as_ref()
    }

    /// The inline error from the last failed action.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True while a submission is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

/// The composition root: holds the active tool and model, the current
/// surface, and the credential gate, and dispatches submissions to the
/// generation or edit path of the backend.
///
/// One `Studio` drives one content area. Submission takes `&mut self`,
/// so at most one request is in flight per studio at a time.
pub struct Studio {
    backend: Box<dyn ImageBackend>,
    gate: KeyGate,
    tool: Tool,
    model: ModelTier,
    surface: Surface,
}

impl Studio {
    /// Creates a studio without credential facilities.
    ///
    /// The gate never shows; key problems surface as auth errors on submit.
    pub fn new(backend: impl ImageBackend + 'static) -> Self {
        Self::build(Box::new(backend), None)
    }

    /// Creates a studio wired to a host that can report and select keys.
    pub fn with_credential_host(
        backend: impl ImageBackend + 'static,
        host: Arc<dyn CredentialHost>,
    ) -> Self {
        Self::build(Box::new(backend), Some(host))
    }

    fn build(backend: Box<dyn ImageBackend>, host: Option<Arc<dyn CredentialHost>>) -> Self {
        let tool = Tool::Generate;
        let model = ModelTier::default();
        let mut gate = KeyGate::new(host);
        gate.refresh(model);
        Self {
            backend,
            gate,
            tool,
            model,
            surface: Surface::for_tool(tool),
        }
    }

    /// The active tool.
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// The active model tier.
    pub fn model(&self) -> ModelTier {
        self.model
    }

    /// The active tool's working state.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Current credential-gate state.
    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    /// Which view the content area should display.
    pub fn active_view(&self) -> ActiveView {
        if self.gate.is_shown() {
            ActiveView::KeyGate
        } else {
            ActiveView::Surface
        }
    }

    /// Switches the active tool, discarding the current surface.
    pub fn select_tool(&mut self, tool: Tool) {
        tracing::debug!(tool = tool.label(), "tool selected");
        self.tool = tool;
        self.surface = Surface::for_tool(tool);
    }

    /// Switches the active model and re-evaluates the credential gate.
    pub fn select_model(&mut self, model: ModelTier) {
        tracing::debug!(model = model.as_str(), "model selected");
        self.model = model;
        self.gate.refresh(model);
    }

    /// Replaces the prompt text.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.surface.prompt = prompt.into();
    }

    /// Changes the requested aspect ratio.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: AspectRatio) {
        self.surface.aspect_ratio = aspect_ratio;
    }

    /// Attaches a source image to an editing surface.
    ///
    /// A fresh attachment clears any previous result and inline error.
    /// Generation surfaces reject the attachment and record the rejection
    /// as the inline error.
    pub fn attach_image(&mut self, image: UploadedImage) -> Result<()> {
        if self.tool.kind() != ToolKind::Editing {
            return Err(self.record_validation(NO_UPLOAD_SLOT));
        }
        self.surface.error = None;
        self.surface.result = None;
        self.surface.upload = Some(image);
        Ok(())
    }

    /// Reads an image file and attaches it to the surface.
    ///
    /// Rejected or unreadable files leave the current attachment in place
    /// and record the failure as the surface's inline error.
    pub fn upload_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let upload = match UploadedImage::from_file(path) {
            Ok(upload) => upload,
            Err(err) => {
                self.surface.error = Some(err.to_string());
                return Err(err);
            }
        };
        self.attach_image(upload)
    }

    /// Runs the credential remediation flow.
    pub fn select_key(&mut self) -> Result<()> {
        self.gate.select_key()
    }

    /// Submits the current surface.
    ///
    /// Validates locally first; validation failures are recorded as the
    /// inline error and never reach the network. On success the result
    /// replaces any previous one. An auth-classified failure additionally
    /// opens the credential gate.
    pub async fn submit(&mut self) -> Result<&GeneratedImage> {
        if self.gate.is_shown() {
            return Err(StudioError::Auth(KEY_REQUIRED.to_string()));
        }

        let kind = self.tool.kind();
        if kind == ToolKind::Editing && self.surface.upload.is_none() {
            return Err(self.record_validation(MISSING_IMAGE));
        }
        if self.surface.prompt.trim().is_empty() {
            let message = match kind {
                ToolKind::Generation => EMPTY_PROMPT_GENERATE,
                ToolKind::Editing => EMPTY_PROMPT_EDIT,
            };
            return Err(self.record_validation(message));
        }

        self.surface.loading = true;
        self.surface.error = None;
        self.surface.result = None;

        tracing::info!(
            tool = self.tool.label(),
            model = self.model.as_str(),
            "submitting"
        );

        let outcome = if kind == ToolKind::Editing {
            match self.surface.upload.as_ref() {
                Some(image) => {
                    self.backend
                        .edit(
                            &self.surface.prompt,
                            image,
                            self.model,
                            self.surface.aspect_ratio,
                        )
                        .await
                }
                None => {
                    self.surface.loading = false;
                    return Err(self.record_validation(MISSING_IMAGE));
                }
            }
        } else {
            self.backend
                .generate(&self.surface.prompt, self.model, self.surface.aspect_ratio)
                .await
        };
        self.surface.loading = false;

        match outcome {
            Ok(image) => {
                tracing::info!(bytes = image.size(), "submission succeeded");
                Ok(&*self.surface.result.insert(image))
            }
            Err(err) => {
                tracing::warn!(error = %err, "submission failed");
                if err.is_auth() {
                    self.surface.error = Some(AUTH_INLINE.to_string());
                    self.gate.notify_auth_failure();
                } else {
                    let message = err.to_string();
                    self.surface.error = Some(if message.is_empty() {
                        GENERIC_FAILURE.to_string()
                    } else {
                        message
                    });
                }
                Err(err)
            }
        }
    }

    fn record_validation(&mut self, message: &str) -> StudioError {
        self.surface.error = Some(message.to_string());
        StudioError::Validation(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GenerationMetadata, ImageFormat};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    fn png_image() -> GeneratedImage {
        let bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        GeneratedImage::new(bytes, ImageFormat::Png, GenerationMetadata::default())
    }

    fn png_upload() -> UploadedImage {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        UploadedImage::from_bytes(&png).unwrap()
    }

    type Responder = Box<dyn Fn() -> Result<GeneratedImage> + Send + Sync>;

    struct MockBackend {
        calls: Arc<Mutex<Vec<String>>>,
        respond: Responder,
    }

    impl MockBackend {
        fn with(respond: Responder) -> (Self, Arc<Mutex<Vec<String>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    calls: calls.clone(),
                    respond,
                },
                calls,
            )
        }

        fn ok() -> (Self, Arc<Mutex<Vec<String>>>) {
            Self::with(Box::new(|| Ok(png_image())))
        }

        fn auth_failing() -> (Self, Arc<Mutex<Vec<String>>>) {
            Self::with(Box::new(|| {
                Err(StudioError::Auth("API key not valid".to_string()))
            }))
        }

        fn no_image() -> (Self, Arc<Mutex<Vec<String>>>) {
            Self::with(Box::new(|| {
                Err(StudioError::NoImage(
                    "The API response did not contain an image.".to_string(),
                ))
            }))
        }

        fn api_failing() -> (Self, Arc<Mutex<Vec<String>>>) {
            Self::with(Box::new(|| {
                Err(StudioError::Api {
                    status: 500,
                    message: "backend exploded".to_string(),
                })
            }))
        }
    }

    #[async_trait]
    impl ImageBackend for MockBackend {
        async fn generate(
            &self,
            prompt: &str,
            model: ModelTier,
            aspect_ratio: AspectRatio,
        ) -> Result<GeneratedImage> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("generate {} {} {}", model.as_str(), aspect_ratio, prompt));
            (self.respond)()
        }

        async fn edit(
            &self,
            prompt: &str,
            _image: &UploadedImage,
            model: ModelTier,
            aspect_ratio: AspectRatio,
        ) -> Result<GeneratedImage> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("edit {} {} {}", model.as_str(), aspect_ratio, prompt));
            (self.respond)()
        }
    }

    struct StubHost {
        selected: AtomicBool,
    }

    impl StubHost {
        fn without_key() -> Arc<Self> {
            Arc::new(Self {
                selected: AtomicBool::new(false),
            })
        }

        fn with_key() -> Arc<Self> {
            Arc::new(Self {
                selected: AtomicBool::new(true),
            })
        }
    }

    impl CredentialHost for StubHost {
        fn has_selected_key(&self) -> bool {
            self.selected.load(Ordering::SeqCst)
        }

        fn open_key_selector(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_generate_flow_produces_data_url() {
        let (backend, calls) = MockBackend::ok();
        let mut studio = Studio::new(backend);
        studio.set_prompt("a red cube on white background");

        let image = studio.submit().await.unwrap();
        assert!(image.to_data_url().starts_with("data:image/png;base64,"));

        assert!(!studio.surface().is_loading());
        assert!(studio.surface().error().is_none());
        assert_eq!(
            *calls.lock().unwrap(),
            ["generate gemini-2.5-flash-image 1:1 a red cube on white background"]
        );
    }

    #[tokio::test]
    async fn test_tool_switch_resets_surface() {
        let (backend, _calls) = MockBackend::api_failing();
        let mut studio = Studio::new(backend);

        studio.select_tool(Tool::Edit);
        studio.attach_image(png_upload()).unwrap();
        studio.set_prompt("make it brighter");
        studio.set_aspect_ratio(AspectRatio::Landscape);
        assert!(studio.submit().await.is_err());
        assert!(studio.surface().error().is_some());

        studio.select_tool(Tool::Generate);
        assert_eq!(studio.surface().prompt(), "");
        assert_eq!(studio.surface().aspect_ratio(), AspectRatio::Square);
        assert!(studio.surface().upload().is_none());
        assert!(studio.surface().result().is_none());
        assert!(studio.surface().error().is_none());
    }

    #[tokio::test]
    async fn test_editing_surface_prefills_prompt() {
        let (backend, _calls) = MockBackend::ok();
        let mut studio = Studio::new(backend);

        for tool in Tool::ALL {
            studio.select_tool(tool);
            match tool.kind() {
                ToolKind::Editing => assert_eq!(
                    studio.surface().prompt(),
                    tool.placeholder_in(ToolKind::Editing).unwrap_or("")
                ),
                ToolKind::Generation => assert_eq!(studio.surface().prompt(), ""),
            }
        }
    }

    #[tokio::test]
    async fn test_empty_prompt_blocks_generation_without_network() {
        let (backend, calls) = MockBackend::ok();
        let mut studio = Studio::new(backend);

        let err = studio.submit().await.unwrap_err();
        assert!(matches!(err, StudioError::Validation(_)));
        assert_eq!(
            studio.surface().error(),
            Some("Please enter a text description.")
        );
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edit_validates_image_before_prompt() {
        let (backend, calls) = MockBackend::ok();
        let mut studio = Studio::new(backend);
        studio.select_tool(Tool::Edit);
        studio.set_prompt("");

        // No image yet: the missing image is reported first.
        let err = studio.submit().await.unwrap_err();
        assert!(matches!(err, StudioError::Validation(_)));
        assert_eq!(studio.surface().error(), Some("Please upload an image first."));

        // Image present, prompt still empty.
        studio.attach_image(png_upload()).unwrap();
        studio.set_prompt("   ");
        let err = studio.submit().await.unwrap_err();
        assert!(matches!(err, StudioError::Validation(_)));
        assert_eq!(
            studio.surface().error(),
            Some("Please describe the edit you want to make.")
        );

        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_editing_tools_dispatch_to_edit() {
        for tool in [Tool::Portrait, Tool::Photoshoot, Tool::Edit, Tool::Enhance] {
            let (backend, calls) = MockBackend::ok();
            let mut studio = Studio::new(backend);
            studio.select_tool(tool);
            studio.attach_image(png_upload()).unwrap();
            studio.set_prompt("change the lighting");

            studio.submit().await.unwrap();

            let calls = calls.lock().unwrap();
            assert_eq!(calls.len(), 1);
            assert!(calls[0].starts_with("edit "), "{tool:?} routed to {}", calls[0]);
        }
    }

    #[tokio::test]
    async fn test_generation_tools_dispatch_to_generate() {
        for tool in [Tool::Generate, Tool::Avatar] {
            let (backend, calls) = MockBackend::ok();
            let mut studio = Studio::new(backend);
            studio.select_tool(tool);
            studio.set_prompt("a quiet forest");

            studio.submit().await.unwrap();

            let calls = calls.lock().unwrap();
            assert_eq!(calls.len(), 1);
            assert!(calls[0].starts_with("generate "));
        }
    }

    #[tokio::test]
    async fn test_no_image_failure_stores_no_result() {
        let (backend, _calls) = MockBackend::no_image();
        let mut studio = Studio::new(backend);
        studio.set_prompt("a red cube");

        let err = studio.submit().await.unwrap_err();
        assert!(matches!(err, StudioError::NoImage(_)));
        assert!(studio.surface().result().is_none());
        assert_eq!(
            studio.surface().error(),
            Some("The API response did not contain an image.")
        );
        assert!(!studio.surface().is_loading());
    }

    #[tokio::test]
    async fn test_auth_failure_shows_gate_and_inline_error() {
        let (backend, _calls) = MockBackend::auth_failing();
        let mut studio = Studio::new(backend);
        studio.set_prompt("a red cube");
        assert_eq!(studio.active_view(), ActiveView::Surface);

        let err = studio.submit().await.unwrap_err();
        assert!(err.is_auth());
        assert_eq!(
            studio.surface().error(),
            Some("The API key is not valid. Please select a different key.")
        );
        assert_eq!(studio.active_view(), ActiveView::KeyGate);
    }

    #[tokio::test]
    async fn test_premium_without_key_blocks_submit() {
        let (backend, calls) = MockBackend::ok();
        let mut studio = Studio::with_credential_host(backend, StubHost::without_key());
        studio.set_prompt("a red cube");

        studio.select_model(ModelTier::Pro);
        assert_eq!(studio.active_view(), ActiveView::KeyGate);

        let err = studio.submit().await.unwrap_err();
        assert!(err.is_auth());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_select_key_dismisses_gate_and_unblocks() {
        let (backend, calls) = MockBackend::ok();
        let mut studio = Studio::with_credential_host(backend, StubHost::without_key());
        studio.set_prompt("a red cube");
        studio.select_model(ModelTier::Pro);
        assert_eq!(studio.active_view(), ActiveView::KeyGate);

        studio.select_key().unwrap();
        assert_eq!(studio.active_view(), ActiveView::Surface);

        studio.submit().await.unwrap();
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_premium_with_key_never_gates() {
        let (backend, calls) = MockBackend::ok();
        let mut studio = Studio::with_credential_host(backend, StubHost::with_key());
        studio.set_prompt("a red cube");

        studio.select_model(ModelTier::Pro);
        assert_eq!(studio.active_view(), ActiveView::Surface);

        studio.submit().await.unwrap();
        assert_eq!(
            *calls.lock().unwrap(),
            ["generate gemini-3-pro-image-preview 1:1 a red cube"]
        );
    }

    #[tokio::test]
    async fn test_switching_back_to_fast_tier_hides_gate() {
        let (backend, _calls) = MockBackend::ok();
        let mut studio = Studio::with_credential_host(backend, StubHost::without_key());

        studio.select_model(ModelTier::Pro);
        assert_eq!(studio.active_view(), ActiveView::KeyGate);
        studio.select_model(ModelTier::Flash);
        assert_eq!(studio.active_view(), ActiveView::Surface);
    }

    #[tokio::test]
    async fn test_resubmit_replaces_result() {
        let (backend, calls) = MockBackend::ok();
        let mut studio = Studio::new(backend);
        studio.set_prompt("a red cube");

        studio.submit().await.unwrap();
        studio.submit().await.unwrap();

        assert_eq!(calls.lock().unwrap().len(), 2);
        assert!(studio.surface().result().is_some());
        assert!(studio.surface().error().is_none());
    }

    #[tokio::test]
    async fn test_attach_image_rejected_on_generation_tool() {
        let (backend, _calls) = MockBackend::ok();
        let mut studio = Studio::new(backend);

        let err = studio.attach_image(png_upload()).unwrap_err();
        assert!(matches!(err, StudioError::Validation(_)));
        assert_eq!(studio.surface().error(), Some(NO_UPLOAD_SLOT));
        assert!(studio.surface().upload().is_none());
    }

    #[tokio::test]
    async fn test_attach_image_clears_error_and_result() {
        let (backend, _calls) = MockBackend::ok();
        let mut studio = Studio::new(backend);
        studio.select_tool(Tool::Edit);
        studio.attach_image(png_upload()).unwrap();
        studio.set_prompt("warmer colors");
        studio.submit().await.unwrap();
        assert!(studio.surface().result().is_some());

        studio.attach_image(png_upload()).unwrap();
        assert!(studio.surface().result().is_none());
        assert!(studio.surface().error().is_none());
        assert!(studio.surface().upload().is_some());
    }

    #[tokio::test]
    async fn test_upload_failure_keeps_previous_attachment() {
        let (backend, _calls) = MockBackend::ok();
        let mut studio = Studio::new(backend);
        studio.select_tool(Tool::Edit);
        studio.attach_image(png_upload()).unwrap();

        let missing = std::path::Path::new("/nonexistent/photo.png");
        let err = studio.upload_file(missing).unwrap_err();
        assert!(matches!(err, StudioError::Read(_)));
        assert!(studio.surface().error().is_some());
        assert!(studio.surface().upload().is_some());
    }

    #[tokio::test]
    async fn test_upload_on_generation_tool_records_inline_error() {
        use std::io::Write;

        let (backend, _calls) = MockBackend::ok();
        let mut studio = Studio::new(backend);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0])
            .unwrap();

        let err = studio.upload_file(file.path()).unwrap_err();
        assert!(matches!(err, StudioError::Validation(_)));
        assert_eq!(studio.surface().error(), Some(NO_UPLOAD_SLOT));
        assert!(studio.surface().upload().is_none());
    }

    #[tokio::test]
    async fn test_oversize_upload_records_inline_error() {
        use std::io::Write;

        let (backend, _calls) = MockBackend::ok();
        let mut studio = Studio::new(backend);
        studio.select_tool(Tool::Edit);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&vec![0u8; 4 * 1024 * 1024 + 1]).unwrap();

        let err = studio.upload_file(file.path()).unwrap_err();
        assert!(matches!(err, StudioError::Validation(_)));
        assert_eq!(
            studio.surface().error(),
            Some("The file must not exceed 4 MB.")
        );
        assert!(studio.surface().upload().is_none());
    }

    #[tokio::test]
    async fn test_select_key_without_host_reports_unavailable() {
        let (backend, _calls) = MockBackend::auth_failing();
        let mut studio = Studio::new(backend);
        studio.set_prompt("a red cube");

        assert!(studio.submit().await.is_err());
        assert_eq!(studio.active_view(), ActiveView::KeyGate);

        let err = studio.select_key().unwrap_err();
        assert!(matches!(err, StudioError::SelectorUnavailable));
        assert_eq!(studio.active_view(), ActiveView::KeyGate);
    }

    #[tokio::test]
    async fn test_unclassified_error_message_passes_through() {
        let (backend, _calls) = MockBackend::api_failing();
        let mut studio = Studio::new(backend);
        studio.set_prompt("a red cube");

        assert!(studio.submit().await.is_err());
        assert_eq!(
            studio.surface().error(),
            Some("API error: 500 - backend exploded")
        );
        assert_eq!(studio.active_view(), ActiveView::Surface);
    }
}
