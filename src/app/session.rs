use image::RgbaImage;

use super::intake::{select_input_file, InputFile};
use super::output::{download_file_name, DownloadArtifact, MASK_FILE_NAME};
use super::worker::{spawn_worker, WorkerHandle, WorkerPoll};
use super::{RemoteKind, Services, SessionError, SessionResult};
use crate::canvas::{encode_png, CanvasError, CanvasLayers};
use crate::editor::{GestureEffect, MaskEditor, StrokeStyle, ToolKind};
use crate::geometry::ScreenRect;
use crate::input::{GesturePhase, PointerGesture, PointerSample};
use crate::mask::{decode_binary_mask, encode_binary_mask, normalize_segmentation};
use crate::remote::{
    CancelToken, EditRequest, ImagePayload, RemoteError, RemoteResult, SegmentationRequest,
    StylePreset, UpscaleFactor, UpscaleRequest,
};
use crate::state::{SessionEvent, SessionPhase, StateMachine};

/// What the user asked the edit service to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditOptions {
    pub instruction: String,
    pub negative_instruction: Option<String>,
    pub style: StylePreset,
}

impl EditOptions {
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpscaledResult {
    pub image: RgbaImage,
    pub factor: UpscaleFactor,
}

/// How a finished remote call was applied.
#[derive(Debug)]
pub struct RemoteOutcome {
    pub kind: RemoteKind,
    pub result: SessionResult<()>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RemoteOperation {
    AutoMask,
    Edit,
    Upscale(UpscaleFactor),
}

impl RemoteOperation {
    const fn kind(self) -> RemoteKind {
        match self {
            Self::AutoMask => RemoteKind::AutoMask,
            Self::Edit => RemoteKind::Edit,
            Self::Upscale(_) => RemoteKind::Upscale,
        }
    }

    const fn event(self) -> SessionEvent {
        match self {
            Self::AutoMask => SessionEvent::BeginAutoMask,
            Self::Edit => SessionEvent::BeginEdit,
            Self::Upscale(_) => SessionEvent::BeginUpscale,
        }
    }
}

#[derive(Debug)]
struct PendingRemote {
    operation: RemoteOperation,
    cancel: CancelToken,
    handle: WorkerHandle<RemoteResult<Vec<u8>>>,
}

/// One user's editing session: the photo and mask, the active tool, and remote results.
///
/// All mutation happens on the caller's thread. Remote calls run on worker
/// threads and are applied only when the caller polls for them.
#[derive(Debug)]
pub struct Session {
    machine: StateMachine,
    editor: MaskEditor,
    layers: Option<CanvasLayers>,
    result: Option<RgbaImage>,
    upscaled: Option<UpscaledResult>,
    pending: Option<PendingRemote>,
    services: Services,
}

impl Session {
    pub fn new(services: Services, style: StrokeStyle, fill_tolerance: u8) -> Self {
        Self {
            machine: StateMachine::new(),
            editor: MaskEditor::new(style, fill_tolerance),
            layers: None,
            result: None,
            upscaled: None,
            pending: None,
            services,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.machine.phase()
    }

    /// Per-operation busy flag for the control that triggers `kind`.
    pub fn is_busy(&self, kind: RemoteKind) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| pending.operation.kind() == kind)
    }

    pub fn layers(&self) -> Option<&CanvasLayers> {
        self.layers.as_ref()
    }

    pub fn editor(&self) -> &MaskEditor {
        &self.editor
    }

    pub fn result(&self) -> Option<&RgbaImage> {
        self.result.as_ref()
    }

    pub fn upscaled(&self) -> Option<&UpscaledResult> {
        self.upscaled.as_ref()
    }

    /// Image to show: the upscaled result when present, else the plain result.
    pub fn display_image(&self) -> Option<&RgbaImage> {
        self.upscaled
            .as_ref()
            .map(|upscaled| &upscaled.image)
            .or(self.result.as_ref())
    }

    pub fn load_files(&mut self, files: &[InputFile]) -> SessionResult<(u32, u32)> {
        let file = select_input_file(files).map_err(|source| SessionError::Load { source })?;
        let bytes = file.bytes.clone();
        self.load_image(&bytes)
    }

    /// Replaces the photo and starts a blank mask. A failed load leaves no image,
    /// so editing stays blocked until a new one is supplied.
    pub fn load_image(&mut self, bytes: &[u8]) -> SessionResult<(u32, u32)> {
        self.ensure_can(SessionEvent::LoadImage)?;
        match CanvasLayers::from_encoded(bytes) {
            Ok(layers) => {
                let dimensions = layers.dimensions();
                let format = layers.base_format().mime_type();
                self.editor.cancel_gesture();
                self.layers = Some(layers);
                self.result = None;
                self.upscaled = None;
                self.machine.transition(SessionEvent::LoadImage)?;
                tracing::info!(
                    width = dimensions.0,
                    height = dimensions.1,
                    format,
                    "image loaded"
                );
                Ok(dimensions)
            }
            Err(source) => {
                tracing::warn!(%source, "image load failed");
                self.reset();
                Err(SessionError::Load { source })
            }
        }
    }

    /// Drops the photo, mask and results. In-flight remote work is cancelled and
    /// its eventual result is discarded.
    pub fn reset(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::info!(
                operation = pending.operation.kind().label(),
                "cancelling pending request"
            );
            pending.cancel.cancel();
        }
        self.editor.cancel_gesture();
        self.layers = None;
        self.result = None;
        self.upscaled = None;
        if self.machine.phase() != SessionPhase::Empty {
            // Reset is accepted from every phase.
            let _ = self.machine.transition(SessionEvent::Reset);
        }
    }

    pub fn select_tool(&mut self, tool: ToolKind) -> bool {
        self.editor.select_tool(tool)
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.editor.set_brush_size(size);
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.editor.set_opacity(opacity);
    }

    pub fn clear_mask(&mut self) -> SessionResult<()> {
        self.ensure_mask_editable()?;
        self.editor.cancel_gesture();
        if let Some(layers) = self.layers.as_mut() {
            layers.clear_mask();
        }
        Ok(())
    }

    /// Replaces the mask with a binary mask image exported earlier.
    pub fn import_mask(&mut self, encoded: &[u8]) -> SessionResult<()> {
        self.ensure_mask_editable()?;
        let style = self.editor.style();
        let layers = self.layers.as_mut().ok_or(SessionError::NoImage)?;
        let mask = decode_binary_mask(encoded, layers.dimensions(), &style)
            .map_err(|source| SessionError::Load { source })?;
        self.editor.cancel_gesture();
        layers
            .replace_mask(mask)
            .map_err(|source| SessionError::Load { source })?;
        tracing::info!(coverage = layers.mask_coverage(), "mask imported");
        Ok(())
    }

    pub fn pointer(&mut self, gesture: PointerGesture) -> SessionResult<GestureEffect> {
        if matches!(gesture, PointerGesture::End | PointerGesture::Leave) {
            // Ending a gesture always clears its state, even when edits are blocked.
            self.editor.cancel_gesture();
            return Ok(GestureEffect::Tracked);
        }
        self.ensure_mask_editable()?;
        let layers = self.layers.as_mut().ok_or(SessionError::NoImage)?;
        Ok(self.editor.handle(layers, gesture))
    }

    /// Maps a raw host event through the displayed surface and dispatches it.
    pub fn pointer_event(
        &mut self,
        phase: GesturePhase,
        sample: &PointerSample,
        surface: ScreenRect,
    ) -> SessionResult<GestureEffect> {
        let dimensions = self
            .layers
            .as_ref()
            .map(CanvasLayers::dimensions)
            .ok_or(SessionError::NoImage)?;
        match PointerGesture::from_sample(phase, sample, surface, dimensions) {
            Some(gesture) => self.pointer(gesture),
            None => Ok(GestureEffect::Ignored),
        }
    }

    pub fn start_auto_mask(&mut self) -> SessionResult<()> {
        let layers = self.layers.as_ref().ok_or(SessionError::NoImage)?;
        self.ensure_can(SessionEvent::BeginAutoMask)?;
        let request = SegmentationRequest {
            image: base_payload(layers)?,
        };
        // An open shape gesture holds a snapshot of the mask that is about to be replaced.
        self.editor.cancel_gesture();

        let service = self.services.segmentation.clone();
        self.dispatch(RemoteOperation::AutoMask, move |cancel| {
            service.segment(&request, &cancel)
        })
    }

    /// Sends photo, binary mask and instruction to the edit service.
    ///
    /// A blank instruction is rejected before anything is sent.
    pub fn submit_edit(&mut self, options: &EditOptions) -> SessionResult<()> {
        if options.instruction.trim().is_empty() {
            return Err(SessionError::validation("enter an instruction before submitting"));
        }
        let layers = self.layers.as_ref().ok_or(SessionError::NoImage)?;
        self.ensure_can(SessionEvent::BeginEdit)?;
        let request = EditRequest {
            instruction: options.instruction.trim().to_string(),
            negative_instruction: options.negative_instruction.clone(),
            style: options.style,
            image: base_payload(layers)?,
            mask_png: encode_binary_mask(layers.mask())
                .map_err(|source| SessionError::Encode { source })?,
        };

        let service = self.services.edit.clone();
        self.dispatch(RemoteOperation::Edit, move |cancel| {
            service.edit(&request, &cancel)
        })
    }

    pub fn start_upscale(&mut self, factor: u32) -> SessionResult<()> {
        let factor = UpscaleFactor::try_from(factor).map_err(|source| SessionError::Validation {
            message: source.to_string(),
        })?;
        let result = self
            .result
            .as_ref()
            .ok_or_else(|| SessionError::validation("there is no edited image to upscale"))?;
        self.ensure_can(SessionEvent::BeginUpscale)?;
        let request = UpscaleRequest {
            image_png: encode_png(result).map_err(|source| SessionError::Encode { source })?,
            factor,
        };

        let service = self.services.upscale.clone();
        self.dispatch(RemoteOperation::Upscale(factor), move |cancel| {
            service.upscale(&request, &cancel)
        })
    }

    /// Applies a finished remote call, if there is one. Never blocks.
    pub fn poll_remote(&mut self) -> Option<RemoteOutcome> {
        let poll = self.pending.as_ref()?.handle.try_take();
        self.settle(poll)
    }

    /// Blocks until the pending remote call finishes and applies it.
    pub fn wait_remote(&mut self) -> Option<RemoteOutcome> {
        let poll = self.pending.as_ref()?.handle.wait();
        self.settle(poll)
    }

    pub fn download(&self) -> SessionResult<DownloadArtifact> {
        let (image, factor) = match (&self.upscaled, &self.result) {
            (Some(upscaled), _) => (&upscaled.image, Some(upscaled.factor)),
            (None, Some(result)) => (result, None),
            (None, None) => return Err(SessionError::validation("there is no result to download")),
        };
        Ok(DownloadArtifact {
            file_name: download_file_name(factor),
            png: encode_png(image).map_err(|source| SessionError::Encode { source })?,
        })
    }

    /// The current mask in the binary form sent with edit requests.
    pub fn mask_download(&self) -> SessionResult<DownloadArtifact> {
        let layers = self.layers.as_ref().ok_or(SessionError::NoImage)?;
        Ok(DownloadArtifact {
            file_name: MASK_FILE_NAME.to_string(),
            png: encode_binary_mask(layers.mask()).map_err(|source| SessionError::Encode { source })?,
        })
    }

    fn settle(&mut self, poll: WorkerPoll<RemoteResult<Vec<u8>>>) -> Option<RemoteOutcome> {
        let response = match poll {
            WorkerPoll::Pending => return None,
            WorkerPoll::Ready(response) => response,
            WorkerPoll::Lost => Err(RemoteError::Network {
                message: "request worker stopped unexpectedly".to_string(),
            }),
        };
        let pending = self.pending.take()?;
        if let Err(err) = self.machine.transition(SessionEvent::RemoteSettled) {
            tracing::warn!(?err, "remote result arrived outside a remote phase");
        }
        let kind = pending.operation.kind();
        if pending.cancel.is_cancelled() {
            tracing::debug!(operation = kind.label(), "discarding cancelled result");
            return None;
        }

        let result = response
            .map_err(|source| SessionError::Remote {
                operation: kind,
                source,
            })
            .and_then(|bytes| self.apply(pending.operation, &bytes));
        match &result {
            Ok(()) => tracing::info!(operation = kind.label(), "remote call applied"),
            Err(err) => tracing::warn!(operation = kind.label(), %err, "remote call failed"),
        }
        Some(RemoteOutcome { kind, result })
    }

    // Decoding happens before any state is touched so failures leave it as it was.
    fn apply(&mut self, operation: RemoteOperation, bytes: &[u8]) -> SessionResult<()> {
        let unreadable = |source| SessionError::UnreadableResult {
            operation: operation.kind(),
            source,
        };
        match operation {
            RemoteOperation::AutoMask => {
                let layers = self.layers.as_mut().ok_or(SessionError::NoImage)?;
                let mask = normalize_segmentation(bytes, layers.dimensions(), &self.editor.style())
                    .map_err(unreadable)?;
                self.editor.cancel_gesture();
                layers
                    .replace_mask(mask)
                    .map_err(|source| SessionError::Encode { source })?;
            }
            RemoteOperation::Edit => {
                let image = decode_result(bytes).map_err(unreadable)?;
                self.result = Some(image);
                self.upscaled = None;
            }
            RemoteOperation::Upscale(factor) => {
                let image = decode_result(bytes).map_err(unreadable)?;
                self.upscaled = Some(UpscaledResult { image, factor });
            }
        }
        Ok(())
    }

    fn dispatch<W>(&mut self, operation: RemoteOperation, work: W) -> SessionResult<()>
    where
        W: FnOnce(CancelToken) -> RemoteResult<Vec<u8>> + Send + 'static,
    {
        self.machine.transition(operation.event())?;
        let cancel = CancelToken::new();
        let worker_cancel = cancel.clone();
        let handle = spawn_worker(move || work(worker_cancel));
        tracing::info!(operation = operation.kind().label(), "remote call dispatched");
        self.pending = Some(PendingRemote {
            operation,
            cancel,
            handle,
        });
        Ok(())
    }

    fn ensure_can(&self, event: SessionEvent) -> SessionResult<()> {
        if self.machine.can_transition(event) {
            Ok(())
        } else if self.layers.is_none() && event != SessionEvent::LoadImage {
            Err(SessionError::NoImage)
        } else {
            Err(SessionError::Busy {
                phase: self.machine.phase(),
            })
        }
    }

    fn ensure_mask_editable(&self) -> SessionResult<()> {
        if self.layers.is_none() {
            return Err(SessionError::NoImage);
        }
        let phase = self.machine.phase();
        if phase.allows_mask_edits() {
            Ok(())
        } else {
            Err(SessionError::Busy { phase })
        }
    }
}

fn base_payload(layers: &CanvasLayers) -> SessionResult<ImagePayload> {
    let bytes = layers
        .encode_base_png()
        .map_err(|source| SessionError::Encode { source })?;
    Ok(ImagePayload::png(bytes))
}

fn decode_result(bytes: &[u8]) -> Result<RgbaImage, CanvasError> {
    let image = image::load_from_memory(bytes)
        .map_err(|source| CanvasError::Decode { source })?
        .to_rgba8();
    if image.width() == 0 || image.height() == 0 {
        return Err(CanvasError::EmptyImage);
    }
    Ok(image)
}
