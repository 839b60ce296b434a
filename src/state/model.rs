/// Where the editing session is in its lifecycle.
///
/// The remote phases are mutually exclusive: at most one service call is in
/// flight per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No photo loaded.
    #[default]
    Empty,
    /// Photo loaded; the mask can be edited and remote work can start.
    Ready,
    /// Waiting for the segmentation service. Mask edits are refused.
    AutoMasking,
    /// Waiting for the edit service.
    Editing,
    /// Waiting for the upscale service.
    Upscaling,
}

impl SessionPhase {
    pub const fn allows_mask_edits(self) -> bool {
        matches!(self, Self::Ready | Self::Editing | Self::Upscaling)
    }
}
