use lovelens_core::{Commentary, Language, Layout, LensError, Mode};
use tokio::sync::oneshot;

/// Operator actions on the host display.
#[derive(Debug)]
pub enum HostCommand {
    SetMode(Mode),
    SetLayout(Layout),
    SetLanguage(Language),
    /// Judge the feed on screen; the reply carries the commentary shown.
    Judge {
        reply: oneshot::Sender<Result<Commentary, LensError>>,
    },
    Leave,
}

/// Operator actions on a camera.
#[derive(Debug)]
pub enum CameraCommand {
    SendLayout {
        layout: Layout,
        reply: oneshot::Sender<Result<(), LensError>>,
    },
    ToggleFacing,
    RestartCapture,
    Leave,
}
