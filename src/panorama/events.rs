//! Signals emitted by panoramas.

use std::fmt;

use hecs::Entity;

/// Something the panorama asks of whichever viewer is listening.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewerRequest {
    /// Make `0` the active panorama.
    SetPanorama(Entity),
}

/// Payload of a panorama signal.
#[derive(Clone, Debug, PartialEq)]
pub enum PanoramaEventKind {
    /// Content finished loading.
    Load,
    /// Loading progress in `[0, 1]`, forwarded unchanged from the loader.
    Progress(f32),
    /// Loading failed.
    Error(String),
    /// `on_enter` was called.
    Enter,
    /// The enter transition's delay elapsed and it began.
    EnterStart,
    /// `on_leave` was called.
    Leave,
    /// A request for the viewer, e.g. from a clicked link marker.
    ViewerRequest(ViewerRequest),
}

impl PanoramaEventKind {
    /// Stable signal name, for logs and bridges to string-keyed event systems.
    pub fn name(&self) -> &'static str {
        match self {
            PanoramaEventKind::Load => "load",
            PanoramaEventKind::Progress(_) => "progress",
            PanoramaEventKind::Error(_) => "error",
            PanoramaEventKind::Enter => "enter",
            PanoramaEventKind::EnterStart => "enter-start",
            PanoramaEventKind::Leave => "leave",
            PanoramaEventKind::ViewerRequest(_) => "panolens-viewer-handler",
        }
    }
}

/// A signal from one panorama.
#[derive(Clone, Debug, PartialEq)]
pub struct PanoramaEvent {
    pub panorama: Entity,
    pub kind: PanoramaEventKind,
}

impl fmt::Display for PanoramaEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.panorama.id();
        match &self.kind {
            PanoramaEventKind::Progress(progress) => {
                write!(f, "progress panorama={id} progress={progress:.3}")
            }
            PanoramaEventKind::Error(reason) => write!(f, "error panorama={id} reason={reason}"),
            PanoramaEventKind::ViewerRequest(ViewerRequest::SetPanorama(target)) => write!(
                f,
                "{} panorama={id} method=setPanorama data={}",
                self.kind.name(),
                target.id()
            ),
            kind => write!(f, "{} panorama={id}", kind.name()),
        }
    }
}
