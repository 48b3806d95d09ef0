//! Collaborator seams: the embedding host and the draw layer.

use bytes::Bytes;
use thiserror::Error;

use crate::types::{DisplayHandle, LayerConfig, RenderState};

#[derive(Debug, Error)]
pub enum HostError {
    #[error("host refused: {0}")]
    Refused(String),
    #[error("host unavailable: {0}")]
    Unavailable(String),
}

/// Host-side notifications, polled once per tick.
///
/// What would be callbacks in the host environment arrive as events, so
/// every transition runs inside `tick` and re-entrancy reduces to state
/// checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// An earlier present request was granted.
    PresentGranted { display: DisplayHandle },
    /// The host tore the render loop down (device lost, surface hidden,
    /// user exit).
    RenderLoopCancelled { display: DisplayHandle },
}

/// Everything the session controller needs from the embedding host.
///
/// The two producers return raw bytes; empty means "nothing available"
/// and surfaces through the wire layer as an acquisition failure.
pub trait VrHost {
    /// Readiness check; discovery is deferred, not failed, while false.
    fn vr_ready(&mut self) -> bool;

    /// Display table payload ([`ocular_wire::DisplayTableSchema`]).
    fn enumerate_displays(&mut self) -> Bytes;

    fn is_presenting(&mut self, display: DisplayHandle) -> bool;

    fn request_present(
        &mut self,
        display: DisplayHandle,
        layer: &LayerConfig,
    ) -> Result<(), HostError>;

    /// Redirect the frame loop to the display's refresh after a grant.
    fn start_render_loop(&mut self, display: DisplayHandle) -> Result<(), HostError>;

    /// Tracking snapshot payload ([`ocular_wire::TrackingSchema`]).
    fn acquire_tracking(&mut self, display: DisplayHandle) -> Bytes;

    /// True when the frame was accepted for presentation.
    fn submit_frame(&mut self, display: DisplayHandle) -> bool;

    fn cancel_render_loop(&mut self, display: DisplayHandle);

    fn poll_events(&mut self) -> Vec<HostEvent>;
}

/// The draw layer. Pure mechanism: issues draw calls for whatever state
/// it is handed, holds no session logic.
pub trait ScenePainter {
    /// Client size of the output surface.
    fn surface_size(&mut self) -> (u32, u32);
    fn resize(&mut self, width: u32, height: u32);
    fn draw_mono(&mut self);
    fn draw_stereo(&mut self, frame: &RenderState);
    /// Hand the finished mono frame to the windowing system. Stereo frames
    /// go through [`VrHost::submit_frame`] instead.
    fn swap_buffers(&mut self);
}
