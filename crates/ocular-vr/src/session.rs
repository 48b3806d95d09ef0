//! VR session control: discovery, presentation lifecycle, frame loop.
//!
//! Single-threaded and cooperatively scheduled. The embedder calls
//! [`SessionController::tick`] once per frame and [`SessionController::enter_vr`]
//! from its input path; host callbacks arrive as polled events consumed at
//! the top of the tick. Every transition therefore runs on the tick call
//! stack, and re-entrant triggers (double clicks, duplicate grants, stale
//! cancellations) reduce to state checks that make them no-ops.

use ocular_wire::{DisplayTableSchema, TrackingSchema, Verified};
use tracing::{debug, info, warn};

use crate::decode::decode;
use crate::host::{HostEvent, ScenePainter, VrHost};
use crate::render::{MonoPath, RenderPath, StereoPath};
use crate::types::{DisplayHandle, DisplayInfo, LayerConfig, RenderState};
use crate::{FrameError, SessionError};

/// Failed `is_presenting` polls tolerated before the attempt is abandoned.
pub const PRESENT_POLL_LIMIT: u32 = 1000;

/// Decoded frames described at debug level before that log goes quiet.
const FRAME_LOG_BUDGET: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Non-VR rendering; discovery runs here while `use_vr` holds.
    Normal,
    /// Display bound, waiting for the user to trigger entry.
    AwaitingReady { display: DisplayHandle },
    /// Present request sent, waiting for the host to grant it.
    Requested { display: DisplayHandle },
    /// Grant received, polling until the display actually presents.
    WaitingPresent { display: DisplayHandle, polls: u32 },
    /// Stereo frame loop.
    Presenting { display: DisplayHandle },
}

impl SessionMode {
    pub fn display(&self) -> Option<DisplayHandle> {
        match *self {
            SessionMode::Normal => None,
            SessionMode::AwaitingReady { display }
            | SessionMode::Requested { display }
            | SessionMode::WaitingPresent { display, .. }
            | SessionMode::Presenting { display } => Some(display),
        }
    }

    pub fn is_presenting(&self) -> bool {
        matches!(self, SessionMode::Presenting { .. })
    }
}

pub struct SessionController<H: VrHost> {
    host: H,
    layer: LayerConfig,
    mode: SessionMode,
    /// Sticky: starts true, cleared once by the first terminal failure,
    /// never set again for this controller's lifetime.
    use_vr: bool,
    render_state: RenderState,
    normal_path: Box<dyn RenderPath>,
    stereo_path: Box<dyn RenderPath>,
    frames_submitted: u64,
    frame_log_budget: u32,
}

impl<H: VrHost> SessionController<H> {
    pub fn new(host: H, layer: LayerConfig) -> Self {
        Self::with_paths(host, layer, Box::new(MonoPath), Box::new(StereoPath))
    }

    /// Construction with explicit path strategies: instrumented doubles in
    /// tests, alternative pipelines in embedders.
    pub fn with_paths(
        host: H,
        layer: LayerConfig,
        normal_path: Box<dyn RenderPath>,
        stereo_path: Box<dyn RenderPath>,
    ) -> Self {
        Self {
            host,
            layer,
            mode: SessionMode::Normal,
            use_vr: true,
            render_state: RenderState::default(),
            normal_path,
            stereo_path,
            frames_submitted: 0,
            frame_log_budget: FRAME_LOG_BUDGET,
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// True until the first terminal failure.
    pub fn use_vr(&self) -> bool {
        self.use_vr
    }

    pub fn display(&self) -> Option<DisplayHandle> {
        self.mode.display()
    }

    /// Latest decoded frame parameters; stable between ticks.
    pub fn render_state(&self) -> &RenderState {
        &self.render_state
    }

    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Advance one frame. Never panics and never blocks; terminal failures
    /// drop back to the normal path with `use_vr` cleared.
    pub fn tick(&mut self, painter: &mut dyn ScenePainter) {
        self.service_host_events();

        match self.mode {
            SessionMode::Normal
            | SessionMode::AwaitingReady { .. }
            | SessionMode::Requested { .. } => {
                self.normal_path.update(painter);
                self.normal_path.draw(painter, &self.render_state);

                match self.mode {
                    SessionMode::Normal => self.maybe_discover(),
                    SessionMode::AwaitingReady { display } => self.maybe_resume(display),
                    _ => {}
                }
            }
            SessionMode::WaitingPresent { display, polls } => {
                self.poll_for_presentation(display, polls);
            }
            SessionMode::Presenting { display } => {
                if let Err(err) = self.present_frame(display, painter) {
                    warn!(error = %err, "frame abandoned");
                }
            }
        }
    }

    /// User-triggered entry into VR; the embedder wires its input path
    /// (button, key, gesture) here. A no-op outside AwaitingReady.
    pub fn enter_vr(&mut self) {
        // Locals here avoid the name `display`: tracing macro expansions
        // import `tracing::field::display`, which shadows it.
        let SessionMode::AwaitingReady { display: handle } = self.mode else {
            debug!(mode = ?self.mode, "enter-vr ignored in current mode");
            return;
        };
        match self.host.request_present(handle, &self.layer) {
            Ok(()) => {
                info!(display = handle.0, "presentation requested");
                self.mode = SessionMode::Requested { display: handle };
            }
            Err(err) => self.abort_vr(SessionError::PresentRequest(err.to_string())),
        }
    }

    fn service_host_events(&mut self) {
        for event in self.host.poll_events() {
            match event {
                HostEvent::PresentGranted { display } => self.on_present_granted(display),
                HostEvent::RenderLoopCancelled { display } => self.on_loop_cancelled(display),
            }
        }
    }

    fn on_present_granted(&mut self, handle: DisplayHandle) {
        let SessionMode::Requested { display: requested } = self.mode else {
            debug!(display = handle.0, "present grant ignored in current mode");
            return;
        };
        if requested != handle {
            debug!(display = handle.0, "present grant for unrequested display ignored");
            return;
        }
        match self.host.start_render_loop(handle) {
            Ok(()) => {
                info!(display = handle.0, "present granted; waiting for display");
                self.mode = SessionMode::WaitingPresent { display: handle, polls: 0 };
            }
            Err(err) => self.abort_vr(SessionError::PresentRequest(err.to_string())),
        }
    }

    fn on_loop_cancelled(&mut self, handle: DisplayHandle) {
        if self.mode.display() != Some(handle) {
            debug!(display = handle.0, "loop cancellation for unbound display ignored");
            return;
        }
        self.abort_vr(SessionError::LoopCancelled);
    }

    fn maybe_discover(&mut self) {
        if !self.use_vr {
            return;
        }
        if !self.host.vr_ready() {
            debug!("host not ready; retrying discovery next frame");
            return;
        }
        match self.discover() {
            Ok(info) => {
                info!(display = info.handle.0, name = %info.name, "bound first display");
                self.mode = SessionMode::AwaitingReady {
                    display: info.handle,
                };
                self.maybe_resume(info.handle);
            }
            Err(err) => self.abort_vr(err),
        }
    }

    fn discover(&mut self) -> Result<DisplayInfo, SessionError> {
        let table = Verified::<DisplayTableSchema>::acquire(|| self.host.enumerate_displays())?;
        let view = table.view()?;
        if view.displays.is_empty() {
            return Err(SessionError::NoDisplays);
        }
        for record in &view.displays {
            debug!(
                handle = record.handle,
                caps = ?record.caps,
                max_layers = record.max_layers,
                name = record.name,
                "display enumerated"
            );
        }
        let first = &view.displays[0];
        Ok(DisplayInfo {
            handle: DisplayHandle(first.handle),
            name: first.name.to_string(),
            caps: first.caps,
            max_layers: first.max_layers,
        })
    }

    /// A display the host already reports as presenting skips the request
    /// dance entirely; re-entry after a page reload works this way.
    fn maybe_resume(&mut self, handle: DisplayHandle) {
        if self.host.is_presenting(handle) {
            info!(display = handle.0, "display already presenting; resuming");
            self.mode = SessionMode::Presenting { display: handle };
        }
    }

    fn poll_for_presentation(&mut self, handle: DisplayHandle, polls: u32) {
        if self.host.is_presenting(handle) {
            info!(display = handle.0, polls, "display presenting; entering stereo loop");
            self.mode = SessionMode::Presenting { display: handle };
            return;
        }
        let polls = polls + 1;
        if polls > PRESENT_POLL_LIMIT {
            self.abort_vr(SessionError::PresentTimeout(PRESENT_POLL_LIMIT));
            return;
        }
        debug!(display = handle.0, polls, "waiting for display to begin presenting");
        self.mode = SessionMode::WaitingPresent { display: handle, polls };
    }

    fn present_frame(
        &mut self,
        display: DisplayHandle,
        painter: &mut dyn ScenePainter,
    ) -> Result<(), FrameError> {
        self.stereo_path.update(painter);

        let tracked = Verified::<TrackingSchema>::acquire(|| self.host.acquire_tracking(display))?;
        let snapshot = tracked.view()?;
        let frame = decode(&snapshot);

        self.render_state = frame;
        self.log_frame(&frame);

        if frame.eyes.is_none() {
            debug!("snapshot without hmd state; stereo draw skipped");
            return Ok(());
        }

        self.stereo_path.draw(painter, &frame);
        if !self.host.submit_frame(display) {
            return Err(FrameError::SubmitRejected);
        }
        self.frames_submitted += 1;
        Ok(())
    }

    fn log_frame(&mut self, frame: &RenderState) {
        if self.frame_log_budget == 0 {
            return;
        }
        self.frame_log_budget -= 1;
        debug!(
            timestamp_ms = frame.timestamp_ms,
            has_eyes = frame.eyes.is_some(),
            left_controller = frame.controllers[0].is_some(),
            right_controller = frame.controllers[1].is_some(),
            "decoded frame"
        );
    }

    /// Single funnel for terminal failures. Every fallible transition path
    /// reaches this through its error return, so the VR attempt is torn
    /// down exactly once: render loop cancelled where one is running,
    /// `use_vr` cleared, mode and active path back to normal.
    fn abort_vr(&mut self, err: SessionError) {
        warn!(error = %err, "disabling VR for this session");
        if let SessionMode::WaitingPresent { display, .. } | SessionMode::Presenting { display } =
            self.mode
        {
            // Host-initiated cancellation already tore the loop down.
            if !matches!(err, SessionError::LoopCancelled) {
                self.host.cancel_render_loop(display);
            }
        }
        self.use_vr = false;
        self.mode = SessionMode::Normal;
        self.render_state = RenderState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use crate::host::HostError;

    struct IdleHost;

    impl VrHost for IdleHost {
        fn vr_ready(&mut self) -> bool {
            false
        }
        fn enumerate_displays(&mut self) -> Bytes {
            Bytes::new()
        }
        fn is_presenting(&mut self, _display: DisplayHandle) -> bool {
            false
        }
        fn request_present(
            &mut self,
            _display: DisplayHandle,
            _layer: &LayerConfig,
        ) -> Result<(), HostError> {
            Err(HostError::Unavailable("idle".into()))
        }
        fn start_render_loop(&mut self, _display: DisplayHandle) -> Result<(), HostError> {
            Err(HostError::Unavailable("idle".into()))
        }
        fn acquire_tracking(&mut self, _display: DisplayHandle) -> Bytes {
            Bytes::new()
        }
        fn submit_frame(&mut self, _display: DisplayHandle) -> bool {
            false
        }
        fn cancel_render_loop(&mut self, _display: DisplayHandle) {}
        fn poll_events(&mut self) -> Vec<HostEvent> {
            Vec::new()
        }
    }

    struct NullPainter;

    impl ScenePainter for NullPainter {
        fn surface_size(&mut self) -> (u32, u32) {
            (640, 480)
        }
        fn resize(&mut self, _width: u32, _height: u32) {}
        fn draw_mono(&mut self) {}
        fn draw_stereo(&mut self, _frame: &RenderState) {}
        fn swap_buffers(&mut self) {}
    }

    #[test]
    fn starts_in_normal_with_vr_enabled() {
        let session = SessionController::new(IdleHost, LayerConfig::default());
        assert_eq!(session.mode(), SessionMode::Normal);
        assert!(session.use_vr());
        assert!(session.display().is_none());
    }

    #[test]
    fn not_ready_host_defers_discovery_without_failing() {
        let mut session = SessionController::new(IdleHost, LayerConfig::default());
        let mut painter = NullPainter;
        for _ in 0..50 {
            session.tick(&mut painter);
        }
        assert_eq!(session.mode(), SessionMode::Normal);
        assert!(session.use_vr());
    }

    #[test]
    fn enter_vr_outside_awaiting_ready_is_a_noop() {
        let mut session = SessionController::new(IdleHost, LayerConfig::default());
        session.enter_vr();
        assert_eq!(session.mode(), SessionMode::Normal);
        assert!(session.use_vr());
    }

    #[test]
    fn mode_display_projection() {
        let display = DisplayHandle(3);
        assert_eq!(SessionMode::Normal.display(), None);
        assert_eq!(
            SessionMode::WaitingPresent { display, polls: 9 }.display(),
            Some(display)
        );
        assert!(SessionMode::Presenting { display }.is_presenting());
        assert!(!SessionMode::Requested { display }.is_presenting());
    }
}
