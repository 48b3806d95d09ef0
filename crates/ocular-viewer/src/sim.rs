//! Deterministic simulated host. Serves one display, grants present
//! requests after a short delay, and synthesizes tracking snapshots with
//! a swaying head and two controllers.

use bytes::Bytes;
use ocular_vr::{DisplayHandle, HostError, HostEvent, LayerConfig, VrHost, MAT4_IDENTITY};
use ocular_wire::{
    ControllerRecord, DisplayCaps, DisplayEntry, DisplayTableBuilder, GamepadButton, HmdView,
    Pose, SnapshotBuilder,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

const FRAME_MS: f64 = 1000.0 / 60.0;
const READY_AFTER_MS: f64 = 50.0;
const GRANT_DELAY_TICKS: u32 = 3;
const PRESENT_DELAY_POLLS: u32 = 5;
const IPD_M: f32 = 0.064;

/// Failure modes the simulator can be armed with.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimFaults {
    /// Refuse every present request.
    pub refuse_present: bool,
    /// Grant requests but never actually start presenting.
    pub never_present: bool,
    /// Serve corrupted tracking bytes every Nth frame (0 disables).
    pub garbage_every: u32,
}

pub struct SimulatedHost {
    rng: StdRng,
    faults: SimFaults,
    now_ms: f64,
    display: DisplayHandle,
    pending_grant: Option<u32>,
    loop_running: bool,
    presenting: bool,
    present_polls: u32,
    frames_served: u64,
    events: Vec<HostEvent>,
}

impl SimulatedHost {
    pub fn new(seed: u64) -> Self {
        Self::with_faults(seed, SimFaults::default())
    }

    pub fn with_faults(seed: u64, faults: SimFaults) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            faults,
            now_ms: 0.0,
            display: DisplayHandle(1),
            pending_grant: None,
            loop_running: false,
            presenting: false,
            present_polls: 0,
            frames_served: 0,
            events: Vec::new(),
        }
    }

    /// Advance simulated time by one frame and fire any due callbacks.
    pub fn advance(&mut self) {
        self.now_ms += FRAME_MS;
        self.pending_grant = match self.pending_grant {
            Some(0) => {
                self.events.push(HostEvent::PresentGranted {
                    display: self.display,
                });
                None
            }
            Some(ticks) => Some(ticks - 1),
            None => None,
        };
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn synthesize_snapshot(&mut self) -> Bytes {
        let t = self.now_ms;
        let jitter = self.rng.gen_range(-0.002..0.002f32);
        let head_x = ((t / 900.0).sin() as f32) * 0.05 + jitter;
        let head_y = 1.7;
        let yaw = ((t / 2400.0).sin() as f32) * 0.3;
        let head_quat = yaw_quat(yaw);

        let trigger = (t / 800.0).sin() * 0.5 + 0.5;

        SnapshotBuilder::new(t)
            .hmd(HmdView {
                left_view: Some(eye_view(head_x - IPD_M / 2.0, head_y, 0.0)),
                left_projection: Some(perspective(1.1, 0.5 * 16.0 / 9.0, 0.1, 100.0)),
                right_view: Some(eye_view(head_x + IPD_M / 2.0, head_y, 0.0)),
                right_projection: Some(perspective(1.1, 0.5 * 16.0 / 9.0, 0.1, 100.0)),
                pose: Some(Pose {
                    position: Some([head_x, head_y, 0.0]),
                    orientation: Some(head_quat),
                    ..Pose::default()
                }),
            })
            .controller(ControllerRecord {
                index: 0,
                connected: true,
                id: "sim-left-hand".to_string(),
                mapping: "standard".to_string(),
                timestamp_ms: t,
                axes: vec![(t / 500.0).sin(), (t / 500.0).cos()],
                buttons: vec![GamepadButton {
                    pressed: trigger > 0.5,
                    touched: trigger > 0.1,
                    value: trigger,
                }],
                pose: Some(Pose {
                    position: Some([
                        head_x - 0.18,
                        1.35 + ((t / 700.0).sin() as f32) * 0.03,
                        -0.35,
                    ]),
                    orientation: Some(head_quat),
                    ..Pose::default()
                }),
            })
            // Tracker without positional data; downstream applies the
            // rest-position correction.
            .controller(ControllerRecord {
                index: 1,
                connected: true,
                id: "sim-right-hand".to_string(),
                mapping: "standard".to_string(),
                timestamp_ms: t,
                pose: Some(Pose {
                    orientation: Some(head_quat),
                    ..Pose::default()
                }),
                ..ControllerRecord::default()
            })
            .build()
    }

    fn garbage(&mut self) -> Bytes {
        let len = self.rng.gen_range(1..64usize);
        let mut junk = vec![0u8; len];
        self.rng.fill(&mut junk[..]);
        Bytes::from(junk)
    }
}

impl VrHost for SimulatedHost {
    fn vr_ready(&mut self) -> bool {
        self.now_ms >= READY_AFTER_MS
    }

    fn enumerate_displays(&mut self) -> Bytes {
        DisplayTableBuilder::new()
            .display(DisplayEntry {
                handle: self.display.0,
                caps: DisplayCaps::CAN_PRESENT | DisplayCaps::HAS_POSITION,
                max_layers: 1,
                name: "Ocular Sim HMD".to_string(),
            })
            .build()
    }

    fn is_presenting(&mut self, display: DisplayHandle) -> bool {
        if display != self.display {
            return false;
        }
        if self.presenting {
            return true;
        }
        if self.loop_running && !self.faults.never_present {
            self.present_polls += 1;
            if self.present_polls >= PRESENT_DELAY_POLLS {
                self.presenting = true;
            }
        }
        self.presenting
    }

    fn request_present(
        &mut self,
        display: DisplayHandle,
        layer: &LayerConfig,
    ) -> Result<(), HostError> {
        if display != self.display {
            return Err(HostError::Unavailable("unknown display".to_string()));
        }
        if self.faults.refuse_present {
            return Err(HostError::Refused("present refused by policy".to_string()));
        }
        debug!(
            left = ?layer.left_bounds,
            right = ?layer.right_bounds,
            "present request accepted"
        );
        self.pending_grant = Some(GRANT_DELAY_TICKS);
        Ok(())
    }

    fn start_render_loop(&mut self, display: DisplayHandle) -> Result<(), HostError> {
        if display != self.display {
            return Err(HostError::Unavailable("unknown display".to_string()));
        }
        self.loop_running = true;
        self.present_polls = 0;
        Ok(())
    }

    fn acquire_tracking(&mut self, _display: DisplayHandle) -> Bytes {
        self.frames_served += 1;
        let nth = self.faults.garbage_every as u64;
        if nth > 0 && self.frames_served % nth == 0 {
            return self.garbage();
        }
        self.synthesize_snapshot()
    }

    fn submit_frame(&mut self, _display: DisplayHandle) -> bool {
        true
    }

    fn cancel_render_loop(&mut self, display: DisplayHandle) {
        if display != self.display {
            return;
        }
        self.loop_running = false;
        self.presenting = false;
        self.pending_grant = None;
    }

    fn poll_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Quaternion for a rotation about +Y, scalar-last.
fn yaw_quat(angle_rad: f32) -> [f32; 4] {
    let half = angle_rad / 2.0;
    [0.0, half.sin(), 0.0, half.cos()]
}

/// Row-major view matrix for an eye at the given position, looking down -Z.
fn eye_view(x: f32, y: f32, z: f32) -> [f32; 16] {
    let mut m = MAT4_IDENTITY;
    m[3] = -x;
    m[7] = -y;
    m[11] = -z;
    m
}

/// Row-major perspective projection.
fn perspective(fov_y_rad: f32, aspect: f32, near: f32, far: f32) -> [f32; 16] {
    let f = 1.0 / (fov_y_rad / 2.0).tan();
    let nf = 1.0 / (near - far);
    let mut m = [0.0; 16];
    m[0] = f / aspect;
    m[5] = f;
    m[10] = (far + near) * nf;
    m[11] = 2.0 * far * near * nf;
    m[14] = -1.0;
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::painter::TracePainter;
    use ocular_vr::{decode, SessionController, SessionMode};
    use ocular_wire::{TrackingSchema, Verified};

    #[test]
    fn simulated_snapshots_decode() {
        let mut host = SimulatedHost::new(11);
        for _ in 0..10 {
            host.advance();
        }
        let display = host.display;
        let tracked =
            Verified::<TrackingSchema>::acquire(|| host.acquire_tracking(display)).unwrap();
        let view = tracked.view().unwrap();
        let state = decode(&view);

        assert!(state.eyes.is_some());
        assert!(state.controllers[0].is_some());
        assert!(state.controllers[1].is_some());
        assert!(state.timestamp_ms > 0.0);
    }

    #[test]
    fn full_loop_reaches_presenting() {
        let host = SimulatedHost::new(7);
        let mut painter = TracePainter::new(1280, 720);
        let mut session = SessionController::new(host, LayerConfig::default());

        for _ in 0..120 {
            session.host_mut().advance();
            if matches!(session.mode(), SessionMode::AwaitingReady { .. }) {
                session.enter_vr();
            }
            session.tick(&mut painter);
        }

        assert!(session.mode().is_presenting());
        assert!(session.use_vr());
        assert!(session.frames_submitted() > 0);
        assert!(painter.stereo_draws > 0);
        assert!(painter.mono_draws > 0);
    }

    #[test]
    fn refusal_disables_vr_for_the_session() {
        let host = SimulatedHost::with_faults(
            7,
            SimFaults {
                refuse_present: true,
                ..SimFaults::default()
            },
        );
        let mut painter = TracePainter::new(640, 480);
        let mut session = SessionController::new(host, LayerConfig::default());

        for _ in 0..60 {
            session.host_mut().advance();
            if matches!(session.mode(), SessionMode::AwaitingReady { .. }) {
                session.enter_vr();
            }
            session.tick(&mut painter);
        }

        assert!(!session.use_vr());
        assert_eq!(session.mode(), SessionMode::Normal);
        assert_eq!(painter.stereo_draws, 0);
    }

    #[test]
    fn garbage_frames_do_not_end_the_session() {
        let host = SimulatedHost::with_faults(
            7,
            SimFaults {
                garbage_every: 2,
                ..SimFaults::default()
            },
        );
        let mut painter = TracePainter::new(1280, 720);
        let mut session = SessionController::new(host, LayerConfig::default());

        for _ in 0..200 {
            session.host_mut().advance();
            if matches!(session.mode(), SessionMode::AwaitingReady { .. }) {
                session.enter_vr();
            }
            session.tick(&mut painter);
        }

        assert!(session.mode().is_presenting());
        assert!(session.use_vr());
        // Roughly half the presenting ticks submitted a frame.
        assert!(session.frames_submitted() > 50);
    }
}
