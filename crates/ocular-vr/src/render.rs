//! Render path strategies, selected by the session state machine.

use crate::host::ScenePainter;
use crate::types::RenderState;

/// One update+draw pairing. The controller decides which path is active
/// each frame from its session state; only one path runs per tick.
pub trait RenderPath {
    fn update(&mut self, painter: &mut dyn ScenePainter);
    fn draw(&mut self, painter: &mut dyn ScenePainter, frame: &RenderState);
}

/// Single-view path; owns the buffer swap.
#[derive(Debug, Default)]
pub struct MonoPath;

impl RenderPath for MonoPath {
    fn update(&mut self, painter: &mut dyn ScenePainter) {
        let (width, height) = painter.surface_size();
        painter.resize(width, height);
    }

    fn draw(&mut self, painter: &mut dyn ScenePainter, _frame: &RenderState) {
        painter.draw_mono();
        painter.swap_buffers();
    }
}

/// Stereo path. No swap here: the host owns frame pacing, so the
/// controller hands finished frames to [`crate::VrHost::submit_frame`].
#[derive(Debug, Default)]
pub struct StereoPath;

impl RenderPath for StereoPath {
    fn update(&mut self, painter: &mut dyn ScenePainter) {
        let (width, height) = painter.surface_size();
        painter.resize(width, height);
    }

    fn draw(&mut self, painter: &mut dyn ScenePainter, frame: &RenderState) {
        painter.draw_stereo(frame);
    }
}
