//! Painter that logs draw traffic instead of rendering. Stands in for a
//! real graphics backend in the simulator.

use ocular_vr::{RenderState, ScenePainter};
use tracing::{debug, trace};

#[derive(Debug)]
pub struct TracePainter {
    width: u32,
    height: u32,
    pub mono_draws: u64,
    pub stereo_draws: u64,
    pub swaps: u64,
}

impl TracePainter {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            mono_draws: 0,
            stereo_draws: 0,
            swaps: 0,
        }
    }
}

impl ScenePainter for TracePainter {
    fn surface_size(&mut self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        if (width, height) != (self.width, self.height) {
            debug!(width, height, "surface resized");
            self.width = width;
            self.height = height;
        }
    }

    fn draw_mono(&mut self) {
        self.mono_draws += 1;
        trace!("mono draw");
    }

    fn draw_stereo(&mut self, frame: &RenderState) {
        self.stereo_draws += 1;
        trace!(
            timestamp_ms = frame.timestamp_ms,
            left_controller = frame.controllers[0].is_some(),
            right_controller = frame.controllers[1].is_some(),
            "stereo draw"
        );
    }

    fn swap_buffers(&mut self) {
        self.swaps += 1;
    }
}
