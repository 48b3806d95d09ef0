//! Stereo rendering core.
//!
//! This crate provides:
//! - Pose math: quaternion transforms, matrix multiply-add, DoF classification
//! - Tracking decode: verified snapshot to per-frame render parameters
//! - Session control: discovery, presentation lifecycle, bounded waits
//! - The host and painter seams the embedder implements
//!
//! Everything is single-threaded and driven by the embedder's frame loop.

#![forbid(unsafe_code)]

pub mod decode;
pub mod host;
pub mod math;
pub mod render;
pub mod session;
pub mod types;

pub use decode::{decode, object_model_matrix, CONTROLLER_SLOTS};
pub use host::{HostError, HostEvent, ScenePainter, VrHost};
pub use math::{mat4_mul_add, pose_matrix, translation_delta, PoseDof};
pub use render::{MonoPath, RenderPath, StereoPath};
pub use session::{SessionController, SessionMode, PRESENT_POLL_LIMIT};
pub use types::{
    DisplayHandle, DisplayInfo, EyePair, EyeParams, LayerConfig, Mat4, RenderState, MAT4_IDENTITY,
};

use ocular_wire::WireError;
use thiserror::Error;

/// Terminal failures: any of these permanently disables the VR attempt
/// for the lifetime of the controller. The app keeps running in non-VR
/// mode.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no VR displays available")]
    NoDisplays,
    #[error("display discovery failed: {0}")]
    Discovery(#[from] WireError),
    #[error("present request failed: {0}")]
    PresentRequest(String),
    #[error("display not presenting after {0} polls")]
    PresentTimeout(u32),
    #[error("render loop cancelled by host")]
    LoopCancelled,
}

/// Per-frame failures during active presentation; the frame is abandoned
/// and the session keeps presenting.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("tracking snapshot rejected: {0}")]
    Tracking(#[from] WireError),
    #[error("frame submit rejected by host")]
    SubmitRejected,
}
