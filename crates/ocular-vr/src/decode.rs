//! Snapshot decode: verified tracking bytes to per-frame render parameters.

use std::f64::consts::PI;

use ocular_wire::{ControllerView, SnapshotView};

use crate::math::{mat4_mul_add, pose_matrix, translation_delta, PoseDof};
use crate::types::{EyePair, EyeParams, Mat4, RenderState, MAT4_IDENTITY};

/// Controller slots the render core draws: 0 left hand, 1 right hand.
pub const CONTROLLER_SLOTS: usize = 2;

/// Rest offsets (meters) applied to controllers reporting less than full
/// tracking, so they hang in front of the viewer instead of at the origin.
const HAND_REST_OFFSET: [[f32; 3]; CONTROLLER_SLOTS] = [[-0.175, -0.3, -0.4], [0.175, -0.3, -0.4]];

/// Decode one snapshot into render parameters.
///
/// Pure and total: missing data degrades to identity matrices, disabled
/// eyes, or empty controller slots, never an error. A snapshot without
/// HMD state yields `eyes: None`; the caller skips the stereo draw for
/// that frame.
pub fn decode(snapshot: &SnapshotView<'_>) -> RenderState {
    let object_model = object_model_matrix(snapshot.timestamp_ms);

    let Some(hmd) = &snapshot.hmd else {
        return RenderState {
            timestamp_ms: snapshot.timestamp_ms,
            eyes: None,
            controllers: [None; CONTROLLER_SLOTS],
            object_model,
        };
    };

    let eyes = EyePair {
        left: eye_params(hmd.left_view, hmd.left_projection),
        right: eye_params(hmd.right_view, hmd.right_projection),
    };

    let mut controllers = [None; CONTROLLER_SLOTS];
    for pad in &snapshot.controllers {
        let slot = pad.index as usize;
        if slot >= CONTROLLER_SLOTS {
            continue;
        }
        if let Some(model) = controller_model(pad, slot) {
            controllers[slot] = Some(model);
        }
    }

    RenderState {
        timestamp_ms: snapshot.timestamp_ms,
        eyes: Some(eyes),
        controllers,
        object_model,
    }
}

fn eye_params(view: Option<Mat4>, projection: Option<Mat4>) -> EyeParams {
    EyeParams {
        view: view.unwrap_or(MAT4_IDENTITY),
        projection: projection.unwrap_or(MAT4_IDENTITY),
        enabled: view.is_some() || projection.is_some(),
    }
}

/// Model matrix for one controller record, or None when it carries no pose.
fn controller_model(pad: &ControllerView<'_>, slot: usize) -> Option<Mat4> {
    let pose = pad.pose.as_ref()?;
    let dof = PoseDof::of(Some(pose));

    let [px, py, pz] = pose.position.unwrap_or([0.0; 3]);
    // Wire orientation is scalar-last; the math wants scalar-first.
    let [qx, qy, qz, qw] = pose.orientation.unwrap_or([0.0, 0.0, 0.0, 1.0]);

    let model = pose_matrix(
        [qw as f64, qx as f64, qy as f64, qz as f64],
        [px as f64, py as f64, pz as f64],
    );

    if dof.is_full() {
        Some(model)
    } else {
        Some(mat4_mul_add(
            &model,
            &MAT4_IDENTITY,
            &translation_delta(HAND_REST_OFFSET[slot]),
        ))
    }
}

/// Demo object transform: a slow spin about Y with a sideways bob, derived
/// purely from the snapshot timestamp so repeated decodes agree.
pub fn object_model_matrix(timestamp_ms: f64) -> Mat4 {
    let q = PI * (timestamp_ms / 1000.0) / 2.0;
    let (sin_q, cos_q) = q.sin_cos();
    let (s, c) = (sin_q as f32, cos_q as f32);

    #[rustfmt::skip]
    let m: Mat4 = [
        c,   0.0, -s,  1.25 + s,
        0.0, 1.0, 0.0, 0.0,
        s,   0.0, c,   0.0,
        0.0, 0.0, 0.0, 1.0,
    ];
    m
}
