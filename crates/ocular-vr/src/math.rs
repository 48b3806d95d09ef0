//! Row-major pose math, hand-expanded.

use ocular_wire::Pose;

use crate::types::Mat4;

/// Build the homogeneous transform for a unit quaternion and position.
///
/// The quaternion is scalar-first `(w, x, y, z)`; wire orientations ride
/// scalar-last and must be reordered by the caller. Inputs are f64, the
/// narrowing to f32 happens here, exactly once. No normalization and no
/// NaN filtering: inputs already passed wire validation.
pub fn pose_matrix(q: [f64; 4], position: [f64; 3]) -> Mat4 {
    let [w, x, y, z] = q;
    let [px, py, pz] = position;

    [
        (1.0 - 2.0 * y * y - 2.0 * z * z) as f32,
        (2.0 * x * y - 2.0 * z * w) as f32,
        (2.0 * x * z + 2.0 * y * w) as f32,
        px as f32,
        (2.0 * x * y + 2.0 * z * w) as f32,
        (1.0 - 2.0 * x * x - 2.0 * z * z) as f32,
        (2.0 * y * z - 2.0 * x * w) as f32,
        py as f32,
        (2.0 * x * z - 2.0 * y * w) as f32,
        (2.0 * y * z + 2.0 * x * w) as f32,
        (1.0 - 2.0 * x * x - 2.0 * y * y) as f32,
        pz as f32,
        0.0,
        0.0,
        0.0,
        1.0,
    ]
}

/// `a * b + c` with elementwise add, row-major.
///
/// The product lands in a fresh output, so writing the result back over
/// any input (`m = mat4_mul_add(&m, &b, &m)`) matches the non-aliased
/// computation.
pub fn mat4_mul_add(a: &Mat4, b: &Mat4, c: &Mat4) -> Mat4 {
    let mut out = [0f32; 16];
    for row in 0..4 {
        for col in 0..4 {
            let mut acc = 0f32;
            for k in 0..4 {
                acc += a[row * 4 + k] * b[k * 4 + col];
            }
            out[row * 4 + col] = acc + c[row * 4 + col];
        }
    }
    out
}

/// Additive delta with `t` in the translation slots and zeros elsewhere.
/// Feeding this as the `c` of [`mat4_mul_add`] nudges a transform without
/// touching its rotation.
pub fn translation_delta(t: [f32; 3]) -> Mat4 {
    let mut m = [0f32; 16];
    m[3] = t[0];
    m[7] = t[1];
    m[11] = t[2];
    m
}

/// Degrees of freedom carried by a pose.
///
/// The discriminants are part of the outward contract: -1 unknown, 0
/// fixed in space, 3 position only, 6 full tracking. Variant order
/// follows the discriminants so `dof < PoseDof::Full` reads naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(i8)]
pub enum PoseDof {
    Indeterminate = -1,
    Fixed = 0,
    Positional = 3,
    Full = 6,
}

impl PoseDof {
    /// Classify a decoded pose. No position means the device is fixed in
    /// space regardless of orientation; position without orientation is
    /// positional-only.
    pub fn of(pose: Option<&Pose>) -> Self {
        let Some(pose) = pose else {
            return PoseDof::Indeterminate;
        };
        if pose.position.is_none() {
            PoseDof::Fixed
        } else if pose.orientation.is_none() {
            PoseDof::Positional
        } else {
            PoseDof::Full
        }
    }

    pub fn is_full(self) -> bool {
        self == PoseDof::Full
    }
}
