use ocular_wire::DisplayCaps;

/// Row-major 4x4 matrix, the currency of the wire contract and the
/// painter interface.
pub type Mat4 = [f32; 16];

#[rustfmt::skip]
pub const MAT4_IDENTITY: Mat4 = [
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 1.0, 0.0,
    0.0, 0.0, 0.0, 1.0,
];

/// Opaque handle the host uses to address one display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayHandle(pub u32);

/// Decoded display enumeration entry.
#[derive(Debug, Clone)]
pub struct DisplayInfo {
    pub handle: DisplayHandle,
    pub name: String,
    pub caps: DisplayCaps,
    pub max_layers: u8,
}

/// Present-request layer: per-eye viewport bounds as `[x, y, w, h]`
/// fractions of the source surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerConfig {
    pub left_bounds: [f32; 4],
    pub right_bounds: [f32; 4],
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            left_bounds: [0.0, 0.0, 0.5, 1.0],
            right_bounds: [0.5, 0.0, 0.5, 1.0],
        }
    }
}

/// Per-eye render parameters. Matrices default to identity when the host
/// omits them; `enabled` is false only when the host sent neither matrix
/// for this eye.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeParams {
    pub view: Mat4,
    pub projection: Mat4,
    pub enabled: bool,
}

impl Default for EyeParams {
    fn default() -> Self {
        Self {
            view: MAT4_IDENTITY,
            projection: MAT4_IDENTITY,
            enabled: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EyePair {
    pub left: EyeParams,
    pub right: EyeParams,
}

/// Everything the draw layer needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub timestamp_ms: f64,
    /// None when the snapshot carried no HMD state; the stereo draw is
    /// skipped for that frame.
    pub eyes: Option<EyePair>,
    /// Model matrices for controller slots 0 (left hand) and 1 (right hand).
    pub controllers: [Option<Mat4>; 2],
    pub object_model: Mat4,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            timestamp_ms: 0.0,
            eyes: None,
            controllers: [None, None],
            object_model: MAT4_IDENTITY,
        }
    }
}
