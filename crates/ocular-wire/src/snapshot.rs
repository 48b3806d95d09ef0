//! Tracking snapshot schema: one frame of HMD and controller state.
//!
//! Layout is little-endian with block offsets measured from the start of
//! the buffer:
//!
//! ```text
//! header:     [Magic][Version][Flags][PadCount][Timestamp f64][HmdOff u32][PadsOff u32]
//! hmd block:  [present u16][matrix f32x16 per set bit][pose block if HEAD_POSE]
//! pose block: [fields u8][vectors f32x3 / orientation f32x4 per set bit]
//! pad block:  PadCount controller records, sequential
//! ```
//!
//! The orientation quaternion rides the wire scalar-last `[x, y, z, w]`.
//! Velocity and acceleration vectors are carried for completeness; the
//! render core does not consume them.

use bitflags::bitflags;
use bytes::{BufMut, Bytes, BytesMut};

use crate::container::Schema;
use crate::reader::{check_block_offset, Reader};
use crate::{
    WireError, MAX_AXES, MAX_BUTTONS, MAX_CONTROLLERS, SNAPSHOT_HEADER_SIZE, SNAPSHOT_MAGIC,
    WIRE_VERSION,
};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SnapshotFlags: u16 {
        const HAS_HMD = 1 << 0;
    }
}

bitflags! {
    /// Which HMD matrices and pose are present, in canonical write order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HmdFields: u16 {
        const LEFT_VIEW = 1 << 0;
        const LEFT_PROJECTION = 1 << 1;
        const RIGHT_VIEW = 1 << 2;
        const RIGHT_PROJECTION = 1 << 3;
        const HEAD_POSE = 1 << 4;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PoseFields: u8 {
        const POSITION = 1 << 0;
        const ORIENTATION = 1 << 1;
        const LINEAR_VELOCITY = 1 << 2;
        const LINEAR_ACCELERATION = 1 << 3;
        const ANGULAR_VELOCITY = 1 << 4;
        const ANGULAR_ACCELERATION = 1 << 5;
    }
}

/// Optional pose fields exactly as carried on the wire.
///
/// Orientation is scalar-last `[x, y, z, w]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pose {
    pub position: Option<[f32; 3]>,
    pub orientation: Option<[f32; 4]>,
    pub linear_velocity: Option<[f32; 3]>,
    pub linear_acceleration: Option<[f32; 3]>,
    pub angular_velocity: Option<[f32; 3]>,
    pub angular_acceleration: Option<[f32; 3]>,
}

/// HMD state for one frame. Matrices are row-major.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HmdView {
    pub left_view: Option<[f32; 16]>,
    pub left_projection: Option<[f32; 16]>,
    pub right_view: Option<[f32; 16]>,
    pub right_projection: Option<[f32; 16]>,
    pub pose: Option<Pose>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GamepadButton {
    pub pressed: bool,
    pub touched: bool,
    pub value: f64,
}

/// One controller record; `id` and `mapping` borrow from the snapshot buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerView<'a> {
    pub index: u8,
    pub connected: bool,
    pub id: &'a str,
    pub mapping: &'a str,
    pub timestamp_ms: f64,
    pub axes: Vec<f64>,
    pub buttons: Vec<GamepadButton>,
    pub pose: Option<Pose>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotView<'a> {
    pub timestamp_ms: f64,
    pub hmd: Option<HmdView>,
    pub controllers: Vec<ControllerView<'a>>,
}

/// Schema marker for [`crate::Verified`].
pub struct TrackingSchema;

impl Schema for TrackingSchema {
    type View<'a> = SnapshotView<'a>;
    const NAME: &'static str = "tracking-snapshot";

    fn verify(bytes: &[u8]) -> Result<(), WireError> {
        check(bytes)
    }

    fn view(bytes: &[u8]) -> Result<SnapshotView<'_>, WireError> {
        walk(bytes)
    }
}

struct Header {
    flags: SnapshotFlags,
    pad_count: usize,
    timestamp_ms: f64,
    hmd_offset: usize,
    pads_offset: usize,
}

fn parse_header(bytes: &[u8]) -> Result<Header, WireError> {
    if bytes.len() < SNAPSHOT_HEADER_SIZE {
        return Err(WireError::TooShort(bytes.len()));
    }
    if bytes[0..2] != SNAPSHOT_MAGIC {
        return Err(WireError::InvalidMagic([bytes[0], bytes[1]]));
    }

    let mut r = Reader::at(bytes, 2);
    let version = r.u16("header")?;
    if version != WIRE_VERSION {
        return Err(WireError::UnsupportedVersion(version));
    }
    let flags = SnapshotFlags::from_bits_truncate(r.u16("header")?);
    let pad_count = r.u16("header")? as usize;
    let timestamp_ms = r.f64("header")?;
    let hmd_offset = r.u32("header")? as usize;
    let pads_offset = r.u32("header")? as usize;

    if pad_count > MAX_CONTROLLERS {
        return Err(WireError::CountExceedsLimit {
            field: "controllers",
            count: pad_count,
            limit: MAX_CONTROLLERS,
        });
    }

    Ok(Header {
        flags,
        pad_count,
        timestamp_ms,
        hmd_offset,
        pads_offset,
    })
}

/// Materializing pass behind `view`: every read is bounds-checked,
/// unknown bitset bits and trailing bytes are ignored.
fn walk(bytes: &[u8]) -> Result<SnapshotView<'_>, WireError> {
    let header = parse_header(bytes)?;

    let hmd = if header.flags.contains(SnapshotFlags::HAS_HMD) {
        Some(read_hmd(bytes, header.hmd_offset)?)
    } else {
        None
    };

    let mut controllers = Vec::with_capacity(header.pad_count);
    if header.pad_count > 0 {
        check_block_offset(
            "controller block",
            header.pads_offset,
            SNAPSHOT_HEADER_SIZE,
            bytes.len(),
        )?;
        let mut r = Reader::at(bytes, header.pads_offset);
        for _ in 0..header.pad_count {
            controllers.push(read_controller(&mut r)?);
        }
    }

    Ok(SnapshotView {
        timestamp_ms: header.timestamp_ms,
        hmd,
        controllers,
    })
}

/// Allocation-free twin of [`walk`]: it covers the same reads in the
/// same order without materializing the view. Agreement between the two
/// passes is pinned by the fuzz tests.
fn check(bytes: &[u8]) -> Result<(), WireError> {
    let header = parse_header(bytes)?;

    if header.flags.contains(SnapshotFlags::HAS_HMD) {
        check_hmd(bytes, header.hmd_offset)?;
    }

    if header.pad_count > 0 {
        check_block_offset(
            "controller block",
            header.pads_offset,
            SNAPSHOT_HEADER_SIZE,
            bytes.len(),
        )?;
        let mut r = Reader::at(bytes, header.pads_offset);
        for _ in 0..header.pad_count {
            skip_controller(&mut r)?;
        }
    }

    Ok(())
}

fn check_hmd(bytes: &[u8], offset: usize) -> Result<(), WireError> {
    check_block_offset("hmd block", offset, SNAPSHOT_HEADER_SIZE, bytes.len())?;
    let mut r = Reader::at(bytes, offset);
    let fields = HmdFields::from_bits_truncate(r.u16("hmd block")?);

    let matrices = [
        (HmdFields::LEFT_VIEW, "left view matrix"),
        (HmdFields::LEFT_PROJECTION, "left projection matrix"),
        (HmdFields::RIGHT_VIEW, "right view matrix"),
        (HmdFields::RIGHT_PROJECTION, "right projection matrix"),
    ];
    for (flag, what) in matrices {
        if fields.contains(flag) {
            r.skip(64, what)?;
        }
    }

    if fields.contains(HmdFields::HEAD_POSE) {
        skip_pose(&mut r)?;
    }
    Ok(())
}

fn skip_pose(r: &mut Reader<'_>) -> Result<(), WireError> {
    let fields = PoseFields::from_bits_truncate(r.u8("pose block")?);

    if fields.contains(PoseFields::POSITION) {
        r.skip(12, "pose position")?;
    }
    if fields.contains(PoseFields::ORIENTATION) {
        r.skip(16, "pose orientation")?;
    }
    if fields.contains(PoseFields::LINEAR_VELOCITY) {
        r.skip(12, "pose linear velocity")?;
    }
    if fields.contains(PoseFields::LINEAR_ACCELERATION) {
        r.skip(12, "pose linear acceleration")?;
    }
    if fields.contains(PoseFields::ANGULAR_VELOCITY) {
        r.skip(12, "pose angular velocity")?;
    }
    if fields.contains(PoseFields::ANGULAR_ACCELERATION) {
        r.skip(12, "pose angular acceleration")?;
    }
    Ok(())
}

fn skip_controller(r: &mut Reader<'_>) -> Result<(), WireError> {
    r.skip(2, "controller record")?;
    r.str("controller id")?;
    r.str("controller mapping")?;
    r.skip(8, "controller record")?;

    let axis_count = r.u8("controller record")? as usize;
    if axis_count > MAX_AXES {
        return Err(WireError::CountExceedsLimit {
            field: "axes",
            count: axis_count,
            limit: MAX_AXES,
        });
    }
    r.skip(axis_count * 8, "controller axis")?;

    let button_count = r.u8("controller record")? as usize;
    if button_count > MAX_BUTTONS {
        return Err(WireError::CountExceedsLimit {
            field: "buttons",
            count: button_count,
            limit: MAX_BUTTONS,
        });
    }
    r.skip(button_count * 10, "controller button")?;

    if r.u8("controller record")? != 0 {
        skip_pose(r)?;
    }
    Ok(())
}

fn read_hmd(bytes: &[u8], offset: usize) -> Result<HmdView, WireError> {
    check_block_offset("hmd block", offset, SNAPSHOT_HEADER_SIZE, bytes.len())?;
    let mut r = Reader::at(bytes, offset);
    let fields = HmdFields::from_bits_truncate(r.u16("hmd block")?);

    let mut read_matrix = |flag: HmdFields, what: &'static str| -> Result<Option<[f32; 16]>, WireError> {
        if fields.contains(flag) {
            Ok(Some(r.f32_array::<16>(what)?))
        } else {
            Ok(None)
        }
    };

    let left_view = read_matrix(HmdFields::LEFT_VIEW, "left view matrix")?;
    let left_projection = read_matrix(HmdFields::LEFT_PROJECTION, "left projection matrix")?;
    let right_view = read_matrix(HmdFields::RIGHT_VIEW, "right view matrix")?;
    let right_projection = read_matrix(HmdFields::RIGHT_PROJECTION, "right projection matrix")?;

    let pose = if fields.contains(HmdFields::HEAD_POSE) {
        Some(read_pose(&mut r)?)
    } else {
        None
    };

    Ok(HmdView {
        left_view,
        left_projection,
        right_view,
        right_projection,
        pose,
    })
}

fn read_pose(r: &mut Reader<'_>) -> Result<Pose, WireError> {
    let fields = PoseFields::from_bits_truncate(r.u8("pose block")?);

    let position = if fields.contains(PoseFields::POSITION) {
        Some(r.f32_array::<3>("pose position")?)
    } else {
        None
    };
    let orientation = if fields.contains(PoseFields::ORIENTATION) {
        Some(r.f32_array::<4>("pose orientation")?)
    } else {
        None
    };
    let linear_velocity = if fields.contains(PoseFields::LINEAR_VELOCITY) {
        Some(r.f32_array::<3>("pose linear velocity")?)
    } else {
        None
    };
    let linear_acceleration = if fields.contains(PoseFields::LINEAR_ACCELERATION) {
        Some(r.f32_array::<3>("pose linear acceleration")?)
    } else {
        None
    };
    let angular_velocity = if fields.contains(PoseFields::ANGULAR_VELOCITY) {
        Some(r.f32_array::<3>("pose angular velocity")?)
    } else {
        None
    };
    let angular_acceleration = if fields.contains(PoseFields::ANGULAR_ACCELERATION) {
        Some(r.f32_array::<3>("pose angular acceleration")?)
    } else {
        None
    };

    Ok(Pose {
        position,
        orientation,
        linear_velocity,
        linear_acceleration,
        angular_velocity,
        angular_acceleration,
    })
}

fn read_controller<'a>(r: &mut Reader<'a>) -> Result<ControllerView<'a>, WireError> {
    let index = r.u8("controller record")?;
    let connected = r.u8("controller record")? != 0;
    let id = r.str("controller id")?;
    let mapping = r.str("controller mapping")?;
    let timestamp_ms = r.f64("controller record")?;

    let axis_count = r.u8("controller record")? as usize;
    if axis_count > MAX_AXES {
        return Err(WireError::CountExceedsLimit {
            field: "axes",
            count: axis_count,
            limit: MAX_AXES,
        });
    }
    let mut axes = Vec::with_capacity(axis_count);
    for _ in 0..axis_count {
        axes.push(r.f64("controller axis")?);
    }

    let button_count = r.u8("controller record")? as usize;
    if button_count > MAX_BUTTONS {
        return Err(WireError::CountExceedsLimit {
            field: "buttons",
            count: button_count,
            limit: MAX_BUTTONS,
        });
    }
    let mut buttons = Vec::with_capacity(button_count);
    for _ in 0..button_count {
        buttons.push(GamepadButton {
            pressed: r.u8("controller button")? != 0,
            touched: r.u8("controller button")? != 0,
            value: r.f64("controller button")?,
        });
    }

    let pose = if r.u8("controller record")? != 0 {
        Some(read_pose(r)?)
    } else {
        None
    };

    Ok(ControllerView {
        index,
        connected,
        id,
        mapping,
        timestamp_ms,
        axes,
        buttons,
        pose,
    })
}

/// Owned controller record for building snapshots.
#[derive(Debug, Clone, Default)]
pub struct ControllerRecord {
    pub index: u8,
    pub connected: bool,
    pub id: String,
    pub mapping: String,
    pub timestamp_ms: f64,
    pub axes: Vec<f64>,
    pub buttons: Vec<GamepadButton>,
    pub pose: Option<Pose>,
}

/// Writes the snapshot layout. The producer side of [`TrackingSchema`];
/// used by simulated hosts and tests. Records beyond the schema caps are
/// clipped so the output always verifies.
#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    timestamp_ms: f64,
    hmd: Option<HmdView>,
    controllers: Vec<ControllerRecord>,
}

impl SnapshotBuilder {
    pub fn new(timestamp_ms: f64) -> Self {
        Self {
            timestamp_ms,
            ..Self::default()
        }
    }

    pub fn hmd(mut self, hmd: HmdView) -> Self {
        self.hmd = Some(hmd);
        self
    }

    pub fn controller(mut self, pad: ControllerRecord) -> Self {
        self.controllers.push(pad);
        self
    }

    pub fn build(self) -> Bytes {
        let pads: &[ControllerRecord] =
            &self.controllers[..self.controllers.len().min(MAX_CONTROLLERS)];

        let mut buf = BytesMut::with_capacity(SNAPSHOT_HEADER_SIZE + 512);
        buf.put_slice(&SNAPSHOT_MAGIC);
        buf.put_u16_le(WIRE_VERSION);

        let mut flags = SnapshotFlags::empty();
        if self.hmd.is_some() {
            flags |= SnapshotFlags::HAS_HMD;
        }
        buf.put_u16_le(flags.bits());
        buf.put_u16_le(pads.len() as u16);
        buf.put_f64_le(self.timestamp_ms);

        // Offset slots, backfilled once the blocks land.
        let hmd_off_pos = buf.len();
        buf.put_u32_le(0);
        let pads_off_pos = buf.len();
        buf.put_u32_le(0);

        if let Some(hmd) = &self.hmd {
            let offset = buf.len() as u32;
            let mut slot = &mut buf[hmd_off_pos..hmd_off_pos + 4];
            slot.put_u32_le(offset);
            write_hmd(&mut buf, hmd);
        }

        if !pads.is_empty() {
            let offset = buf.len() as u32;
            let mut slot = &mut buf[pads_off_pos..pads_off_pos + 4];
            slot.put_u32_le(offset);
            for pad in pads {
                write_controller(&mut buf, pad);
            }
        }

        buf.freeze()
    }
}

fn write_hmd(buf: &mut BytesMut, hmd: &HmdView) {
    let mut fields = HmdFields::empty();
    if hmd.left_view.is_some() {
        fields |= HmdFields::LEFT_VIEW;
    }
    if hmd.left_projection.is_some() {
        fields |= HmdFields::LEFT_PROJECTION;
    }
    if hmd.right_view.is_some() {
        fields |= HmdFields::RIGHT_VIEW;
    }
    if hmd.right_projection.is_some() {
        fields |= HmdFields::RIGHT_PROJECTION;
    }
    if hmd.pose.is_some() {
        fields |= HmdFields::HEAD_POSE;
    }
    buf.put_u16_le(fields.bits());

    for matrix in [
        hmd.left_view,
        hmd.left_projection,
        hmd.right_view,
        hmd.right_projection,
    ]
    .into_iter()
    .flatten()
    {
        for v in matrix {
            buf.put_f32_le(v);
        }
    }

    if let Some(pose) = &hmd.pose {
        write_pose(buf, pose);
    }
}

fn write_pose(buf: &mut BytesMut, pose: &Pose) {
    let mut fields = PoseFields::empty();
    if pose.position.is_some() {
        fields |= PoseFields::POSITION;
    }
    if pose.orientation.is_some() {
        fields |= PoseFields::ORIENTATION;
    }
    if pose.linear_velocity.is_some() {
        fields |= PoseFields::LINEAR_VELOCITY;
    }
    if pose.linear_acceleration.is_some() {
        fields |= PoseFields::LINEAR_ACCELERATION;
    }
    if pose.angular_velocity.is_some() {
        fields |= PoseFields::ANGULAR_VELOCITY;
    }
    if pose.angular_acceleration.is_some() {
        fields |= PoseFields::ANGULAR_ACCELERATION;
    }
    buf.put_u8(fields.bits());

    if let Some(v) = pose.position {
        put_vec3(buf, v);
    }
    if let Some(q) = pose.orientation {
        for v in q {
            buf.put_f32_le(v);
        }
    }
    for vec in [
        pose.linear_velocity,
        pose.linear_acceleration,
        pose.angular_velocity,
        pose.angular_acceleration,
    ]
    .into_iter()
    .flatten()
    {
        put_vec3(buf, vec);
    }
}

fn write_controller(buf: &mut BytesMut, pad: &ControllerRecord) {
    buf.put_u8(pad.index);
    buf.put_u8(pad.connected as u8);
    put_str(buf, &pad.id);
    put_str(buf, &pad.mapping);
    buf.put_f64_le(pad.timestamp_ms);

    let axes = &pad.axes[..pad.axes.len().min(MAX_AXES)];
    buf.put_u8(axes.len() as u8);
    for &axis in axes {
        buf.put_f64_le(axis);
    }

    let buttons = &pad.buttons[..pad.buttons.len().min(MAX_BUTTONS)];
    buf.put_u8(buttons.len() as u8);
    for button in buttons {
        buf.put_u8(button.pressed as u8);
        buf.put_u8(button.touched as u8);
        buf.put_f64_le(button.value);
    }

    match &pad.pose {
        Some(pose) => {
            buf.put_u8(1);
            write_pose(buf, pose);
        }
        None => buf.put_u8(0),
    }
}

fn put_vec3(buf: &mut BytesMut, v: [f32; 3]) {
    for x in v {
        buf.put_f32_le(x);
    }
}

/// Length-prefixed string; cut at 255 bytes on a char boundary.
fn put_str(buf: &mut BytesMut, s: &str) {
    let mut end = s.len().min(u8::MAX as usize);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    buf.put_u8(end as u8);
    buf.put_slice(&s.as_bytes()[..end]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Verified;

    fn sample_pose() -> Pose {
        Pose {
            position: Some([0.1, 1.6, -0.2]),
            orientation: Some([0.0, 0.0, 0.0, 1.0]),
            linear_velocity: Some([0.0, 0.0, -0.5]),
            ..Pose::default()
        }
    }

    fn sample_snapshot() -> Bytes {
        let mut view = [0f32; 16];
        let mut proj = [0f32; 16];
        for i in 0..4 {
            view[i * 5] = 1.0;
            proj[i * 5] = 2.0;
        }
        SnapshotBuilder::new(16.0)
            .hmd(HmdView {
                left_view: Some(view),
                left_projection: Some(proj),
                right_view: Some(view),
                right_projection: Some(proj),
                pose: Some(sample_pose()),
            })
            .controller(ControllerRecord {
                index: 0,
                connected: true,
                id: "Ocular Touch (Left)".to_string(),
                mapping: "standard".to_string(),
                timestamp_ms: 16.0,
                axes: vec![0.0, 0.25],
                buttons: vec![GamepadButton {
                    pressed: true,
                    touched: true,
                    value: 1.0,
                }],
                pose: Some(sample_pose()),
            })
            .controller(ControllerRecord {
                index: 1,
                connected: true,
                id: "Ocular Touch (Right)".to_string(),
                mapping: "standard".to_string(),
                timestamp_ms: 16.0,
                pose: Some(Pose {
                    orientation: Some([0.0, 0.383, 0.0, 0.924]),
                    ..Pose::default()
                }),
                ..ControllerRecord::default()
            })
            .build()
    }

    #[test]
    fn full_snapshot_roundtrip() {
        let verified = Verified::<TrackingSchema>::acquire(sample_snapshot).unwrap();
        let view = verified.view().unwrap();

        assert_eq!(view.timestamp_ms, 16.0);
        let hmd = view.hmd.unwrap();
        assert_eq!(hmd.left_view.unwrap()[0], 1.0);
        assert_eq!(hmd.right_projection.unwrap()[5], 2.0);
        assert_eq!(hmd.pose.unwrap().position, Some([0.1, 1.6, -0.2]));

        assert_eq!(view.controllers.len(), 2);
        let left = &view.controllers[0];
        assert_eq!(left.id, "Ocular Touch (Left)");
        assert_eq!(left.axes, vec![0.0, 0.25]);
        assert!(left.buttons[0].pressed);
        let right = &view.controllers[1];
        assert_eq!(right.index, 1);
        assert_eq!(right.pose.unwrap().position, None);
    }

    #[test]
    fn minimal_snapshot_roundtrip() {
        let bytes = SnapshotBuilder::new(0.0).build();
        assert_eq!(bytes.len(), SNAPSHOT_HEADER_SIZE);
        let verified = Verified::<TrackingSchema>::acquire(|| bytes).unwrap();
        let view = verified.view().unwrap();
        assert!(view.hmd.is_none());
        assert!(view.controllers.is_empty());
    }

    #[test]
    fn too_short_is_rejected() {
        let err = TrackingSchema::verify(&[0x4f, 0x54, 1]).unwrap_err();
        assert!(matches!(err, WireError::TooShort(3)));
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut bytes = sample_snapshot().to_vec();
        bytes[0] = b'X';
        let err = TrackingSchema::verify(&bytes).unwrap_err();
        assert!(matches!(err, WireError::InvalidMagic([b'X', _])));
    }

    #[test]
    fn bad_version_is_rejected() {
        let mut bytes = sample_snapshot().to_vec();
        bytes[2] = 0xFF;
        let err = TrackingSchema::verify(&bytes).unwrap_err();
        assert!(matches!(err, WireError::UnsupportedVersion(_)));
    }

    #[test]
    fn hmd_offset_out_of_range_is_rejected() {
        let mut bytes = sample_snapshot().to_vec();
        // Hmd offset slot lives at bytes 16..20.
        bytes[16..20].copy_from_slice(&(u32::MAX).to_le_bytes());
        let err = TrackingSchema::verify(&bytes).unwrap_err();
        assert!(matches!(err, WireError::OffsetOutOfRange { field: "hmd block", .. }));
    }

    #[test]
    fn offset_inside_header_is_rejected() {
        let mut bytes = sample_snapshot().to_vec();
        bytes[16..20].copy_from_slice(&4u32.to_le_bytes());
        let err = TrackingSchema::verify(&bytes).unwrap_err();
        assert!(matches!(err, WireError::OffsetOutOfRange { .. }));
    }

    #[test]
    fn controller_count_over_limit_is_rejected() {
        let mut bytes = sample_snapshot().to_vec();
        // Pad count slot lives at bytes 6..8.
        bytes[6..8].copy_from_slice(&100u16.to_le_bytes());
        let err = TrackingSchema::verify(&bytes).unwrap_err();
        assert!(matches!(
            err,
            WireError::CountExceedsLimit {
                field: "controllers",
                count: 100,
                ..
            }
        ));
    }

    #[test]
    fn truncated_controller_block_is_rejected() {
        let bytes = sample_snapshot();
        let cut = &bytes[..bytes.len() - 10];
        let err = TrackingSchema::verify(cut).unwrap_err();
        assert!(matches!(err, WireError::Truncated(_)));
    }

    #[test]
    fn bad_controller_id_utf8_is_rejected() {
        let bytes = SnapshotBuilder::new(1.0)
            .controller(ControllerRecord {
                id: "ab".to_string(),
                ..ControllerRecord::default()
            })
            .build();
        let mut raw = bytes.to_vec();
        // id bytes sit right after the record's index/connected/len prefix.
        let id_pos = SNAPSHOT_HEADER_SIZE + 3;
        assert_eq!(raw[id_pos], b'a');
        raw[id_pos] = 0xFF;
        let err = TrackingSchema::verify(&raw).unwrap_err();
        assert!(matches!(err, WireError::BadString("controller id")));
    }

    #[test]
    fn over_cap_builder_input_is_clipped() {
        let mut builder = SnapshotBuilder::new(1.0);
        for i in 0..20 {
            builder = builder.controller(ControllerRecord {
                index: i as u8,
                axes: vec![0.5; 40],
                ..ControllerRecord::default()
            });
        }
        let verified = Verified::<TrackingSchema>::acquire(|| builder.build()).unwrap();
        let view = verified.view().unwrap();
        assert_eq!(view.controllers.len(), MAX_CONTROLLERS);
        assert_eq!(view.controllers[0].axes.len(), MAX_AXES);
    }
}
