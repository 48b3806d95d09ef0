//! Wire formats for payloads handed over by the embedding host.
//!
//! This crate provides:
//! - A generic verified-buffer container: own the bytes, validate once up
//!   front, then hand out typed read-only views
//! - The tracking snapshot schema (eye matrices, head pose, controller records)
//! - The display table schema (enumeration results with capabilities)
//!
//! Buffers come from outside the trust boundary. Nothing in here panics on
//! hostile input; every structural defect maps to a [`WireError`] variant.

#![forbid(unsafe_code)]

mod reader;

pub mod container;
pub mod display;
pub mod snapshot;

pub use container::{Schema, Verified};
pub use display::{
    DisplayCaps, DisplayEntry, DisplayRecord, DisplayTableBuilder, DisplayTableSchema,
    DisplayTableView,
};
pub use snapshot::{
    ControllerRecord, ControllerView, GamepadButton, HmdFields, HmdView, Pose, PoseFields,
    SnapshotBuilder, SnapshotFlags, SnapshotView, TrackingSchema,
};

pub const WIRE_VERSION: u16 = 1;

pub const SNAPSHOT_MAGIC: [u8; 2] = [0x4f, 0x54]; // 'OT'
pub const DISPLAY_MAGIC: [u8; 2] = [0x4f, 0x44]; // 'OD'

/// Snapshot header (24 bytes)
/// [Magic (2B)][Version (2B)][Flags (2B)][PadCount (2B)][Timestamp (8B)][HmdOff (4B)][PadsOff (4B)]
pub const SNAPSHOT_HEADER_SIZE: usize = 24;

/// Display table header (5 bytes)
/// [Magic (2B)][Version (2B)][Count (1B)]
pub const DISPLAY_HEADER_SIZE: usize = 5;

/// Hard caps on repeated records; counts above these are rejected outright.
pub const MAX_CONTROLLERS: usize = 8;
pub const MAX_AXES: usize = 16;
pub const MAX_BUTTONS: usize = 32;
pub const MAX_DISPLAYS: usize = 8;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WireError {
    #[error("producer returned no bytes")]
    Acquisition,
    #[error("buffer too short: {0}")]
    TooShort(usize),
    #[error("invalid magic: {0:?}")]
    InvalidMagic([u8; 2]),
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u16),
    #[error("{field} offset {offset} out of range for {len} bytes")]
    OffsetOutOfRange {
        field: &'static str,
        offset: usize,
        len: usize,
    },
    #[error("{0} truncated")]
    Truncated(&'static str),
    #[error("{field} count {count} exceeds limit {limit}")]
    CountExceedsLimit {
        field: &'static str,
        count: usize,
        limit: usize,
    },
    #[error("{0} is not valid UTF-8")]
    BadString(&'static str),
}
