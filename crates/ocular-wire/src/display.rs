//! Display table schema: the host's answer to display enumeration.
//!
//! A second payload through the same [`crate::Verified`] container; the
//! session layer decodes it during discovery.

use bitflags::bitflags;
use bytes::{BufMut, Bytes, BytesMut};

use crate::container::Schema;
use crate::reader::Reader;
use crate::{WireError, DISPLAY_HEADER_SIZE, DISPLAY_MAGIC, MAX_DISPLAYS, WIRE_VERSION};

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct DisplayCaps: u8 {
        const HAS_POSITION = 1 << 0;
        const HAS_EXTERNAL_DISPLAY = 1 << 1;
        const CAN_PRESENT = 1 << 2;
    }
}

/// One enumerated display; `name` borrows from the table buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRecord<'a> {
    pub handle: u32,
    pub caps: DisplayCaps,
    /// Compositor layers the display accepts per frame; 0 when it cannot present.
    pub max_layers: u8,
    pub name: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayTableView<'a> {
    pub displays: Vec<DisplayRecord<'a>>,
}

/// Schema marker for [`crate::Verified`].
pub struct DisplayTableSchema;

impl Schema for DisplayTableSchema {
    type View<'a> = DisplayTableView<'a>;
    const NAME: &'static str = "display-table";

    fn verify(bytes: &[u8]) -> Result<(), WireError> {
        check(bytes)
    }

    fn view(bytes: &[u8]) -> Result<DisplayTableView<'_>, WireError> {
        walk(bytes)
    }
}

fn parse_header(bytes: &[u8]) -> Result<usize, WireError> {
    if bytes.len() < DISPLAY_HEADER_SIZE {
        return Err(WireError::TooShort(bytes.len()));
    }
    if bytes[0..2] != DISPLAY_MAGIC {
        return Err(WireError::InvalidMagic([bytes[0], bytes[1]]));
    }

    let mut r = Reader::at(bytes, 2);
    let version = r.u16("header")?;
    if version != WIRE_VERSION {
        return Err(WireError::UnsupportedVersion(version));
    }
    let count = r.u8("header")? as usize;
    if count > MAX_DISPLAYS {
        return Err(WireError::CountExceedsLimit {
            field: "displays",
            count,
            limit: MAX_DISPLAYS,
        });
    }
    Ok(count)
}

fn walk(bytes: &[u8]) -> Result<DisplayTableView<'_>, WireError> {
    let count = parse_header(bytes)?;
    let mut r = Reader::at(bytes, DISPLAY_HEADER_SIZE);

    let mut displays = Vec::with_capacity(count);
    for _ in 0..count {
        let handle = r.u32("display record")?;
        let caps = DisplayCaps::from_bits_truncate(r.u8("display record")?);
        let max_layers = r.u8("display record")?;
        let name = r.str("display name")?;
        displays.push(DisplayRecord { handle, caps, max_layers, name });
    }

    Ok(DisplayTableView { displays })
}

/// Allocation-free twin of [`walk`]: covers the same reads without
/// building the view. Their agreement is pinned by the fuzz tests.
fn check(bytes: &[u8]) -> Result<(), WireError> {
    let count = parse_header(bytes)?;
    let mut r = Reader::at(bytes, DISPLAY_HEADER_SIZE);

    for _ in 0..count {
        r.skip(6, "display record")?;
        r.str("display name")?;
    }
    Ok(())
}

/// Owned display record for building tables.
#[derive(Debug, Clone, Default)]
pub struct DisplayEntry {
    pub handle: u32,
    pub caps: DisplayCaps,
    pub max_layers: u8,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct DisplayTableBuilder {
    displays: Vec<DisplayEntry>,
}

impl DisplayTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display(mut self, entry: DisplayEntry) -> Self {
        self.displays.push(entry);
        self
    }

    pub fn build(self) -> Bytes {
        let displays = &self.displays[..self.displays.len().min(MAX_DISPLAYS)];

        let mut buf = BytesMut::with_capacity(DISPLAY_HEADER_SIZE + displays.len() * 40);
        buf.put_slice(&DISPLAY_MAGIC);
        buf.put_u16_le(WIRE_VERSION);
        buf.put_u8(displays.len() as u8);

        for entry in displays {
            buf.put_u32_le(entry.handle);
            buf.put_u8(entry.caps.bits());
            buf.put_u8(entry.max_layers);
            let name = entry.name.as_bytes();
            let mut end = name.len().min(u8::MAX as usize);
            while !entry.name.is_char_boundary(end) {
                end -= 1;
            }
            buf.put_u8(end as u8);
            buf.put_slice(&name[..end]);
        }

        buf.freeze()
    }
}
