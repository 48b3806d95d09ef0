//! Bounds-checked little-endian reads over a borrowed buffer.

use crate::WireError;

pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    pub(crate) fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [u8], WireError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or(WireError::Truncated(what))?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn skip(&mut self, n: usize, what: &'static str) -> Result<(), WireError> {
        self.take(n, what).map(|_| ())
    }

    pub(crate) fn array<const N: usize>(&mut self, what: &'static str) -> Result<[u8; N], WireError> {
        let slice = self.take(N, what)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    pub(crate) fn u8(&mut self, what: &'static str) -> Result<u8, WireError> {
        Ok(self.array::<1>(what)?[0])
    }

    pub(crate) fn u16(&mut self, what: &'static str) -> Result<u16, WireError> {
        Ok(u16::from_le_bytes(self.array(what)?))
    }

    pub(crate) fn u32(&mut self, what: &'static str) -> Result<u32, WireError> {
        Ok(u32::from_le_bytes(self.array(what)?))
    }

    pub(crate) fn f32(&mut self, what: &'static str) -> Result<f32, WireError> {
        Ok(f32::from_le_bytes(self.array(what)?))
    }

    pub(crate) fn f64(&mut self, what: &'static str) -> Result<f64, WireError> {
        Ok(f64::from_le_bytes(self.array(what)?))
    }

    pub(crate) fn f32_array<const N: usize>(
        &mut self,
        what: &'static str,
    ) -> Result<[f32; N], WireError> {
        let mut out = [0f32; N];
        for v in &mut out {
            *v = self.f32(what)?;
        }
        Ok(out)
    }

    /// Length-prefixed UTF-8 string (u8 length).
    pub(crate) fn str(&mut self, what: &'static str) -> Result<&'a str, WireError> {
        let len = self.u8(what)? as usize;
        let raw = self.take(len, what)?;
        std::str::from_utf8(raw).map_err(|_| WireError::BadString(what))
    }
}

/// A block offset must land past the fixed header and inside the buffer.
pub(crate) fn check_block_offset(
    field: &'static str,
    offset: usize,
    header: usize,
    len: usize,
) -> Result<(), WireError> {
    if offset < header || offset >= len {
        return Err(WireError::OffsetOutOfRange { field, offset, len });
    }
    Ok(())
}
