//! Owning container for host-supplied buffers: validate once, then view.

use std::fmt;
use std::marker::PhantomData;

use bytes::Bytes;

use crate::WireError;

/// A wire schema: how to validate a raw buffer and how to read it.
///
/// `verify` runs once per acquisition and must bounds-check every read
/// `view` will perform, without allocating or materializing the view.
/// `view` may assume the buffer already passed `verify`, but must still
/// fail cleanly (never panic) when it did not.
pub trait Schema {
    type View<'a>;

    /// Schema name for logs and diagnostics.
    const NAME: &'static str;

    fn verify(bytes: &[u8]) -> Result<(), WireError>;
    fn view(bytes: &[u8]) -> Result<Self::View<'_>, WireError>;
}

/// A buffer that passed `S::verify` at acquisition time.
///
/// The bytes are owned by the container; views borrow from it and cannot
/// outlive it. Dropping the container is the only way the buffer is
/// released.
pub struct Verified<S: Schema> {
    bytes: Bytes,
    _schema: PhantomData<S>,
}

impl<S: Schema> Verified<S> {
    /// Pull a buffer from `producer` and validate it in full.
    ///
    /// An empty buffer is the producer's failure signal and maps to
    /// [`WireError::Acquisition`]. On any validation failure the bytes are
    /// dropped before the error is returned, so no unvalidated buffer
    /// survives.
    pub fn acquire(producer: impl FnOnce() -> Bytes) -> Result<Self, WireError> {
        let bytes = producer();
        if bytes.is_empty() {
            return Err(WireError::Acquisition);
        }
        S::verify(&bytes)?;
        Ok(Self {
            bytes,
            _schema: PhantomData,
        })
    }

    /// Typed read-only view over the validated bytes.
    ///
    /// Every call decodes the buffer anew; callers that need the view
    /// more than once per buffer should keep the result.
    pub fn view(&self) -> Result<S::View<'_>, WireError> {
        S::view(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl<S: Schema> fmt::Debug for Verified<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verified")
            .field("schema", &S::NAME)
            .field("len", &self.bytes.len())
            .finish()
    }
}
