//! Byte views of sample buffers for the transport layer.
//!
//! Samples are sent in native byte order; all ranks of a run are assumed to
//! share one architecture.

use bytemuck::Pod;
use std::mem::size_of;

pub fn cast_slice<T: Pod>(v: &[T]) -> &[u8] {
    bytemuck::cast_slice(v)
}

pub fn cast_slice_mut<T: Pod>(v: &mut [T]) -> &mut [u8] {
    bytemuck::cast_slice_mut(v)
}

/// Bytes on the wire for `n` samples of `T`.
#[inline]
pub const fn byte_len<T>(n: usize) -> usize {
    n * size_of::<T>()
}
