//! Byte-order conversion helpers
//!
//! Pure functions for swapping integer byte order and for bounds-checked
//! reads/writes of little- and big-endian values inside byte slices. No I/O
//! happens here; callers pair these with the file utilities when decoding
//! binary headers.

use crate::error::{Error, Result};

/// Swap the byte order of a `u16`.
pub fn swap_u16(value: u16) -> u16 {
    value.swap_bytes()
}

/// Swap the byte order of a `u32`.
pub fn swap_u32(value: u32) -> u32 {
    value.swap_bytes()
}

/// Swap the byte order of a `u64`.
pub fn swap_u64(value: u64) -> u64 {
    value.swap_bytes()
}

fn take<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N]> {
    let end = offset
        .checked_add(N)
        .ok_or_else(|| Error::InvalidArgument(format!("offset {} overflows", offset)))?;
    let slice = buf.get(offset..end).ok_or_else(|| {
        Error::InvalidArgument(format!(
            "buffer of {} bytes too short for {} bytes at offset {}",
            buf.len(),
            N,
            offset
        ))
    })?;
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(slice);
    Ok(bytes)
}

fn put<const N: usize>(buf: &mut [u8], offset: usize, bytes: [u8; N]) -> Result<()> {
    let end = offset
        .checked_add(N)
        .ok_or_else(|| Error::InvalidArgument(format!("offset {} overflows", offset)))?;
    let slice = buf.get_mut(offset..end).ok_or_else(|| {
        Error::InvalidArgument(format!(
            "buffer too short for {} bytes at offset {}",
            N, offset
        ))
    })?;
    slice.copy_from_slice(&bytes);
    Ok(())
}

macro_rules! endian_accessors {
    ($ty:ty, $read_le:ident, $read_be:ident, $write_le:ident, $write_be:ident) => {
        /// Read a little-endian value at `offset`.
        pub fn $read_le(buf: &[u8], offset: usize) -> Result<$ty> {
            Ok(<$ty>::from_le_bytes(take(buf, offset)?))
        }

        /// Read a big-endian value at `offset`.
        pub fn $read_be(buf: &[u8], offset: usize) -> Result<$ty> {
            Ok(<$ty>::from_be_bytes(take(buf, offset)?))
        }

        /// Write a little-endian value at `offset`.
        pub fn $write_le(buf: &mut [u8], offset: usize, value: $ty) -> Result<()> {
            put(buf, offset, value.to_le_bytes())
        }

        /// Write a big-endian value at `offset`.
        pub fn $write_be(buf: &mut [u8], offset: usize, value: $ty) -> Result<()> {
            put(buf, offset, value.to_be_bytes())
        }
    };
}

endian_accessors!(u16, read_u16_le, read_u16_be, write_u16_le, write_u16_be);
endian_accessors!(u32, read_u32_le, read_u32_be, write_u32_le, write_u32_be);
endian_accessors!(u64, read_u64_le, read_u64_be, write_u64_le, write_u64_be);
