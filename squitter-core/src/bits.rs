//! Bounds-checked bit-field extraction.
//!
//! Every field in the decoder is read through [`read_bits`], either on the
//! whole 112-bit message ([`MessageBits`]) or on its 56-bit ME field
//! ([`MePayload`]). Offsets are zero-based, MSB first.

use serde::{Serialize, Serializer};

use crate::error::{DecodeError, Result};
use crate::types::{hex_encode, MESSAGE_BITS, MESSAGE_HEX_LEN};

/// Message bytes in an extended squitter.
pub const MESSAGE_BYTES: usize = MESSAGE_BITS / 8;

/// ME field: message bits [32, 88).
pub const ME_OFFSET: usize = 32;
pub const ME_BITS: usize = 56;

/// Read `width` bits starting at bit `offset` of `data`, MSB first.
///
/// Fails with `OutOfRange` when the field runs past the end of the buffer or
/// is wider than 64 bits.
pub fn read_bits(data: &[u8], offset: usize, width: usize) -> Result<u64> {
    let len = data.len() * 8;
    let end = offset.checked_add(width);
    if width > 64 || end.map_or(true, |end| end > len) {
        return Err(DecodeError::OutOfRange { offset, width, len });
    }

    let mut value = 0u64;
    for bit in offset..offset + width {
        let b = (data[bit / 8] >> (7 - bit % 8)) & 1;
        value = (value << 1) | b as u64;
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// MessageBits
// ---------------------------------------------------------------------------

/// A validated 112-bit Mode S extended squitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageBits([u8; MESSAGE_BYTES]);

impl MessageBits {
    /// Wrap exactly 14 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; MESSAGE_BYTES] =
            bytes
                .try_into()
                .map_err(|_| DecodeError::InvalidMessageLength {
                    expected: MESSAGE_HEX_LEN,
                    actual: bytes.len() * 2,
                })?;
        Ok(MessageBits(arr))
    }

    pub fn field(&self, offset: usize, width: usize) -> Result<u64> {
        read_bits(&self.0, offset, width)
    }

    /// The 56-bit ME field.
    pub fn me(&self) -> MePayload {
        let mut me = [0u8; ME_BITS / 8];
        me.copy_from_slice(&self.0[ME_OFFSET / 8..(ME_OFFSET + ME_BITS) / 8]);
        MePayload(me)
    }

    pub fn as_bytes(&self) -> &[u8; MESSAGE_BYTES] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex_encode(&self.0)
    }

    /// Render as 112 `0`/`1` characters.
    pub fn to_bit_string(&self) -> String {
        self.0.iter().map(|b| format!("{b:08b}")).collect()
    }
}

impl Serialize for MessageBits {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// MePayload
// ---------------------------------------------------------------------------

/// The 56-bit ME field of an extended squitter. Offsets are relative to
/// message bit 32.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MePayload([u8; ME_BITS / 8]);

impl MePayload {
    pub fn field(&self, offset: usize, width: usize) -> Result<u64> {
        read_bits(&self.0, offset, width)
    }

    /// First 5 bits of ME.
    pub fn type_code(&self) -> Result<u8> {
        Ok(self.field(0, 5)? as u8)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
