//! TC 1-4: aircraft identification (callsign and emitter category).
//!
//! ME layout: TC (5 bits) | CA (3 bits) | 8 x 6-bit characters.

use serde::Serialize;

use crate::bits::MePayload;
use crate::error::{DecodeError, Result};
use crate::wake::wake_category;

/// Characters in a callsign.
pub const CALLSIGN_LEN: usize = 8;

const CHAR_OFFSET: usize = 8;
const CHAR_BITS: usize = 6;

/// Decoded identification payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identification {
    pub type_code: u8,
    pub emitter_category: u8,
    /// Always 8 characters, trailing spaces kept.
    pub callsign: String,
    pub wake_category: &'static str,
}

/// Map one 6-bit ICAO character code.
///
/// 1-26 are letters, 48-57 digits, 32 space. Anything else is rejected.
pub fn decode_char(value: u8, position: usize) -> Result<char> {
    match value {
        1..=26 => Ok((b'A' + value - 1) as char),
        48..=57 => Ok(value as char),
        32 => Ok(' '),
        _ => Err(DecodeError::InvalidCallsignCharacter { position, value }),
    }
}

/// Decode an identification ME payload.
pub fn decode_identification(me: &MePayload) -> Result<Identification> {
    let type_code = me.type_code()?;
    let emitter_category = me.field(5, 3)? as u8;
    let wake_category = wake_category(type_code, emitter_category)?;

    let mut callsign = String::with_capacity(CALLSIGN_LEN);
    for i in 0..CALLSIGN_LEN {
        let value = me.field(CHAR_OFFSET + i * CHAR_BITS, CHAR_BITS)? as u8;
        callsign.push(decode_char(value, i)?);
    }

    Ok(Identification {
        type_code,
        emitter_category,
        callsign,
        wake_category,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
