//! Shared value types: ICAO addresses, hex helpers, CPR frames, positions.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{DecodeError, Result};

/// Length of an extended squitter in bits.
pub const MESSAGE_BITS: usize = 112;

/// Length of an extended squitter as a hex string.
pub const MESSAGE_HEX_LEN: usize = MESSAGE_BITS / 4;

// ---------------------------------------------------------------------------
// ICAO address
// ---------------------------------------------------------------------------

/// 24-bit ICAO transponder address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IcaoAddress(u32);

impl IcaoAddress {
    /// Build from a 24-bit integer. Bits above 24 are masked off.
    pub const fn new(value: u32) -> Self {
        IcaoAddress(value & 0xFF_FFFF)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    /// Parse a 6-char hex string into an ICAO address.
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 6 {
            return None;
        }
        u32::from_str_radix(hex, 16).ok().map(IcaoAddress::new)
    }
}

impl fmt::Display for IcaoAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06X}", self.0)
    }
}

impl Serialize for IcaoAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Hex utilities
// ---------------------------------------------------------------------------

/// Decode a hex string into bytes. Case-insensitive, must be even length.
pub fn hex_decode(hex: &str) -> Result<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return Err(DecodeError::InvalidHexEncoding(hex.to_string()));
    }
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for chunk in hex.as_bytes().chunks(2) {
        match (hex_digit(chunk[0]), hex_digit(chunk[1])) {
            (Some(high), Some(low)) => bytes.push((high << 4) | low),
            _ => return Err(DecodeError::InvalidHexEncoding(hex.to_string())),
        }
    }
    Ok(bytes)
}

/// Encode bytes as uppercase hex string.
pub fn hex_encode(data: &[u8]) -> String {
    let mut s = String::with_capacity(data.len() * 2);
    for &b in data {
        s.push(HEX_CHARS[(b >> 4) as usize] as char);
        s.push(HEX_CHARS[(b & 0x0F) as usize] as char);
    }
    s
}

const HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// CPR frames and positions
// ---------------------------------------------------------------------------

/// CPR format bit: even (0) or odd (1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CprFormat {
    Even,
    Odd,
}

impl CprFormat {
    pub fn from_bit(bit: u64) -> Self {
        if bit & 1 == 1 {
            CprFormat::Odd
        } else {
            CprFormat::Even
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            CprFormat::Even => CprFormat::Odd,
            CprFormat::Odd => CprFormat::Even,
        }
    }

    /// 0 for even, 1 for odd. Used as `i` in the zone-count formulas.
    pub fn index(self) -> u32 {
        match self {
            CprFormat::Even => 0,
            CprFormat::Odd => 1,
        }
    }
}

impl fmt::Display for CprFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CprFormat::Even => write!(f, "even"),
            CprFormat::Odd => write!(f, "odd"),
        }
    }
}

/// One CPR position report fragment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CprFrame {
    pub format: CprFormat,
    /// 17-bit zone fraction (value / 2^17).
    pub encoded_lat: u32,
    /// 17-bit zone fraction (value / 2^17).
    pub encoded_lon: u32,
    /// Receipt time in seconds.
    pub received_at: f64,
}

/// Decoded geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    pub fn new(lat: f64, lon: f64) -> Self {
        Position { lat, lon }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lon)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icao_roundtrip() {
        let icao = IcaoAddress::from_hex("4840D6").unwrap();
        assert_eq!(icao.value(), 0x4840D6);
        assert_eq!(icao.to_string(), "4840D6");
    }

    #[test]
    fn test_icao_zero_padded() {
        assert_eq!(IcaoAddress::new(0x00ABCD).to_string(), "00ABCD");
    }

    #[test]
    fn test_icao_masks_high_bits() {
        assert_eq!(IcaoAddress::new(0xFF4840D6).value(), 0x4840D6);
    }

    #[test]
    fn test_icao_from_hex_rejects_bad_input() {
        assert!(IcaoAddress::from_hex("4840D").is_none());
        assert!(IcaoAddress::from_hex("4840DZ").is_none());
    }

    #[test]
    fn test_hex_decode() {
        assert_eq!(hex_decode("4840d6").unwrap(), vec![0x48, 0x40, 0xD6]);
        assert!(matches!(
            hex_decode("odd"),
            Err(DecodeError::InvalidHexEncoding(_))
        ));
        assert!(matches!(
            hex_decode("ZZZZ"),
            Err(DecodeError::InvalidHexEncoding(_))
        ));
    }

    #[test]
    fn test_hex_encode() {
        assert_eq!(hex_encode(&[0x48, 0x40, 0xD6]), "4840D6");
    }

    #[test]
    fn test_cpr_format() {
        assert_eq!(CprFormat::from_bit(0), CprFormat::Even);
        assert_eq!(CprFormat::from_bit(1), CprFormat::Odd);
        assert_eq!(CprFormat::Even.opposite(), CprFormat::Odd);
        assert_eq!(CprFormat::Odd.index(), 1);
    }

    #[test]
    fn test_icao_serializes_as_hex() {
        let json = serde_json::to_string(&IcaoAddress::new(0x40621D)).unwrap();
        assert_eq!(json, "\"40621D\"");
    }
}
