//! Parse hex strings into structured extended-squitter frames.
//!
//! Responsibilities:
//! - Reject anything that is not exactly 28 hex characters (112 bits)
//! - Extract the header: DF, CA, ICAO address, ME type code
//!
//! Parity/CRC checking happens upstream; frames arriving here are trusted.

use crate::bits::MessageBits;
use crate::error::{DecodeError, Result};
use crate::types::{hex_decode, IcaoAddress, MESSAGE_HEX_LEN};

// Header field positions (bit offset, width)
const DF_FIELD: (usize, usize) = (0, 5);
const CA_FIELD: (usize, usize) = (5, 3);
const ICAO_FIELD: (usize, usize) = (8, 24);
const TC_FIELD: (usize, usize) = (32, 5);

/// A parsed 112-bit Mode S frame with its header decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Downlink Format (0-31)
    pub df: u8,
    /// Capability (0-7)
    pub ca: u8,
    pub icao: IcaoAddress,
    /// ME type code (0-31)
    pub tc: u8,
    pub bits: MessageBits,
}

impl Frame {
    /// Decode the header of an already validated bit buffer.
    pub fn from_bits(bits: MessageBits) -> Result<Self> {
        Ok(Frame {
            df: bits.field(DF_FIELD.0, DF_FIELD.1)? as u8,
            ca: bits.field(CA_FIELD.0, CA_FIELD.1)? as u8,
            icao: IcaoAddress::new(bits.field(ICAO_FIELD.0, ICAO_FIELD.1)? as u32),
            tc: bits.field(TC_FIELD.0, TC_FIELD.1)? as u8,
            bits,
        })
    }

    /// True for ADS-B (DF17) and TIS-B/ADS-R (DF18) extended squitters.
    pub fn is_extended_squitter(&self) -> bool {
        self.df == 17 || self.df == 18
    }
}

/// Parse a hex string into a Frame.
///
/// Length is checked before the characters are decoded, so a short string of
/// garbage reports `InvalidMessageLength` rather than `InvalidHexEncoding`.
pub fn parse_frame(hex_str: &str) -> Result<Frame> {
    let hex_str = hex_str.trim();

    let n_chars = hex_str.chars().count();
    if n_chars != MESSAGE_HEX_LEN {
        return Err(DecodeError::InvalidMessageLength {
            expected: MESSAGE_HEX_LEN,
            actual: n_chars,
        });
    }

    let raw = hex_decode(hex_str)?;
    Frame::from_bits(MessageBits::from_bytes(&raw)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::hex_encode;

    /// Assemble a synthetic 112-bit message from header fields and a 56-bit ME.
    fn build(df: u8, ca: u8, icao: u32, me: u64) -> String {
        let mut bytes = [0u8; 14];
        bytes[0] = (df << 3) | (ca & 0x07);
        bytes[1..4].copy_from_slice(&icao.to_be_bytes()[1..4]);
        bytes[4..11].copy_from_slice(&me.to_be_bytes()[1..8]);
        hex_encode(&bytes)
    }

    #[test]
    fn test_parse_df17_identification() {
        let frame = parse_frame("8D4840D6202CC371C32CE0576098").unwrap();
        assert_eq!(frame.df, 17);
        assert_eq!(frame.ca, 5);
        assert_eq!(frame.icao.to_string(), "4840D6");
        assert_eq!(frame.tc, 4);
        assert!(frame.is_extended_squitter());
    }

    #[test]
    fn test_parse_df17_position() {
        let frame = parse_frame("8D40621D58C382D690C8AC2863A7").unwrap();
        assert_eq!(frame.icao.to_string(), "40621D");
        assert_eq!(frame.tc, 11);
    }

    #[test]
    fn test_parse_lowercase_and_whitespace() {
        let frame = parse_frame("  8d4840d6202cc371c32ce0576098\n").unwrap();
        assert_eq!(frame.icao, IcaoAddress::new(0x4840D6));
    }

    #[test]
    fn test_parse_invalid_length() {
        for hex in ["", "8D4840D6", "8D4840D6202CC371C32CE057609", "8D4840D6202CC371C32CE05760980"] {
            assert!(
                matches!(
                    parse_frame(hex),
                    Err(DecodeError::InvalidMessageLength { expected: 28, .. })
                ),
                "{hex:?} should fail on length"
            );
        }
    }

    #[test]
    fn test_length_checked_before_hex() {
        assert!(matches!(
            parse_frame("ZZZZZZZZZZZZZZ"),
            Err(DecodeError::InvalidMessageLength { actual: 14, .. })
        ));
    }

    #[test]
    fn test_parse_invalid_hex() {
        assert!(matches!(
            parse_frame("8D4840D6202CC371C32CE05760ZZ"),
            Err(DecodeError::InvalidHexEncoding(_))
        ));
        // Multi-byte characters count as one character each.
        assert!(matches!(
            parse_frame("8D4840D6202CC371C32CE05760é8"),
            Err(DecodeError::InvalidHexEncoding(_))
        ));
    }

    #[test]
    fn test_header_roundtrip() {
        let cases = [
            (17u8, 5u8, 0x4840D6u32, 4u8),
            (18, 2, 0xABCDEF, 11),
            (0, 0, 0x000001, 0),
            (31, 7, 0xFFFFFF, 31),
            (11, 3, 0x3C6586, 19),
        ];
        for (df, ca, icao, tc) in cases {
            let me = (tc as u64) << 51 | 0x1_2345_6789;
            let frame = parse_frame(&build(df, ca, icao, me)).unwrap();
            assert_eq!(frame.df, df);
            assert_eq!(frame.ca, ca);
            assert_eq!(frame.icao.value(), icao);
            assert_eq!(frame.tc, tc);
        }
    }

    #[test]
    fn test_extended_squitter_flag() {
        let frame = parse_frame(&build(11, 5, 0x4840D6, 0)).unwrap();
        assert!(!frame.is_extended_squitter());
        let frame = parse_frame(&build(18, 5, 0x4840D6, 0)).unwrap();
        assert!(frame.is_extended_squitter());
    }
}
