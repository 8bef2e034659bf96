//! Route a frame to the decoder for its DF and type code.

use crate::bits::MePayload;
use crate::error::{DecodeError, Result};
use crate::frame::Frame;

/// What the rest of a frame holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// DF17/18, TC 1-4
    Identification(MePayload),
    /// DF17/18, TC 9-18 (barometric altitude) or 20-22 (GNSS height)
    AirbornePosition(MePayload),
    /// Anything else: only the header is decoded
    HeaderOnly,
}

impl MessageKind {
    pub fn name(&self) -> &'static str {
        match self {
            MessageKind::Identification(_) => "identification",
            MessageKind::AirbornePosition(_) => "airborne position",
            MessageKind::HeaderOnly => "header only",
        }
    }
}

/// Classify a frame. Never fails: unknown DF/TC combinations are `HeaderOnly`.
pub fn classify(frame: &Frame) -> MessageKind {
    if !frame.is_extended_squitter() {
        return MessageKind::HeaderOnly;
    }
    match frame.tc {
        1..=4 => MessageKind::Identification(frame.bits.me()),
        9..=18 | 20..=22 => MessageKind::AirbornePosition(frame.bits.me()),
        _ => MessageKind::HeaderOnly,
    }
}

/// Classify a frame, failing with `UnsupportedTypeCode` when nothing beyond
/// the header could be decoded.
pub fn classify_strict(frame: &Frame) -> Result<MessageKind> {
    match classify(frame) {
        MessageKind::HeaderOnly => Err(DecodeError::UnsupportedTypeCode {
            df: frame.df,
            tc: frame.tc,
        }),
        kind => Ok(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::parse_frame;

    fn frame_with(df: u8, tc: u8) -> Frame {
        let hex = format!("{:02X}4840D6{:02X}000000000000000000", df << 3 | 5, tc << 3);
        parse_frame(&hex).unwrap()
    }

    #[test]
    fn test_identification_range() {
        for tc in 1..=4 {
            assert!(matches!(
                classify(&frame_with(17, tc)),
                MessageKind::Identification(_)
            ));
        }
    }

    #[test]
    fn test_airborne_position_ranges() {
        for tc in (9..=18).chain(20..=22) {
            let kind = classify(&frame_with(17, tc));
            assert!(matches!(kind, MessageKind::AirbornePosition(_)), "tc {tc}");
        }
    }

    #[test]
    fn test_header_only_type_codes() {
        for tc in [0, 5, 6, 7, 8, 19, 23, 28, 31] {
            assert_eq!(classify(&frame_with(17, tc)), MessageKind::HeaderOnly, "tc {tc}");
        }
    }

    #[test]
    fn test_df18_is_decoded() {
        assert!(matches!(
            classify(&frame_with(18, 11)),
            MessageKind::AirbornePosition(_)
        ));
    }

    #[test]
    fn test_other_df_header_only() {
        assert_eq!(classify(&frame_with(20, 4)), MessageKind::HeaderOnly);
        assert_eq!(classify(&frame_with(11, 11)), MessageKind::HeaderOnly);
    }

    #[test]
    fn test_classify_strict() {
        assert!(classify_strict(&frame_with(17, 4)).is_ok());
        assert!(matches!(
            classify_strict(&frame_with(17, 19)),
            Err(DecodeError::UnsupportedTypeCode { df: 17, tc: 19 })
        ));
    }

    #[test]
    fn test_payload_is_me_field() {
        let frame = parse_frame("8D4840D6202CC371C32CE0576098").unwrap();
        match classify(&frame) {
            MessageKind::Identification(me) => {
                assert_eq!(me.as_bytes(), &[0x20, 0x2C, 0xC3, 0x71, 0xC3, 0x2C, 0xE0]);
            }
            other => panic!("expected identification, got {}", other.name()),
        }
    }
}
