//! Error taxonomy for squitter-core.
//!
//! Parse-level failures (hex, length, bit range) end decoding of a message.
//! CPR failures are recoverable at the track level and live in their own
//! enum so they can also be reported inside a decoded record.

use serde::Serialize;
use thiserror::Error;

use crate::types::CprFormat;

/// All errors produced by squitter-core.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid hex encoding: {0:?}")]
    InvalidHexEncoding(String),
    #[error("invalid message length: expected {expected} hex characters, got {actual}")]
    InvalidMessageLength { expected: usize, actual: usize },
    #[error("bit field at offset {offset} width {width} exceeds {len}-bit buffer")]
    OutOfRange {
        offset: usize,
        width: usize,
        len: usize,
    },
    #[error("unsupported type code {tc} for downlink format {df}")]
    UnsupportedTypeCode { df: u8, tc: u8 },
    #[error("invalid callsign character code {value} at position {position}")]
    InvalidCallsignCharacter { position: usize, value: u8 },
    #[error("unknown emitter category {ca} for type code {tc}")]
    UnknownCategory { tc: u8, ca: u8 },
    #[error(transparent)]
    Cpr(#[from] CprError),
    #[error("config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Position-resolution failures. None of these invalidate the track.
#[derive(Debug, Clone, Copy, PartialEq, Error, Serialize)]
#[serde(tag = "kind")]
pub enum CprError {
    #[error("incomplete CPR pair: no {missing} frame buffered")]
    IncompleteCprPair { missing: CprFormat },
    #[error("stale CPR pair: frames {age:.1}s apart, window is {window:.1}s")]
    StaleCprPair { age: f64, window: f64 },
    #[error("CPR pair straddles a zone boundary (NL {nl_even} even vs {nl_odd} odd)")]
    CprZoneMismatch { nl_even: u32, nl_odd: u32 },
    #[error("CPR latitude {lat:.4} outside [-90, 90]")]
    LatitudeOutOfRange { lat: f64 },
    #[error("no usable reference position for local CPR decode")]
    NoReferencePosition,
}
