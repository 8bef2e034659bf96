//! The decoded record handed back to callers.

use serde::Serialize;

use crate::bits::MessageBits;
use crate::error::CprError;
use crate::frame::Frame;
use crate::types::{CprFrame, IcaoAddress, Position};

/// One decoded downlink message.
///
/// Header fields are always present. The identification fields are filled
/// only for TC 1-4, the CPR/altitude fields only for airborne positions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeSMessage {
    pub downlink_format: u8,
    pub capability: u8,
    pub icao: IcaoAddress,
    pub type_code: u8,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub callsign: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emitter_category: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wake_category: Option<&'static str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpr: Option<CprFrame>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude_ft: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surveillance_status: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_error: Option<CprError>,

    pub received_at: f64,
    pub raw: MessageBits,
}

impl ModeSMessage {
    /// A header-only record for `frame`.
    pub fn from_frame(frame: &Frame, received_at: f64) -> Self {
        ModeSMessage {
            downlink_format: frame.df,
            capability: frame.ca,
            icao: frame.icao,
            type_code: frame.tc,
            callsign: None,
            emitter_category: None,
            wake_category: None,
            cpr: None,
            altitude_ft: None,
            surveillance_status: None,
            position: None,
            position_error: None,
            received_at,
            raw: frame.bits,
        }
    }

    /// Callsign without trailing padding.
    pub fn trimmed_callsign(&self) -> Option<&str> {
        self.callsign.as_deref().map(str::trim_end)
    }

    pub fn is_identification(&self) -> bool {
        self.callsign.is_some()
    }

    pub fn is_airborne_position(&self) -> bool {
        self.cpr.is_some()
    }
}
