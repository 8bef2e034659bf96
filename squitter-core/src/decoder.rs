//! Decode extended squitters into [`ModeSMessage`] records.
//!
//! Handles:
//! - DF17/18 TC 1-4:   aircraft identification (callsign, wake category)
//! - DF17/18 TC 9-18:  airborne position (barometric altitude + CPR)
//! - DF17/18 TC 20-22: airborne position (GNSS height + CPR)
//! - everything else:  header only (DF, CA, ICAO, TC)
//!
//! Everything up to the CPR frame is pure. Position resolution reads and
//! updates the caller's [`TrackStore`].

use tracing::{debug, trace};

use crate::classify::{classify, classify_strict, MessageKind};
use crate::config::{DecodeMode, DecoderConfig};
use crate::cpr::decode_airborne_position;
use crate::error::Result;
use crate::frame::{parse_frame, Frame};
use crate::identification::decode_identification;
use crate::message::ModeSMessage;
use crate::track::TrackStore;

/// Message decoder. Holds configuration only; track state is injected.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Decoder { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode a hex message, resolving its position against `store`.
    pub fn decode<S: TrackStore>(
        &self,
        store: &mut S,
        hex: &str,
        received_at: f64,
    ) -> Result<ModeSMessage> {
        let frame = parse_frame(hex)?;
        self.decode_frame(store, &frame, received_at)
    }

    /// Decode a parsed frame, resolving its position against `store`.
    pub fn decode_frame<S: TrackStore>(
        &self,
        store: &mut S,
        frame: &Frame,
        received_at: f64,
    ) -> Result<ModeSMessage> {
        let mut msg = self.decode_frame_stateless(frame, received_at)?;

        let Some(cpr) = msg.cpr else {
            return Ok(msg);
        };

        match store.with_track(frame.icao, |track| track.resolve(cpr, &self.config)) {
            Ok(position) => {
                debug!(icao = %frame.icao, %position, format = %cpr.format, "position resolved");
                msg.position = Some(position);
            }
            Err(err) => {
                debug!(icao = %frame.icao, error = %err, "position unresolved");
                if self.config.mode == DecodeMode::Full {
                    return Err(err.into());
                }
                msg.position_error = Some(err);
            }
        }
        Ok(msg)
    }

    /// Decode a hex message without touching any track state.
    ///
    /// Airborne positions carry their CPR frame but no resolved position.
    pub fn decode_stateless(&self, hex: &str, received_at: f64) -> Result<ModeSMessage> {
        let frame = parse_frame(hex)?;
        self.decode_frame_stateless(&frame, received_at)
    }

    /// Decode a parsed frame without touching any track state.
    pub fn decode_frame_stateless(&self, frame: &Frame, received_at: f64) -> Result<ModeSMessage> {
        let mut msg = ModeSMessage::from_frame(frame, received_at);

        let kind = match self.config.mode {
            DecodeMode::Full => classify_strict(frame)?,
            DecodeMode::Lenient => classify(frame),
        };
        trace!(icao = %frame.icao, df = frame.df, tc = frame.tc, kind = kind.name(), "classified");

        match kind {
            MessageKind::Identification(me) => {
                let id = decode_identification(&me)?;
                msg.callsign = Some(id.callsign);
                msg.emitter_category = Some(id.emitter_category);
                msg.wake_category = Some(id.wake_category);
            }
            MessageKind::AirbornePosition(me) => {
                let pos = decode_airborne_position(&me, received_at)?;
                msg.cpr = Some(pos.cpr);
                msg.altitude_ft = pos.altitude_ft;
                msg.surveillance_status = Some(pos.surveillance_status);
            }
            MessageKind::HeaderOnly => {}
        }

        Ok(msg)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
