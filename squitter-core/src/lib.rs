//! squitter-core: Mode S / ADS-B extended squitter decoding.
//!
//! No async, no I/O on the decode path. Messages go hex -> [`Frame`] ->
//! [`ModeSMessage`]; CPR position state lives in a caller-owned
//! [`TrackStore`] so the same [`Decoder`] can serve one loop or many threads.

pub mod altitude;
pub mod bits;
pub mod classify;
pub mod config;
pub mod cpr;
pub mod decoder;
pub mod error;
pub mod frame;
pub mod identification;
pub mod message;
pub mod track;
pub mod types;
pub mod wake;

// Re-export commonly used types at crate root
pub use classify::{classify, MessageKind};
pub use config::{DecodeMode, DecoderConfig};
pub use decoder::Decoder;
pub use error::{CprError, DecodeError, Result};
pub use frame::{parse_frame, Frame};
pub use message::ModeSMessage;
pub use track::{AircraftTrack, ShardedTrackCache, TrackCache, TrackStore};
pub use types::*;
