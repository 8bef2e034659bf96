//! Per-aircraft CPR state and the stores that hold it.
//!
//! The decoder never owns track state. Callers inject a [`TrackStore`]: a
//! plain [`TrackCache`] map for a single decode loop, or a
//! [`ShardedTrackCache`] shared by worker threads. Both give the decoder
//! exclusive access to one aircraft's track for a read-modify-write cycle.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::trace;

use crate::config::DecoderConfig;
use crate::cpr;
use crate::error::CprError;
use crate::types::{CprFormat, CprFrame, IcaoAddress, Position};

/// Default number of buckets in a [`ShardedTrackCache`].
pub const DEFAULT_SHARDS: usize = 16;

/// A resolved position and when it was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedPosition {
    pub position: Position,
    pub resolved_at: f64,
}

/// CPR decode state for one aircraft.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AircraftTrack {
    pub last_even: Option<CprFrame>,
    pub last_odd: Option<CprFrame>,
    pub last_known_position: Option<ResolvedPosition>,
}

impl AircraftTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest buffered frame of `format`.
    pub fn frame(&self, format: CprFormat) -> Option<&CprFrame> {
        match format {
            CprFormat::Even => self.last_even.as_ref(),
            CprFormat::Odd => self.last_odd.as_ref(),
        }
    }

    /// Buffer a frame, replacing the previous one of the same format.
    pub fn record(&mut self, frame: CprFrame) {
        match frame.format {
            CprFormat::Even => self.last_even = Some(frame),
            CprFormat::Odd => self.last_odd = Some(frame),
        }
    }

    fn discard(&mut self, format: CprFormat) {
        match format {
            CprFormat::Even => self.last_even = None,
            CprFormat::Odd => self.last_odd = None,
        }
    }

    /// Global decode using the buffered pair, reporting in `latest`'s format.
    ///
    /// A pair that straddles a zone boundary is broken up: the frame of the
    /// other format is dropped so the next arrival can pair with `latest`.
    pub fn global_decode(
        &mut self,
        latest: CprFormat,
        window: f64,
    ) -> Result<Position, CprError> {
        let (even, odd) = match (self.last_even, self.last_odd) {
            (Some(even), Some(odd)) => (even, odd),
            (None, _) => {
                return Err(CprError::IncompleteCprPair {
                    missing: CprFormat::Even,
                })
            }
            (_, None) => {
                return Err(CprError::IncompleteCprPair {
                    missing: CprFormat::Odd,
                })
            }
        };

        let result = cpr::global_decode(&even, &odd, latest, window);
        if let Err(CprError::CprZoneMismatch { .. }) = result {
            self.discard(latest.opposite());
        }
        result
    }

    /// A reference position for local decode at time `now`.
    ///
    /// The track's own last position wins while younger than `max_age`;
    /// otherwise the receiver location is used if there is one.
    pub fn reference(
        &self,
        now: f64,
        max_age: f64,
        receiver: Option<Position>,
    ) -> Option<Position> {
        self.last_known_position
            .filter(|p| now - p.resolved_at <= max_age)
            .map(|p| p.position)
            .or(receiver)
    }

    /// Local decode of `frame` against this track's reference.
    pub fn local_decode(
        &self,
        frame: &CprFrame,
        max_age: f64,
        receiver: Option<Position>,
    ) -> Result<Position, CprError> {
        let reference = self
            .reference(frame.received_at, max_age, receiver)
            .ok_or(CprError::NoReferencePosition)?;
        cpr::local_decode(frame, reference)
    }

    /// Buffer a new frame and try to resolve a position from it.
    ///
    /// Global decode is tried first; when it fails, local decode. If local
    /// decode has no reference, the global failure is returned since it says
    /// more about what is missing.
    pub fn resolve(
        &mut self,
        frame: CprFrame,
        config: &DecoderConfig,
    ) -> Result<Position, CprError> {
        self.record(frame);

        let result = match self.global_decode(frame.format, config.pair_window_secs) {
            Ok(pos) => Ok(pos),
            Err(global_err) => {
                trace!(error = %global_err, "global CPR decode failed, trying local");
                match self.local_decode(&frame, config.reference_max_age_secs, config.receiver) {
                    Err(CprError::NoReferencePosition) => Err(global_err),
                    other => other,
                }
            }
        };

        if let Ok(position) = result {
            self.last_known_position = Some(ResolvedPosition {
                position,
                resolved_at: frame.received_at,
            });
        }
        result
    }
}

// ---------------------------------------------------------------------------
// Track stores
// ---------------------------------------------------------------------------

/// Exclusive per-aircraft access to track state.
pub trait TrackStore {
    /// Run `f` on the track for `icao`, creating an empty one if needed.
    fn with_track<R, F>(&mut self, icao: IcaoAddress, f: F) -> R
    where
        F: FnOnce(&mut AircraftTrack) -> R;
}

/// Single-owner track store.
pub type TrackCache = HashMap<IcaoAddress, AircraftTrack>;

impl TrackStore for TrackCache {
    fn with_track<R, F>(&mut self, icao: IcaoAddress, f: F) -> R
    where
        F: FnOnce(&mut AircraftTrack) -> R,
    {
        f(self.entry(icao).or_default())
    }
}

/// Track store split into independently locked buckets keyed by ICAO.
///
/// Share it by reference: `&ShardedTrackCache` is itself a [`TrackStore`].
#[derive(Debug)]
pub struct ShardedTrackCache {
    shards: Vec<Mutex<TrackCache>>,
}

impl ShardedTrackCache {
    pub fn new(shards: usize) -> Self {
        ShardedTrackCache {
            shards: (0..shards.max(1)).map(|_| Mutex::new(TrackCache::new())).collect(),
        }
    }

    fn shard(&self, icao: IcaoAddress) -> &Mutex<TrackCache> {
        &self.shards[icao.value() as usize % self.shards.len()]
    }

    /// Copy of one aircraft's track.
    pub fn get(&self, icao: IcaoAddress) -> Option<AircraftTrack> {
        self.shard(icao).lock().get(&icao).cloned()
    }

    /// Number of tracked aircraft.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merge every bucket into one map, e.g. for checkpointing.
    pub fn snapshot(&self) -> TrackCache {
        let mut all = TrackCache::new();
        for shard in &self.shards {
            all.extend(shard.lock().iter().map(|(k, v)| (*k, v.clone())));
        }
        all
    }
}

impl Default for ShardedTrackCache {
    fn default() -> Self {
        ShardedTrackCache::new(DEFAULT_SHARDS)
    }
}

impl TrackStore for &ShardedTrackCache {
    fn with_track<R, F>(&mut self, icao: IcaoAddress, f: F) -> R
    where
        F: FnOnce(&mut AircraftTrack) -> R,
    {
        let mut shard = self.shard(icao).lock();
        f(shard.entry(icao).or_default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpr::tests::{encode, frame};

    fn config() -> DecoderConfig {
        DecoderConfig::default()
    }

    fn even(t: f64) -> CprFrame {
        frame(CprFormat::Even, 93000, 51372, t)
    }

    fn odd(t: f64) -> CprFrame {
        frame(CprFormat::Odd, 74158, 50194, t)
    }

    #[test]
    fn test_first_frame_incomplete() {
        let mut track = AircraftTrack::new();
        assert_eq!(
            track.resolve(even(1.0), &config()),
            Err(CprError::IncompleteCprPair {
                missing: CprFormat::Odd
            })
        );
        assert_eq!(track.last_even, Some(even(1.0)));
        assert!(track.last_known_position.is_none());
    }

    #[test]
    fn test_pair_resolves_and_sets_reference() {
        let mut track = AircraftTrack::new();
        let _ = track.resolve(even(1.0), &config());
        let pos = track.resolve(odd(2.0), &config()).unwrap();
        assert!((pos.lat - 52.26578).abs() < 1e-4);

        let resolved = track.last_known_position.unwrap();
        assert_eq!(resolved.position, pos);
        assert_eq!(resolved.resolved_at, 2.0);
    }

    #[test]
    fn test_stale_pair_falls_back_to_local() {
        let mut track = AircraftTrack::new();
        let _ = track.resolve(even(1.0), &config());
        let _ = track.resolve(odd(2.0), &config()).unwrap();

        // 30 s later: pair is stale, but the reference is fresh
        let pos = track.resolve(even(32.0), &config()).unwrap();
        assert!((pos.lat - 52.25720).abs() < 1e-4);
        assert!((pos.lon - 3.91937).abs() < 1e-4);
        assert_eq!(track.last_known_position.unwrap().resolved_at, 32.0);
    }

    #[test]
    fn test_stale_pair_without_reference() {
        let mut track = AircraftTrack::new();
        let _ = track.resolve(even(1.0), &config());
        assert!(matches!(
            track.resolve(odd(20.0), &config()),
            Err(CprError::StaleCprPair { .. })
        ));
        // Track survives and keeps buffering
        assert!(track.last_even.is_some() && track.last_odd.is_some());
        assert!(track.resolve(even(21.0), &config()).is_ok());
    }

    #[test]
    fn test_local_decode_stale_reference() {
        let mut track = AircraftTrack::new();
        track.last_known_position = Some(ResolvedPosition {
            position: Position::new(52.25, 3.92),
            resolved_at: 0.0,
        });
        let cfg = config();
        assert!(track.local_decode(&even(100.0), cfg.reference_max_age_secs, None).is_ok());
        assert_eq!(
            track.local_decode(&even(500.0), cfg.reference_max_age_secs, None),
            Err(CprError::NoReferencePosition)
        );
    }

    #[test]
    fn test_local_decode_absent_reference() {
        let track = AircraftTrack::new();
        assert_eq!(
            track.local_decode(&even(1.0), 180.0, None),
            Err(CprError::NoReferencePosition)
        );
    }

    #[test]
    fn test_receiver_reference() {
        let cfg = DecoderConfig {
            receiver: Some(Position::new(52.0, 4.0)),
            ..config()
        };
        let mut track = AircraftTrack::new();
        let pos = track.resolve(even(1.0), &cfg).unwrap();
        assert!((pos.lat - 52.25720).abs() < 1e-4);
    }

    #[test]
    fn test_zone_mismatch_discards_older_frame() {
        let mut track = AircraftTrack::new();
        let _ = track.resolve(frame(CprFormat::Even, 97430, 0, 0.0), &config());
        let result = track.resolve(frame(CprFormat::Odd, 94051, 0, 1.0), &config());
        assert!(matches!(result, Err(CprError::CprZoneMismatch { .. })));
        assert!(track.last_even.is_none());
        assert!(track.last_odd.is_some());
        assert!(track.last_known_position.is_none());

        // A fresh even frame on the odd side of the boundary pairs cleanly
        let (lat, lon) = encode(10.48, 0.0, CprFormat::Even);
        let pos = track
            .resolve(frame(CprFormat::Even, lat, lon, 2.0), &config())
            .unwrap();
        assert!((pos.lat - 10.48).abs() < 1e-3);
    }

    #[test]
    fn test_track_cache_creates_on_demand() {
        let mut cache = TrackCache::new();
        let icao = IcaoAddress::new(0x40621D);
        let len = cache.with_track(icao, |t| {
            t.record(even(1.0));
            1
        });
        assert_eq!(len, 1);
        assert_eq!(cache.len(), 1);
        assert!(cache[&icao].last_even.is_some());
    }

    #[test]
    fn test_sharded_cache_across_threads() {
        let cache = ShardedTrackCache::new(4);
        let cfg = config();
        std::thread::scope(|s| {
            for n in 0..8u32 {
                let cache = &cache;
                let cfg = &cfg;
                s.spawn(move || {
                    let mut store = cache;
                    let icao = IcaoAddress::new(0x100000 + n);
                    let _ = store.with_track(icao, |t| t.resolve(even(1.0), cfg));
                    let pos = store.with_track(icao, |t| t.resolve(odd(2.0), cfg));
                    assert!(pos.is_ok());
                });
            }
        });
        assert_eq!(cache.len(), 8);
        assert_eq!(cache.snapshot().len(), 8);
        assert!(cache
            .get(IcaoAddress::new(0x100003))
            .unwrap()
            .last_known_position
            .is_some());
    }

    #[test]
    fn test_sharded_cache_zero_shards() {
        let cache = ShardedTrackCache::new(0);
        assert!(cache.is_empty());
        let mut store = &cache;
        store.with_track(IcaoAddress::new(1), |t| t.record(odd(0.0)));
        assert_eq!(cache.len(), 1);
    }
}
