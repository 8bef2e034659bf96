//! Compact Position Reporting: CPR decode for airborne positions.
//!
//! Two decode modes:
//! - Global: requires an even+odd frame pair within the pair window. No reference needed.
//! - Local: single frame + a reference position close enough to share its zone.
//!
//! Key constants:
//! - NZ = 15 (latitude zones per hemisphere for even frames)
//! - Nb = 17 (bits per coordinate)
//! - Dlat_even = 360 / (4 * NZ) = 6.0 degrees
//! - Dlat_odd = 360 / (4 * NZ - 1) ≈ 6.1017 degrees

use std::f64::consts::PI;

use crate::altitude::{decode_ac12, decode_gnss_height};
use crate::bits::MePayload;
use crate::error::{CprError, Result};
use crate::types::{CprFormat, CprFrame, Position};

/// Number of latitude zones per hemisphere.
const NZ: f64 = 15.0;

/// Bits per CPR coordinate.
const NB: u32 = 17;

/// Maximum CPR value (2^17 = 131072).
const CPR_MAX: f64 = (1u32 << NB) as f64;

/// Default maximum time between even/odd frames for global decode (seconds).
pub const MAX_PAIR_AGE: f64 = 10.0;

/// Latitude zone size for a format.
fn dlat(format: CprFormat) -> f64 {
    360.0 / (4.0 * NZ - format.index() as f64)
}

/// Number of longitude zones at a given latitude (NL function).
///
/// 59 at the equator, 2 at exactly ±87°, 1 beyond.
pub fn nl(lat: f64) -> u32 {
    if lat == 0.0 {
        return 59;
    }
    let abs = lat.abs();
    if abs == 87.0 {
        return 2;
    }
    if abs > 87.0 {
        return 1;
    }

    let a = 1.0 - (PI / (2.0 * NZ)).cos();
    let b = (PI / 180.0 * lat).cos().powi(2);
    let arg = (1.0 - a / b).clamp(-1.0, 1.0);
    let nl_val = (2.0 * PI / arg.acos()).floor();
    (nl_val as u32).max(1)
}

/// Longitude zone count for a format at a latitude: NL for even, NL-1 for odd.
fn n_lon(nl_val: u32, format: CprFormat) -> u32 {
    nl_val.saturating_sub(format.index()).max(1)
}

/// Modulo that always returns a non-negative result.
fn modulo(x: f64, y: f64) -> f64 {
    x - y * (x / y).floor()
}

fn normalize_lon(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else if lon <= -180.0 {
        lon + 360.0
    } else {
        lon
    }
}

fn check_lat(lat: f64) -> std::result::Result<f64, CprError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(lat)
    } else {
        Err(CprError::LatitudeOutOfRange { lat })
    }
}

// ---------------------------------------------------------------------------
// Airborne position payload
// ---------------------------------------------------------------------------

/// Fields of a TC 9-18 / 20-22 ME payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirbornePosition {
    pub surveillance_status: u8,
    pub altitude_ft: Option<i32>,
    pub cpr: CprFrame,
}

/// Decode an airborne-position ME payload.
///
/// ME layout: TC (5) | SS (2) | SAF (1) | ALT (12) | T (1) | F (1) | LAT (17) | LON (17)
///
/// ALT is a barometric altitude code for TC 9-18 and GNSS height in metres
/// for TC 20-22.
pub fn decode_airborne_position(me: &MePayload, received_at: f64) -> Result<AirbornePosition> {
    let surveillance_status = me.field(5, 2)? as u8;
    let alt = me.field(8, 12)? as u16;
    let altitude_ft = match me.type_code()? {
        20..=22 => decode_gnss_height(alt),
        _ => decode_ac12(alt),
    };
    let format = CprFormat::from_bit(me.field(21, 1)?);
    let encoded_lat = me.field(22, 17)? as u32;
    let encoded_lon = me.field(39, 17)? as u32;

    Ok(AirbornePosition {
        surveillance_status,
        altitude_ft,
        cpr: CprFrame {
            format,
            encoded_lat,
            encoded_lon,
            received_at,
        },
    })
}

// ---------------------------------------------------------------------------
// Global / local decode
// ---------------------------------------------------------------------------

/// Global CPR decode from an even/odd frame pair.
///
/// `latest` picks which frame's latitude/longitude is reported; it should be
/// the format of the most recently received frame. Fails when the frames are
/// further apart than `window` seconds or straddle a zone boundary.
pub fn global_decode(
    even: &CprFrame,
    odd: &CprFrame,
    latest: CprFormat,
    window: f64,
) -> std::result::Result<Position, CprError> {
    let age = (even.received_at - odd.received_at).abs();
    // NaN timestamps never pair
    if age.is_nan() || age > window {
        return Err(CprError::StaleCprPair { age, window });
    }

    let lat_even_cpr = even.encoded_lat as f64 / CPR_MAX;
    let lon_even_cpr = even.encoded_lon as f64 / CPR_MAX;
    let lat_odd_cpr = odd.encoded_lat as f64 / CPR_MAX;
    let lon_odd_cpr = odd.encoded_lon as f64 / CPR_MAX;

    // Latitude zone index
    let j = (59.0 * lat_even_cpr - 60.0 * lat_odd_cpr + 0.5).floor();

    let mut lat_e = dlat(CprFormat::Even) * (modulo(j, 60.0) + lat_even_cpr);
    let mut lat_o = dlat(CprFormat::Odd) * (modulo(j, 59.0) + lat_odd_cpr);

    // Southern hemisphere comes out in [270, 360)
    if lat_e >= 270.0 {
        lat_e -= 360.0;
    }
    if lat_o >= 270.0 {
        lat_o -= 360.0;
    }
    check_lat(lat_e)?;
    check_lat(lat_o)?;

    let nl_even = nl(lat_e);
    let nl_odd = nl(lat_o);
    if nl_even != nl_odd {
        return Err(CprError::CprZoneMismatch { nl_even, nl_odd });
    }

    let (lat, lon_cpr) = match latest {
        CprFormat::Even => (lat_e, lon_even_cpr),
        CprFormat::Odd => (lat_o, lon_odd_cpr),
    };
    let nl_val = nl(lat) as f64;
    let ni = n_lon(nl(lat), latest) as f64;
    let m = (lon_even_cpr * (nl_val - 1.0) - lon_odd_cpr * nl_val + 0.5).floor();
    let lon = (360.0 / ni) * (modulo(m, ni) + lon_cpr);

    Ok(Position::new(lat, normalize_lon(lon)))
}

/// Local CPR decode of a single frame against a reference position.
///
/// Valid only when the aircraft is within half a zone of the reference
/// (~180 NM); the caller decides whether the reference is fresh enough.
pub fn local_decode(frame: &CprFrame, reference: Position) -> std::result::Result<Position, CprError> {
    let d_lat = dlat(frame.format);
    let lat_cpr = frame.encoded_lat as f64 / CPR_MAX;
    let lon_cpr = frame.encoded_lon as f64 / CPR_MAX;

    let j = (reference.lat / d_lat).floor()
        + (0.5 + modulo(reference.lat, d_lat) / d_lat - lat_cpr).floor();
    let lat = check_lat(d_lat * (j + lat_cpr))?;

    let d_lon = 360.0 / n_lon(nl(lat), frame.format) as f64;
    let m = (reference.lon / d_lon).floor()
        + (0.5 + modulo(reference.lon, d_lon) / d_lon - lon_cpr).floor();
    let lon = d_lon * (m + lon_cpr);

    Ok(Position::new(lat, normalize_lon(lon)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
