//! Altitude decoding for airborne-position messages.
//!
//! The 12-bit AC field of an extended squitter is the 13-bit Mode S altitude
//! code with the M bit removed:
//!
//! ```plain
//! AC13: C1 A1 C2 A2 C4 A4 M B1 Q B2 D2 B4 D4
//! AC12: C1 A1 C2 A2 C4 A4   B1 Q B2 D2 B4 D4
//! ```

/// Decode the 12-bit AC field of TC 9-18 / 20-22 messages.
///
/// Returns `None` for "no altitude" (all zero) and for illegal Gillham codes.
pub fn decode_ac12(ac12: u16) -> Option<i32> {
    let ac13 = ((ac12 & 0x0FC0) << 1) | (ac12 & 0x003F);
    decode_ac13(ac13)
}

/// Decode a 13-bit AC field.
pub fn decode_ac13(ac13: u16) -> Option<i32> {
    if ac13 == 0 {
        return None;
    }
    if ac13 & 0x0040 != 0 {
        // metric altitude, not used by extended squitters
        return None;
    }
    if ac13 & 0x0010 != 0 {
        // Q bit: 25 ft increments
        let n = ((ac13 & 0x1F80) >> 2) | ((ac13 & 0x0020) >> 1) | (ac13 & 0x000F);
        return Some(n as i32 * 25 - 1000);
    }
    decode_gillham(ac13)
}

/// Convert the 12-bit GNSS height of TC 20-22 (plain binary, metres) to feet.
///
/// Zero means no height available.
pub fn decode_gnss_height(meters: u16) -> Option<i32> {
    if meters == 0 {
        return None;
    }
    Some((meters as f64 * FEET_PER_METER).round() as i32)
}

const FEET_PER_METER: f64 = 3.28084;

/// 100 ft Gillham (Mode C) gray code.
fn decode_gillham(ac13: u16) -> Option<i32> {
    if ac13 & 0x1500 == 0 {
        return None; // no C bits
    }

    // 100 ft steps from C1 C2 C4
    let mut h: i32 = 0;
    if ac13 & 0x1000 != 0 {
        h ^= 7;
    }
    if ac13 & 0x0400 != 0 {
        h ^= 3;
    }
    if ac13 & 0x0100 != 0 {
        h ^= 1;
    }
    if h & 5 == 5 {
        h ^= 2;
    }
    if h > 5 {
        return None;
    }

    // 500 ft steps from D2 D4 A1 A2 A4 B1 B2 B4
    let mut f: i32 = 0;
    for (mask, flip) in [
        (0x0004, 0x0FF), // D2
        (0x0001, 0x07F), // D4
        (0x0800, 0x03F), // A1
        (0x0200, 0x01F), // A2
        (0x0080, 0x00F), // A4
        (0x0020, 0x007), // B1
        (0x0008, 0x003), // B2
        (0x0002, 0x001), // B4
    ] {
        if ac13 & mask != 0 {
            f ^= flip;
        }
    }

    if f & 1 != 0 {
        h = 6 - h;
    }

    let altitude = 500 * f + 100 * h - 1300;
    if altitude < -1200 {
        return None;
    }
    Some(altitude)
}
