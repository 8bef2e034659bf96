//! Wake-turbulence / emitter category lookup for identification messages.

use crate::error::{DecodeError, Result};

/// Describe the emitter category `ca` of an identification message with
/// type code `tc`.
///
/// TC 1 is reserved regardless of CA, CA 0 means "no information" for the
/// other identification type codes, and every other unassigned pair fails
/// with `UnknownCategory`.
pub fn wake_category(tc: u8, ca: u8) -> Result<&'static str> {
    if tc == 1 {
        return Ok("Reserved");
    }
    if ca == 0 {
        return Ok("No category information");
    }

    let category = match (tc, ca) {
        (2, 1) => "Surface emergency vehicle",
        (2, 3) => "Surface service vehicle",
        (2, 4..=7) => "Ground obstruction",
        (3, 1) => "Glider, sailplane",
        (3, 2) => "Lighter-than-air",
        (3, 3) => "Parachutist, skydiver",
        (3, 4) => "Ultralight, hang-glider, paraglider",
        (3, 5) => "Reserved",
        (3, 6) => "Unmanned aerial vehicle",
        (3, 7) => "Space or transatmospheric vehicle",
        (4, 1) => "Light (less than 7000 kg)",
        (4, 2) => "Medium 1 (between 7000 kg and 34000 kg)",
        (4, 3) => "Medium 2 (between 34000 kg and 136000 kg)",
        (4, 4) => "High vortex aircraft",
        (4, 5) => "Heavy (larger than 136000 kg)",
        (4, 6) => "High performance (>5 g acceleration and high speed (>400 kt))",
        (4, 7) => "Rotorcraft",
        _ => return Err(DecodeError::UnknownCategory { tc, ca }),
    };
    Ok(category)
}
