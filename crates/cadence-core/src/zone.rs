//! Time zones, delegated to the IANA database shipped with `chrono-tz`

use crate::{CadenceError, CadenceResult};

/// IANA time zone identifier
pub type Zone = chrono_tz::Tz;

pub const UTC: Zone = chrono_tz::UTC;

/// Resolve an IANA zone name such as `Europe/Berlin`
pub fn parse_zone(name: &str) -> CadenceResult<Zone> {
    name.trim()
        .parse::<Zone>()
        .map_err(|_| CadenceError::UnknownZone(name.to_string()))
}
