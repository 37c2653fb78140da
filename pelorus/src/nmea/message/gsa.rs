// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use crate::fixedpoint::HundredthsU8;
use crate::nmea::field::{self, FieldError, GpsFixMode};
use crate::nmea::line::LineWalker;
use crate::nmea::talker::Talker;

/// GSA: active satellites and dilution of precision.
///
/// Some receivers emit back to back GSA messages carrying two different
/// satellite sets. They are not concatenated; each message rewrites the
/// satellite list whole.
#[derive(Debug, Clone, PartialEq)]
pub struct GsaMessage {
    pub talker: Talker,
    pub automatic_mode: bool,
    pub fix_mode: GpsFixMode,
    pub satellite_ids: [Option<u16>; 12],
    pub pdop: HundredthsU8,
    pub hdop: HundredthsU8,
    pub vdop: HundredthsU8,
}

impl GsaMessage {
    pub(crate) fn parse(talker: Talker, walker: &mut LineWalker) -> Result<Self, FieldError> {
        const MODE: &str = "Manual or Automatic Mode";
        let automatic_mode = match walker.next_field() {
            Some("A") => true,
            Some("M") => false,
            Some(_) => return Err(FieldError::invalid(MODE)),
            None => return Err(FieldError::missing(MODE)),
        };

        let fix_mode = field::gps_fix_mode(walker)?;

        let mut satellite_ids = [None; 12];
        for slot in &mut satellite_ids {
            *slot = field::uint16(walker, "Satellite ID", true, u16::MAX)?;
        }

        let pdop =
            field::hundredths_u8(walker, "PDOP", false)?.ok_or(FieldError::missing("PDOP"))?;
        let hdop =
            field::hundredths_u8(walker, "HDOP", false)?.ok_or(FieldError::missing("HDOP"))?;
        let vdop =
            field::hundredths_u8(walker, "VDOP", false)?.ok_or(FieldError::missing("VDOP"))?;

        Ok(Self {
            talker,
            automatic_mode,
            fix_mode,
            satellite_ids,
            pdop,
            hdop,
            vdop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let mut walker = LineWalker::new("A,3,04,05,,09,12,,,24,,,,,2.5,1.3,2.1");
        let message = GsaMessage::parse(Talker::new(*b"GP"), &mut walker).unwrap();
        assert!(message.automatic_mode);
        assert_eq!(message.fix_mode, GpsFixMode::ThreeDimensional);
        assert_eq!(message.satellite_ids[0], Some(4));
        assert_eq!(message.satellite_ids[2], None);
        assert_eq!(message.pdop.to_string(), "2.50");
        assert_eq!(message.hdop.to_string(), "1.30");
        assert_eq!(message.vdop.to_string(), "2.10");
    }
}
