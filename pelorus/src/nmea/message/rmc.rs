// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use crate::fixedpoint::{TenthsI16, TenthsU16};
use crate::nmea::field::{self, Coordinate, FaaMode, FieldError, NmeaDate, NmeaTime};
use crate::nmea::line::LineWalker;
use crate::nmea::talker::Talker;

/// RMC: recommended minimum navigation information.
#[derive(Debug, Clone, PartialEq)]
pub struct RmcMessage {
    pub talker: Talker,
    pub time: NmeaTime,
    pub data_valid: bool,
    pub latitude: Coordinate,
    pub longitude: Coordinate,
    pub speed_over_ground: TenthsU16,
    pub track_made_good: TenthsU16,
    pub date: NmeaDate,
    pub magnetic_variation: Option<TenthsI16>,
    pub faa_mode: Option<FaaMode>,
}

impl RmcMessage {
    pub(crate) fn parse(talker: Talker, walker: &mut LineWalker) -> Result<Self, FieldError> {
        let time = field::time(walker, false)?.ok_or(FieldError::missing("Time"))?;
        let data_valid = field::data_valid(walker, false)?;
        let latitude =
            field::latitude(walker, false)?.ok_or(FieldError::missing("Latitude"))?;
        let longitude =
            field::longitude(walker, false)?.ok_or(FieldError::missing("Longitude"))?;
        let speed_over_ground = field::tenths_u16(walker, "Speed Over Ground", false)?
            .ok_or(FieldError::missing("Speed Over Ground"))?;
        let track_made_good = field::tenths_u16(walker, "Track Made Good", false)?
            .ok_or(FieldError::missing("Track Made Good"))?;
        let date = field::date(walker, false)?.ok_or(FieldError::missing("Date"))?;
        let magnetic_variation = field::heading_offset(walker, "Magnetic Variation")?;
        let faa_mode = field::faa_mode(walker)?;

        Ok(Self {
            talker,
            time,
            data_valid,
            latitude,
            longitude,
            speed_over_ground,
            track_made_good,
            date,
            magnetic_variation,
            faa_mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let mut walker =
            LineWalker::new("123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W");
        let message = RmcMessage::parse(Talker::new(*b"GP"), &mut walker).unwrap();
        assert!(message.data_valid);
        assert_eq!(message.speed_over_ground.to_string(), "22.4");
        assert_eq!(message.track_made_good.to_string(), "84.4");
        assert_eq!(message.date.to_wire(), "1994-03-23");
        assert_eq!(message.magnetic_variation.unwrap().to_string(), "3.1");
        assert_eq!(message.faa_mode, None);
    }
}
