// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use crate::fixedpoint::TenthsU16;
use crate::nmea::field::{self, FieldError, RelativeIndicator, SpeedUnits};
use crate::nmea::line::LineWalker;
use crate::nmea::talker::Talker;

/// MWV: wind speed and angle.
#[derive(Debug, Clone, PartialEq)]
pub struct MwvMessage {
    pub talker: Talker,
    pub wind_angle: TenthsU16,
    pub relative_indicator: RelativeIndicator,
    pub wind_speed: TenthsU16,
    pub wind_speed_units: SpeedUnits,
    pub data_valid: bool,
}

impl MwvMessage {
    pub(crate) fn parse(talker: Talker, walker: &mut LineWalker) -> Result<Self, FieldError> {
        let wind_angle = field::tenths_u16(walker, "Wind Angle", false)?
            .ok_or(FieldError::missing("Wind Angle"))?;
        let relative_indicator = field::relative_indicator(walker)?;
        let wind_speed = field::tenths_u16(walker, "Wind Speed", false)?
            .ok_or(FieldError::missing("Wind Speed"))?;
        let wind_speed_units = field::speed_units(walker)?;
        let data_valid = field::data_valid(walker, false)?;

        Ok(Self {
            talker,
            wind_angle,
            relative_indicator,
            wind_speed,
            wind_speed_units,
            data_valid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let mut walker = LineWalker::new("054.7,T,005.5,N,A");
        let message = MwvMessage::parse(Talker::new(*b"WI"), &mut walker).unwrap();
        assert_eq!(message.wind_angle.to_string(), "54.7");
        assert_eq!(message.relative_indicator, RelativeIndicator::Theoretical);
        assert_eq!(message.wind_speed.to_string(), "5.5");
        assert_eq!(message.wind_speed_units, SpeedUnits::Knots);
        assert!(message.data_valid);
    }
}
