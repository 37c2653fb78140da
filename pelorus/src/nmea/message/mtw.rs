// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use crate::fixedpoint::TenthsI16;
use crate::nmea::field::{self, FieldError, TemperatureUnits};
use crate::nmea::line::LineWalker;
use crate::nmea::talker::Talker;

/// MTW: water temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct MtwMessage {
    pub talker: Talker,
    pub water_temperature: TenthsI16,
    pub water_temperature_units: TemperatureUnits,
}

impl MtwMessage {
    pub(crate) fn parse(talker: Talker, walker: &mut LineWalker) -> Result<Self, FieldError> {
        let water_temperature = field::tenths_i16(walker, "Water Temperature", false)?
            .ok_or(FieldError::missing("Water Temperature"))?;
        let water_temperature_units = field::temperature_units(walker)?;

        Ok(Self {
            talker,
            water_temperature,
            water_temperature_units,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let mut walker = LineWalker::new("18.4,C");
        let message = MtwMessage::parse(Talker::new(*b"II"), &mut walker).unwrap();
        assert_eq!(message.water_temperature.to_string(), "18.4");
        assert_eq!(message.water_temperature_units, TemperatureUnits::Celsius);
    }
}
