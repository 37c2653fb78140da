// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use crate::fixedpoint::{TenthsI16, TenthsU16};
use crate::nmea::field::{self, FieldError};
use crate::nmea::line::LineWalker;
use crate::nmea::talker::Talker;

/// HDG: magnetic sensor heading with deviation and variation.
#[derive(Debug, Clone, PartialEq)]
pub struct HdgMessage {
    pub talker: Talker,
    pub magnetic_sensor_heading: TenthsU16,
    pub magnetic_deviation: Option<TenthsI16>,
    pub magnetic_variation: Option<TenthsI16>,
}

impl HdgMessage {
    pub(crate) fn parse(talker: Talker, walker: &mut LineWalker) -> Result<Self, FieldError> {
        let magnetic_sensor_heading = field::tenths_u16(walker, "Magnetic Sensor Heading", false)?
            .ok_or(FieldError::missing("Magnetic Sensor Heading"))?;
        let magnetic_deviation = field::heading_offset(walker, "Magnetic Deviation")?;
        let magnetic_variation = field::heading_offset(walker, "Magnetic Variation")?;

        Ok(Self {
            talker,
            magnetic_sensor_heading,
            magnetic_deviation,
            magnetic_variation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let mut walker = LineWalker::new("271.2,10.7,E,12.2,W");
        let message = HdgMessage::parse(Talker::new(*b"HC"), &mut walker).unwrap();
        assert_eq!(message.magnetic_sensor_heading.to_string(), "271.2");
        assert_eq!(message.magnetic_deviation.unwrap().to_string(), "-10.7");
        assert_eq!(message.magnetic_variation.unwrap().to_string(), "12.2");
    }
}
