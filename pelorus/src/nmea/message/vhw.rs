// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use crate::fixedpoint::{TenthsI16, TenthsU16};
use crate::nmea::field::{self, FieldError};
use crate::nmea::line::LineWalker;
use crate::nmea::talker::Talker;

/// VHW: water referenced heading and speed.
#[derive(Debug, Clone, PartialEq)]
pub struct VhwMessage {
    pub talker: Talker,
    pub water_heading_true: Option<TenthsU16>,
    pub water_heading_magnetic: Option<TenthsU16>,
    pub water_speed_knots: Option<TenthsI16>,
    pub water_speed_kmh: Option<TenthsI16>,
}

impl VhwMessage {
    pub(crate) fn parse(talker: Talker, walker: &mut LineWalker) -> Result<Self, FieldError> {
        let water_heading_true = field::tenths_u16(walker, "Heading True", true)?;
        field::constant_word(walker, "Heading True Units", "T")?;
        let water_heading_magnetic = field::tenths_u16(walker, "Heading Magnetic", true)?;
        field::constant_word(walker, "Heading Magnetic Units", "M")?;
        let water_speed_knots = field::tenths_i16(walker, "Water Speed Knots", true)?;
        field::constant_word(walker, "Water Speed Knots Units", "N")?;
        let water_speed_kmh = field::tenths_i16(walker, "Water Speed km/h", true)?;
        field::constant_word(walker, "Water Speed km/h Units", "K")?;

        Ok(Self {
            talker,
            water_heading_true,
            water_heading_magnetic,
            water_speed_knots,
            water_speed_kmh,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let mut walker = LineWalker::new("245.1,T,235.3,M,5.5,N,10.2,K");
        let message = VhwMessage::parse(Talker::new(*b"VW"), &mut walker).unwrap();
        assert_eq!(message.water_heading_true.unwrap().to_string(), "245.1");
        assert_eq!(message.water_speed_knots.unwrap().to_string(), "5.5");
    }
}
