// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use crate::fixedpoint::TenthsU16;
use crate::nmea::field::{self, FieldError};
use crate::nmea::line::LineWalker;
use crate::nmea::talker::Talker;

/// DBT: depth below transducer.
#[derive(Debug, Clone, PartialEq)]
pub struct DbtMessage {
    pub talker: Talker,
    pub depth_feet: Option<TenthsU16>,
    pub depth_meters: Option<TenthsU16>,
    pub depth_fathoms: Option<TenthsU16>,
}

impl DbtMessage {
    pub(crate) fn parse(talker: Talker, walker: &mut LineWalker) -> Result<Self, FieldError> {
        let depth_feet = field::tenths_u16(walker, "Depth Feet", true)?;
        field::constant_word(walker, "Depth Feet Units", "f")?;
        let depth_meters = field::tenths_u16(walker, "Depth Meters", true)?;
        field::constant_word(walker, "Depth Meters Units", "M")?;
        let depth_fathoms = field::tenths_u16(walker, "Depth Fathoms", true)?;
        field::constant_word(walker, "Depth Fathoms Units", "F")?;

        Ok(Self {
            talker,
            depth_feet,
            depth_meters,
            depth_fathoms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let mut walker = LineWalker::new("36.3,f,11.0,M,6.0,F");
        let message = DbtMessage::parse(Talker::new(*b"SD"), &mut walker).unwrap();
        assert_eq!(message.depth_meters.unwrap().to_string(), "11.0");
        assert_eq!(message.depth_feet.unwrap().to_string(), "36.3");
    }

    #[test]
    fn test_parse_empty_depths() {
        let mut walker = LineWalker::new(",f,,M,,F");
        let message = DbtMessage::parse(Talker::new(*b"SD"), &mut walker).unwrap();
        assert!(message.depth_meters.is_none());
    }

    #[test]
    fn test_parse_bad_unit_tag() {
        let mut walker = LineWalker::new("36.3,x,11.0,M,6.0,F");
        assert!(DbtMessage::parse(Talker::new(*b"SD"), &mut walker).is_err());
    }
}
