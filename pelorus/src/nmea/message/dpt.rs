// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use crate::fixedpoint::{TenthsI16, TenthsU16};
use crate::nmea::field::{self, FieldError};
use crate::nmea::line::LineWalker;
use crate::nmea::talker::Talker;

/// DPT: depth below transducer plus the transducer's offset from the
/// keel (negative) or the water line (positive).
#[derive(Debug, Clone, PartialEq)]
pub struct DptMessage {
    pub talker: Talker,
    pub depth_below_transducer_meters: TenthsU16,
    pub transducer_offset_meters: TenthsI16,
    pub max_range_scale_meters: Option<TenthsU16>,
}

impl DptMessage {
    pub(crate) fn parse(talker: Talker, walker: &mut LineWalker) -> Result<Self, FieldError> {
        let depth_below_transducer_meters = field::tenths_u16(walker, "Depth", false)?
            .ok_or(FieldError::missing("Depth"))?;
        let transducer_offset_meters = field::tenths_i16(walker, "Transducer Offset", false)?
            .ok_or(FieldError::missing("Transducer Offset"))?;
        let max_range_scale_meters = if walker.at_end() {
            None
        } else {
            field::tenths_u16(walker, "Max Range Scale", true)?
        };

        Ok(Self {
            talker,
            depth_below_transducer_meters,
            transducer_offset_meters,
            max_range_scale_meters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_negative_offset() {
        let mut walker = LineWalker::new("12.3,-2.1");
        let message = DptMessage::parse(Talker::new(*b"SD"), &mut walker).unwrap();
        assert_eq!(message.depth_below_transducer_meters.to_string(), "12.3");
        assert_eq!(message.transducer_offset_meters.to_string(), "-2.1");
        assert!(message.max_range_scale_meters.is_none());
    }

    #[test]
    fn test_parse_with_range_scale() {
        let mut walker = LineWalker::new("12.3,0.5,100.0");
        let message = DptMessage::parse(Talker::new(*b"SD"), &mut walker).unwrap();
        assert_eq!(message.max_range_scale_meters.unwrap().to_string(), "100.0");
    }
}
