// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use crate::fixedpoint::TenthsU16;
use crate::nmea::field::{self, FaaMode, FieldError};
use crate::nmea::line::LineWalker;
use crate::nmea::talker::Talker;

/// VTG: track made good and ground speed.
///
/// Two field layouts exist: the current one tags each value with a unit
/// word (`T`, `M`, `N`, `K`), the pre-2.3 one carries the four values
/// bare. The second field tells them apart.
#[derive(Debug, Clone, PartialEq)]
pub struct VtgMessage {
    pub talker: Talker,
    pub track_made_good_true: Option<TenthsU16>,
    pub track_made_good_magnetic: Option<TenthsU16>,
    pub speed_over_ground: Option<TenthsU16>,
    pub speed_over_ground_kmh: Option<TenthsU16>,
    pub faa_mode: Option<FaaMode>,
}

impl VtgMessage {
    pub(crate) fn parse(talker: Talker, walker: &mut LineWalker) -> Result<Self, FieldError> {
        let track_made_good_true = field::tenths_u16(walker, "Track Made Good", true)?;

        let second = walker
            .next_field()
            .ok_or(FieldError::missing("Course Over Ground, Magnetic"))?;
        let old_form = second != "T";

        let track_made_good_magnetic;
        if old_form {
            track_made_good_magnetic = parse_optional_tenths(second)?;
        } else {
            track_made_good_magnetic =
                field::tenths_u16(walker, "Course Over Ground, Magnetic", true)?;
            field::constant_word(walker, "Course Magnetic Units", "M")?;
        }

        let speed_over_ground = field::tenths_u16(walker, "Speed Over Ground", true)?;
        if !old_form {
            field::constant_word(walker, "Speed Knots Units", "N")?;
        }

        let speed_over_ground_kmh = field::tenths_u16(walker, "Speed Over Ground km/h", true)?;
        if !old_form {
            field::constant_word(walker, "Speed km/h Units", "K")?;
        }

        let faa_mode = field::faa_mode(walker)?;

        Ok(Self {
            talker,
            track_made_good_true,
            track_made_good_magnetic,
            speed_over_ground,
            speed_over_ground_kmh,
            faa_mode,
        })
    }
}

fn parse_optional_tenths(view: &str) -> Result<Option<TenthsU16>, FieldError> {
    if view.is_empty() {
        return Ok(None);
    }
    let mut walker = LineWalker::new(view);
    field::tenths_u16(&mut walker, "Course Over Ground, Magnetic", false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modern_form() {
        let mut walker = LineWalker::new("054.7,T,034.4,M,005.5,N,010.2,K,A");
        let message = VtgMessage::parse(Talker::new(*b"GP"), &mut walker).unwrap();
        assert_eq!(message.track_made_good_true.unwrap().to_string(), "54.7");
        assert_eq!(
            message.track_made_good_magnetic.unwrap().to_string(),
            "34.4"
        );
        assert_eq!(message.speed_over_ground.unwrap().to_string(), "5.5");
        assert_eq!(message.speed_over_ground_kmh.unwrap().to_string(), "10.2");
        assert_eq!(message.faa_mode, Some(FaaMode::Autonomous));
    }

    #[test]
    fn test_parse_old_form() {
        let mut walker = LineWalker::new("054.7,034.4,005.5,010.2");
        let message = VtgMessage::parse(Talker::new(*b"GP"), &mut walker).unwrap();
        assert_eq!(message.track_made_good_true.unwrap().to_string(), "54.7");
        assert_eq!(message.speed_over_ground_kmh.unwrap().to_string(), "10.2");
        assert_eq!(message.faa_mode, None);
    }
}
