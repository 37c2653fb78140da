// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use crate::fixedpoint::TenthsI16;
use crate::nmea::field::{self, FieldError};
use crate::nmea::line::LineWalker;
use crate::nmea::talker::Talker;

/// RSA: rudder sensor angle. Starboard carries the single rudder on
/// single-rudder vessels; the port pair is often absent.
#[derive(Debug, Clone, PartialEq)]
pub struct RsaMessage {
    pub talker: Talker,
    pub starboard_angle: TenthsI16,
    pub starboard_valid: bool,
    pub port_angle: Option<TenthsI16>,
    pub port_valid: bool,
}

impl RsaMessage {
    pub(crate) fn parse(talker: Talker, walker: &mut LineWalker) -> Result<Self, FieldError> {
        let starboard_angle = field::tenths_i16(walker, "Starboard Rudder Angle", false)?
            .ok_or(FieldError::missing("Starboard Rudder Angle"))?;
        let starboard_valid = field::data_valid(walker, false)?;
        let port_angle = field::tenths_i16(walker, "Port Rudder Angle", true)?;
        let port_valid = field::data_valid(walker, true)?;

        Ok(Self {
            talker,
            starboard_angle,
            starboard_valid,
            port_angle,
            port_valid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_rudder() {
        let mut walker = LineWalker::new("-4.2,A,,V");
        let message = RsaMessage::parse(Talker::new(*b"II"), &mut walker).unwrap();
        assert_eq!(message.starboard_angle.to_string(), "-4.2");
        assert!(message.starboard_valid);
        assert!(message.port_angle.is_none());
        assert!(!message.port_valid);
    }
}
