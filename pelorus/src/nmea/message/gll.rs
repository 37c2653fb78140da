// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use crate::nmea::field::{self, Coordinate, FaaMode, FieldError, NmeaTime};
use crate::nmea::line::LineWalker;
use crate::nmea::talker::Talker;

/// GLL: geographic position.
#[derive(Debug, Clone, PartialEq)]
pub struct GllMessage {
    pub talker: Talker,
    pub latitude: Coordinate,
    pub longitude: Coordinate,
    pub time: NmeaTime,
    pub data_valid: bool,
    pub faa_mode: Option<FaaMode>,
}

impl GllMessage {
    pub(crate) fn parse(talker: Talker, walker: &mut LineWalker) -> Result<Self, FieldError> {
        let latitude =
            field::latitude(walker, false)?.ok_or(FieldError::missing("Latitude"))?;
        let longitude =
            field::longitude(walker, false)?.ok_or(FieldError::missing("Longitude"))?;
        let time = field::time(walker, false)?.ok_or(FieldError::missing("Time"))?;
        let data_valid = field::data_valid(walker, false)?;
        let faa_mode = field::faa_mode(walker)?;

        Ok(Self {
            talker,
            latitude,
            longitude,
            time,
            data_valid,
            faa_mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let mut walker = LineWalker::new("4916.45,N,12311.12,W,225444,A,D");
        let message = GllMessage::parse(Talker::new(*b"GP"), &mut walker).unwrap();
        assert_eq!(message.time.to_wire(), "22:54:44");
        assert!(message.data_valid);
        assert_eq!(message.faa_mode, Some(FaaMode::Differential));
    }
}
