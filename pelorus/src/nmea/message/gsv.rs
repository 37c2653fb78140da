// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use crate::nmea::field::{self, FieldError};
use crate::nmea::line::LineWalker;
use crate::nmea::talker::Talker;

/// Per-satellite block of a GSV sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GsvSatelliteInfo {
    pub id: u16,
    pub elevation: Option<i8>,
    pub azimuth: Option<u16>,
    pub signal_to_noise_ratio: Option<u8>,
}

/// GSV: satellites in view, up to four per sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct GsvMessage {
    pub talker: Talker,
    pub sentences_in_group: u8,
    pub sentence_number: u8,
    pub number_satellites: u8,
    pub satellites: Vec<GsvSatelliteInfo>,
}

impl GsvMessage {
    pub(crate) fn parse(talker: Talker, walker: &mut LineWalker) -> Result<Self, FieldError> {
        let sentences_in_group = field::uint8(walker, "Sentences in Group", false, 9)?
            .ok_or(FieldError::missing("Sentences in Group"))?;
        let sentence_number = field::uint8(walker, "Sentence Number", false, 9)?
            .ok_or(FieldError::missing("Sentence Number"))?;
        let number_satellites = field::uint8(walker, "Number Satellites", false, u8::MAX)?
            .ok_or(FieldError::missing("Number Satellites"))?;

        let mut satellites = Vec::with_capacity(4);
        while !walker.at_end() && satellites.len() < 4 {
            let Some(id) = field::uint16(walker, "Satellite ID", true, u16::MAX)? else {
                // A receiver padding out the last sentence with empty
                // blocks.
                walker.next_field();
                walker.next_field();
                walker.next_field();
                continue;
            };
            let elevation = field::int8(walker, "Elevation", true)?;
            let azimuth = field::uint16(walker, "Azimuth", true, 359)?;
            let signal_to_noise_ratio =
                field::uint8(walker, "Signal to Noise Ratio", true, 99)?;
            satellites.push(GsvSatelliteInfo {
                id,
                elevation,
                azimuth,
                signal_to_noise_ratio,
            });
        }

        Ok(Self {
            talker,
            sentences_in_group,
            sentence_number,
            number_satellites,
            satellites,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let mut walker =
            LineWalker::new("2,1,08,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45");
        let message = GsvMessage::parse(Talker::new(*b"GP"), &mut walker).unwrap();
        assert_eq!(message.sentences_in_group, 2);
        assert_eq!(message.sentence_number, 1);
        assert_eq!(message.number_satellites, 8);
        assert_eq!(message.satellites.len(), 4);
        assert_eq!(message.satellites[0].id, 1);
        assert_eq!(message.satellites[0].azimuth, Some(83));
        assert_eq!(message.satellites[3].signal_to_noise_ratio, Some(45));
    }
}
