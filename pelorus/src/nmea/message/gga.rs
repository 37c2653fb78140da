// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use crate::fixedpoint::{HundredthsU16, TenthsI16, TenthsU16};
use crate::nmea::field::{self, Coordinate, FieldError, GpsQuality, NmeaTime};
use crate::nmea::line::LineWalker;
use crate::nmea::talker::Talker;

/// GGA: GPS fix data.
#[derive(Debug, Clone, PartialEq)]
pub struct GgaMessage {
    pub talker: Talker,
    pub time: NmeaTime,
    pub latitude: Coordinate,
    pub longitude: Coordinate,
    pub gps_quality: GpsQuality,
    pub number_satellites: u16,
    pub horizontal_dilution_of_precision: HundredthsU16,
    pub antenna_altitude: TenthsI16,
    pub geoidal_separation: TenthsI16,
    pub gps_data_age: Option<TenthsU16>,
    pub differential_reference_station: Option<u16>,
}

impl GgaMessage {
    pub(crate) fn parse(talker: Talker, walker: &mut LineWalker) -> Result<Self, FieldError> {
        let time = field::time(walker, false)?.ok_or(FieldError::missing("Time"))?;
        let latitude =
            field::latitude(walker, false)?.ok_or(FieldError::missing("Latitude"))?;
        let longitude =
            field::longitude(walker, false)?.ok_or(FieldError::missing("Longitude"))?;
        let gps_quality = field::gps_quality(walker)?;
        let number_satellites = field::uint16(walker, "Number Satellites", false, 12)?
            .ok_or(FieldError::missing("Number Satellites"))?;
        let horizontal_dilution_of_precision =
            field::hundredths_u16(walker, "Horizontal Dilution of Precision", false)?
                .ok_or(FieldError::missing("Horizontal Dilution of Precision"))?;
        let antenna_altitude = field::tenths_i16(walker, "Antenna Altitude", false)?
            .ok_or(FieldError::missing("Antenna Altitude"))?;
        field::constant_word(walker, "Antenna Altitude Units", "M")?;
        let geoidal_separation = field::tenths_i16(walker, "Geoidal Separation", false)?
            .ok_or(FieldError::missing("Geoidal Separation"))?;
        field::constant_word(walker, "Geoidal Separation Units", "M")?;
        let gps_data_age = field::tenths_u16(walker, "GPS Data Age", true)?;
        let differential_reference_station =
            field::uint16(walker, "Differential Reference Station", true, 1023)?;

        Ok(Self {
            talker,
            time,
            latitude,
            longitude,
            gps_quality,
            number_satellites,
            horizontal_dilution_of_precision,
            antenna_altitude,
            geoidal_separation,
            gps_data_age,
            differential_reference_station,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let mut walker =
            LineWalker::new("123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,");
        let message = GgaMessage::parse(Talker::new(*b"GP"), &mut walker).unwrap();
        assert_eq!(message.time.to_wire(), "12:35:19");
        assert_eq!(message.latitude.to_wire(), "48\u{00b0}7.03800'N");
        assert_eq!(message.longitude.to_wire(), "11\u{00b0}31.00000'E");
        assert_eq!(message.gps_quality, GpsQuality::Gps);
        assert_eq!(message.number_satellites, 8);
        assert_eq!(
            message.horizontal_dilution_of_precision.to_string(),
            "0.90"
        );
        assert_eq!(message.antenna_altitude.to_string(), "545.4");
        assert_eq!(message.geoidal_separation.to_string(), "46.9");
        assert!(message.gps_data_age.is_none());
        assert!(message.differential_reference_station.is_none());
    }

    #[test]
    fn test_parse_bad_unit_word_fails() {
        let mut walker =
            LineWalker::new("123519,4807.038,N,01131.000,E,1,08,0.9,545.4,Z,46.9,M,,");
        assert!(GgaMessage::parse(Talker::new(*b"GP"), &mut walker).is_err());
    }
}
