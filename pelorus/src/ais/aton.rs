// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use std::fmt;

use super::bits::BitReader;
use crate::nmea::Talker;

/// Navigational aid categories carried in a type 21 report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavAidType(pub u8);

impl fmt::Display for NavAidType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self.0 {
            0 => "Unspecified",
            1 => "Reference Point",
            2 => "RACON",
            3 => "Fixed Offshore Structure",
            4 => "Emergency Wreck Marking Buoy",
            5 => "Light, without Sectors",
            6 => "Light, with Sectors",
            7 => "Leading Light Front",
            8 => "Leading Light Rear",
            9 => "Beacon, Cardinal N",
            10 => "Beacon, Cardinal E",
            11 => "Beacon, Cardinal S",
            12 => "Beacon, Cardinal W",
            13 => "Beacon, Port Hand",
            14 => "Beacon, Starboard Hand",
            15 => "Beacon, Preferred Channel Port Hand",
            16 => "Beacon, Preferred Channel Starboard Hand",
            17 => "Beacon, Isolated Danger",
            18 => "Beacon, Safe Water",
            19 => "Beacon, Special Mark",
            20 => "Cardinal Mark N",
            21 => "Cardinal Mark E",
            22 => "Cardinal Mark S",
            23 => "Cardinal Mark W",
            24 => "Port Hand Mark",
            25 => "Starboard Hand Mark",
            26 => "Preferred Channel Port Hand",
            27 => "Preferred Channel Starboard Hand",
            28 => "Isolated Danger",
            29 => "Safe Water",
            30 => "Special Mark",
            31 => "Light Vessel / LANBY / Rig",
            _ => "Reserved",
        };
        write!(f, "{name}")
    }
}

/// AIS message type 21: aid-to-navigation report.
///
/// Coordinates are in 1/10000 minute; 181 degrees longitude and 91
/// degrees latitude mean "not available".
#[derive(Debug, Clone, PartialEq)]
pub struct AidToNavigationReport {
    pub repeat_indicator: u8,
    pub mmsi: u32,
    pub nav_aid_type: NavAidType,
    pub name: String,
    pub position_accurate: bool,
    pub longitude_ten_thousandths_min: i32,
    pub latitude_ten_thousandths_min: i32,
    pub dimension_to_bow: u16,
    pub dimension_to_stern: u16,
    pub dimension_to_port: u8,
    pub dimension_to_starboard: u8,
    pub epfd_type: u8,
    pub utc_second: u8,
    pub off_position: bool,
    pub regional: u8,
    pub raim: bool,
    pub virtual_aid: bool,
    pub assigned_mode: bool,
    pub name_extension: String,
}

impl AidToNavigationReport {
    /// Decode the fields following the six-bit message type.
    pub(super) fn parse(reader: &mut BitReader) -> Option<Self> {
        let repeat_indicator = reader.read_u8(2)?;
        let mmsi = reader.read_u32(30)?;
        let nav_aid_type = NavAidType(reader.read_u8(5)?);
        let name = reader.read_string(20)?;
        let position_accurate = reader.read_bool()?;
        let longitude_ten_thousandths_min = reader.read_i32(28)?;
        let latitude_ten_thousandths_min = reader.read_i32(27)?;
        #[allow(clippy::cast_possible_truncation)]
        let dimension_to_bow = reader.read_u32(9)? as u16;
        #[allow(clippy::cast_possible_truncation)]
        let dimension_to_stern = reader.read_u32(9)? as u16;
        let dimension_to_port = reader.read_u8(6)?;
        let dimension_to_starboard = reader.read_u8(6)?;
        let epfd_type = reader.read_u8(4)?;
        let utc_second = reader.read_u8(6)?;
        let off_position = reader.read_bool()?;
        let regional = reader.read_u8(8)?;
        let raim = reader.read_bool()?;
        let virtual_aid = reader.read_bool()?;
        let assigned_mode = reader.read_bool()?;
        let _spare = reader.read_bool()?;

        // The name extension fills whatever six-bit groups remain.
        let extension_chars = reader.remaining_bits() / 6;
        let name_extension = reader.read_string(extension_chars)?;

        Some(Self {
            repeat_indicator,
            mmsi,
            nav_aid_type,
            name,
            position_accurate,
            longitude_ten_thousandths_min,
            latitude_ten_thousandths_min,
            dimension_to_bow,
            dimension_to_stern,
            dimension_to_port,
            dimension_to_starboard,
            epfd_type,
            utc_second,
            off_position,
            regional,
            raim,
            virtual_aid,
            assigned_mode,
            name_extension,
        })
    }

    /// Degrees east, negative west; `None` when the report carries the
    /// "not available" sentinel.
    #[must_use]
    pub fn longitude_degrees(&self) -> Option<f64> {
        let degrees = f64::from(self.longitude_ten_thousandths_min) / 600_000.0;
        (degrees.abs() <= 180.0).then_some(degrees)
    }

    /// Degrees north, negative south.
    #[must_use]
    pub fn latitude_degrees(&self) -> Option<f64> {
        let degrees = f64::from(self.latitude_ten_thousandths_min) / 600_000.0;
        (degrees.abs() <= 90.0).then_some(degrees)
    }

    pub(super) fn log(&self, talker: Talker) {
        log::debug!(
            "{talker} Aid-to-Navigation Report: {} '{}{}' MMSI {} at ({:?}, {:?}){}{}",
            self.nav_aid_type,
            self.name,
            self.name_extension,
            self.mmsi,
            self.latitude_degrees(),
            self.longitude_degrees(),
            if self.virtual_aid { " virtual" } else { "" },
            if self.off_position { " off-position" } else { "" },
        );
    }
}
