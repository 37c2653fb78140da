// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use crate::fixedpoint::TenthsU16;
use crate::nmea::field::{self, FieldError, NmeaTime};
use crate::nmea::line::LineWalker;
use crate::nmea::talker::Talker;

/// GST: position error statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct GstMessage {
    pub talker: Talker,
    pub time: NmeaTime,
    pub std_dev_of_range_inputs_rms: TenthsU16,
    pub std_dev_of_semi_major_axis: TenthsU16,
    pub std_dev_of_semi_minor_axis: TenthsU16,
    pub orientation_of_semi_major_axis: TenthsU16,
    pub std_dev_of_latitude_error: TenthsU16,
    pub std_dev_of_longitude_error: TenthsU16,
    pub std_dev_of_altitude_error: TenthsU16,
}

impl GstMessage {
    pub(crate) fn parse(talker: Talker, walker: &mut LineWalker) -> Result<Self, FieldError> {
        let time = field::time(walker, false)?.ok_or(FieldError::missing("Time"))?;

        let mut values = [TenthsU16::default(); 7];
        const FIELDS: [&str; 7] = [
            "Standard Deviation of Range Inputs RMS",
            "Standard Deviation of Semi-major Axis",
            "Standard Deviation of Semi-minor Axis",
            "Orientation of Semi-major Axis",
            "Standard Deviation of Latitude Error",
            "Standard Deviation of Longitude Error",
            "Standard Deviation of Altitude Error",
        ];
        for (value, name) in values.iter_mut().zip(FIELDS) {
            *value = field::tenths_u16(walker, name, false)?.ok_or(FieldError::missing(name))?;
        }

        Ok(Self {
            talker,
            time,
            std_dev_of_range_inputs_rms: values[0],
            std_dev_of_semi_major_axis: values[1],
            std_dev_of_semi_minor_axis: values[2],
            orientation_of_semi_major_axis: values[3],
            std_dev_of_latitude_error: values[4],
            std_dev_of_longitude_error: values[5],
            std_dev_of_altitude_error: values[6],
        })
    }
}
