// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use crate::fixedpoint::TenthsI16;
use crate::nmea::field::{self, FieldError};
use crate::nmea::line::LineWalker;
use crate::nmea::talker::Talker;

/// DBK: depth below keel.
#[derive(Debug, Clone, PartialEq)]
pub struct DbkMessage {
    pub talker: Talker,
    pub depth_feet: Option<TenthsI16>,
    pub depth_meters: Option<TenthsI16>,
    pub depth_fathoms: Option<TenthsI16>,
}

impl DbkMessage {
    pub(crate) fn parse(talker: Talker, walker: &mut LineWalker) -> Result<Self, FieldError> {
        let depth_feet = field::tenths_i16(walker, "Depth Feet", true)?;
        field::constant_word(walker, "Depth Feet Units", "f")?;
        let depth_meters = field::tenths_i16(walker, "Depth Meters", true)?;
        field::constant_word(walker, "Depth Meters Units", "M")?;
        let depth_fathoms = field::tenths_i16(walker, "Depth Fathoms", true)?;
        field::constant_word(walker, "Depth Fathoms Units", "F")?;

        Ok(Self {
            talker,
            depth_feet,
            depth_meters,
            depth_fathoms,
        })
    }
}
