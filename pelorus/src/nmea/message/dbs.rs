// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use crate::fixedpoint::TenthsU16;
use crate::nmea::field::{self, FieldError};
use crate::nmea::line::LineWalker;
use crate::nmea::talker::Talker;

/// DBS: depth below surface.
#[derive(Debug, Clone, PartialEq)]
pub struct DbsMessage {
    pub talker: Talker,
    pub depth_feet: Option<TenthsU16>,
    pub depth_meters: Option<TenthsU16>,
    pub depth_fathoms: Option<TenthsU16>,
}

impl DbsMessage {
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
