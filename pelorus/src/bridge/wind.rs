// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.


use crate::datamodel::{DataModel, Leaf, NodeId, ROOT_NODE};
use crate::error::Error;
use crate::fixedpoint::TenthsU16;
use crate::nmea::field::{RelativeIndicator, SpeedUnits};
use crate::nmea::message::MwvMessage;

struct WindLeaves {
    angle: Leaf<TenthsU16>,
    speed_knots: Leaf<TenthsU16>,
    speed_mph: Leaf<TenthsU16>,
    speed_kmh: Leaf<TenthsU16>,
}

impl WindLeaves {
    fn new(model: &DataModel, parent: NodeId) -> Result<Self, Error> {
        let speed = model.add_node(parent, "speed")?;
        Ok(Self {
            angle: model.add_leaf(parent, "angle")?,
            speed_knots: model.add_leaf(speed, "knots")?,
            speed_mph: model.add_leaf(speed, "mph")?,
            speed_kmh: model.add_leaf(speed, "kmh")?,
        })
    }
}

/// Leaves under `wind/{apparent,true}`, fed by MWV.
pub struct WindBridge {
    apparent: WindLeaves,
    true_wind: WindLeaves,
}

impl WindBridge {
    pub fn new(model: &DataModel) -> Result<Self, Error> {
        let wind = model.add_node(ROOT_NODE, "wind")?;
        let apparent = model.add_node(wind, "apparent")?;
        let true_wind = model.add_node(wind, "true")?;
        Ok(Self {
            apparent: WindLeaves::new(model, apparent)?,
            true_wind: WindLeaves::new(model, true_wind)?,
        })
    }

    pub fn bridge_mwv(&self, message: &MwvMessage) {
        if !message.data_valid {
            return;
        }

        let leaves = match message.relative_indicator {
            RelativeIndicator::Relative => &self.apparent,
            RelativeIndicator::Theoretical => &self.true_wind,
        };
        leaves.angle.set(message.wind_angle);
        match message.wind_speed_units {
            SpeedUnits::Knots => leaves.speed_knots.set(message.wind_speed),
            SpeedUnits::MilesPerHour => leaves.speed_mph.set(message.wind_speed),
            SpeedUnits::KilometersPerHour => leaves.speed_kmh.set(message.wind_speed),
        }
    }
}
