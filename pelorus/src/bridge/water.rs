// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.


use super::publish_or_remove;
use crate::datamodel::{DataModel, Leaf, ROOT_NODE};
use crate::error::Error;
use crate::fixedpoint::{TenthsI16, TenthsU16};
use crate::nmea::field::TemperatureUnits;
use crate::nmea::message::{MtwMessage, VhwMessage};

/// Leaves under `water/`, fed by MTW and VHW.
pub struct WaterBridge {
    temperature_celsius: Leaf<TenthsI16>,
    temperature_fahrenheit: Leaf<TenthsI16>,
    heading_true: Leaf<TenthsU16>,
    heading_magnetic: Leaf<TenthsU16>,
    speed_knots: Leaf<TenthsI16>,
    speed_kmh: Leaf<TenthsI16>,
}

impl WaterBridge {
    pub fn new(model: &DataModel) -> Result<Self, Error> {
        let water = model.add_node(ROOT_NODE, "water")?;
        let temperature = model.add_node(water, "temperature")?;
        let heading = model.add_node(water, "heading")?;
        let speed = model.add_node(water, "speed")?;
        Ok(Self {
            temperature_celsius: model.add_leaf(temperature, "celsius")?,
            temperature_fahrenheit: model.add_leaf(temperature, "fahrenheit")?,
            heading_true: model.add_leaf(heading, "true")?,
            heading_magnetic: model.add_leaf(heading, "magnetic")?,
            speed_knots: model.add_leaf(speed, "knots")?,
            speed_kmh: model.add_leaf(speed, "kmh")?,
        })
    }

    pub fn bridge_mtw(&self, message: &MtwMessage) {
        match message.water_temperature_units {
            TemperatureUnits::Celsius => {
                self.temperature_celsius.set(message.water_temperature);
            }
            TemperatureUnits::Fahrenheit => {
                self.temperature_fahrenheit.set(message.water_temperature);
            }
        }
    }

    pub fn bridge_vhw(&self, message: &VhwMessage) {
        publish_or_remove(&self.heading_true, message.water_heading_true);
        publish_or_remove(&self.heading_magnetic, message.water_heading_magnetic);
        publish_or_remove(&self.speed_knots, message.water_speed_knots);
        publish_or_remove(&self.speed_kmh, message.water_speed_kmh);
    }
}
