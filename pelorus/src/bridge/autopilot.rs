// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.


use super::publish_or_remove;
use crate::datamodel::{DataModel, Leaf, ROOT_NODE};
use crate::error::Error;
use crate::fixedpoint::{TenthsI16, TenthsU16};
use crate::nmea::message::{HdgMessage, RsaMessage};

/// Leaves under `autopilot/`, fed by HDG and RSA.
pub struct AutoPilotBridge {
    heading_sensor: Leaf<TenthsU16>,
    heading_deviation: Leaf<TenthsI16>,
    heading_variation: Leaf<TenthsI16>,
    rudder_starboard: Leaf<TenthsI16>,
    rudder_port: Leaf<TenthsI16>,
}

impl AutoPilotBridge {
    pub fn new(model: &DataModel) -> Result<Self, Error> {
        let autopilot = model.add_node(ROOT_NODE, "autopilot")?;
        let heading = model.add_node(autopilot, "heading")?;
        let rudder = model.add_node(autopilot, "rudder")?;
        Ok(Self {
            heading_sensor: model.add_leaf(heading, "sensor")?,
            heading_deviation: model.add_leaf(heading, "deviation")?,
            heading_variation: model.add_leaf(heading, "variation")?,
            rudder_starboard: model.add_leaf(rudder, "starboard")?,
            rudder_port: model.add_leaf(rudder, "port")?,
        })
    }

    pub fn bridge_hdg(&self, message: &HdgMessage) {
        self.heading_sensor.set(message.magnetic_sensor_heading);
        publish_or_remove(&self.heading_deviation, message.magnetic_deviation);
        publish_or_remove(&self.heading_variation, message.magnetic_variation);
    }

    pub fn bridge_rsa(&self, message: &RsaMessage) {
        if message.starboard_valid {
            self.rudder_starboard.set(message.starboard_angle);
        } else {
            self.rudder_starboard.remove();
        }
        if message.port_valid {
            publish_or_remove(&self.rudder_port, message.port_angle);
        } else {
            self.rudder_port.remove();
        }
    }
}
