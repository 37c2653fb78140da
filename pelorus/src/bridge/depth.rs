// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.


use super::publish_or_remove;
use crate::datamodel::{DataModel, Leaf, ROOT_NODE};
use crate::error::Error;
use crate::fixedpoint::TenthsU16;
use crate::nmea::message::{DbkMessage, DbsMessage, DbtMessage, DptMessage};

/// Leaves under `depth/{belowSurface,belowTransducer,belowKeel}`, fed by
/// DBS, DBT, DBK and DPT.
pub struct DepthBridge {
    below_surface_feet: Leaf<TenthsU16>,
    below_surface_meters: Leaf<TenthsU16>,
    below_surface_fathoms: Leaf<TenthsU16>,
    below_transducer_feet: Leaf<TenthsU16>,
    below_transducer_meters: Leaf<TenthsU16>,
    below_transducer_fathoms: Leaf<TenthsU16>,
    below_keel_feet: Leaf<TenthsU16>,
    below_keel_meters: Leaf<TenthsU16>,
    below_keel_fathoms: Leaf<TenthsU16>,
}

impl DepthBridge {
    pub fn new(model: &DataModel) -> Result<Self, Error> {
        let depth = model.add_node(ROOT_NODE, "depth")?;
        let below_surface = model.add_node(depth, "belowSurface")?;
        let below_transducer = model.add_node(depth, "belowTransducer")?;
        let below_keel = model.add_node(depth, "belowKeel")?;
        Ok(Self {
            below_surface_feet: model.add_leaf(below_surface, "feet")?,
            below_surface_meters: model.add_leaf(below_surface, "meters")?,
            below_surface_fathoms: model.add_leaf(below_surface, "fathoms")?,
            below_transducer_feet: model.add_leaf(below_transducer, "feet")?,
            below_transducer_meters: model.add_leaf(below_transducer, "meters")?,
            below_transducer_fathoms: model.add_leaf(below_transducer, "fathoms")?,
            below_keel_feet: model.add_leaf(below_keel, "feet")?,
            below_keel_meters: model.add_leaf(below_keel, "meters")?,
            below_keel_fathoms: model.add_leaf(below_keel, "fathoms")?,
        })
    }

    pub fn bridge_dbk(&self, message: &DbkMessage) {
        publish_or_remove(
            &self.below_keel_feet,
            message.depth_feet.map(|depth| depth.abs()),
        );
        publish_or_remove(
            &self.below_keel_meters,
            message.depth_meters.map(|depth| depth.abs()),
        );
        publish_or_remove(
            &self.below_keel_fathoms,
            message.depth_fathoms.map(|depth| depth.abs()),
        );
    }

    pub fn bridge_dbs(&self, message: &DbsMessage) {
        publish_or_remove(&self.below_surface_feet, message.depth_feet);
        publish_or_remove(&self.below_surface_meters, message.depth_meters);
        publish_or_remove(&self.below_surface_fathoms, message.depth_fathoms);
    }

    pub fn bridge_dbt(&self, message: &DbtMessage) {
        publish_or_remove(&self.below_transducer_feet, message.depth_feet);
        publish_or_remove(&self.below_transducer_meters, message.depth_meters);
        publish_or_remove(&self.below_transducer_fathoms, message.depth_fathoms);
    }

    pub fn bridge_dpt(&self, message: &DptMessage) {
        self.below_transducer_meters
            .set(message.depth_below_transducer_meters);

        // The offset's sign says what it measures: negative is the
        // distance down to the keel, positive the distance up to the
        // water line.
        let folded = message
            .depth_below_transducer_meters
            .offset_by(message.transducer_offset_meters);
        if message.transducer_offset_meters.is_negative() {
            self.below_keel_meters.set(folded);
        } else {
            self.below_surface_meters.set(folded);
        }
    }
}
