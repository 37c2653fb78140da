// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

//! Bridges translate parsed NMEA messages into data model leaf writes.
//! Each domain bridge owns its subtree; the dispatcher routes messages
//! by kind. One bridge instance serves every source.

mod autopilot;
mod depth;
mod gps;
mod water;
mod wind;

pub use autopilot::AutoPilotBridge;
pub use depth::DepthBridge;
pub use gps::GpsBridge;
pub use water::WaterBridge;
pub use wind::WindBridge;

use std::sync::Arc;
use tokio::sync::mpsc::Receiver;

use crate::datamodel::{DataModel, Leaf, LeafValue, StringLeaf};
use crate::error::Error;
use crate::nmea::message::NmeaMessage;

pub struct NmeaBridge {
    gps: GpsBridge,
    depth: DepthBridge,
    water: WaterBridge,
    wind: WindBridge,
    autopilot: AutoPilotBridge,
}

impl NmeaBridge {
    /// Build every domain bridge, constructing their subtrees.
    ///
    /// # Errors
    ///
    /// Returns error if leaf construction collides, a wiring bug at
    /// startup.
    pub fn new(model: &DataModel) -> Result<Self, Error> {
        Ok(Self {
            gps: GpsBridge::new(model)?,
            depth: DepthBridge::new(model)?,
            water: WaterBridge::new(model)?,
            wind: WindBridge::new(model)?,
            autopilot: AutoPilotBridge::new(model)?,
        })
    }

    /// Drain one source's message queue.
    pub async fn run_loop(self: Arc<Self>, mut receiver: Receiver<NmeaMessage>) {
        while let Some(message) = receiver.recv().await {
            self.dispatch(&message);
        }
    }

    pub fn dispatch(&self, message: &NmeaMessage) {
        match message {
            NmeaMessage::Dbk(message) => self.depth.bridge_dbk(message),
            NmeaMessage::Dbs(message) => self.depth.bridge_dbs(message),
            NmeaMessage::Dbt(message) => self.depth.bridge_dbt(message),
            NmeaMessage::Dpt(message) => self.depth.bridge_dpt(message),
            NmeaMessage::Gga(message) => self.gps.bridge_gga(message),
            NmeaMessage::Gll(message) => self.gps.bridge_gll(message),
            NmeaMessage::Gsa(message) => self.gps.bridge_gsa(message),
            NmeaMessage::Gst(message) => self.gps.bridge_gst(message),
            NmeaMessage::Rmc(message) => self.gps.bridge_rmc(message),
            NmeaMessage::Vtg(message) => self.gps.bridge_vtg(message),
            NmeaMessage::Hdg(message) => self.autopilot.bridge_hdg(message),
            NmeaMessage::Rsa(message) => self.autopilot.bridge_rsa(message),
            NmeaMessage::Mtw(message) => self.water.bridge_mtw(message),
            NmeaMessage::Vhw(message) => self.water.bridge_vhw(message),
            NmeaMessage::Mwv(message) => self.wind.bridge_mwv(message),
            NmeaMessage::Gsv(message) => {
                log::debug!(
                    "Ignoring {} GSV sentence {}/{}",
                    message.talker,
                    message.sentence_number,
                    message.sentences_in_group
                );
            }
            NmeaMessage::Txt(message) => {
                log::info!("{} text: {}", message.talker, message.text);
            }
            NmeaMessage::AidToNavigation(_report) => {
                // Logged in detail by the decoder; there is no contact
                // store to bridge into.
            }
        }
    }
}

/// The missing-field convention: a sentence that omits a value clears
/// the leaf, publishing the empty retained payload.
fn publish_or_remove<T: LeafValue>(leaf: &Leaf<T>, value: Option<T>) {
    match value {
        Some(value) => leaf.set(value),
        None => leaf.remove(),
    }
}

fn publish_str_or_remove(leaf: &StringLeaf, value: Option<&str>) {
    match value {
        Some(value) => leaf.set(value.to_string()),
        None => leaf.remove(),
    }
}
