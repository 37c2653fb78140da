// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use serde::Deserialize;

use crate::error::Error;

mod general;
mod log;
mod mqtt;
mod nmea;

pub use self::log::{Log, LogLevel};
pub use general::General;
pub use mqtt::{Mqtt, TcpKeepalive};
pub use nmea::NmeaSource;

/// Gateway main config.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "General::default")]
    general: General,

    #[serde(default = "Mqtt::default")]
    mqtt: Mqtt,

    #[serde(default = "NmeaSource::default_sources")]
    nmea_sources: Vec<NmeaSource>,

    #[serde(default = "Log::default")]
    log: Log,
}

impl Config {
    #[must_use]
    pub const fn general(&self) -> &General {
        &self.general
    }

    #[must_use]
    pub const fn mqtt(&self) -> &Mqtt {
        &self.mqtt
    }

    #[must_use]
    pub fn nmea_sources(&self) -> &[NmeaSource] {
        &self.nmea_sources
    }

    #[must_use]
    pub const fn log(&self) -> &Log {
        &self.log
    }

    /// Validate config.
    ///
    /// # Errors
    ///
    /// Returns error if some option in config is invalid.
    pub fn validate(&self) -> Result<(), Error> {
        self.mqtt.validate()?;
        for source in &self.nmea_sources {
            source.validate()?;
        }
        self.log.validate()
    }
}
