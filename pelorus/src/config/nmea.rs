// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{Error, ErrorKind};

/// One `[[nmea_sources]]` entry: a TCP NMEA 0183 stream to ingest, such
/// as an AIS receiver or instrument mux publishing on port 10110.
#[derive(Debug, Deserialize, Clone)]
pub struct NmeaSource {
    /// Name used in log lines for this source.
    name: String,

    /// `host:port` of the NMEA stream.
    address: String,

    /// Seconds to wait before reconnecting after a connection failure.
    ///
    /// Default is 10.
    #[serde(default = "NmeaSource::default_reconnect_delay")]
    reconnect_delay: u32,
}

impl NmeaSource {
    #[must_use]
    pub fn default_sources() -> Vec<Self> {
        Vec::new()
    }

    #[must_use]
    pub const fn default_reconnect_delay() -> u32 {
        10
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub const fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay as u64)
    }

    /// Validate config.
    ///
    /// # Errors
    ///
    /// Returns error if the source address does not parse.
    pub fn validate(&self) -> Result<(), Error> {
        self.address.parse::<SocketAddr>().map_err(|err| {
            Error::from_string(
                ErrorKind::ConfigError,
                format!(
                    "Invalid nmea source address {} for {}, err: {err:?}",
                    self.address, self.name
                ),
            )
        })?;
        Ok(())
    }
}
