// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use serde::Deserialize;
use std::net::SocketAddr;

use crate::error::{Error, ErrorKind};

/// MQTT broker section in config.
#[derive(Debug, Deserialize, Clone)]
pub struct Mqtt {
    /// Address the broker listens on.
    ///
    /// Default is "0.0.0.0:1883".
    #[serde(default = "Mqtt::default_address")]
    address: String,

    /// Number of preallocated connection and session slots. A client past
    /// this limit is refused at accept time.
    ///
    /// Default is 5.
    #[serde(default = "Mqtt::default_max_clients")]
    max_clients: usize,

    /// TCP keep-alive options applied to every client socket.
    #[serde(default = "TcpKeepalive::default")]
    keepalive: TcpKeepalive,
}

/// Kernel TCP keep-alive settings; dead peers surface as connection loss.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct TcpKeepalive {
    /// Seconds of idle before the first probe.
    ///
    /// Default is 60.
    #[serde(default = "TcpKeepalive::default_idle")]
    idle: u32,

    /// Seconds between probes.
    ///
    /// Default is 10.
    #[serde(default = "TcpKeepalive::default_interval")]
    interval: u32,

    /// Unanswered probes before the connection is declared dead.
    ///
    /// Default is 6.
    #[serde(default = "TcpKeepalive::default_count")]
    count: u32,
}

impl Mqtt {
    #[must_use]
    pub fn default_address() -> String {
        "0.0.0.0:1883".to_string()
    }

    #[must_use]
    pub const fn default_max_clients() -> usize {
        5
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub const fn max_clients(&self) -> usize {
        self.max_clients
    }

    #[must_use]
    pub const fn keepalive(&self) -> TcpKeepalive {
        self.keepalive
    }

    /// Validate config.
    ///
    /// # Errors
    ///
    /// Returns error if the listen address does not parse or the client
    /// limit is zero.
    pub fn validate(&self) -> Result<(), Error> {
        self.address.parse::<SocketAddr>().map_err(|err| {
            Error::from_string(
                ErrorKind::ConfigError,
                format!("Invalid mqtt listen address {}, err: {err:?}", self.address),
            )
        })?;
        if self.max_clients == 0 {
            return Err(Error::new(
                ErrorKind::ConfigError,
                "mqtt max_clients must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for Mqtt {
    fn default() -> Self {
        Self {
            address: Self::default_address(),
            max_clients: Self::default_max_clients(),
            keepalive: TcpKeepalive::default(),
        }
    }
}

impl TcpKeepalive {
    #[must_use]
    pub const fn default_idle() -> u32 {
        60
    }

    #[must_use]
    pub const fn default_interval() -> u32 {
        10
    }

    #[must_use]
    pub const fn default_count() -> u32 {
        6
    }

    #[must_use]
    pub const fn idle(&self) -> u32 {
        self.idle
    }

    #[must_use]
    pub const fn interval(&self) -> u32 {
        self.interval
    }

    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }
}

impl Default for TcpKeepalive {
    fn default() -> Self {
        Self {
            idle: Self::default_idle(),
            interval: Self::default_interval(),
            count: Self::default_count(),
        }
    }
}
