// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc::Sender;

use crate::config;
use crate::nmea::line::LineFramer;
use crate::nmea::message::NmeaMessage;
use crate::nmea::NmeaParser;

const READ_BUFFER_SIZE: usize = 2048;

/// A TCP NMEA feed, such as an AIS receiver or an instrument mux
/// publishing on port 10110. Connects, streams lines into the parser,
/// and reconnects after a delay when the peer goes away.
pub struct NmeaTcpSource {
    name: String,
    address: String,
    reconnect_delay: Duration,
    sender: Sender<NmeaMessage>,
    parser: NmeaParser,
    framer: LineFramer,
}

impl NmeaTcpSource {
    #[must_use]
    pub fn new(source_config: &config::NmeaSource, sender: Sender<NmeaMessage>) -> Self {
        Self {
            name: source_config.name().to_string(),
            address: source_config.address().to_string(),
            reconnect_delay: source_config.reconnect_delay(),
            sender,
            parser: NmeaParser::new(),
            framer: LineFramer::new(),
        }
    }

    pub async fn run_loop(mut self) {
        loop {
            log::debug!(
                "nmea source {}: starting connection to {}",
                self.name,
                self.address
            );
            match TcpStream::connect(&self.address).await {
                Ok(stream) => {
                    log::info!("nmea source {}: connected to {}", self.name, self.address);
                    self.process_stream(stream).await;
                    log::info!("nmea source {}: connection closed", self.name);
                }
                Err(err) => {
                    log::warn!(
                        "nmea source {}: failed to connect to {}: {err}",
                        self.name,
                        self.address
                    );
                }
            }

            tokio::time::sleep(self.reconnect_delay).await;
        }
    }

    async fn process_stream(&mut self, mut stream: TcpStream) {
        let mut buffer = [0u8; READ_BUFFER_SIZE];
        loop {
            let received = match stream.read(&mut buffer).await {
                Ok(0) | Err(_) => return,
                Ok(received) => received,
            };

            for &byte in &buffer[..received] {
                let Some(raw_line) = self.framer.push(byte) else {
                    continue;
                };
                if raw_line.is_empty() {
                    continue;
                }
                if let Some(message) = self.parser.parse_line(&raw_line) {
                    if self.sender.send(message).await.is_err() {
                        return;
                    }
                }
            }
        }
    }
}
