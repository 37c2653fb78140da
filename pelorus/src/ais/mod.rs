// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

//! Decoding of reassembled AIS messages. Only the types the data model
//! consumes are decoded in detail; the rest are length-logged and
//! dropped.

mod aton;
mod bits;
mod msg_type;

pub use aton::AidToNavigationReport;
pub use bits::BitReader;
pub use msg_type::AisMsgType;

use crate::nmea::message::NmeaMessage;
use crate::nmea::Talker;

/// Decode one reassembled VDM bit stream into a message, if it is a
/// type we care about.
#[must_use]
pub fn parse_vdm_message(talker: Talker, data: &[u8], bit_length: usize) -> Option<NmeaMessage> {
    if bit_length < 6 {
        log::warn!(
            "Encapsulated VDM message from {talker} too small to be valid ({bit_length} bits)"
        );
        return None;
    }

    let mut reader = BitReader::new(data, bit_length);
    let type_code = reader.read_u8(6)?;
    let ais_msg_type = AisMsgType::from(type_code);

    match ais_msg_type {
        AisMsgType::AidToNavigationReport => {
            match AidToNavigationReport::parse(&mut reader) {
                Some(report) => {
                    report.log(talker);
                    Some(NmeaMessage::AidToNavigation(report))
                }
                None => {
                    log::warn!(
                        "Truncated {bit_length} bit NMEA VDM {ais_msg_type} message from {talker}"
                    );
                    None
                }
            }
        }
        _ => {
            log::info!("Ignoring {talker} {bit_length} bit NMEA VDM {ais_msg_type} message");
            None
        }
    }
}
