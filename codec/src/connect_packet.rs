// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use crate::{
    ByteArray, ConnectFlags, DecodeError, DecodePacket, FixedHeader, PacketType, ProtocolLevel,
    StringData,
};

/// CONNECT packet as received from a client.
///
/// ```txt
///  7                          0
/// +----------------------------+
/// | Fixed header               |
/// |                            |
/// +----------------------------+
/// | Protocol name length       |
/// |                            |
/// +----------------------------+
/// | Protocol name string ...   |
/// +----------------------------+
/// | Protocol level             |
/// +----------------------------+
/// | Connect flags              |
/// +----------------------------+
/// | Keep alive                 |
/// |                            |
/// +----------------------------+
/// | Client id length           |
/// |                            |
/// +----------------------------+
/// | Client id string ...       |
/// +----------------------------+
/// | Will topic / will message  |
/// | Username / password        |
/// | (each if flagged)          |
/// +----------------------------+
/// ```
///
/// Decode fails only on violations that require closing the connection
/// outright: malformed lengths, the reserved flag bit, inconsistent will
/// flags, trailing bytes. Policy refusals (wrong protocol name or level,
/// username/password present, will present, empty client id on a
/// non-clean session) are left to the broker, which answers them with the
/// matching CONNACK return code.
#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectPacket {
    protocol_name: StringData,
    protocol_level: ProtocolLevel,
    connect_flags: ConnectFlags,

    /// Seconds between client control packets; zero disables the
    /// keep alive mechanism.
    keep_alive: u16,

    client_id: StringData,
    will_topic: Option<StringData>,
    will_message: Option<Vec<u8>>,
    username: Option<StringData>,
    password: Option<Vec<u8>>,
}

impl ConnectPacket {
    #[must_use]
    pub fn protocol_name(&self) -> &str {
        self.protocol_name.as_ref()
    }

    #[must_use]
    pub const fn protocol_level(&self) -> ProtocolLevel {
        self.protocol_level
    }

    #[must_use]
    pub const fn connect_flags(&self) -> &ConnectFlags {
        &self.connect_flags
    }

    #[must_use]
    pub const fn keep_alive(&self) -> u16 {
        self.keep_alive
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        self.client_id.as_ref()
    }

    #[must_use]
    pub fn will_topic(&self) -> Option<&str> {
        self.will_topic.as_ref().map(AsRef::as_ref)
    }

    #[must_use]
    pub fn will_message(&self) -> Option<&[u8]> {
        self.will_message.as_deref()
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_ref().map(AsRef::as_ref)
    }

    #[must_use]
    pub fn password(&self) -> Option<&[u8]> {
        self.password.as_deref()
    }
}

impl DecodePacket for ConnectPacket {
    fn decode(ba: &mut ByteArray) -> Result<Self, DecodeError> {
        let fixed_header = FixedHeader::decode(ba)?;
        if fixed_header.packet_type() != PacketType::Connect {
            return Err(DecodeError::InvalidPacketType);
        }
        let payload_end = ba.offset() + fixed_header.remaining_length();

        let protocol_name = StringData::decode(ba)?;
        let protocol_level = ProtocolLevel::from(ba.read_byte()?);
        let connect_flags = ConnectFlags::decode(ba)?;
        let keep_alive = ba.read_u16()?;

        let client_id = StringData::decode(ba)?;

        let (will_topic, will_message) = if connect_flags.has_will() {
            let topic = StringData::decode(ba)?;
            let len = ba.read_u16()?;
            let message = ba.read_bytes(usize::from(len))?.to_vec();
            (Some(topic), Some(message))
        } else {
            (None, None)
        };

        let username = if connect_flags.has_username() {
            Some(StringData::decode(ba)?)
        } else {
            None
        };

        let password = if connect_flags.has_password() {
            let len = ba.read_u16()?;
            Some(ba.read_bytes(usize::from(len))?.to_vec())
        } else {
            None
        };

        // The payload ends exactly where the remaining length said it
        // would, or the packet is malformed.
        if ba.offset() != payload_end {
            log::warn!(
                "connect: {} unexpected trailing bytes",
                payload_end.saturating_sub(ba.offset())
            );
            return Err(DecodeError::TrailingBytes);
        }

        Ok(Self {
            protocol_name,
            protocol_level,
            connect_flags,
            keep_alive,
            client_id,
            will_topic,
            will_message,
            username,
            password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_minimal_clean_session() {
        let buf = [
            0x10, 0x0e, // CONNECT, remaining length 14
            0x00, 0x04, b'M', b'Q', b'T', b'T', // protocol name
            0x04, // level 4
            0x02, // clean session
            0x00, 0x3c, // keep alive 60
            0x00, 0x02, b'c', b'1', // client id
        ];
        let mut ba = ByteArray::new(&buf);
        let packet = ConnectPacket::decode(&mut ba).unwrap();
        assert_eq!(packet.protocol_name(), "MQTT");
        assert_eq!(packet.protocol_level(), ProtocolLevel::V311);
        assert!(packet.connect_flags().clean_session());
        assert_eq!(packet.keep_alive(), 60);
        assert_eq!(packet.client_id(), "c1");
    }

    #[test]
    fn test_decode_old_protocol_name_is_not_fatal() {
        // An MQTT 3.1 client; the broker refuses it with CONNACK 0x01,
        // so decode has to succeed.
        let buf = [
            0x10, 0x10, // CONNECT, remaining length 16
            0x00, 0x06, b'M', b'Q', b'I', b's', b'd', b'p', // protocol name
            0x03, // level 3
            0x02, // clean session
            0x00, 0x3c, // keep alive
            0x00, 0x02, b'c', b'1', // client id
        ];
        let mut ba = ByteArray::new(&buf);
        let packet = ConnectPacket::decode(&mut ba).unwrap();
        assert_eq!(packet.protocol_name(), "MQIsdp");
        assert_eq!(packet.protocol_level(), ProtocolLevel::V31);
    }

    #[test]
    fn test_decode_trailing_bytes_rejected() {
        let buf = [
            0x10, 0x0f, // remaining length one too large
            0x00, 0x04, b'M', b'Q', b'T', b'T',
            0x04,
            0x02,
            0x00, 0x3c,
            0x00, 0x02, b'c', b'1',
            0xff, // stray byte
        ];
        let mut ba = ByteArray::new(&buf);
        assert_eq!(
            ConnectPacket::decode(&mut ba),
            Err(DecodeError::TrailingBytes)
        );
    }

    #[test]
    fn test_decode_username_flag() {
        let buf = [
            0x10, 0x14, // remaining length 20
            0x00, 0x04, b'M', b'Q', b'T', b'T',
            0x04,
            0x82, // username + clean session
            0x00, 0x3c,
            0x00, 0x02, b'c', b'1',
            0x00, 0x04, b'u', b's', b'e', b'r',
        ];
        let mut ba = ByteArray::new(&buf);
        let packet = ConnectPacket::decode(&mut ba).unwrap();
        assert!(packet.connect_flags().has_username());
        assert!(!packet.connect_flags().has_password());
    }
}
