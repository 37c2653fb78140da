// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use crate::{ByteArray, DecodeError, DecodePacket, FixedHeader, PacketId, PacketType, StringData};

/// UNSUBSCRIBE packet from a client.
///
/// ```txt
///  7                          0
/// +----------------------------+
/// | Fixed header               |
/// |                            |
/// +----------------------------+
/// | Packet id                  |
/// |                            |
/// +----------------------------+
/// | Topic filter length        |
/// |                            |
/// +----------------------------+
/// | Topic filter string ...    |
/// +----------------------------+
/// | ... repeated per filter    |
/// +----------------------------+
/// ```
#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsubscribePacket {
    packet_id: PacketId,
    topics: Vec<StringData>,
}

impl UnsubscribePacket {
    #[must_use]
    pub const fn packet_id(&self) -> PacketId {
        self.packet_id
    }

    #[must_use]
    pub fn topics(&self) -> &[StringData] {
        &self.topics
    }
}

impl DecodePacket for UnsubscribePacket {
    fn decode(ba: &mut ByteArray) -> Result<Self, DecodeError> {
        let fixed_header = FixedHeader::decode(ba)?;
        if fixed_header.packet_type() != PacketType::Unsubscribe {
            return Err(DecodeError::InvalidPacketType);
        }
        let payload_end = ba.offset() + fixed_header.remaining_length();

        let packet_id = ba.read_u16()?;
        if packet_id == 0 {
            log::warn!("unsubscribe: packet id is zero");
            return Err(DecodeError::InvalidPacketId);
        }

        let mut topics = Vec::new();
        while ba.offset() < payload_end {
            topics.push(StringData::decode(ba)?);
        }

        if ba.offset() != payload_end {
            return Err(DecodeError::InvalidPacketLength);
        }
        if topics.is_empty() {
            // An UNSUBSCRIBE with no topic filters is a protocol
            // violation [MQTT-3.10.3-2].
            return Err(DecodeError::EmptyTopicFilter);
        }

        Ok(Self { packet_id, topics })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        let buf = [
            0xa2, 0x0a, // UNSUBSCRIBE, remaining length 10
            0x00, 0x05, // packet id 5
            0x00, 0x06, b'w', b'i', b'n', b'd', b'/', b'+',
        ];
        let mut ba = ByteArray::new(&buf);
        let packet = UnsubscribePacket::decode(&mut ba).unwrap();
        assert_eq!(packet.packet_id(), 5);
        assert_eq!(packet.topics().len(), 1);
        assert_eq!(packet.topics()[0].as_ref(), "wind/+");
    }

    #[test]
    fn test_decode_bad_flags_rejected() {
        let buf = [0xa0, 0x02, 0x00, 0x05];
        let mut ba = ByteArray::new(&buf);
        assert_eq!(
            UnsubscribePacket::decode(&mut ba),
            Err(DecodeError::InvalidPacketFlags)
        );
    }
}
