// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use crate::{ByteArray, DecodeError, DecodePacket, FixedHeader, PacketId, PacketType, QoS,
            StringData};

/// One topic-filter / requested-QoS pair in a SUBSCRIBE payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscribeTopic {
    topic_filter: StringData,
    qos: QoS,
}

impl SubscribeTopic {
    #[must_use]
    pub fn topic_filter(&self) -> &str {
        self.topic_filter.as_ref()
    }

    #[must_use]
    pub const fn qos(&self) -> QoS {
        self.qos
    }
}

/// SUBSCRIBE packet from a client.
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
/// | Requested QoS              |
/// +----------------------------+
/// | ... repeated per filter    |
/// +----------------------------+
/// ```
///
/// The fixed header flags must be 0b0010 (enforced by the header parser),
/// the packet id must be non-zero [MQTT-2.3.1-1], the payload must carry
/// at least one pair [MQTT-3.8.3-3], and each requested QoS byte must be
/// 0, 1 or 2 [MQTT-3.8.3-4].
#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscribePacket {
    packet_id: PacketId,
    topics: Vec<SubscribeTopic>,
}

impl SubscribePacket {
    #[must_use]
    pub const fn packet_id(&self) -> PacketId {
        self.packet_id
    }

    #[must_use]
    pub fn topics(&self) -> &[SubscribeTopic] {
        &self.topics
    }
}

impl DecodePacket for SubscribePacket {
    fn decode(ba: &mut ByteArray) -> Result<Self, DecodeError> {
        let fixed_header = FixedHeader::decode(ba)?;
        if fixed_header.packet_type() != PacketType::Subscribe {
            return Err(DecodeError::InvalidPacketType);
        }
        let payload_end = ba.offset() + fixed_header.remaining_length();

        let packet_id = ba.read_u16()?;
        if packet_id == 0 {
            log::warn!("subscribe: packet id is zero");
            return Err(DecodeError::InvalidPacketId);
        }

        let mut topics = Vec::new();
        while ba.offset() < payload_end {
            let topic_filter = StringData::decode(ba)?;
            let qos = QoS::try_from(ba.read_byte()?)?;
            topics.push(SubscribeTopic { topic_filter, qos });
        }

        if ba.offset() != payload_end {
            return Err(DecodeError::InvalidPacketLength);
        }
        if topics.is_empty() {
            log::warn!("subscribe: no topic filters in payload");
            return Err(DecodeError::EmptyTopicFilter);
        }

        Ok(Self { packet_id, topics })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_single_filter() {
        let buf = [
            0x82, 0x0c, // SUBSCRIBE, remaining length 12
            0x00, 0x01, // packet id 1
            0x00, 0x07, b'd', b'e', b'p', b't', b'h', b'/', b'#', // filter
            0x00, // QoS 0
        ];
        let mut ba = ByteArray::new(&buf);
        let packet = SubscribePacket::decode(&mut ba).unwrap();
        assert_eq!(packet.packet_id(), 1);
        assert_eq!(packet.topics().len(), 1);
        assert_eq!(packet.topics()[0].topic_filter(), "depth/#");
        assert_eq!(packet.topics()[0].qos(), QoS::AtMostOnce);
    }

    #[test]
    fn test_decode_zero_packet_id_rejected() {
        let buf = [
            0x82, 0x07, 0x00, 0x00, 0x00, 0x02, b'a', b'b', 0x00,
        ];
        let mut ba = ByteArray::new(&buf);
        assert_eq!(
            SubscribePacket::decode(&mut ba),
            Err(DecodeError::InvalidPacketId)
        );
    }

    #[test]
    fn test_decode_empty_payload_rejected() {
        let buf = [0x82, 0x02, 0x00, 0x01];
        let mut ba = ByteArray::new(&buf);
        assert_eq!(
            SubscribePacket::decode(&mut ba),
            Err(DecodeError::EmptyTopicFilter)
        );
    }

    #[test]
    fn test_decode_qos3_rejected() {
        let buf = [
            0x82, 0x07, 0x00, 0x01, 0x00, 0x02, b'a', b'b', 0x03,
        ];
        let mut ba = ByteArray::new(&buf);
        assert_eq!(
            SubscribePacket::decode(&mut ba),
            Err(DecodeError::InvalidQoS)
        );
    }
}
