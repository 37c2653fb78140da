// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use crate::{ByteArray, DecodeError, DecodePacket, EncodeError, EncodePacket, FixedHeader,
            PacketType, QoS, StringData};

/// PUBLISH packet as this broker emits it: QoS 0, never duplicated, with
/// the retain flag preserved from the data-model publish.
///
/// ```txt
///  7                          0
/// +----------------------------+
/// | Fixed header               |
/// |                            |
/// +----------------------------+
/// | Topic name length          |
/// |                            |
/// +----------------------------+
/// | Topic name string ...      |
/// +----------------------------+
/// | Payload bytes ...          |
/// +----------------------------+
/// ```
///
/// At QoS 0 there is no packet identifier [MQTT-2.3.1-5].
#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PublishPacket {
    topic: StringData,
    retain: bool,
    payload: Vec<u8>,
}

impl PublishPacket {
    /// Create a new QoS 0 publish packet.
    ///
    /// # Errors
    ///
    /// Returns error if `topic` is too long for a wire string.
    pub fn new(topic: &str, retain: bool, payload: &[u8]) -> Result<Self, EncodeError> {
        let topic = StringData::from(topic)?;
        Ok(Self {
            topic,
            retain,
            payload: payload.to_vec(),
        })
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        self.topic.as_ref()
    }

    #[must_use]
    pub const fn retain(&self) -> bool {
        self.retain
    }

    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

impl EncodePacket for PublishPacket {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError> {
        let remaining_length = self.topic.bytes() + self.payload.len();
        let packet_type = PacketType::Publish {
            dup: false,
            qos: QoS::AtMostOnce,
            retain: self.retain,
        };
        let fixed_header = FixedHeader::new(packet_type, remaining_length)?;
        let header_bytes = fixed_header.encode(buf)?;
        self.topic.encode(buf)?;
        buf.extend_from_slice(&self.payload);
        Ok(header_bytes + remaining_length)
    }
}

impl DecodePacket for PublishPacket {
    fn decode(ba: &mut ByteArray) -> Result<Self, DecodeError> {
        let fixed_header = FixedHeader::decode(ba)?;
        let PacketType::Publish { qos, retain, .. } = fixed_header.packet_type() else {
            return Err(DecodeError::InvalidPacketType);
        };
        if qos != QoS::AtMostOnce {
            // QoS 1/2 would carry a packet id; this broker never emits
            // them and its tests never need them.
            return Err(DecodeError::InvalidQoS);
        }
        let payload_end = ba.offset() + fixed_header.remaining_length();

        let topic = StringData::decode(ba)?;
        if ba.offset() > payload_end {
            return Err(DecodeError::InvalidPacketLength);
        }
        let payload = ba.read_bytes(payload_end - ba.offset())?.to_vec();

        Ok(Self {
            topic,
            retain,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_retained() {
        let packet = PublishPacket::new("depth/belowKeel/meters", true, b"12.3").unwrap();
        let mut buf = Vec::new();
        let used = packet.encode(&mut buf).unwrap();
        assert_eq!(used, buf.len());
        assert_eq!(buf[0], 0x31);
        assert_eq!(buf[1], 28);
        assert_eq!(&buf[2..4], &[0x00, 0x16]);
        assert_eq!(&buf[4..26], b"depth/belowKeel/meters");
        assert_eq!(&buf[26..], b"12.3");
    }

    #[test]
    fn test_roundtrip() {
        let packet = PublishPacket::new("gps/time", false, b"12:35:19").unwrap();
        let mut buf = Vec::new();
        let _used = packet.encode(&mut buf).unwrap();
        let mut ba = ByteArray::new(&buf);
        let decoded = PublishPacket::decode(&mut ba).unwrap();
        assert_eq!(decoded, packet);
        assert_eq!(ba.remaining_bytes(), 0);
    }

    #[test]
    fn test_empty_payload_roundtrip() {
        // A removed retained value publishes as an empty payload.
        let packet = PublishPacket::new("water/temperature/celsius", true, b"").unwrap();
        let mut buf = Vec::new();
        let _used = packet.encode(&mut buf).unwrap();
        let mut ba = ByteArray::new(&buf);
        let decoded = PublishPacket::decode(&mut ba).unwrap();
        assert!(decoded.payload().is_empty());
        assert!(decoded.retain());
    }
}
