// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use byteorder::{BigEndian, WriteBytesExt};

use crate::{ByteArray, DecodeError, DecodePacket, EncodeError, EncodePacket, FixedHeader,
            PacketId, PacketType, QoS};

/// Result for one topic filter in a SUBACK payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubscribeAck {
    /// Subscription accepted with the granted maximum QoS.
    QoS(QoS),

    /// Subscription refused (0x80).
    Failed,
}

impl From<SubscribeAck> for u8 {
    fn from(ack: SubscribeAck) -> Self {
        match ack {
            SubscribeAck::QoS(qos) => qos as Self,
            SubscribeAck::Failed => 0x80,
        }
    }
}

impl TryFrom<u8> for SubscribeAck {
    type Error = DecodeError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0x80 => Ok(Self::Failed),
            v => Ok(Self::QoS(QoS::try_from(v)?)),
        }
    }
}

/// SUBACK packet, one return byte per filter in the SUBSCRIBE it answers.
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
/// | Return code per filter ... |
/// +----------------------------+
/// ```
#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscribeAckPacket {
    packet_id: PacketId,
    acks: Vec<SubscribeAck>,
}

impl SubscribeAckPacket {
    #[must_use]
    pub const fn with_vec(packet_id: PacketId, acks: Vec<SubscribeAck>) -> Self {
        Self { packet_id, acks }
    }

    #[must_use]
    pub const fn packet_id(&self) -> PacketId {
        self.packet_id
    }

    #[must_use]
    pub fn acks(&self) -> &[SubscribeAck] {
        &self.acks
    }
}

impl EncodePacket for SubscribeAckPacket {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError> {
        let remaining_length = 2 + self.acks.len();
        let fixed_header = FixedHeader::new(PacketType::SubscribeAck, remaining_length)?;
        let header_bytes = fixed_header.encode(buf)?;

        buf.write_u16::<BigEndian>(self.packet_id)?;
        for ack in &self.acks {
            buf.push(u8::from(*ack));
        }
        Ok(header_bytes + remaining_length)
    }
}

impl DecodePacket for SubscribeAckPacket {
    fn decode(ba: &mut ByteArray) -> Result<Self, DecodeError> {
        let fixed_header = FixedHeader::decode(ba)?;
        if fixed_header.packet_type() != PacketType::SubscribeAck {
            return Err(DecodeError::InvalidPacketType);
        }
        if fixed_header.remaining_length() < 3 {
            return Err(DecodeError::InvalidPacketLength);
        }
        let packet_id = ba.read_u16()?;
        let mut acks = Vec::with_capacity(fixed_header.remaining_length() - 2);
        for _ in 0..fixed_header.remaining_length() - 2 {
            acks.push(SubscribeAck::try_from(ba.read_byte()?)?);
        }
        Ok(Self { packet_id, acks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_granted_qos0() {
        let packet = SubscribeAckPacket::with_vec(1, vec![SubscribeAck::QoS(QoS::AtMostOnce)]);
        let mut buf = Vec::new();
        assert_eq!(packet.encode(&mut buf), Ok(5));
        assert_eq!(&buf, &[0x90, 0x03, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn test_encode_failure() {
        let packet = SubscribeAckPacket::with_vec(
            7,
            vec![SubscribeAck::QoS(QoS::AtMostOnce), SubscribeAck::Failed],
        );
        let mut buf = Vec::new();
        let _used = packet.encode(&mut buf);
        assert_eq!(&buf, &[0x90, 0x04, 0x00, 0x07, 0x00, 0x80]);
    }
}
