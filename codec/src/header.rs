// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use crate::{ByteArray, DecodeError, DecodePacket, EncodeError, EncodePacket, QoS, VarInt,
            VarIntError};

/// MQTT control packet types.
///
/// PUBLISH carries its flag bits here since they are part of the type byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PacketType {
    /// Client request to connect.
    #[default]
    Connect,

    /// Broker reply to a connect request.
    ConnectAck,

    /// Publish message.
    Publish { dup: bool, qos: QoS, retain: bool },

    PublishAck,
    PublishReceived,
    PublishRelease,
    PublishComplete,

    /// Client subscribe request.
    Subscribe,

    SubscribeAck,

    /// Client unsubscribe request.
    Unsubscribe,

    UnsubscribeAck,

    PingRequest,
    PingResponse,

    /// Client is disconnecting cleanly.
    Disconnect,
}

impl PacketType {
    /// Byte length used in packet.
    #[must_use]
    pub const fn bytes() -> usize {
        1
    }

    /// Packet types a server may emit but must never receive.
    #[must_use]
    pub const fn is_server_to_client_only(&self) -> bool {
        matches!(
            self,
            Self::ConnectAck | Self::SubscribeAck | Self::UnsubscribeAck | Self::PingResponse
        )
    }
}

impl From<PacketType> for u8 {
    fn from(packet_type: PacketType) -> Self {
        let type_bits: u8 = match packet_type {
            PacketType::Connect => 1,
            PacketType::ConnectAck => 2,
            PacketType::Publish { .. } => 3,
            PacketType::PublishAck => 4,
            PacketType::PublishReceived => 5,
            PacketType::PublishRelease => 6,
            PacketType::PublishComplete => 7,
            PacketType::Subscribe => 8,
            PacketType::SubscribeAck => 9,
            PacketType::Unsubscribe => 10,
            PacketType::UnsubscribeAck => 11,
            PacketType::PingRequest => 12,
            PacketType::PingResponse => 13,
            PacketType::Disconnect => 14,
        };

        let flag_bits: u8 = match packet_type {
            PacketType::Publish { dup, qos, retain } => {
                let dup = if dup { 0b0000_1000 } else { 0b0000_0000 };
                let qos = match qos {
                    QoS::AtMostOnce => 0b0000_0000,
                    QoS::AtLeastOnce => 0b0000_0010,
                    QoS::ExactOnce => 0b0000_0100,
                };
                let retain = if retain { 0b0000_0001 } else { 0b0000_0000 };
                dup | qos | retain
            }
            // Bits 3..0 of SUBSCRIBE, UNSUBSCRIBE and PUBREL are reserved
            // and must be 0b0010 [MQTT-2.2.2-1].
            PacketType::Subscribe | PacketType::Unsubscribe | PacketType::PublishRelease => {
                0b0000_0010
            }
            _ => 0b0000_0000,
        };

        (type_bits << 4) | flag_bits
    }
}

impl TryFrom<u8> for PacketType {
    type Error = DecodeError;

    /// Parse packet type and flags from the first header byte.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPacketType` for the two reserved type values and
    /// `InvalidPacketFlags` when the flag nibble does not match the value
    /// mandated for the type; receivers must close the network connection
    /// in both cases [MQTT-2.2.2-2].
    fn try_from(v: u8) -> Result<Self, Self::Error> {
        let type_bits = (v & 0b1111_0000) >> 4;
        let flag = v & 0b0000_1111;

        let with_zero_flag = |packet_type: Self| {
            if flag == 0b0000_0000 {
                Ok(packet_type)
            } else {
                log::warn!("header: unexpected flags {flag:#06b} for {packet_type:?}");
                Err(DecodeError::InvalidPacketFlags)
            }
        };
        let with_sub_flag = |packet_type: Self| {
            if flag == 0b0000_0010 {
                Ok(packet_type)
            } else {
                log::warn!("header: unexpected flags {flag:#06b} for {packet_type:?}");
                Err(DecodeError::InvalidPacketFlags)
            }
        };

        match type_bits {
            1 => with_zero_flag(Self::Connect),
            2 => with_zero_flag(Self::ConnectAck),
            3 => {
                let dup = (flag & 0b0000_1000) != 0;
                let retain = (flag & 0b0000_0001) != 0;
                let qos = match flag & 0b0000_0110 {
                    0b0000_0000 => QoS::AtMostOnce,
                    0b0000_0010 => QoS::AtLeastOnce,
                    0b0000_0100 => QoS::ExactOnce,
                    _ => return Err(DecodeError::InvalidPacketFlags),
                };
                Ok(Self::Publish { dup, qos, retain })
            }
            4 => with_zero_flag(Self::PublishAck),
            5 => with_zero_flag(Self::PublishReceived),
            6 => with_sub_flag(Self::PublishRelease),
            7 => with_zero_flag(Self::PublishComplete),
            8 => with_sub_flag(Self::Subscribe),
            9 => with_zero_flag(Self::SubscribeAck),
            10 => with_sub_flag(Self::Unsubscribe),
            11 => with_zero_flag(Self::UnsubscribeAck),
            12 => with_zero_flag(Self::PingRequest),
            13 => with_zero_flag(Self::PingResponse),
            14 => with_zero_flag(Self::Disconnect),
            t => {
                log::warn!("header: reserved packet type {t}");
                Err(DecodeError::InvalidPacketType)
            }
        }
    }
}

/// Fixed header part of an MQTT control packet.
///
/// ```txt
///  7 6 5 4 3 2 1 0
/// +-------+-------+
/// | Type  | Flags |
/// +-------+-------+
/// | Remaining Len |
/// +-------+-------+
/// ```
#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedHeader {
    packet_type: PacketType,

    /// Number of bytes after the fixed header, in variable byte encoding
    /// of at most four bytes.
    remaining_length: VarInt,
}

impl FixedHeader {
    /// Create a new fixed header.
    ///
    /// # Errors
    ///
    /// Returns error if `remaining_length` is out of range.
    pub const fn new(packet_type: PacketType, remaining_length: usize) -> Result<Self, VarIntError> {
        let remaining_length = match VarInt::from(remaining_length) {
            Ok(v) => v,
            Err(e) => return Err(e),
        };
        Ok(Self {
            packet_type,
            remaining_length,
        })
    }

    #[must_use]
    pub const fn packet_type(&self) -> PacketType {
        self.packet_type
    }

    #[must_use]
    pub const fn remaining_length(&self) -> usize {
        self.remaining_length.value()
    }

    /// Get byte length in packet.
    #[must_use]
    pub const fn bytes(&self) -> usize {
        PacketType::bytes() + self.remaining_length.bytes()
    }
}

impl DecodePacket for FixedHeader {
    fn decode(ba: &mut ByteArray) -> Result<Self, DecodeError> {
        let flag = ba.read_byte()?;
        let packet_type = PacketType::try_from(flag)?;
        let remaining_length = VarInt::decode(ba)?;
        Ok(Self {
            packet_type,
            remaining_length,
        })
    }
}

impl EncodePacket for FixedHeader {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError> {
        let packet_type: u8 = self.packet_type.into();
        buf.push(packet_type);
        let len_bytes = self.remaining_length.encode(buf)?;
        Ok(PacketType::bytes() + len_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        let mut buf = Vec::new();
        let fixed_header = FixedHeader::new(PacketType::PingResponse, 0).unwrap();
        let ret = fixed_header.encode(&mut buf);
        assert_eq!(ret, Ok(2));
        assert_eq!(&buf, &[0xd0, 0x00]);
    }

    #[test]
    fn test_decode_publish() {
        let buf = [0x31, 0x0b];
        let mut ba = ByteArray::new(&buf);
        let fixed_header = FixedHeader::decode(&mut ba).unwrap();
        assert_eq!(
            fixed_header.packet_type(),
            PacketType::Publish {
                dup: false,
                qos: QoS::AtMostOnce,
                retain: true
            }
        );
        assert_eq!(fixed_header.remaining_length(), 11);
    }

    #[test]
    fn test_decode_rejects_bad_subscribe_flags() {
        let buf = [0x80, 0x00];
        let mut ba = ByteArray::new(&buf);
        assert_eq!(
            FixedHeader::decode(&mut ba),
            Err(DecodeError::InvalidPacketFlags)
        );
    }

    #[test]
    fn test_decode_rejects_reserved_type() {
        let buf = [0x00, 0x00];
        let mut ba = ByteArray::new(&buf);
        assert_eq!(
            FixedHeader::decode(&mut ba),
            Err(DecodeError::InvalidPacketType)
        );
        let buf = [0xf0, 0x00];
        let mut ba = ByteArray::new(&buf);
        assert_eq!(
            FixedHeader::decode(&mut ba),
            Err(DecodeError::InvalidPacketType)
        );
    }
}
