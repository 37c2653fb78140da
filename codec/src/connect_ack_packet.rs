// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use crate::{ByteArray, DecodeError, DecodePacket, EncodeError, EncodePacket, FixedHeader,
            PacketType};

/// Return code in the CONNACK variable header.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectReturnCode {
    /// Connection accepted.
    #[default]
    Accepted = 0,

    /// The server does not support the protocol level requested.
    UnacceptableProtocol = 1,

    /// The client identifier is correct UTF-8 but not allowed.
    IdentifierRejected = 2,

    /// The service is unavailable.
    ServerUnavailable = 3,

    /// The data in the user name or password is malformed.
    BadUsernameOrPassword = 4,

    /// The client is not authorized to connect.
    NotAuthorized = 5,
}

impl TryFrom<u8> for ConnectReturnCode {
    type Error = DecodeError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::Accepted),
            1 => Ok(Self::UnacceptableProtocol),
            2 => Ok(Self::IdentifierRejected),
            3 => Ok(Self::ServerUnavailable),
            4 => Ok(Self::BadUsernameOrPassword),
            5 => Ok(Self::NotAuthorized),
            _ => Err(DecodeError::InvalidPacketLength),
        }
    }
}

/// CONNACK packet, the first packet a server sends on any connection.
///
/// ```txt
///  7                          0
/// +----------------------------+
/// | Fixed header               |
/// |                            |
/// +----------------------------+
/// | Ack flags (session present)|
/// +----------------------------+
/// | Return code                |
/// +----------------------------+
/// ```
#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConnectAckPacket {
    /// True only when a non-clean CONNECT was paired with a session the
    /// broker already held for that client id [MQTT-3.2.2-2].
    session_present: bool,

    return_code: ConnectReturnCode,
}

impl ConnectAckPacket {
    #[must_use]
    pub const fn new(session_present: bool, return_code: ConnectReturnCode) -> Self {
        Self {
            session_present,
            return_code,
        }
    }

    #[must_use]
    pub const fn session_present(&self) -> bool {
        self.session_present
    }

    #[must_use]
    pub const fn return_code(&self) -> ConnectReturnCode {
        self.return_code
    }
}

impl EncodePacket for ConnectAckPacket {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError> {
        let fixed_header = FixedHeader::new(PacketType::ConnectAck, 2)?;
        let header_bytes = fixed_header.encode(buf)?;
        buf.push(u8::from(self.session_present));
        buf.push(self.return_code as u8);
        Ok(header_bytes + 2)
    }
}

impl DecodePacket for ConnectAckPacket {
    fn decode(ba: &mut ByteArray) -> Result<Self, DecodeError> {
        let fixed_header = FixedHeader::decode(ba)?;
        if fixed_header.packet_type() != PacketType::ConnectAck {
            return Err(DecodeError::InvalidPacketType);
        }
        if fixed_header.remaining_length() != 2 {
            return Err(DecodeError::InvalidPacketLength);
        }
        let ack_flags = ba.read_byte()?;
        let session_present = (ack_flags & 0b0000_0001) != 0;
        let return_code = ConnectReturnCode::try_from(ba.read_byte()?)?;
        Ok(Self {
            session_present,
            return_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_accepted() {
        let packet = ConnectAckPacket::new(false, ConnectReturnCode::Accepted);
        let mut buf = Vec::new();
        assert_eq!(packet.encode(&mut buf), Ok(4));
        assert_eq!(&buf, &[0x20, 0x02, 0x00, 0x00]);
    }

    #[test]
    fn test_encode_session_present() {
        let packet = ConnectAckPacket::new(true, ConnectReturnCode::Accepted);
        let mut buf = Vec::new();
        let _used = packet.encode(&mut buf);
        assert_eq!(&buf, &[0x20, 0x02, 0x01, 0x00]);
    }

    #[test]
    fn test_roundtrip_refused() {
        let packet = ConnectAckPacket::new(false, ConnectReturnCode::ServerUnavailable);
        let mut buf = Vec::new();
        let _used = packet.encode(&mut buf).unwrap();
        let mut ba = ByteArray::new(&buf);
        assert_eq!(ConnectAckPacket::decode(&mut ba), Ok(packet));
    }
}
