// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use serde::{Deserialize, Serialize};

use crate::{ByteArray, DecodeError, EncodeError};

/// Packet identifier carried by SUBSCRIBE, SUBACK, UNSUBSCRIBE and UNSUBACK.
pub type PacketId = u16;

/// Parse object from byte stream.
pub trait DecodePacket: Sized {
    /// Decode one object from the byte array cursor.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes do not form a valid object.
    fn decode(ba: &mut ByteArray) -> Result<Self, DecodeError>;
}

/// Serialize object into byte stream.
pub trait EncodePacket {
    /// Append the wire form of this object to `buf`, returning the number
    /// of bytes written.
    ///
    /// # Errors
    ///
    /// Returns error if the object cannot be represented on the wire.
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError>;
}

/// Quality of service levels.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum QoS {
    /// At most once delivery.
    #[default]
    AtMostOnce = 0,

    /// At least once delivery.
    AtLeastOnce = 1,

    /// Exactly once delivery.
    ExactOnce = 2,
}

impl TryFrom<u8> for QoS {
    type Error = DecodeError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::AtMostOnce),
            1 => Ok(Self::AtLeastOnce),
            2 => Ok(Self::ExactOnce),
            _ => Err(DecodeError::InvalidQoS),
        }
    }
}

/// Protocol versions understood on the wire.
///
/// The broker only accepts level 4; other levels decode so that the
/// CONNECT handler can refuse them with the proper return code.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolLevel {
    V31 = 3,

    #[default]
    V311 = 4,

    V5 = 5,

    /// Anything else seen in a CONNECT packet.
    Unknown = 0,
}

impl From<u8> for ProtocolLevel {
    fn from(v: u8) -> Self {
        match v {
            3 => Self::V31,
            4 => Self::V311,
            5 => Self::V5,
            _ => Self::Unknown,
        }
    }
}
