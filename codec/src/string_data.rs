// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use byteorder::{BigEndian, WriteBytesExt};
use std::fmt;
use std::io::Write;

use crate::utils::validate_utf8_string;
use crate::{ByteArray, DecodeError, DecodePacket, EncodeError, EncodePacket};

/// Text fields within MQTT control packets are encoded as UTF-8 strings
/// prefixed by a two byte big-endian length:
///
/// ```txt
/// +-------------------+
/// | String Length     |
/// |                   |
/// +-------------------+
/// | String bytes ...  |
/// +-------------------+
/// ```
///
/// The length limits a string to 65,535 bytes, and the character data must
/// not contain U+0000 [MQTT-1.5.3-2].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StringData(String);

impl StringData {
    #[must_use]
    pub const fn new() -> Self {
        Self(String::new())
    }

    /// Convert a string slice into string data.
    ///
    /// # Errors
    ///
    /// Returns error if the string is too long for the length prefix.
    pub fn from(s: &str) -> Result<Self, EncodeError> {
        validate_utf8_string(s)?;
        Ok(Self(s.to_string()))
    }

    /// Get byte length in packet, including the length prefix.
    #[must_use]
    pub fn bytes(&self) -> usize {
        2 + self.0.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for StringData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for StringData {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl DecodePacket for StringData {
    fn decode(ba: &mut ByteArray) -> Result<Self, DecodeError> {
        let len = ba.read_u16()?;
        let s = ba.read_string(usize::from(len))?;
        Ok(Self(s))
    }
}

impl EncodePacket for StringData {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError> {
        #[allow(clippy::cast_possible_truncation)]
        let len = self.0.len() as u16;
        buf.write_u16::<BigEndian>(len)?;
        buf.write_all(self.0.as_bytes())?;
        Ok(self.bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_data_roundtrip() {
        let s = StringData::from("depth/belowKeel/meters").unwrap();
        let mut buf = Vec::new();
        let used = s.encode(&mut buf).unwrap();
        assert_eq!(used, 24);
        assert_eq!(&buf[..2], &[0x00, 0x16]);

        let mut ba = ByteArray::new(&buf);
        let decoded = StringData::decode(&mut ba).unwrap();
        assert_eq!(decoded.as_ref(), "depth/belowKeel/meters");
    }

    #[test]
    fn test_string_data_rejects_null() {
        let buf = [0x00, 0x03, b'a', 0x00, b'b'];
        let mut ba = ByteArray::new(&buf);
        assert!(StringData::decode(&mut ba).is_err());
    }
}
