// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use crate::{ByteArray, DecodeError, DecodePacket, QoS};

/// Connect flag byte of the CONNECT variable header.
///
/// ```txt
///  7 6 5 4 3 2 1 0
/// +-+-+-+-+-+-+-+-+
/// |U|P|R| Q |W|C|0|
/// +-+-+-+-+-+-+-+-+
/// ```
///
/// U = username, P = password, R = will retain, Q = will QoS, W = will,
/// C = clean session. Bit 0 is reserved and must be zero [MQTT-3.1.2-3].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConnectFlags {
    username: bool,
    password: bool,
    will_retain: bool,
    will_qos: QoS,
    will: bool,
    clean_session: bool,
}

impl ConnectFlags {
    #[must_use]
    pub const fn has_username(&self) -> bool {
        self.username
    }

    #[must_use]
    pub const fn has_password(&self) -> bool {
        self.password
    }

    #[must_use]
    pub const fn will_retain(&self) -> bool {
        self.will_retain
    }

    #[must_use]
    pub const fn will_qos(&self) -> QoS {
        self.will_qos
    }

    #[must_use]
    pub const fn has_will(&self) -> bool {
        self.will
    }

    #[must_use]
    pub const fn clean_session(&self) -> bool {
        self.clean_session
    }
}

impl DecodePacket for ConnectFlags {
    fn decode(ba: &mut ByteArray) -> Result<Self, DecodeError> {
        let flags = ba.read_byte()?;

        if (flags & 0b0000_0001) != 0 {
            log::warn!("connect: reserved connect flag bit set");
            return Err(DecodeError::InvalidConnectFlags);
        }

        let username = (flags & 0b1000_0000) != 0;
        let password = (flags & 0b0100_0000) != 0;
        let will_retain = (flags & 0b0010_0000) != 0;
        let will = (flags & 0b0000_0100) != 0;
        let clean_session = (flags & 0b0000_0010) != 0;

        let will_qos = match (flags & 0b0001_1000) >> 3 {
            0 => QoS::AtMostOnce,
            1 => QoS::AtLeastOnce,
            2 => QoS::ExactOnce,
            _ => {
                log::warn!("connect: will QoS of 3");
                return Err(DecodeError::InvalidConnectFlags);
            }
        };

        // If the will flag is clear, will QoS and will retain must be
        // zero [MQTT-3.1.2-13] [MQTT-3.1.2-15].
        if !will && (will_qos != QoS::AtMostOnce || will_retain) {
            log::warn!("connect: will QoS or will retain set without will flag");
            return Err(DecodeError::InvalidConnectFlags);
        }

        Ok(Self {
            username,
            password,
            will_retain,
            will_qos,
            will,
            clean_session,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_session_only() {
        let buf = [0b0000_0010];
        let mut ba = ByteArray::new(&buf);
        let flags = ConnectFlags::decode(&mut ba).unwrap();
        assert!(flags.clean_session());
        assert!(!flags.has_will());
        assert!(!flags.has_username());
    }

    #[test]
    fn test_reserved_bit_rejected() {
        let buf = [0b0000_0011];
        let mut ba = ByteArray::new(&buf);
        assert_eq!(
            ConnectFlags::decode(&mut ba),
            Err(DecodeError::InvalidConnectFlags)
        );
    }

    #[test]
    fn test_will_qos_without_will_rejected() {
        let buf = [0b0000_1010];
        let mut ba = ByteArray::new(&buf);
        assert_eq!(
            ConnectFlags::decode(&mut ba),
            Err(DecodeError::InvalidConnectFlags)
        );
    }
}
