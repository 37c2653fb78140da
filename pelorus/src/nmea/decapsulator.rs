// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

//! Reassembly of six-bit armored AIS payloads split over 1..N
//! encapsulated sentences.

use super::msg_type::MsgType;
use super::talker::Talker;

/// Upper bound on a reassembled message, in bytes.
pub const MAX_ENCAPSULATED_MESSAGE_SIZE: usize = 256;

/// Per-source fragment reassembler.
///
/// Idle until a fragment with index 1 arrives; collects while successive
/// fragments match the captured identity; complete when the final
/// fragment lands. A fragment that does not continue the in-progress
/// message abandons it and is then considered afresh, so a new message's
/// first fragment resynchronizes the stream.
#[derive(Debug)]
pub struct Decapsulator {
    in_progress: bool,
    talker: Talker,
    msg_type: MsgType,
    fragment_count: u8,
    last_fragment_index: u8,
    message_id: u32,
    data: [u8; MAX_ENCAPSULATED_MESSAGE_SIZE],
    bit_length: usize,
}

impl Decapsulator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            in_progress: false,
            talker: Talker::default(),
            msg_type: MsgType::Unknown,
            fragment_count: 0,
            last_fragment_index: 0,
            message_id: 0,
            data: [0; MAX_ENCAPSULATED_MESSAGE_SIZE],
            bit_length: 0,
        }
    }

    pub fn add_fragment(
        &mut self,
        talker: Talker,
        msg_type: MsgType,
        fragment_count: u8,
        fragment_index: u8,
        message_id_or_zero: u32,
        payload: &str,
        fill_bits: u8,
    ) {
        if self.in_progress
            && !self.fragment_is_next(talker, msg_type, fragment_count, fragment_index,
                                      message_id_or_zero)
        {
            // Ditch the old message but keep working on this fragment;
            // it may be the start of a different message.
            log::warn!(
                "Incomplete encapsulated NMEA {} message from {}",
                self.msg_type,
                self.talker
            );
            self.in_progress = false;
            self.bit_length = 0;
        }

        if !self.in_progress {
            if fragment_index != 1 {
                // We came in mid-stream; the fragment is useless without
                // its predecessors.
                log::warn!(
                    "Discarding encapsulated NMEA {msg_type} message fragment from {talker} \
                     that is missing preceding fragments"
                );
                return;
            }

            self.talker = talker;
            self.msg_type = msg_type;
            self.fragment_count = fragment_count;
            self.message_id = message_id_or_zero;
            self.bit_length = 0;
            self.in_progress = true;
        }

        self.last_fragment_index = fragment_index;

        let last_fragment = fragment_index == fragment_count;
        if !self.add_fragment_payload(payload, fill_bits, last_fragment) {
            self.reset();
        }
    }

    fn fragment_is_next(
        &self,
        talker: Talker,
        msg_type: MsgType,
        fragment_count: u8,
        fragment_index: u8,
        message_id_or_zero: u32,
    ) -> bool {
        self.talker == talker
            && self.msg_type == msg_type
            && self.fragment_count == fragment_count
            && self.last_fragment_index + 1 == fragment_index
            && self.message_id == message_id_or_zero
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.in_progress && self.last_fragment_index == self.fragment_count
    }

    #[must_use]
    pub fn message_data(&self) -> &[u8] {
        &self.data[..(self.bit_length + 7) / 8]
    }

    #[must_use]
    pub const fn message_bit_length(&self) -> usize {
        self.bit_length
    }

    pub fn reset(&mut self) {
        self.in_progress = false;
        self.bit_length = 0;
    }

    fn add_fragment_payload(&mut self, payload: &str, fill_bits: u8, last_fragment: bool) -> bool {
        let bytes = payload.as_bytes();
        for (position, &armored) in bytes.iter().enumerate() {
            let mut value = payload_char_value(armored);

            // The last character of the final fragment carries fill bits
            // in its low positions that are padding, not payload.
            let valid_bits = if last_fragment && position + 1 == bytes.len() {
                value >>= fill_bits;
                6 - fill_bits
            } else {
                6
            };

            if !self.write_bits(value, valid_bits) {
                log::warn!("Failed to add encapsulated fragment payload to message");
                return false;
            }
        }
        true
    }

    /// Append the low `count` bits of `value`, most significant first.
    fn write_bits(&mut self, value: u8, count: u8) -> bool {
        for shift in (0..count).rev() {
            let byte_index = self.bit_length / 8;
            if byte_index >= MAX_ENCAPSULATED_MESSAGE_SIZE {
                return false;
            }
            let bit = (value >> shift) & 1;
            let bit_offset = 7 - (self.bit_length % 8);
            if bit == 1 {
                self.data[byte_index] |= 1 << bit_offset;
            } else {
                self.data[byte_index] &= !(1 << bit_offset);
            }
            self.bit_length += 1;
        }
        true
    }
}

impl Default for Decapsulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Six-bit armor value of a payload character, per ITU-R M.1371 Annex 8.
#[must_use]
pub fn payload_char_value(payload_char: u8) -> u8 {
    let mut value = payload_char.wrapping_sub(48);
    if value > 40 {
        value -= 8;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ais_talker() -> Talker {
        Talker::new(*b"AI")
    }

    #[test]
    fn test_payload_char_values() {
        assert_eq!(payload_char_value(b'0'), 0);
        assert_eq!(payload_char_value(b'W'), 39);
        assert_eq!(payload_char_value(b'`'), 40);
        assert_eq!(payload_char_value(b'w'), 63);
    }

    #[test]
    fn test_single_fragment_complete() {
        let mut decapsulator = Decapsulator::new();
        decapsulator.add_fragment(ais_talker(), MsgType::Vdm, 1, 1, 0, "14", 0);
        assert!(decapsulator.is_complete());
        assert_eq!(decapsulator.message_bit_length(), 12);
        // '1' = 000001, '4' = 000100 -> 0000_0100 0100....
        assert_eq!(decapsulator.message_data(), &[0b0000_0100, 0b0100_0000]);
    }

    #[test]
    fn test_two_fragment_reassembly_with_fill_bits() {
        let mut decapsulator = Decapsulator::new();
        decapsulator.add_fragment(ais_talker(), MsgType::Vdm, 2, 1, 3, "E00", 0);
        assert!(!decapsulator.is_complete());
        decapsulator.add_fragment(ais_talker(), MsgType::Vdm, 2, 2, 3, "00", 2);
        assert!(decapsulator.is_complete());
        // 6 * 3 + 6 * 2 - 2 fill bits.
        assert_eq!(decapsulator.message_bit_length(), 28);
        // First six bits are the message type: 'E' = 21.
        assert_eq!(decapsulator.message_data()[0] >> 2, 21);
    }

    #[test]
    fn test_fragment_without_head_discarded() {
        let mut decapsulator = Decapsulator::new();
        decapsulator.add_fragment(ais_talker(), MsgType::Vdm, 2, 2, 3, "00", 2);
        assert!(!decapsulator.is_complete());
        assert_eq!(decapsulator.message_bit_length(), 0);
    }

    #[test]
    fn test_mismatched_fragment_resynchronizes() {
        let mut decapsulator = Decapsulator::new();
        // First half of one message...
        decapsulator.add_fragment(ais_talker(), MsgType::Vdm, 2, 1, 3, "E00", 0);
        // ...interrupted by the head of a different message.
        decapsulator.add_fragment(ais_talker(), MsgType::Vdm, 2, 1, 7, "14", 0);
        assert!(!decapsulator.is_complete());
        decapsulator.add_fragment(ais_talker(), MsgType::Vdm, 2, 2, 7, "14", 0);
        assert!(decapsulator.is_complete());
        assert_eq!(decapsulator.message_bit_length(), 24);
        assert_eq!(decapsulator.message_data()[0] >> 2, 1);
    }
}
