// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use super::decapsulator::Decapsulator;
use super::field::{self, FieldError};
use super::line::{self, Encoding, FrameError, LineWalker};
use super::message::{
    DbkMessage, DbsMessage, DbtMessage, DptMessage, GgaMessage, GllMessage, GsaMessage,
    GstMessage, GsvMessage, HdgMessage, MtwMessage, MwvMessage, NmeaMessage, RmcMessage,
    RsaMessage, TxtMessage, VhwMessage, VtgMessage,
};
use super::msg_type::MsgType;
use super::talker::Talker;
use crate::ais;

/// Error counters a parser accumulates over its source's lifetime.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParserCounters {
    pub bad_framing: u32,
    pub bad_checksum: u32,
    pub bad_tag: u32,
    pub unknown_sentence: u32,
    pub invalid_sentence: u32,
}

/// Per-source NMEA 0183 parser. Lines in, at most one typed message out;
/// the caller consumes each message before handing over the next line.
#[derive(Debug, Default)]
pub struct NmeaParser {
    decapsulator: Decapsulator,
    pub counters: ParserCounters,
}

impl NmeaParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            decapsulator: Decapsulator::new(),
            counters: ParserCounters::default(),
        }
    }

    /// Parse one complete line (without its `\r\n`).
    pub fn parse_line(&mut self, raw: &[u8]) -> Option<NmeaMessage> {
        let (encoding, body) = match line::check_frame(raw) {
            Ok(frame) => frame,
            Err(FrameError::BadChecksum) => {
                self.counters.bad_checksum += 1;
                log::warn!("NMEA line with bad checksum: {}", String::from_utf8_lossy(raw));
                return None;
            }
            Err(FrameError::BadFraming | FrameError::BadCharacter) => {
                self.counters.bad_framing += 1;
                log::warn!("Badly framed NMEA line: {}", String::from_utf8_lossy(raw));
                return None;
            }
        };

        let mut walker = LineWalker::new(body);
        let Some(tag) = walker.next_field() else {
            self.counters.bad_tag += 1;
            log::warn!("NMEA message missing tag");
            return None;
        };
        if tag.len() != 5 || !tag.is_ascii() {
            self.counters.bad_tag += 1;
            log::warn!("Bad NMEA tag '{tag}'");
            return None;
        }

        let tag_bytes = tag.as_bytes();
        let talker = Talker::new([tag_bytes[0], tag_bytes[1]]);
        let msg_type = MsgType::parse(&tag[2..]);

        match encoding {
            Encoding::Plain => self.parse_plain_line(talker, msg_type, &mut walker),
            Encoding::Encapsulated => self.parse_encapsulated_line(talker, msg_type, &mut walker),
        }
    }

    fn parse_plain_line(
        &mut self,
        talker: Talker,
        msg_type: MsgType,
        walker: &mut LineWalker,
    ) -> Option<NmeaMessage> {
        let result = match msg_type {
            MsgType::Dbk => DbkMessage::parse(talker, walker).map(NmeaMessage::Dbk),
            MsgType::Dbs => DbsMessage::parse(talker, walker).map(NmeaMessage::Dbs),
            MsgType::Dbt => DbtMessage::parse(talker, walker).map(NmeaMessage::Dbt),
            MsgType::Dpt => DptMessage::parse(talker, walker).map(NmeaMessage::Dpt),
            MsgType::Gga => GgaMessage::parse(talker, walker).map(NmeaMessage::Gga),
            MsgType::Gll => GllMessage::parse(talker, walker).map(NmeaMessage::Gll),
            MsgType::Gsa => GsaMessage::parse(talker, walker).map(NmeaMessage::Gsa),
            MsgType::Gst => GstMessage::parse(talker, walker).map(NmeaMessage::Gst),
            MsgType::Gsv => GsvMessage::parse(talker, walker).map(NmeaMessage::Gsv),
            MsgType::Hdg => HdgMessage::parse(talker, walker).map(NmeaMessage::Hdg),
            MsgType::Mtw => MtwMessage::parse(talker, walker).map(NmeaMessage::Mtw),
            MsgType::Mwv => MwvMessage::parse(talker, walker).map(NmeaMessage::Mwv),
            MsgType::Rmc => RmcMessage::parse(talker, walker).map(NmeaMessage::Rmc),
            MsgType::Rsa => RsaMessage::parse(talker, walker).map(NmeaMessage::Rsa),
            MsgType::Txt => TxtMessage::parse(talker, walker).map(NmeaMessage::Txt),
            MsgType::Vhw => VhwMessage::parse(talker, walker).map(NmeaMessage::Vhw),
            MsgType::Vtg => VtgMessage::parse(talker, walker).map(NmeaMessage::Vtg),
            MsgType::Vdm | MsgType::Vdo => {
                log::warn!("Unsupported unencapsulated {msg_type} message from {talker}");
                self.counters.unknown_sentence += 1;
                return None;
            }
            MsgType::Unknown => {
                log::warn!("Unknown NMEA message type from {talker}");
                self.counters.unknown_sentence += 1;
                return None;
            }
        };

        match result {
            Ok(message) => Some(message),
            Err(err) => {
                self.counters.invalid_sentence += 1;
                log::warn!("{talker} {msg_type} message {err}");
                None
            }
        }
    }

    fn parse_encapsulated_line(
        &mut self,
        talker: Talker,
        msg_type: MsgType,
        walker: &mut LineWalker,
    ) -> Option<NmeaMessage> {
        if !matches!(msg_type, MsgType::Vdm | MsgType::Vdo) {
            log::warn!("Ignoring unsupported encapsulated {msg_type} message from {talker}");
            self.counters.unknown_sentence += 1;
            return None;
        }

        match self.extract_fragment(talker, msg_type, walker) {
            Ok(()) => {}
            Err(err) => {
                self.counters.invalid_sentence += 1;
                log::warn!("{talker} {msg_type} message {err}");
                self.decapsulator.reset();
                return None;
            }
        }

        if self.decapsulator.is_complete() {
            let message = self.parse_encapsulated_message(talker, msg_type);
            self.decapsulator.reset();
            message
        } else {
            None
        }
    }

    fn extract_fragment(
        &mut self,
        talker: Talker,
        msg_type: MsgType,
        walker: &mut LineWalker,
    ) -> Result<(), FieldError> {
        let fragment_count = field::uint8(walker, "Fragment Count", false, u8::MAX)?
            .ok_or(FieldError::missing("Fragment Count"))?;
        if fragment_count == 0 {
            return Err(FieldError::invalid("Fragment Count"));
        }

        let fragment_index = field::uint8(walker, "Fragment Index", false, u8::MAX)?
            .ok_or(FieldError::missing("Fragment Index"))?;
        if fragment_index == 0 {
            return Err(FieldError::invalid("Fragment Index"));
        }

        let message_id = field::uint32(walker, "Message ID", true, u32::MAX)?;
        // A multi-fragment message without an id could not be matched up
        // with its siblings.
        if fragment_count > 1 && message_id.is_none() {
            return Err(FieldError::missing("Message ID"));
        }

        let radio_channel = walker
            .next_field()
            .ok_or(FieldError::missing("Radio Channel Code"))?;
        if !matches!(radio_channel, "A" | "B" | "1" | "2" | "") {
            return Err(FieldError::invalid("Radio Channel Code"));
        }

        let payload = walker.next_field().ok_or(FieldError::missing("Payload"))?;
        if payload.is_empty() {
            return Err(FieldError::missing("Payload"));
        }

        let fill_bits = field::uint8(walker, "Fill Bits", false, 5)?
            .ok_or(FieldError::missing("Fill Bits"))?;

        self.decapsulator.add_fragment(
            talker,
            msg_type,
            fragment_count,
            fragment_index,
            message_id.unwrap_or(0),
            payload,
            fill_bits,
        );
        Ok(())
    }

    fn parse_encapsulated_message(
        &mut self,
        talker: Talker,
        msg_type: MsgType,
    ) -> Option<NmeaMessage> {
        match msg_type {
            MsgType::Vdm => ais::parse_vdm_message(
                talker,
                self.decapsulator.message_data(),
                self.decapsulator.message_bit_length(),
            ),
            MsgType::Vdo => {
                log::info!(
                    "Ignoring {} bit encapsulated NMEA VDO message from {talker}",
                    self.decapsulator.message_bit_length()
                );
                None
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nmea::field::GpsQuality;

    const GGA: &[u8] =
        b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";

    #[test]
    fn test_parse_gga_line() {
        let mut parser = NmeaParser::new();
        let message = parser.parse_line(GGA).unwrap();
        let NmeaMessage::Gga(gga) = message else {
            panic!("expected GGA, got {message:?}");
        };
        assert_eq!(gga.time.to_wire(), "12:35:19");
        assert_eq!(gga.gps_quality, GpsQuality::Gps);
        assert_eq!(gga.number_satellites, 8);
    }

    #[test]
    fn test_bad_checksum_counted() {
        let mut parser = NmeaParser::new();
        let mut line = GGA.to_vec();
        let last = line.len() - 1;
        line[last] = b'8';
        assert!(parser.parse_line(&line).is_none());
        assert_eq!(parser.counters.bad_checksum, 1);
    }

    #[test]
    fn test_unknown_sentence_counted() {
        let mut parser = NmeaParser::new();
        // "GPZZZ" with a correct checksum.
        let line = b"$GPZZZ,1,2*4E";
        assert!(parser.parse_line(line).is_none());
        assert_eq!(parser.counters.unknown_sentence, 1);
    }

    #[test]
    fn test_invalid_field_counted_and_parser_recovers() {
        let mut parser = NmeaParser::new();
        // MTW with a non-numeric temperature; checksum is correct.
        let bad = checksummed("IIMTW,abc,C");
        assert!(parser.parse_line(&bad).is_none());
        assert_eq!(parser.counters.invalid_sentence, 1);

        let good = checksummed("IIMTW,18.4,C");
        assert!(parser.parse_line(&good).is_some());
    }

    #[test]
    fn test_vdm_two_fragment_roundtrip() {
        let mut parser = NmeaParser::new();
        let first = checksummed("AIVDM,2,1,3,B,E00,0");
        let second = checksummed("AIVDM,2,2,3,B,00,2");
        assert!(parser.parse_line(&first).is_none());
        // 28 bits is far short of a full report; the decoder drops it,
        // but only after the decapsulator saw a complete message.
        assert!(parser.parse_line(&second).is_none());
    }

    fn checksummed(body: &str) -> Vec<u8> {
        let checksum = body.bytes().fold(0u8, |acc, b| acc ^ b);
        let sentinel = if body.starts_with("AI") { '!' } else { '$' };
        format!("{sentinel}{body}*{checksum:02X}").into_bytes()
    }
}
