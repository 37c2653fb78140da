// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use crate::nmea::field::{self, FieldError};
use crate::nmea::line::LineWalker;
use crate::nmea::talker::Talker;

/// TXT: free-form text from a talker, split over numbered sentences.
#[derive(Debug, Clone, PartialEq)]
pub struct TxtMessage {
    pub talker: Talker,
    pub total_sentences: u8,
    pub sentence_number: u8,
    pub text_identifier: u8,
    pub text: String,
}

impl TxtMessage {
    pub(crate) fn parse(talker: Talker, walker: &mut LineWalker) -> Result<Self, FieldError> {
        let total_sentences = field::uint8(walker, "Total Sentences", false, 99)?
            .ok_or(FieldError::missing("Total Sentences"))?;
        let sentence_number = field::uint8(walker, "Sentence Number", false, 99)?
            .ok_or(FieldError::missing("Sentence Number"))?;
        let text_identifier = field::uint8(walker, "Text Identifier", false, 99)?
            .ok_or(FieldError::missing("Text Identifier"))?;
        let text = walker
            .next_field()
            .ok_or(FieldError::missing("Text"))?
            .to_string();

        Ok(Self {
            talker,
            total_sentences,
            sentence_number,
            text_identifier,
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let mut walker = LineWalker::new("01,01,25,DR MODE - ANTENNA FAULT^21");
        let message = TxtMessage::parse(Talker::new(*b"GP"), &mut walker).unwrap();
        assert_eq!(message.total_sentences, 1);
        assert_eq!(message.text_identifier, 25);
        assert_eq!(message.text, "DR MODE - ANTENNA FAULT^21");
    }
}
