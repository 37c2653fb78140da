// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use std::fmt;

/// Two character talker id from the start of a sentence tag.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Talker {
    code: [u8; 2],
}

impl Talker {
    #[must_use]
    pub const fn new(code: [u8; 2]) -> Self {
        Self { code }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        std::str::from_utf8(&self.code).unwrap_or("??")
    }

    /// Human readable name used in log lines.
    #[must_use]
    pub fn name(&self) -> &str {
        match &self.code {
            b"AI" => "AIS",
            b"EC" => "ECDIS",
            b"GA" => "Galileo",
            b"GB" => "BeiDou",
            b"GL" => "GLONASS",
            b"GN" => "GNSS",
            b"GP" => "GPS",
            b"HC" => "Magnetic Compass",
            b"II" => "Integrated Instrumentation",
            b"IN" => "Integrated Navigation",
            b"SD" => "Depth Sounder",
            b"SN" => "Electronic Positioning",
            b"VW" => "Speed Log",
            b"WI" => "Weather Instrument",
            b"YX" => "Transducer",
            _ => self.code(),
        }
    }
}

impl fmt::Display for Talker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_talker() {
        assert_eq!(Talker::new(*b"GP").name(), "GPS");
        assert_eq!(Talker::new(*b"AI").name(), "AIS");
    }

    #[test]
    fn test_unknown_talker_shows_code() {
        assert_eq!(Talker::new(*b"ZZ").name(), "ZZ");
    }
}
