// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringError {
    InvalidUtf8,

    /// Strings on the wire are length-prefixed with a u16.
    TooLong,

    /// U+0000 must not appear in an MQTT string [MQTT-1.5.3-2].
    NullCharacter,
}

/// Convert raw bytes read from a packet into an owned string.
///
/// # Errors
///
/// Returns error if the bytes are not well formed UTF-8 or contain a
/// null character.
pub fn to_utf8_string(bytes: &[u8]) -> Result<String, StringError> {
    let s = std::str::from_utf8(bytes).map_err(|_| StringError::InvalidUtf8)?;
    if s.contains('\u{0000}') {
        return Err(StringError::NullCharacter);
    }
    Ok(s.to_string())
}

/// Check that a string may be placed in a length-prefixed wire field.
///
/// # Errors
///
/// Returns error if the string is longer than 64k bytes or contains a
/// null character.
pub fn validate_utf8_string(s: &str) -> Result<(), StringError> {
    if s.len() > usize::from(u16::MAX) {
        return Err(StringError::TooLong);
    }
    if s.contains('\u{0000}') {
        return Err(StringError::NullCharacter);
    }
    Ok(())
}
