// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

//! NMEA 0183 ingest: line framing, field extraction, per-sentence
//! parsing and AIS fragment decapsulation.

pub mod decapsulator;
pub mod field;
pub mod line;
pub mod message;
mod msg_type;
mod parser;
mod talker;

pub use msg_type::MsgType;
pub use parser::{NmeaParser, ParserCounters};
pub use talker::Talker;
