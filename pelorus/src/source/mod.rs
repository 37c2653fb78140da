// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

//! NMEA 0183 byte-stream sources. Each source runs its own task with
//! its own parser state and feeds a bounded per-source message queue.

mod tcp;

pub use tcp::NmeaTcpSource;

/// Depth of the per-source parsed-message queue between a source task
/// and its bridge task.
pub const SOURCE_CHANNEL_CAPACITY: usize = 16;
