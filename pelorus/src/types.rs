// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

/// Index of a connection slot in the broker's preallocated pool.
pub type ConnectionId = usize;

/// Index of a session slot in the broker's preallocated pool.
pub type SessionId = usize;

/// Opaque per-subscription value a subscriber attaches to each leaf it
/// subscribes to. The MQTT session stores the requested maximum QoS here.
pub type Cookie = u32;
