// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::Sender;

use crate::types::SessionId;

/// One value publication on its way from a leaf to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafPublish {
    pub topic: String,
    pub payload: String,
    pub retain: bool,
}

/// Handle a session registers with the data model. A leaf's subscriber
/// table stores clones of this; it never keeps the session itself alive,
/// and a closed or full channel turns the publish into a counted drop
/// rather than a blocked writer.
#[derive(Debug, Clone)]
pub struct Subscriber {
    session_id: SessionId,
    sender: Sender<LeafPublish>,
    publish_dropped: Arc<AtomicU32>,
}

impl Subscriber {
    #[must_use]
    pub const fn new(
        session_id: SessionId,
        sender: Sender<LeafPublish>,
        publish_dropped: Arc<AtomicU32>,
    ) -> Self {
        Self {
            session_id,
            sender,
            publish_dropped,
        }
    }

    #[must_use]
    pub const fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Hand one publication to the owning session. Called with the
    /// subscription lock held, which is safe because the send never
    /// blocks.
    pub(super) fn publish(&self, topic: &str, payload: &str, retain: bool) {
        let publish = LeafPublish {
            topic: topic.to_string(),
            payload: payload.to_string(),
            retain,
        };
        if self.sender.try_send(publish).is_err() {
            self.publish_dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}
