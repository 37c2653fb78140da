// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use std::sync::atomic::AtomicU32;
use std::sync::Arc;

use crate::datamodel::{DataModel, Leaf, StringLeaf, ROOT_NODE};
use crate::error::Error;

/// Counters one session accumulates across every client it serves.
/// Harvested by the broker, never reset.
#[derive(Debug, Default)]
pub struct SessionStats {
    pub messages_received: AtomicU32,
    pub messages_sent: AtomicU32,
    pub publish_received: AtomicU32,
    pub publish_sent: AtomicU32,

    /// Shared with the subscriber handles living in leaf tables, which
    /// count against it when a session's publish queue is full.
    pub publish_dropped: Arc<AtomicU32>,
}

impl SessionStats {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

/// The leaves the broker publishes its own statistics into. The broker
/// observes itself through the same fabric its clients subscribe to.
pub struct BrokerLeaves {
    pub connected_clients: Leaf<u8>,
    pub disconnected_clients: Leaf<u8>,
    pub maximum_clients: Leaf<u8>,
    pub total_clients: Leaf<u8>,

    pub messages_received: Leaf<u32>,
    pub messages_sent: Leaf<u32>,
    pub publish_received: Leaf<u32>,
    pub publish_sent: Leaf<u32>,
    pub publish_dropped: Leaf<u32>,

    /// Client id of the connection/session occupying each pool slot,
    /// empty when the slot is free.
    pub connection_ids: Vec<StringLeaf>,
    pub session_ids: Vec<StringLeaf>,
}

impl BrokerLeaves {
    /// Build the statistics subtree: `clients/*`, `messages/*` and
    /// `broker/{connections,sessions}/<n>`.
    ///
    /// # Errors
    ///
    /// Returns error if the tree nodes collide, which would be a wiring
    /// bug at startup.
    pub fn new(
        model: &DataModel,
        max_clients: usize,
        max_client_id_length: usize,
    ) -> Result<Self, Error> {
        let clients = model.add_node(ROOT_NODE, "clients")?;
        let connected_clients = model.add_leaf(clients, "connected")?;
        let disconnected_clients = model.add_leaf(clients, "disconnected")?;
        let maximum_clients = model.add_leaf(clients, "maximum")?;
        let total_clients = model.add_leaf(clients, "total")?;

        let messages = model.add_node(ROOT_NODE, "messages")?;
        let messages_received = model.add_leaf(messages, "received")?;
        let messages_sent = model.add_leaf(messages, "sent")?;
        let publish = model.add_node(messages, "publish")?;
        let publish_received = model.add_leaf(publish, "received")?;
        let publish_sent = model.add_leaf(publish, "sent")?;
        let publish_dropped = model.add_leaf(publish, "dropped")?;

        let broker = model.add_node(ROOT_NODE, "broker")?;
        let connections = model.add_node(broker, "connections")?;
        let sessions = model.add_node(broker, "sessions")?;
        let mut connection_ids = Vec::with_capacity(max_clients);
        let mut session_ids = Vec::with_capacity(max_clients);
        for slot in 1..=max_clients {
            let name = slot.to_string();
            connection_ids.push(model.add_string_leaf(
                connections,
                &name,
                max_client_id_length,
            )?);
            session_ids.push(model.add_string_leaf(sessions, &name, max_client_id_length)?);
        }

        let leaves = Self {
            connected_clients,
            disconnected_clients,
            maximum_clients,
            total_clients,
            messages_received,
            messages_sent,
            publish_received,
            publish_sent,
            publish_dropped,
            connection_ids,
            session_ids,
        };
        leaves.init();
        Ok(leaves)
    }

    fn init(&self) {
        self.connected_clients.set(0);
        self.disconnected_clients.set(0);
        self.maximum_clients.set(0);
        self.total_clients.set(0);
    }
}
