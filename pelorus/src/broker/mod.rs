// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

//! The MQTT broker: an accept loop over preallocated connection and
//! session task pools.
//!
//! All pool bookkeeping lives in the supervisor task. Connections are
//! idle or active; sessions are free, active or disconnected. State
//! transitions arrive as commands from the member tasks, so there are no
//! pool locks to order and no way to invert them.

mod connection;
mod session;
mod stats;

pub use connection::MAX_INCOMING_MESSAGE_SIZE;
pub use stats::{BrokerLeaves, SessionStats};

use codec::{ConnectAckPacket, ConnectReturnCode, EncodePacket};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, Receiver, Sender};

use crate::commands::{ToBrokerCmd, ToConnectionCmd, ToSessionCmd};
use crate::config;
use crate::datamodel::{DataModel, LeafPublish, Subscriber};
use crate::error::Error;
use crate::types::{ConnectionId, SessionId};

use connection::Connection;
use session::Session;

const CHANNEL_CAPACITY: usize = 16;

/// Depth of each session's leaf-publish queue; a full queue drops the
/// publication and counts it.
const PUBLISH_CHANNEL_CAPACITY: usize = 64;

/// Longest client id stored in the per-slot statistics leaves. MQTT
/// promises 23 bytes; the synthesized `IP:port` ids fit too.
const MAX_CLIENT_ID_LENGTH: usize = 23;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionState {
    Idle,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Free,
    Active,
    Disconnected,
}

struct ConnectionEntry {
    state: ConnectionState,
    sender: Sender<ToConnectionCmd>,
    client_id: String,
    messages_sent: Arc<AtomicU32>,
}

struct SessionEntry {
    state: SessionState,
    sender: Sender<ToSessionCmd>,
    client_id: String,
    stats: Arc<SessionStats>,
}

/// Broker supervisor: owns the listening socket, both pools, the pairing
/// logic and the statistics export.
pub struct Broker {
    sys_interval: Duration,
    listener: TcpListener,
    connections: Vec<ConnectionEntry>,
    sessions: Vec<SessionEntry>,
    receiver: Receiver<ToBrokerCmd>,
    leaves: BrokerLeaves,
    maximum_clients_seen: u8,
}

impl Broker {
    /// Bind the listening socket and spawn the pools.
    ///
    /// # Errors
    ///
    /// Returns error if the listen address cannot be bound or the
    /// statistics leaves collide in the data model.
    pub async fn bind(
        mqtt_config: &config::Mqtt,
        sys_interval: Duration,
        model: &DataModel,
    ) -> Result<Self, Error> {
        let listener = TcpListener::bind(mqtt_config.address()).await?;
        log::info!(
            "MQTT broker listening for connections on {}",
            mqtt_config.address()
        );

        let (broker_sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        let max_clients = mqtt_config.max_clients();

        // Both pools are preallocated so clients coming and going cost
        // no task churn; each member parks on its mailbox until used.
        let mut connections = Vec::with_capacity(max_clients);
        for id in 0..max_clients {
            let (sender, conn_receiver) = mpsc::channel(CHANNEL_CAPACITY);
            let messages_sent = Arc::new(AtomicU32::new(0));
            let connection = Connection::new(
                id,
                mqtt_config.keepalive(),
                broker_sender.clone(),
                conn_receiver,
                Arc::clone(&messages_sent),
            );
            tokio::spawn(connection.run_loop());
            connections.push(ConnectionEntry {
                state: ConnectionState::Idle,
                sender,
                client_id: String::new(),
                messages_sent,
            });
        }

        let mut sessions = Vec::with_capacity(max_clients);
        for id in 0..max_clients {
            let (sender, session_receiver) = mpsc::channel(CHANNEL_CAPACITY);
            let (publish_sender, publish_receiver) =
                mpsc::channel::<LeafPublish>(PUBLISH_CHANNEL_CAPACITY);
            let stats = SessionStats::new();
            let subscriber =
                Subscriber::new(id, publish_sender, Arc::clone(&stats.publish_dropped));
            let session = Session::new(
                id,
                model.clone(),
                broker_sender.clone(),
                session_receiver,
                publish_receiver,
                subscriber,
                Arc::clone(&stats),
            );
            tokio::spawn(session.run_loop());
            sessions.push(SessionEntry {
                state: SessionState::Free,
                sender,
                client_id: String::new(),
                stats,
            });
        }

        let leaves = BrokerLeaves::new(model, max_clients, MAX_CLIENT_ID_LENGTH)?;

        Ok(Self {
            sys_interval,
            listener,
            connections,
            sessions,
            receiver,
            leaves,
            maximum_clients_seen: 0,
        })
    }

    /// Address the broker actually bound, for configs that asked for an
    /// ephemeral port.
    ///
    /// # Errors
    ///
    /// Returns error if the socket has no local address.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn run_loop(mut self) {
        let mut stats_interval = tokio::time::interval(self.sys_interval);
        loop {
            tokio::select! {
                result = self.listener.accept() => match result {
                    Ok((stream, peer)) => self.accept_connection(stream, peer).await,
                    Err(err) => log::warn!("Unable to accept MQTT connection: {err}"),
                },
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => self.handle_cmd(cmd).await,
                    None => return,
                },
                _instant = stats_interval.tick() => self.export_stats(),
            }
        }
    }

    async fn accept_connection(&mut self, stream: TcpStream, peer: SocketAddr) {
        let Some(connection_id) = self
            .connections
            .iter()
            .position(|entry| entry.state == ConnectionState::Idle)
        else {
            log::warn!("Max MQTT connections exceeded, ignoring connection from {peer}");
            return;
        };

        self.connections[connection_id].state = ConnectionState::Active;
        log::info!("Accepted MQTT connection from {peer}");
        if self.connections[connection_id]
            .sender
            .send(ToConnectionCmd::AssignSocket { stream, peer })
            .await
            .is_err()
        {
            log::error!("Failed to assign socket to connection #{connection_id}");
            self.connections[connection_id].state = ConnectionState::Idle;
        }
    }

    async fn handle_cmd(&mut self, cmd: ToBrokerCmd) {
        match cmd {
            ToBrokerCmd::ConnectReady {
                connection_id,
                client_id,
                clean_session,
                writer,
            } => {
                self.pair_connection_with_session(connection_id, client_id, clean_session, writer)
                    .await;
            }
            ToBrokerCmd::ConnectionIdle(connection_id) => {
                self.connections[connection_id].state = ConnectionState::Idle;
                self.connections[connection_id].client_id.clear();
            }
            ToBrokerCmd::SessionFree(session_id) => {
                self.sessions[session_id].state = SessionState::Free;
                self.sessions[session_id].client_id.clear();
            }
            ToBrokerCmd::SessionDisconnected(session_id) => {
                self.sessions[session_id].state = SessionState::Disconnected;
            }
        }
    }

    async fn pair_connection_with_session(
        &mut self,
        connection_id: ConnectionId,
        client_id: String,
        clean_session: bool,
        writer: OwnedWriteHalf,
    ) {
        let paired = if clean_session {
            self.pair_with_clean_session(&client_id).await
        } else {
            self.pair_with_non_clean_session(&client_id)
        };

        let Some((session_id, fresh_session)) = paired else {
            log::warn!(
                "No free session for client '{client_id}' on connection #{connection_id}"
            );
            refuse_server_unavailable(writer);
            let _ret = self.connections[connection_id]
                .sender
                .send(ToConnectionCmd::Refused)
                .await;
            return;
        };

        self.sessions[session_id].state = SessionState::Active;
        self.sessions[session_id].client_id = client_id.clone();
        self.connections[connection_id].client_id = client_id.clone();

        let new_connection = ToSessionCmd::NewConnection {
            connection_id,
            connection_sender: self.connections[connection_id].sender.clone(),
            writer,
            client_id,
            clean_session,
            fresh_session,
        };
        if self.sessions[session_id]
            .sender
            .send(new_connection)
            .await
            .is_err()
        {
            log::error!("Failed to hand connection #{connection_id} to session #{session_id}");
            return;
        }
        let _ret = self.connections[connection_id]
            .sender
            .send(ToConnectionCmd::Paired {
                session_sender: self.sessions[session_id].sender.clone(),
            })
            .await;
    }

    /// A clean-session CONNECT gets a fresh session; any session the
    /// broker still holds for the client id is told to shut itself down
    /// and will return itself to the free pool.
    async fn pair_with_clean_session(&mut self, client_id: &str) -> Option<(SessionId, bool)> {
        let stale: Vec<SessionId> = self
            .sessions
            .iter()
            .enumerate()
            .filter(|(_, entry)| {
                entry.state != SessionState::Free && entry.client_id == client_id
            })
            .map(|(id, _)| id)
            .collect();
        for session_id in stale {
            let _ret = self.sessions[session_id]
                .sender
                .send(ToSessionCmd::Shutdown)
                .await;
        }

        self.pop_free_session().map(|id| (id, true))
    }

    /// A non-clean CONNECT resumes a disconnected session for the same
    /// client id with its subscriptions intact, takes over an active one
    /// (the session closes the older connection itself), or falls back
    /// to a fresh session.
    fn pair_with_non_clean_session(&mut self, client_id: &str) -> Option<(SessionId, bool)> {
        if let Some(session_id) = self.session_for_client(SessionState::Disconnected, client_id) {
            return Some((session_id, false));
        }
        if let Some(session_id) = self.session_for_client(SessionState::Active, client_id) {
            return Some((session_id, false));
        }
        self.pop_free_session().map(|id| (id, true))
    }

    fn session_for_client(&self, state: SessionState, client_id: &str) -> Option<SessionId> {
        self.sessions
            .iter()
            .position(|entry| entry.state == state && entry.client_id == client_id)
    }

    fn pop_free_session(&self) -> Option<SessionId> {
        self.sessions
            .iter()
            .position(|entry| entry.state == SessionState::Free)
    }

    fn export_stats(&mut self) {
        let mut received: u32 = 0;
        let mut sent: u32 = 0;
        let mut publish_received: u32 = 0;
        let mut publish_sent: u32 = 0;
        let mut publish_dropped: u32 = 0;

        // Counters accumulate since broker startup, so free slots count
        // too: their totals belong to clients that already left.
        for entry in &self.connections {
            sent = sent.wrapping_add(entry.messages_sent.load(Ordering::Relaxed));
        }
        for entry in &self.sessions {
            received = received.wrapping_add(entry.stats.messages_received.load(Ordering::Relaxed));
            sent = sent.wrapping_add(entry.stats.messages_sent.load(Ordering::Relaxed));
            publish_received = publish_received
                .wrapping_add(entry.stats.publish_received.load(Ordering::Relaxed));
            publish_sent =
                publish_sent.wrapping_add(entry.stats.publish_sent.load(Ordering::Relaxed));
            publish_dropped =
                publish_dropped.wrapping_add(entry.stats.publish_dropped.load(Ordering::Relaxed));
        }

        self.leaves.messages_received.set(received);
        self.leaves.messages_sent.set(sent);
        self.leaves.publish_received.set(publish_received);
        self.leaves.publish_sent.set(publish_sent);
        self.leaves.publish_dropped.set(publish_dropped);

        let mut slot = 0;
        for entry in &self.connections {
            if entry.state == ConnectionState::Active {
                self.leaves.connection_ids[slot].set(entry.client_id.clone());
                slot += 1;
            }
        }
        for leaf in &self.leaves.connection_ids[slot..] {
            leaf.set(String::new());
        }

        let mut connected: u8 = 0;
        let mut disconnected: u8 = 0;
        let mut slot = 0;
        for entry in &self.sessions {
            if entry.state == SessionState::Active {
                connected += 1;
                self.leaves.session_ids[slot].set(entry.client_id.clone());
                slot += 1;
            }
        }
        for entry in &self.sessions {
            if entry.state == SessionState::Disconnected {
                disconnected += 1;
                self.leaves.session_ids[slot].set(entry.client_id.clone());
                slot += 1;
            }
        }
        for leaf in &self.leaves.session_ids[slot..] {
            leaf.set(String::new());
        }

        let total = connected + disconnected;
        self.leaves.connected_clients.set(connected);
        self.leaves.disconnected_clients.set(disconnected);
        self.leaves.total_clients.set(total);
        if total > self.maximum_clients_seen {
            self.maximum_clients_seen = total;
        }
        self.leaves.maximum_clients.set(self.maximum_clients_seen);
    }
}

/// Answer a CONNECT that found no free session, off the supervisor's
/// critical path.
fn refuse_server_unavailable(mut writer: OwnedWriteHalf) {
    tokio::spawn(async move {
        let ack = ConnectAckPacket::new(false, ConnectReturnCode::ServerUnavailable);
        let mut buf = Vec::new();
        if ack.encode(&mut buf).is_ok() {
            let _ret = writer.write_all(&buf).await;
            let _ret = writer.shutdown().await;
        }
    });
}
