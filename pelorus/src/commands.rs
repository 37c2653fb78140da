// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use std::net::SocketAddr;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc::Sender;

use crate::types::{ConnectionId, SessionId};

/// Commands delivered to a connection task's mailbox.
#[derive(Debug)]
pub enum ToConnectionCmd {
    /// The accept loop hands a fresh socket to an idle connection. The
    /// connection must already be on the active list so that a dead-on-
    /// arrival socket cannot race the pool bookkeeping.
    AssignSocket { stream: TcpStream, peer: SocketAddr },

    /// Pairing finished; subsequent packets go to this session.
    Paired { session_sender: Sender<ToSessionCmd> },

    /// No session could be acquired; the refusal CONNACK has been sent.
    Refused,

    /// A session (or the broker) wants this connection closed.
    Disconnect,
}

/// Commands delivered to a session task's mailbox.
///
/// These are the four distinguishable signals a session can receive:
/// a new connection pairing, queued inbound packets, loss of the peer,
/// and a broker-initiated teardown.
#[derive(Debug)]
pub enum ToSessionCmd {
    NewConnection {
        connection_id: ConnectionId,
        connection_sender: Sender<ToConnectionCmd>,
        writer: OwnedWriteHalf,
        client_id: String,
        clean_session: bool,
        /// False when the broker paired this connection with a session it
        /// already held for the client id; drives `session_present`.
        fresh_session: bool,
    },

    /// One complete MQTT packet framed by the connection task.
    Packet(Vec<u8>),

    /// The peer's TCP stream closed or errored.
    ConnectionLost(ConnectionId),

    /// Tear the session down and return it to the free pool.
    Shutdown,
}

/// Commands delivered to the broker supervisor from connections and
/// sessions.
#[derive(Debug)]
pub enum ToBrokerCmd {
    /// A wire-level valid and policy-accepted CONNECT arrived; pair a
    /// session with this connection. The socket's write half travels with
    /// the command and ends up owned by the paired session.
    ConnectReady {
        connection_id: ConnectionId,
        client_id: String,
        clean_session: bool,
        writer: OwnedWriteHalf,
    },

    /// Connection closed its socket and is ready for reassignment.
    ConnectionIdle(ConnectionId),

    /// Session finished teardown and may be reused.
    SessionFree(SessionId),

    /// Non-clean session lost its connection but keeps its subscriptions.
    SessionDisconnected(SessionId),
}
