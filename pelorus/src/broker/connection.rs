// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use codec::{
    ByteArray, ConnectAckPacket, ConnectPacket, ConnectReturnCode, DecodePacket, EncodePacket,
    ProtocolLevel, VarInt,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{Receiver, Sender};

use crate::commands::{ToBrokerCmd, ToConnectionCmd, ToSessionCmd};
use crate::config::TcpKeepalive;
use crate::error::{Error, ErrorKind};
use crate::socket;
use crate::types::ConnectionId;

/// Largest inbound packet accepted. The protocol allows 256 MB; a
/// gateway does not.
pub const MAX_INCOMING_MESSAGE_SIZE: usize = 1024;

const MIN_FIXED_HEADER_SIZE: usize = 2;
const MAX_FIXED_HEADER_SIZE: usize = 5;

/// One preallocated connection slot. Parks on its mailbox until the
/// accept loop assigns it a socket, owns the socket's read half for that
/// socket's lifetime, and hands the write half to whichever session it
/// gets paired with.
pub struct Connection {
    id: ConnectionId,
    keepalive: TcpKeepalive,
    broker_sender: Sender<ToBrokerCmd>,
    receiver: Receiver<ToConnectionCmd>,
    messages_sent: Arc<AtomicU32>,
}

impl Connection {
    pub fn new(
        id: ConnectionId,
        keepalive: TcpKeepalive,
        broker_sender: Sender<ToBrokerCmd>,
        receiver: Receiver<ToConnectionCmd>,
        messages_sent: Arc<AtomicU32>,
    ) -> Self {
        Self {
            id,
            keepalive,
            broker_sender,
            receiver,
            messages_sent,
        }
    }

    pub async fn run_loop(mut self) {
        loop {
            // Idle: wait for a socket. Stale Disconnect signals from a
            // previous pairing are swallowed here.
            let Some(cmd) = self.receiver.recv().await else {
                return;
            };
            let ToConnectionCmd::AssignSocket { stream, peer } = cmd else {
                continue;
            };

            log::debug!("connection #{}: assigned socket from {peer}", self.id);
            self.serve_socket(stream, peer).await;

            log::debug!("connection #{}: going idle", self.id);
            if self
                .broker_sender
                .send(ToBrokerCmd::ConnectionIdle(self.id))
                .await
                .is_err()
            {
                return;
            }
        }
    }

    async fn serve_socket(&mut self, stream: TcpStream, peer: SocketAddr) {
        if let Err(err) = socket::set_keepalive(&stream, self.keepalive) {
            log::warn!("connection #{}: {err}", self.id);
        }

        let (mut reader, writer) = stream.into_split();

        // The first packet on any connection must be a CONNECT.
        let packet = match read_packet(&mut reader).await {
            Ok(packet) => packet,
            Err(err) => {
                log::warn!("connection #{}: {err}", self.id);
                return;
            }
        };
        let mut ba = ByteArray::new(&packet);
        let connect = match ConnectPacket::decode(&mut ba) {
            Ok(connect) => connect,
            Err(err) => {
                log::warn!(
                    "connection #{}: bad CONNECT from {peer}: {err:?}. Terminating connection.",
                    self.id
                );
                return;
            }
        };

        let mut writer = writer;
        if let Some(return_code) = connect_refusal(&connect) {
            log::warn!(
                "connection #{}: refusing CONNECT from {peer} with {return_code:?}",
                self.id
            );
            self.send_connect_ack(&mut writer, return_code).await;
            return;
        }

        // A client may omit its id if it asks for a clean session; name
        // it after its address so log lines stay attributable.
        let client_id = if connect.client_id().is_empty() {
            peer.to_string()
        } else {
            connect.client_id().to_string()
        };
        let clean_session = connect.connect_flags().clean_session();
        log::debug!(
            "connection #{}: CONNECT client id '{client_id}' clean session {clean_session}",
            self.id
        );

        if self
            .broker_sender
            .send(ToBrokerCmd::ConnectReady {
                connection_id: self.id,
                client_id,
                clean_session,
                writer,
            })
            .await
            .is_err()
        {
            return;
        }

        // Pairing outcome decides whether the read loop starts.
        let session_sender = loop {
            match self.receiver.recv().await {
                Some(ToConnectionCmd::Paired { session_sender }) => break session_sender,
                Some(ToConnectionCmd::Refused | ToConnectionCmd::Disconnect) | None => return,
                Some(ToConnectionCmd::AssignSocket { .. }) => {
                    log::error!("connection #{}: socket assigned while active", self.id);
                    return;
                }
            }
        };

        self.read_loop(&mut reader, &session_sender).await;
    }

    async fn read_loop(
        &mut self,
        reader: &mut OwnedReadHalf,
        session_sender: &Sender<ToSessionCmd>,
    ) {
        loop {
            tokio::select! {
                result = read_packet(reader) => match result {
                    Ok(packet) => {
                        if session_sender
                            .send(ToSessionCmd::Packet(packet))
                            .await
                            .is_err()
                        {
                            return;
                        }
                    }
                    Err(err) => {
                        log::debug!("connection #{}: {err}", self.id);
                        let _ret = session_sender
                            .send(ToSessionCmd::ConnectionLost(self.id))
                            .await;
                        return;
                    }
                },
                cmd = self.receiver.recv() => {
                    // The only signal a session or the broker sends an
                    // active connection is a disconnection request.
                    match cmd {
                        Some(ToConnectionCmd::Disconnect) | None => return,
                        Some(other) => {
                            log::error!(
                                "connection #{}: unexpected command {other:?} while active",
                                self.id
                            );
                            return;
                        }
                    }
                }
            }
        }
    }

    async fn send_connect_ack(&mut self, writer: &mut OwnedWriteHalf, code: ConnectReturnCode) {
        let ack = ConnectAckPacket::new(false, code);
        let mut buf = Vec::new();
        if ack.encode(&mut buf).is_ok() && writer.write_all(&buf).await.is_ok() {
            self.messages_sent.fetch_add(1, Ordering::Relaxed);
        }
        let _ret = writer.shutdown().await;
    }
}

/// CONNECT policy decisions that answer with a refusal CONNACK rather
/// than a silently closed socket.
fn connect_refusal(connect: &ConnectPacket) -> Option<ConnectReturnCode> {
    if connect.protocol_name() != "MQTT" {
        return Some(ConnectReturnCode::UnacceptableProtocol);
    }
    if connect.protocol_level() != ProtocolLevel::V311 {
        return Some(ConnectReturnCode::UnacceptableProtocol);
    }
    // Wills are deliberately unsupported in this broker.
    if connect.connect_flags().has_will() {
        return Some(ConnectReturnCode::ServerUnavailable);
    }
    if connect.connect_flags().has_username() || connect.connect_flags().has_password() {
        return Some(ConnectReturnCode::BadUsernameOrPassword);
    }
    // Without an id and without clean session there is nothing to pair
    // a later reconnect against.
    if connect.client_id().is_empty() && !connect.connect_flags().clean_session() {
        return Some(ConnectReturnCode::IdentifierRejected);
    }
    None
}

/// Read one complete MQTT packet: fixed header byte, 1..4 length bytes,
/// then the declared remainder.
async fn read_packet(reader: &mut OwnedReadHalf) -> Result<Vec<u8>, Error> {
    let mut header = [0u8; MAX_FIXED_HEADER_SIZE];
    reader.read_exact(&mut header[..MIN_FIXED_HEADER_SIZE]).await?;
    let mut header_length = MIN_FIXED_HEADER_SIZE;

    while header[header_length - 1] & 0x80 != 0 {
        if header_length == MAX_FIXED_HEADER_SIZE {
            return Err(Error::new(
                ErrorKind::DecodeError,
                "Illegal message remaining length",
            ));
        }
        reader
            .read_exact(&mut header[header_length..=header_length])
            .await?;
        header_length += 1;
    }

    let mut ba = ByteArray::new(&header[1..header_length]);
    let remaining_length = VarInt::decode(&mut ba)
        .map_err(|err| Error::from_string(ErrorKind::DecodeError, format!("{err:?}")))?
        .value();

    if header_length + remaining_length > MAX_INCOMING_MESSAGE_SIZE {
        return Err(Error::from_string(
            ErrorKind::DecodeError,
            format!(
                "Message size {} exceeds maximum allowable ({MAX_INCOMING_MESSAGE_SIZE})",
                header_length + remaining_length
            ),
        ));
    }

    let mut packet = vec![0u8; header_length + remaining_length];
    packet[..header_length].copy_from_slice(&header[..header_length]);
    reader.read_exact(&mut packet[header_length..]).await?;
    Ok(packet)
}
