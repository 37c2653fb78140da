// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use codec::{
    ByteArray, ConnectAckPacket, ConnectReturnCode, DecodePacket, EncodePacket, FixedHeader,
    PacketType, PingRequestPacket, PingResponsePacket, PublishPacket, QoS, SubscribeAck,
    SubscribeAckPacket, SubscribePacket, UnsubscribeAckPacket, UnsubscribePacket,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::mpsc::{Receiver, Sender};

use super::stats::SessionStats;
use crate::commands::{ToBrokerCmd, ToConnectionCmd, ToSessionCmd};
use crate::datamodel::{DataModel, LeafPublish, Subscriber};
use crate::types::{ConnectionId, Cookie, SessionId};

const MAX_TOPICS_PER_SUBSCRIBE: usize = 100;

struct ConnectionHandle {
    id: ConnectionId,
    sender: Sender<ToConnectionCmd>,
    writer: OwnedWriteHalf,
}

/// One preallocated session slot: the MQTT-level client state. Paired
/// with a connection it drains that connection's packets and is the
/// single writer to the socket; disconnected non-clean it parks with its
/// subscriptions attached; freed it waits for the next pairing.
pub struct Session {
    id: SessionId,
    model: DataModel,
    broker_sender: Sender<ToBrokerCmd>,
    receiver: Receiver<ToSessionCmd>,
    publish_receiver: Receiver<LeafPublish>,
    subscriber: Subscriber,
    stats: Arc<SessionStats>,

    client_id: String,
    clean_session: bool,
    connection: Option<ConnectionHandle>,
}

impl Session {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: SessionId,
        model: DataModel,
        broker_sender: Sender<ToBrokerCmd>,
        receiver: Receiver<ToSessionCmd>,
        publish_receiver: Receiver<LeafPublish>,
        subscriber: Subscriber,
        stats: Arc<SessionStats>,
    ) -> Self {
        Self {
            id,
            model,
            broker_sender,
            receiver,
            publish_receiver,
            subscriber,
            stats,
            client_id: String::new(),
            clean_session: true,
            connection: None,
        }
    }

    pub async fn run_loop(mut self) {
        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => self.handle_cmd(cmd).await,
                    None => return,
                },
                Some(publish) = self.publish_receiver.recv() => {
                    self.handle_leaf_publish(publish).await;
                }
            }
        }
    }

    async fn handle_cmd(&mut self, cmd: ToSessionCmd) {
        match cmd {
            ToSessionCmd::NewConnection {
                connection_id,
                connection_sender,
                writer,
                client_id,
                clean_session,
                fresh_session,
            } => {
                self.new_connection(
                    connection_id,
                    connection_sender,
                    writer,
                    client_id,
                    clean_session,
                    fresh_session,
                )
                .await;
            }
            ToSessionCmd::Packet(packet) => self.packet_received(&packet).await,
            ToSessionCmd::ConnectionLost(connection_id) => {
                self.connection_lost(connection_id).await;
            }
            ToSessionCmd::Shutdown => self.shutdown().await,
        }
    }

    async fn new_connection(
        &mut self,
        connection_id: ConnectionId,
        connection_sender: Sender<ToConnectionCmd>,
        writer: OwnedWriteHalf,
        client_id: String,
        clean_session: bool,
        fresh_session: bool,
    ) {
        // We may still hold a connection if the client noticed the old
        // TCP stream die before we did, or two clients share an id.
        // The old connection gets closed; the new one wins.
        if let Some(old) = self.connection.take() {
            let _ret = old.sender.send(ToConnectionCmd::Disconnect).await;
        }

        // Values that changed while we were unpaired are stale, not
        // undelivered; QoS 0 makes no redelivery promise.
        while let Ok(_stale) = self.publish_receiver.try_recv() {
            self.stats.publish_dropped.fetch_add(1, Ordering::Relaxed);
        }

        if fresh_session {
            log::debug!(
                "session #{}: for '{client_id}' paired with connection #{connection_id}",
                self.id
            );
        } else {
            log::debug!(
                "session #{}: for '{client_id}' repaired with connection #{connection_id}",
                self.id
            );
        }

        self.client_id = client_id;
        self.clean_session = clean_session;
        self.connection = Some(ConnectionHandle {
            id: connection_id,
            sender: connection_sender,
            writer,
        });

        // A reused non-clean session is the one case where the stored
        // state is the client's old state [MQTT-3.2.2-2].
        let session_present = !fresh_session;
        let ack = ConnectAckPacket::new(session_present, ConnectReturnCode::Accepted);
        self.send(&ack).await;
    }

    async fn packet_received(&mut self, packet: &[u8]) {
        self.stats.messages_received.fetch_add(1, Ordering::Relaxed);

        let mut ba = ByteArray::new(packet);
        let header = match FixedHeader::decode(&mut ba) {
            Ok(header) => header,
            Err(err) => {
                log::warn!(
                    "session #{}: unparseable packet from '{}': {err:?}. Terminating connection.",
                    self.id,
                    self.client_id
                );
                self.shutdown().await;
                return;
            }
        };

        match header.packet_type() {
            PacketType::Connect => {
                log::warn!(
                    "session #{}: second CONNECT from '{}'. Terminating connection.",
                    self.id,
                    self.client_id
                );
                self.shutdown().await;
            }
            PacketType::Subscribe => self.subscribe_received(packet).await,
            PacketType::Unsubscribe => self.unsubscribe_received(packet).await,
            PacketType::PingRequest => self.ping_request_received(packet).await,
            PacketType::Disconnect => {
                log::debug!(
                    "session #{}: stopping client '{}' due to DISCONNECT",
                    self.id,
                    self.client_id
                );
                self.shutdown().await;
            }
            packet_type if packet_type.is_server_to_client_only() => {
                log::error!(
                    "session #{}: received server to client only {packet_type:?} from '{}'. \
                     Terminating connection.",
                    self.id,
                    self.client_id
                );
                self.shutdown().await;
            }
            packet_type => {
                // PUBLISH and the QoS handshakes; this broker accepts no
                // client publishes at all.
                log::warn!(
                    "session #{}: unsupported {packet_type:?} from '{}'. Terminating connection.",
                    self.id,
                    self.client_id
                );
                self.shutdown().await;
            }
        }
    }

    async fn subscribe_received(&mut self, packet: &[u8]) {
        let mut ba = ByteArray::new(packet);
        let subscribe = match SubscribePacket::decode(&mut ba) {
            Ok(subscribe) => subscribe,
            Err(err) => {
                log::warn!(
                    "session #{}: bad SUBSCRIBE from '{}': {err:?}. Terminating connection.",
                    self.id,
                    self.client_id
                );
                self.shutdown().await;
                return;
            }
        };

        if subscribe.topics().len() > MAX_TOPICS_PER_SUBSCRIBE {
            log::warn!(
                "session #{}: SUBSCRIBE from '{}' has too many topic filters ({}). \
                 Terminating connection.",
                self.id,
                self.client_id,
                subscribe.topics().len()
            );
            self.shutdown().await;
            return;
        }

        let mut acks = Vec::with_capacity(subscribe.topics().len());
        for topic in subscribe.topics() {
            let cookie = topic.qos() as Cookie;
            match self
                .model
                .subscribe(topic.topic_filter(), &self.subscriber, cookie)
            {
                Ok(attached) => {
                    log::debug!(
                        "session #{}: '{}' subscribed to '{}' ({attached} leaves)",
                        self.id,
                        self.client_id,
                        topic.topic_filter()
                    );
                    // Granted maximum QoS is always 0; higher requests
                    // are downgraded silently.
                    acks.push(SubscribeAck::QoS(QoS::AtMostOnce));
                }
                Err(err) => {
                    log::warn!(
                        "session #{}: '{}' failed to subscribe to '{}': {err:?}",
                        self.id,
                        self.client_id,
                        topic.topic_filter()
                    );
                    acks.push(SubscribeAck::Failed);
                }
            }
        }

        let ack = SubscribeAckPacket::with_vec(subscribe.packet_id(), acks);
        self.send(&ack).await;
    }

    async fn unsubscribe_received(&mut self, packet: &[u8]) {
        let mut ba = ByteArray::new(packet);
        let unsubscribe = match UnsubscribePacket::decode(&mut ba) {
            Ok(unsubscribe) => unsubscribe,
            Err(err) => {
                log::warn!(
                    "session #{}: bad UNSUBSCRIBE from '{}': {err:?}. Terminating connection.",
                    self.id,
                    self.client_id
                );
                self.shutdown().await;
                return;
            }
        };

        for topic in unsubscribe.topics() {
            // Unsubscribing from an unknown filter is quietly acceptable.
            match self.model.unsubscribe(topic.as_ref(), self.id) {
                Ok(detached) => {
                    log::debug!(
                        "session #{}: '{}' unsubscribed from '{}' ({detached} leaves)",
                        self.id,
                        self.client_id,
                        topic
                    );
                }
                Err(err) => {
                    log::warn!(
                        "session #{}: '{}' sent malformed unsubscribe filter '{}': {err:?}",
                        self.id,
                        self.client_id,
                        topic
                    );
                }
            }
        }

        let ack = UnsubscribeAckPacket::new(unsubscribe.packet_id());
        self.send(&ack).await;
    }

    async fn ping_request_received(&mut self, packet: &[u8]) {
        let mut ba = ByteArray::new(packet);
        if let Err(err) = PingRequestPacket::decode(&mut ba) {
            log::warn!(
                "session #{}: bad PINGREQ from '{}': {err:?}. Terminating connection.",
                self.id,
                self.client_id
            );
            self.shutdown().await;
            return;
        }
        self.send(&PingResponsePacket::new()).await;
    }

    async fn handle_leaf_publish(&mut self, publish: LeafPublish) {
        if self.connection.is_none() {
            // Parked in the disconnected list; subscriptions stay
            // attached but values published meanwhile are not queued.
            self.stats.publish_dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let packet =
            match PublishPacket::new(&publish.topic, publish.retain, publish.payload.as_bytes()) {
                Ok(packet) => packet,
                Err(err) => {
                    log::error!(
                        "session #{}: failed to build publish for '{}': {err:?}",
                        self.id,
                        publish.topic
                    );
                    return;
                }
            };
        log::debug!(
            "session #{}: publishing '{}'='{}' retain {} to '{}'",
            self.id,
            publish.topic,
            publish.payload,
            publish.retain,
            self.client_id
        );
        if self.send(&packet).await {
            self.stats.publish_sent.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Write one packet to the paired connection's socket. Returns true
    /// if the packet went out.
    async fn send<P: EncodePacket>(&mut self, packet: &P) -> bool {
        let mut buf = Vec::new();
        if let Err(err) = packet.encode(&mut buf) {
            log::error!("session #{}: encode failed: {err:?}", self.id);
            return false;
        }

        let Some(connection) = &mut self.connection else {
            return false;
        };
        match connection.writer.write_all(&buf).await {
            Ok(()) => {
                self.stats.messages_sent.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(err) => {
                log::warn!(
                    "session #{}: failed to send to client '{}': {err}. Closing connection.",
                    self.id,
                    self.client_id
                );
                self.connection_send_failure().await;
                false
            }
        }
    }

    /// The socket died under a write before the connection task noticed.
    async fn connection_send_failure(&mut self) {
        if let Some(connection) = self.connection.take() {
            let _ret = connection.sender.send(ToConnectionCmd::Disconnect).await;
        }
        self.go_disconnected_or_free().await;
    }

    async fn connection_lost(&mut self, connection_id: ConnectionId) {
        // A lost signal can trail in from a connection we already
        // replaced; only the current pairing counts.
        match &self.connection {
            Some(connection) if connection.id == connection_id => {}
            _ => return,
        }
        self.connection = None;
        self.go_disconnected_or_free().await;
    }

    async fn go_disconnected_or_free(&mut self) {
        if self.clean_session {
            log::debug!(
                "session #{}: lost connection to '{}'. Going idle.",
                self.id,
                self.client_id
            );
            self.model.unsubscribe_all(self.id);
            self.client_id.clear();
            let _ret = self
                .broker_sender
                .send(ToBrokerCmd::SessionFree(self.id))
                .await;
        } else {
            log::debug!(
                "session #{}: lost connection to '{}'. Going into disconnected.",
                self.id,
                self.client_id
            );
            let _ret = self
                .broker_sender
                .send(ToBrokerCmd::SessionDisconnected(self.id))
                .await;
        }
    }

    /// Tear down completely and return to the free pool.
    async fn shutdown(&mut self) {
        log::info!(
            "session #{}: shutting down session for client id '{}'",
            self.id,
            self.client_id
        );

        self.model.unsubscribe_all(self.id);
        self.client_id.clear();
        self.clean_session = true;
        if let Some(connection) = self.connection.take() {
            let _ret = connection.sender.send(ToConnectionCmd::Disconnect).await;
        }
        let _ret = self
            .broker_sender
            .send(ToBrokerCmd::SessionFree(self.id))
            .await;
    }
}
