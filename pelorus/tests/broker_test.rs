// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

//! Broker tests over real sockets: CONNECT handling, retained delivery
//! on subscribe, non-clean session reconnects and pool exhaustion.

use codec::{
    ByteArray, ConnectAckPacket, ConnectReturnCode, DecodePacket, EncodePacket, PublishPacket,
};
use pelorus::broker::Broker;
use pelorus::config::Mqtt;
use pelorus::datamodel::{DataModel, Leaf, ROOT_NODE};
use pelorus::fixedpoint::TenthsU16;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

struct TestBroker {
    address: SocketAddr,
    model: DataModel,
}

async fn start_broker(max_clients: usize) -> TestBroker {
    let _ret = env_logger::builder().is_test(true).try_init();

    let config_text = format!("address = \"127.0.0.1:0\"\nmax_clients = {max_clients}");
    let mqtt_config: Mqtt = toml::from_str(&config_text).unwrap();

    let model = DataModel::new(max_clients);
    let broker = Broker::bind(&mqtt_config, Duration::from_secs(3600), &model)
        .await
        .unwrap();
    let address = broker.local_addr().unwrap();
    tokio::spawn(broker.run_loop());
    TestBroker { address, model }
}

fn connect_packet(client_id: &str, clean_session: bool) -> Vec<u8> {
    let mut body = vec![
        0x00, 0x04, b'M', b'Q', b'T', b'T', // protocol name
        0x04, // protocol level
        if clean_session { 0x02 } else { 0x00 },
        0x00, 0x3c, // keep alive 60
    ];
    #[allow(clippy::cast_possible_truncation)]
    body.extend((client_id.len() as u16).to_be_bytes());
    body.extend(client_id.bytes());

    #[allow(clippy::cast_possible_truncation)]
    let mut packet = vec![0x10, body.len() as u8];
    packet.extend(body);
    packet
}

fn subscribe_packet(packet_id: u16, filter: &str) -> Vec<u8> {
    let mut body = packet_id.to_be_bytes().to_vec();
    #[allow(clippy::cast_possible_truncation)]
    body.extend((filter.len() as u16).to_be_bytes());
    body.extend(filter.bytes());
    body.push(0x00); // requested QoS

    #[allow(clippy::cast_possible_truncation)]
    let mut packet = vec![0x82, body.len() as u8];
    packet.extend(body);
    packet
}

/// Client-side packet framing: type byte, 1..4 length bytes, body.
async fn read_packet(stream: &mut TcpStream) -> Vec<u8> {
    let mut packet = vec![0u8; 2];
    stream.read_exact(&mut packet).await.unwrap();
    while packet.last().unwrap() & 0x80 != 0 {
        let mut byte = [0u8; 1];
        stream.read_exact(&mut byte).await.unwrap();
        packet.push(byte[0]);
    }
    let mut remaining = 0usize;
    let mut multiplier = 1usize;
    for &byte in &packet[1..] {
        remaining += (byte as usize & 0x7f) * multiplier;
        multiplier *= 128;
    }
    let body_start = packet.len();
    packet.resize(body_start + remaining, 0);
    stream.read_exact(&mut packet[body_start..]).await.unwrap();
    packet
}

async fn connect_client(
    address: SocketAddr,
    client_id: &str,
    clean_session: bool,
) -> (TcpStream, ConnectAckPacket) {
    let mut stream = TcpStream::connect(address).await.unwrap();
    stream
        .write_all(&connect_packet(client_id, clean_session))
        .await
        .unwrap();
    let packet = read_packet(&mut stream).await;
    let mut ba = ByteArray::new(&packet);
    let ack = ConnectAckPacket::decode(&mut ba).unwrap();
    (stream, ack)
}

#[tokio::test]
async fn test_connect_subscribe_retained() {
    let broker = start_broker(5).await;

    // Preload a retained value before any client appears.
    let depth = broker.model.add_node(ROOT_NODE, "depth").unwrap();
    let below_keel = broker.model.add_node(depth, "belowKeel").unwrap();
    let meters: Leaf<TenthsU16> = broker.model.add_leaf(below_keel, "meters").unwrap();
    meters.set(TenthsU16::new(12, 3));

    let (mut stream, ack) = connect_client(broker.address, "c1", true).await;
    assert_eq!(ack.return_code(), ConnectReturnCode::Accepted);
    assert!(!ack.session_present());

    stream.write_all(&subscribe_packet(1, "depth/#")).await.unwrap();

    let suback = read_packet(&mut stream).await;
    assert_eq!(suback, vec![0x90, 0x03, 0x00, 0x01, 0x00]);

    let publish_bytes = read_packet(&mut stream).await;
    let mut ba = ByteArray::new(&publish_bytes);
    let publish = PublishPacket::decode(&mut ba).unwrap();
    assert_eq!(publish.topic(), "depth/belowKeel/meters");
    assert_eq!(publish.payload(), b"12.3");
    assert!(publish.retain());

    // A live update follows with the retain flag clear.
    meters.set(TenthsU16::new(11, 8));
    let publish_bytes = read_packet(&mut stream).await;
    let mut ba = ByteArray::new(&publish_bytes);
    let publish = PublishPacket::decode(&mut ba).unwrap();
    assert_eq!(publish.payload(), b"11.8");
    assert!(!publish.retain());
}

#[tokio::test]
async fn test_non_clean_session_survives_reconnect() {
    let broker = start_broker(5).await;
    let wind = broker.model.add_node(ROOT_NODE, "wind").unwrap();
    let angle: Leaf<u16> = broker.model.add_leaf(wind, "angle").unwrap();

    let (mut stream, ack) = connect_client(broker.address, "c2", false).await;
    assert!(!ack.session_present());
    stream.write_all(&subscribe_packet(1, "wind/+")).await.unwrap();
    let suback = read_packet(&mut stream).await;
    assert_eq!(suback, vec![0x90, 0x03, 0x00, 0x01, 0x00]);

    // The TCP stream drops without a DISCONNECT.
    drop(stream);
    tokio::time::sleep(Duration::from_millis(100)).await;

    let (mut stream, ack) = connect_client(broker.address, "c2", false).await;
    assert_eq!(ack.return_code(), ConnectReturnCode::Accepted);
    assert!(ack.session_present());

    // Subscriptions stayed attached: a leaf write reaches the new
    // connection without any new SUBSCRIBE.
    angle.set(90);
    let publish_bytes = read_packet(&mut stream).await;
    let mut ba = ByteArray::new(&publish_bytes);
    let publish = PublishPacket::decode(&mut ba).unwrap();
    assert_eq!(publish.topic(), "wind/angle");
    assert_eq!(publish.payload(), b"90");
    assert!(!publish.retain());
}

#[tokio::test]
async fn test_clean_session_discards_subscriptions() {
    let broker = start_broker(5).await;
    let wind = broker.model.add_node(ROOT_NODE, "wind").unwrap();
    let angle: Leaf<u16> = broker.model.add_leaf(wind, "angle").unwrap();

    let (mut stream, _ack) = connect_client(broker.address, "c3", true).await;
    stream.write_all(&subscribe_packet(1, "wind/+")).await.unwrap();
    let _suback = read_packet(&mut stream).await;
    drop(stream);
    tokio::time::sleep(Duration::from_millis(100)).await;

    let (mut stream, ack) = connect_client(broker.address, "c3", true).await;
    assert!(!ack.session_present());

    angle.set(45);
    // Nothing arrives; the read times out rather than yielding a
    // publish from the discarded subscription.
    let read_result =
        tokio::time::timeout(Duration::from_millis(200), read_packet(&mut stream)).await;
    assert!(read_result.is_err());
}

#[tokio::test]
async fn test_connect_refusals() {
    let broker = start_broker(5).await;

    // Username present.
    let mut stream = TcpStream::connect(broker.address).await.unwrap();
    let packet = [
        0x10, 0x14, // CONNECT
        0x00, 0x04, b'M', b'Q', b'T', b'T', 0x04,
        0x82, // username + clean session
        0x00, 0x3c, 0x00, 0x02, b'c', b'4', 0x00, 0x04, b'u', b's', b'e', b'r',
    ];
    stream.write_all(&packet).await.unwrap();
    let ack = read_packet(&mut stream).await;
    assert_eq!(ack, vec![0x20, 0x02, 0x00, 0x04]);

    // Will flag set.
    let mut stream = TcpStream::connect(broker.address).await.unwrap();
    let packet = [
        0x10, 0x18,
        0x00, 0x04, b'M', b'Q', b'T', b'T', 0x04,
        0x06, // will + clean session
        0x00, 0x3c, 0x00, 0x02, b'c', b'5',
        0x00, 0x03, b'w', b'/', b't', // will topic
        0x00, 0x03, b'b', b'y', b'e', // will message
    ];
    stream.write_all(&packet).await.unwrap();
    let ack = read_packet(&mut stream).await;
    assert_eq!(ack, vec![0x20, 0x02, 0x00, 0x03]);

    // Wrong protocol level.
    let mut stream = TcpStream::connect(broker.address).await.unwrap();
    let packet = [
        0x10, 0x0e,
        0x00, 0x04, b'M', b'Q', b'T', b'T', 0x03, 0x02, 0x00, 0x3c, 0x00, 0x02, b'c', b'6',
    ];
    stream.write_all(&packet).await.unwrap();
    let ack = read_packet(&mut stream).await;
    assert_eq!(ack, vec![0x20, 0x02, 0x00, 0x01]);

    // Zero length client id without clean session.
    let mut stream = TcpStream::connect(broker.address).await.unwrap();
    let packet = [
        0x10, 0x0c,
        0x00, 0x04, b'M', b'Q', b'T', b'T', 0x04, 0x00, 0x00, 0x3c, 0x00, 0x00,
    ];
    stream.write_all(&packet).await.unwrap();
    let ack = read_packet(&mut stream).await;
    assert_eq!(ack, vec![0x20, 0x02, 0x00, 0x02]);
}

#[tokio::test]
async fn test_ping_and_disconnect() {
    let broker = start_broker(5).await;
    let (mut stream, _ack) = connect_client(broker.address, "c7", true).await;

    stream.write_all(&[0xc0, 0x00]).await.unwrap();
    let response = read_packet(&mut stream).await;
    assert_eq!(response, vec![0xd0, 0x00]);

    stream.write_all(&[0xe0, 0x00]).await.unwrap();
    // The broker closes the socket; the next read sees EOF.
    let mut byte = [0u8; 1];
    let read = stream.read(&mut byte).await.unwrap();
    assert_eq!(read, 0);
}

#[tokio::test]
async fn test_client_publish_closes_connection() {
    let broker = start_broker(5).await;
    let (mut stream, _ack) = connect_client(broker.address, "c8", true).await;

    // A QoS 0 PUBLISH; this broker accepts none from clients.
    let publish = PublishPacket::new("depth/belowKeel/meters", false, b"1.0").unwrap();
    let mut buf = Vec::new();
    publish.encode(&mut buf).unwrap();
    stream.write_all(&buf).await.unwrap();

    let mut byte = [0u8; 1];
    let read = stream.read(&mut byte).await.unwrap();
    assert_eq!(read, 0);
}

#[tokio::test]
async fn test_pool_exhaustion_drops_accept() {
    let broker = start_broker(1).await;

    let (_held, ack) = connect_client(broker.address, "c9", true).await;
    assert_eq!(ack.return_code(), ConnectReturnCode::Accepted);

    // The only connection slot is taken; the next accept is dropped on
    // the floor before any MQTT exchange.
    let mut refused = TcpStream::connect(broker.address).await.unwrap();
    refused
        .write_all(&connect_packet("c10", true))
        .await
        .ok();
    let mut byte = [0u8; 1];
    let read = tokio::time::timeout(Duration::from_secs(2), refused.read(&mut byte))
        .await
        .expect("broker should close the surplus connection");
    assert!(matches!(read, Ok(0) | Err(_)));
}

#[tokio::test]
async fn test_unsubscribe_unknown_filter_is_silent() {
    let broker = start_broker(5).await;
    let (mut stream, _ack) = connect_client(broker.address, "c11", true).await;

    // UNSUBSCRIBE for a filter that was never subscribed.
    let filter = b"never/subscribed";
    let mut body = vec![0x00, 0x07];
    #[allow(clippy::cast_possible_truncation)]
    body.extend((filter.len() as u16).to_be_bytes());
    body.extend_from_slice(filter);
    #[allow(clippy::cast_possible_truncation)]
    let mut packet = vec![0xa2, body.len() as u8];
    packet.extend(body);
    stream.write_all(&packet).await.unwrap();

    let unsuback = read_packet(&mut stream).await;
    assert_eq!(unsuback, vec![0xb0, 0x02, 0x00, 0x07]);
}
