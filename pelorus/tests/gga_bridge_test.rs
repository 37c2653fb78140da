// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

//! End to end: a GGA line through the parser and GPS bridge lands as
//! retained leaf values with the documented textual forms.

use pelorus::bridge::NmeaBridge;
use pelorus::datamodel::{DataModel, LeafPublish, Subscriber};
use pelorus::nmea::NmeaParser;
use std::sync::atomic::AtomicU32;
use std::sync::Arc;
use tokio::sync::mpsc;

const GGA_LINE: &[u8] =
    b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";

fn retained_value(model: &DataModel, topic: &str) -> Option<String> {
    let (sender, mut receiver) = mpsc::channel::<LeafPublish>(4);
    let subscriber = Subscriber::new(0, sender, Arc::new(AtomicU32::new(0)));
    model.subscribe(topic, &subscriber, 0).unwrap();
    let publish = receiver.try_recv().ok()?;
    assert!(publish.retain);
    model.unsubscribe_all(0);
    Some(publish.payload)
}

#[test]
fn test_gga_parse_and_publish() {
    let model = DataModel::new(4);
    let bridge = NmeaBridge::new(&model).unwrap();
    let mut parser = NmeaParser::new();

    let message = parser.parse_line(GGA_LINE).expect("GGA line should parse");
    bridge.dispatch(&message);

    assert_eq!(
        retained_value(&model, "gps/time").as_deref(),
        Some("12:35:19")
    );
    assert_eq!(
        retained_value(&model, "gps/latitude").as_deref(),
        Some("48\u{00b0}7.03800'N")
    );
    assert_eq!(
        retained_value(&model, "gps/longitude").as_deref(),
        Some("11\u{00b0}31.00000'E")
    );
    assert_eq!(
        retained_value(&model, "gps/numberSatellites").as_deref(),
        Some("8")
    );
    assert_eq!(
        retained_value(&model, "gps/altitude").as_deref(),
        Some("545.4")
    );
    assert_eq!(
        retained_value(&model, "gps/horizontalDilutionOfPrecision").as_deref(),
        Some("0.90")
    );
    assert_eq!(
        retained_value(&model, "gps/gpsQuality").as_deref(),
        Some("GPS")
    );
    // Optional fields were empty, so their leaves never got a value.
    assert_eq!(retained_value(&model, "gps/dataAge"), None);
}

#[test]
fn test_gga_bad_checksum_writes_nothing() {
    let model = DataModel::new(4);
    let _bridge = NmeaBridge::new(&model).unwrap();
    let mut parser = NmeaParser::new();

    let mut line = GGA_LINE.to_vec();
    let last = line.len() - 1;
    line[last] = b'8';

    assert!(parser.parse_line(&line).is_none());
    assert_eq!(parser.counters.bad_checksum, 1);

    assert_eq!(retained_value(&model, "gps/time"), None);
    assert_eq!(retained_value(&model, "gps/latitude"), None);
}
