// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use std::fmt::Write;

use super::{publish_or_remove, publish_str_or_remove};
use crate::datamodel::{DataModel, Leaf, StringLeaf, ROOT_NODE};
use crate::error::Error;
use crate::fixedpoint::{HundredthsU16, HundredthsU8, TenthsI16, TenthsU16};
use crate::nmea::message::{GgaMessage, GllMessage, GsaMessage, GstMessage, RmcMessage,
                           VtgMessage};

const TIME_LENGTH: usize = 15;
const DATE_LENGTH: usize = 10;
const COORDINATE_LENGTH: usize = 20;
const ACTIVE_SATELLITES_LENGTH: usize = 72;

/// Leaves under `gps/`, fed by GGA, GLL, GSA, GST, RMC and VTG.
pub struct GpsBridge {
    time: StringLeaf,
    date: StringLeaf,
    data_valid: Leaf<bool>,
    latitude: StringLeaf,
    longitude: StringLeaf,
    altitude: Leaf<TenthsI16>,
    speed_over_ground: Leaf<TenthsU16>,
    speed_over_ground_kmh: Leaf<TenthsU16>,
    track_made_good_true: Leaf<TenthsU16>,
    track_made_good_magnetic: Leaf<TenthsU16>,
    magnetic_variation: Leaf<TenthsI16>,
    faa_mode_indicator: StringLeaf,
    gps_quality: StringLeaf,
    number_satellites: Leaf<u16>,
    horizontal_dilution_of_precision: Leaf<HundredthsU16>,
    geoidal_separation: Leaf<TenthsI16>,
    data_age: Leaf<TenthsU16>,
    differential_reference_station: Leaf<u16>,
    satellite_selection_mode: StringLeaf,
    fix_mode: StringLeaf,
    active_satellites: StringLeaf,
    pdop: Leaf<HundredthsU8>,
    hdop: Leaf<HundredthsU8>,
    vdop: Leaf<HundredthsU8>,
    std_dev_of_range_inputs_rms: Leaf<TenthsU16>,
    std_dev_of_semi_major_axis: Leaf<TenthsU16>,
    std_dev_of_semi_minor_axis: Leaf<TenthsU16>,
    orientation_of_semi_major_axis: Leaf<TenthsU16>,
    std_dev_of_latitude_error: Leaf<TenthsU16>,
    std_dev_of_longitude_error: Leaf<TenthsU16>,
    std_dev_of_altitude_error: Leaf<TenthsU16>,
}

impl GpsBridge {
    pub fn new(model: &DataModel) -> Result<Self, Error> {
        let gps = model.add_node(ROOT_NODE, "gps")?;
        Ok(Self {
            time: model.add_string_leaf(gps, "time", TIME_LENGTH)?,
            date: model.add_string_leaf(gps, "date", DATE_LENGTH)?,
            data_valid: model.add_leaf(gps, "dataValid")?,
            latitude: model.add_string_leaf(gps, "latitude", COORDINATE_LENGTH)?,
            longitude: model.add_string_leaf(gps, "longitude", COORDINATE_LENGTH)?,
            altitude: model.add_leaf(gps, "altitude")?,
            speed_over_ground: model.add_leaf(gps, "speedOverGround")?,
            speed_over_ground_kmh: model.add_leaf(gps, "speedOverGroundKmPerH")?,
            track_made_good_true: model.add_leaf(gps, "trackMadeGoodTrue")?,
            track_made_good_magnetic: model.add_leaf(gps, "trackMadeGoodMagnetic")?,
            magnetic_variation: model.add_leaf(gps, "magneticVariation")?,
            faa_mode_indicator: model.add_string_leaf(gps, "faaModeIndicator", 15)?,
            gps_quality: model.add_string_leaf(gps, "gpsQuality", 20)?,
            number_satellites: model.add_leaf(gps, "numberSatellites")?,
            horizontal_dilution_of_precision: model
                .add_leaf(gps, "horizontalDilutionOfPrecision")?,
            geoidal_separation: model.add_leaf(gps, "geoidalSeparation")?,
            data_age: model.add_leaf(gps, "dataAge")?,
            differential_reference_station: model
                .add_leaf(gps, "differentialReferenceStation")?,
            satellite_selection_mode: model.add_string_leaf(gps, "satelliteSelectionMode", 9)?,
            fix_mode: model.add_string_leaf(gps, "fixMode", 4)?,
            active_satellites: model.add_string_leaf(
                gps,
                "activeSatellites",
                ACTIVE_SATELLITES_LENGTH,
            )?,
            pdop: model.add_leaf(gps, "pdop")?,
            hdop: model.add_leaf(gps, "hdop")?,
            vdop: model.add_leaf(gps, "vdop")?,
            std_dev_of_range_inputs_rms: model
                .add_leaf(gps, "standardDeviationOfRangeInputsRMS")?,
            std_dev_of_semi_major_axis: model
                .add_leaf(gps, "standardDeviationOfSemiMajorAxis")?,
            std_dev_of_semi_minor_axis: model
                .add_leaf(gps, "standardDeviationOfSemiMinorAxis")?,
            orientation_of_semi_major_axis: model
                .add_leaf(gps, "orientationOfSemiMajorAxis")?,
            std_dev_of_latitude_error: model.add_leaf(gps, "standardDeviationOfLatitudeError")?,
            std_dev_of_longitude_error: model
                .add_leaf(gps, "standardDeviationOfLongitudeError")?,
            std_dev_of_altitude_error: model.add_leaf(gps, "standardDeviationOfAltitudeError")?,
        })
    }

    pub fn bridge_gga(&self, message: &GgaMessage) {
        self.time.set(message.time.to_wire());
        self.latitude.set(message.latitude.to_wire());
        self.longitude.set(message.longitude.to_wire());
        self.gps_quality.set(message.gps_quality.as_str().to_string());
        self.number_satellites.set(message.number_satellites);
        self.horizontal_dilution_of_precision
            .set(message.horizontal_dilution_of_precision);
        self.altitude.set(message.antenna_altitude);
        self.geoidal_separation.set(message.geoidal_separation);
        publish_or_remove(&self.data_age, message.gps_data_age);
        publish_or_remove(
            &self.differential_reference_station,
            message.differential_reference_station,
        );
    }

    pub fn bridge_gll(&self, message: &GllMessage) {
        self.latitude.set(message.latitude.to_wire());
        self.longitude.set(message.longitude.to_wire());
        self.time.set(message.time.to_wire());
        self.data_valid.set(message.data_valid);
        publish_str_or_remove(
            &self.faa_mode_indicator,
            message.faa_mode.map(|mode| mode.as_str()),
        );
    }

    pub fn bridge_gsa(&self, message: &GsaMessage) {
        let mode = if message.automatic_mode {
            "Automatic"
        } else {
            "Manual"
        };
        self.satellite_selection_mode.set(mode.to_string());
        self.fix_mode.set(message.fix_mode.as_str().to_string());

        let mut active = String::with_capacity(ACTIVE_SATELLITES_LENGTH);
        for id in message.satellite_ids.iter().flatten() {
            if !active.is_empty() {
                active.push(',');
            }
            let _ret = write!(active, "{id}");
        }
        self.active_satellites.set(active);

        self.pdop.set(message.pdop);
        self.hdop.set(message.hdop);
        self.vdop.set(message.vdop);
    }

    pub fn bridge_gst(&self, message: &GstMessage) {
        self.std_dev_of_range_inputs_rms
            .set(message.std_dev_of_range_inputs_rms);
        self.std_dev_of_semi_major_axis
            .set(message.std_dev_of_semi_major_axis);
        self.std_dev_of_semi_minor_axis
            .set(message.std_dev_of_semi_minor_axis);
        self.orientation_of_semi_major_axis
            .set(message.orientation_of_semi_major_axis);
        self.std_dev_of_latitude_error
            .set(message.std_dev_of_latitude_error);
        self.std_dev_of_longitude_error
            .set(message.std_dev_of_longitude_error);
        self.std_dev_of_altitude_error
            .set(message.std_dev_of_altitude_error);
    }

    pub fn bridge_rmc(&self, message: &RmcMessage) {
        self.time.set(message.time.to_wire());
        self.data_valid.set(message.data_valid);
        self.latitude.set(message.latitude.to_wire());
        self.longitude.set(message.longitude.to_wire());
        self.speed_over_ground.set(message.speed_over_ground);
        self.track_made_good_true.set(message.track_made_good);
        self.date.set(message.date.to_wire());
        publish_or_remove(&self.magnetic_variation, message.magnetic_variation);
        publish_str_or_remove(
            &self.faa_mode_indicator,
            message.faa_mode.map(|mode| mode.as_str()),
        );
    }

    pub fn bridge_vtg(&self, message: &VtgMessage) {
        publish_or_remove(&self.track_made_good_true, message.track_made_good_true);
        publish_or_remove(
            &self.track_made_good_magnetic,
            message.track_made_good_magnetic,
        );
        publish_or_remove(&self.speed_over_ground, message.speed_over_ground);
        publish_or_remove(&self.speed_over_ground_kmh, message.speed_over_ground_kmh);
        publish_str_or_remove(
            &self.faa_mode_indicator,
            message.faa_mode.map(|mode| mode.as_str()),
        );
    }
}
