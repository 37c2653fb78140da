// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

//! One struct per recognized sentence, each consuming its fields from
//! the walker in documented order. The parser emits them through the
//! `NmeaMessage` union, whose size is the largest variant; the caller
//! consumes each message before the next line is parsed.

mod dbk;
mod dbs;
mod dbt;
mod dpt;
mod gga;
mod gll;
mod gsa;
mod gst;
mod gsv;
mod hdg;
mod mtw;
mod mwv;
mod rmc;
mod rsa;
mod txt;
mod vhw;
mod vtg;

pub use dbk::DbkMessage;
pub use dbs::DbsMessage;
pub use dbt::DbtMessage;
pub use dpt::DptMessage;
pub use gga::GgaMessage;
pub use gll::GllMessage;
pub use gsa::GsaMessage;
pub use gst::GstMessage;
pub use gsv::{GsvMessage, GsvSatelliteInfo};
pub use hdg::HdgMessage;
pub use mtw::MtwMessage;
pub use mwv::MwvMessage;
pub use rmc::RmcMessage;
pub use rsa::RsaMessage;
pub use txt::TxtMessage;
pub use vhw::VhwMessage;
pub use vtg::VtgMessage;

use crate::ais::AidToNavigationReport;

/// A parsed message ready for bridging into the data model.
#[derive(Debug, Clone, PartialEq)]
pub enum NmeaMessage {
    Dbk(DbkMessage),
    Dbs(DbsMessage),
    Dbt(DbtMessage),
    Dpt(DptMessage),
    Gga(GgaMessage),
    Gll(GllMessage),
    Gsa(GsaMessage),
    Gst(GstMessage),
    Gsv(GsvMessage),
    Hdg(HdgMessage),
    Mtw(MtwMessage),
    Mwv(MwvMessage),
    Rmc(RmcMessage),
    Rsa(RsaMessage),
    Txt(TxtMessage),
    Vhw(VhwMessage),
    Vtg(VtgMessage),
    AidToNavigation(AidToNavigationReport),
}
