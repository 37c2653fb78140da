// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use std::fmt;

/// Three character sentence code from a sentence tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsgType {
    Dbk,
    Dbs,
    Dbt,
    Dpt,
    Gga,
    Gll,
    Gsa,
    Gst,
    Gsv,
    Hdg,
    Mtw,
    Mwv,
    Rmc,
    Rsa,
    Txt,
    Vdm,
    Vdo,
    Vhw,
    Vtg,
    Unknown,
}

impl MsgType {
    #[must_use]
    pub fn parse(code: &str) -> Self {
        match code {
            "DBK" => Self::Dbk,
            "DBS" => Self::Dbs,
            "DBT" => Self::Dbt,
            "DPT" => Self::Dpt,
            "GGA" => Self::Gga,
            "GLL" => Self::Gll,
            "GSA" => Self::Gsa,
            "GST" => Self::Gst,
            "GSV" => Self::Gsv,
            "HDG" => Self::Hdg,
            "MTW" => Self::Mtw,
            "MWV" => Self::Mwv,
            "RMC" => Self::Rmc,
            "RSA" => Self::Rsa,
            "TXT" => Self::Txt,
            "VDM" => Self::Vdm,
            "VDO" => Self::Vdo,
            "VHW" => Self::Vhw,
            "VTG" => Self::Vtg,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Dbk => "DBK",
            Self::Dbs => "DBS",
            Self::Dbt => "DBT",
            Self::Dpt => "DPT",
            Self::Gga => "GGA",
            Self::Gll => "GLL",
            Self::Gsa => "GSA",
            Self::Gst => "GST",
            Self::Gsv => "GSV",
            Self::Hdg => "HDG",
            Self::Mtw => "MTW",
            Self::Mwv => "MWV",
            Self::Rmc => "RMC",
            Self::Rsa => "RSA",
            Self::Txt => "TXT",
            Self::Vdm => "VDM",
            Self::Vdo => "VDO",
            Self::Vhw => "VHW",
            Self::Vtg => "VTG",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
