// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use std::fmt;

/// AIS message types from the first six bits of a reassembled message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AisMsgType {
    PositionReportClassA,
    PositionReportClassAAssignedSchedule,
    PositionReportClassAResponseToInterrogation,
    BaseStationReport,
    StaticAndVoyageRelatedData,
    BinaryAddressedMessage,
    BinaryAcknowledge,
    BinaryBroadcastMessage,
    StandardSarAircraftPositionReport,
    UtcAndDateInquiry,
    UtcAndDateResponse,
    AddressedSafetyRelatedMessage,
    SafetyRelatedAcknowledgement,
    SafetyRelatedBroadcastMessage,
    Interrogation,
    AssignmentModeCommand,
    DgnssBinaryBroadcastMessage,
    StandardClassBCsPositionReport,
    ExtendedClassBEquipmentPositionReport,
    DataLinkManagement,
    AidToNavigationReport,
    ChannelManagement,
    GroupAssignmentCommand,
    StaticDataReport,
    SingleSlotBinaryMessage,
    MultipleSlotBinaryMessage,
    PositionReportForLongRangeApplications,
    Unknown(u8),
}

impl From<u8> for AisMsgType {
    fn from(code: u8) -> Self {
        match code {
            1 => Self::PositionReportClassA,
            2 => Self::PositionReportClassAAssignedSchedule,
            3 => Self::PositionReportClassAResponseToInterrogation,
            4 => Self::BaseStationReport,
            5 => Self::StaticAndVoyageRelatedData,
            6 => Self::BinaryAddressedMessage,
            7 => Self::BinaryAcknowledge,
            8 => Self::BinaryBroadcastMessage,
            9 => Self::StandardSarAircraftPositionReport,
            10 => Self::UtcAndDateInquiry,
            11 => Self::UtcAndDateResponse,
            12 => Self::AddressedSafetyRelatedMessage,
            13 => Self::SafetyRelatedAcknowledgement,
            14 => Self::SafetyRelatedBroadcastMessage,
            15 => Self::Interrogation,
            16 => Self::AssignmentModeCommand,
            17 => Self::DgnssBinaryBroadcastMessage,
            18 => Self::StandardClassBCsPositionReport,
            19 => Self::ExtendedClassBEquipmentPositionReport,
            20 => Self::DataLinkManagement,
            21 => Self::AidToNavigationReport,
            22 => Self::ChannelManagement,
            23 => Self::GroupAssignmentCommand,
            24 => Self::StaticDataReport,
            25 => Self::SingleSlotBinaryMessage,
            26 => Self::MultipleSlotBinaryMessage,
            27 => Self::PositionReportForLongRangeApplications,
            code => Self::Unknown(code),
        }
    }
}

impl fmt::Display for AisMsgType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::PositionReportClassA => "Position Report Class A",
            Self::PositionReportClassAAssignedSchedule => {
                "Position Report Class A (Assigned Schedule)"
            }
            Self::PositionReportClassAResponseToInterrogation => {
                "Position Report Class A (Response to Interrogation)"
            }
            Self::BaseStationReport => "Base Station Report",
            Self::StaticAndVoyageRelatedData => "Static and Voyage Related Data",
            Self::BinaryAddressedMessage => "Binary Addressed Message",
            Self::BinaryAcknowledge => "Binary Acknowledge",
            Self::BinaryBroadcastMessage => "Binary Broadcast Message",
            Self::StandardSarAircraftPositionReport => "Standard SAR Aircraft Position Report",
            Self::UtcAndDateInquiry => "UTC and Date Inquiry",
            Self::UtcAndDateResponse => "UTC and Date Response",
            Self::AddressedSafetyRelatedMessage => "Addressed Safety Related Message",
            Self::SafetyRelatedAcknowledgement => "Safety Related Acknowledgement",
            Self::SafetyRelatedBroadcastMessage => "Safety Related Broadcast Message",
            Self::Interrogation => "Interrogation",
            Self::AssignmentModeCommand => "Assignment Mode Command",
            Self::DgnssBinaryBroadcastMessage => "DGNSS Binary Broadcast Message",
            Self::StandardClassBCsPositionReport => "Standard Class B CS Position Report",
            Self::ExtendedClassBEquipmentPositionReport => {
                "Extended Class B Equipment Position Report"
            }
            Self::DataLinkManagement => "Data Link Management",
            Self::AidToNavigationReport => "Aid-to-Navigation Report",
            Self::ChannelManagement => "Channel Management",
            Self::GroupAssignmentCommand => "Group Assignment Command",
            Self::StaticDataReport => "Static Data Report",
            Self::SingleSlotBinaryMessage => "Single Slot Binary Message",
            Self::MultipleSlotBinaryMessage => "Multiple Slot Binary Message",
            Self::PositionReportForLongRangeApplications => {
                "Position Report for Long Range Applications"
            }
            Self::Unknown(code) => return write!(f, "Unknown ({code})"),
        };
        write!(f, "{name}")
    }
}
