// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoeAdminStatus {
    Enabled,
    Disabled,
}

impl PoeAdminStatus {
    /// `pethPsePortAdminEnable`: 1=true(enabled), 2=false(disabled).
    pub fn from_peth_admin_enable(v: i64) -> Option<Self> {
        match v {
            1 => Some(PoeAdminStatus::Enabled),
            2 => Some(PoeAdminStatus::Disabled),
            _ => None,
        }
    }

    pub fn to_peth_admin_enable(self) -> i64 {
        match self {
            PoeAdminStatus::Enabled => 1,
            PoeAdminStatus::Disabled => 2,
        }
    }
}

/// `pethPsePortDetectionStatus` (RFC 3621).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoeDetectStatus {
    Disabled,
    Searching,
    DeliveringPower,
    Fault,
    Test,
    OtherFault,
}

impl PoeDetectStatus {
    pub fn from_peth_detection_status(v: i64) -> Option<Self> {
        match v {
            1 => Some(PoeDetectStatus::Disabled),
            2 => Some(PoeDetectStatus::Searching),
            3 => Some(PoeDetectStatus::DeliveringPower),
            4 => Some(PoeDetectStatus::Fault),
            5 => Some(PoeDetectStatus::Test),
            6 => Some(PoeDetectStatus::OtherFault),
            _ => None,
        }
    }

    pub fn status_name(self) -> &'static str {
        match self {
            PoeDetectStatus::Disabled => "disabled",
            PoeDetectStatus::Searching => "searching",
            PoeDetectStatus::DeliveringPower => "deliveringPower",
            PoeDetectStatus::Fault => "fault",
            PoeDetectStatus::Test => "test",
            PoeDetectStatus::OtherFault => "otherFault",
        }
    }
}

/// PoE Power Sourcing Equipment unit, keyed by PSE id in
/// `System::poe_pse_devices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoePSE {
    pub pse_id: u32,
    pub max_power: Option<u32>,
    pub status: Option<i64>,
    pub power_consumed: Option<u32>,
    pub threshold: Option<u32>,
}

impl PoePSE {
    pub fn new(pse_id: u32) -> Self {
        PoePSE {
            pse_id,
            max_power: None,
            status: None,
            power_consumed: None,
            threshold: None,
        }
    }
}

/// PoE port, keyed by `pethPsePortEntry` index `<group>.<port>` in
/// `DeviceModel::poe_ports`. The group/port tuple is what the index
/// reconciler (§4.5) matches against an interface's trailing
/// `<group>/<port>` name segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoePort {
    pub group: u32,
    pub port: u32,
    pub admin_status: Option<PoeAdminStatus>,
    pub detect_status: Option<PoeDetectStatus>,
}

impl PoePort {
    /// `index` has the wire form `<group>.<port>`, e.g. "1.24".
    pub fn index_key(&self) -> String {
        format!("{}.{}", self.group, self.port)
    }

    /// The suffix this PoE port entry is matched against, e.g. "1/24".
    pub fn interface_suffix(&self) -> String {
        format!("{}/{}", self.group, self.port)
    }

    pub fn parse_index(index: &str) -> Option<(u32, u32)> {
        let mut parts = index.split('.');
        let group = parts.next()?.parse().ok()?;
        let port = parts.next()?.parse().ok()?;
        Some((group, port))
    }
}
