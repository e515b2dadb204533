// SPDX-License-Identifier: MIT

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// `lldpRemSysCapEnabled`, a bitmap of IEEE 802.1AB system
    /// capabilities.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LldpCapabilities: u16 {
        const OTHER = 0b0000_0001;
        const REPEATER = 0b0000_0010;
        const BRIDGE = 0b0000_0100;
        const WLAN_ACCESS_POINT = 0b0000_1000;
        const ROUTER = 0b0001_0000;
        const TELEPHONE = 0b0010_0000;
        const DOCSIS_CABLE_DEVICE = 0b0100_0000;
        const STATION_ONLY = 0b1000_0000;
    }
}

/// LLDP remote-index triplet `<timestamp>.<local-port>.<remote-index>`
/// identifying one remote neighbor observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NeighborKey {
    pub time_mark: u32,
    pub local_port: u32,
    pub remote_index: u32,
}

impl NeighborKey {
    pub fn parse(suffix: &[u32]) -> Option<Self> {
        match suffix {
            [time_mark, local_port, remote_index] => Some(NeighborKey {
                time_mark: *time_mark,
                local_port: *local_port,
                remote_index: *remote_index,
            }),
            _ => None,
        }
    }
}

/// One observed LLDP neighbor, keyed by `NeighborKey` in
/// `DeviceModel::neighbors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborDevice {
    pub key: NeighborKey,
    pub port_descr: Option<String>,
    pub sys_name: Option<String>,
    pub sys_descr: Option<String>,
    pub capabilities: LldpCapabilities,
    pub chassis_type: Option<i64>,
    pub chassis_string: Option<String>,
}

impl NeighborDevice {
    pub fn new(key: NeighborKey) -> Self {
        NeighborDevice {
            key,
            port_descr: None,
            sys_name: None,
            sys_descr: None,
            capabilities: LldpCapabilities::empty(),
            chassis_type: None,
            chassis_string: None,
        }
    }
}
