// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VlanStatus {
    Static,
    Dynamic,
}

impl VlanStatus {
    /// `dot1qVlanStatus`: 1=other, 2=permanent(static), 3=dynamicGvrp.
    pub fn from_dot1q_vlan_status(v: i64) -> Self {
        match v {
            3 => VlanStatus::Dynamic,
            _ => VlanStatus::Static,
        }
    }
}

/// One VLAN, keyed by vid (1..=4094) in `DeviceModel::vlans`.
///
/// Bitmaps are opaque MSB-first, 1-based-bit byte strings over
/// `dot1dBasePort`; see `crate::bytes` for the encode/decode helpers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vlan {
    pub vid: u16,
    pub name: String,
    pub status: VlanStatus,
    pub current_egress_ports: Vec<u8>,
    pub static_egress_ports: Vec<u8>,
}

impl Vlan {
    pub fn new(vid: u16) -> Self {
        Vlan {
            vid,
            name: String::new(),
            status: VlanStatus::Static,
            current_egress_ports: Vec::new(),
            static_egress_ports: Vec::new(),
        }
    }
}
