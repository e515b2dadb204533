// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::address::{EthernetAddress, Ip4Address};
use super::neighbor::NeighborKey;
use super::poe::PoePort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminStatus {
    Up,
    Down,
    Testing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperStatus {
    Up,
    Down,
    Testing,
    Unknown,
    Dormant,
    NotPresent,
    LowerLayerDown,
}

impl AdminStatus {
    pub fn from_ifadminstatus(v: i64) -> Option<Self> {
        match v {
            1 => Some(AdminStatus::Up),
            2 => Some(AdminStatus::Down),
            3 => Some(AdminStatus::Testing),
            _ => None,
        }
    }

    pub fn to_ifadminstatus(self) -> i64 {
        match self {
            AdminStatus::Up => 1,
            AdminStatus::Down => 2,
            AdminStatus::Testing => 3,
        }
    }
}

impl OperStatus {
    pub fn from_ifoperstatus(v: i64) -> Option<Self> {
        match v {
            1 => Some(OperStatus::Up),
            2 => Some(OperStatus::Down),
            3 => Some(OperStatus::Testing),
            4 => Some(OperStatus::Unknown),
            5 => Some(OperStatus::Dormant),
            6 => Some(OperStatus::NotPresent),
            7 => Some(OperStatus::LowerLayerDown),
            _ => None,
        }
    }
}

/// `ifType` values this DAL cares about (RFC 2863 `IANAifType`); anything
/// unrecognized is kept as `Other(raw)` rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IfType {
    EthernetCsmacd,
    Ieee8023adLag,
    L2vlan,
    SoftwareLoopback,
    Tunnel,
    Other(i64),
}

impl IfType {
    pub fn from_iftype(v: i64) -> Self {
        match v {
            6 => IfType::EthernetCsmacd,
            161 => IfType::Ieee8023adLag,
            135 => IfType::L2vlan,
            24 => IfType::SoftwareLoopback,
            131 => IfType::Tunnel,
            other => IfType::Other(other),
        }
    }

    pub fn is_ethernet(self) -> bool {
        matches!(self, IfType::EthernetCsmacd)
    }
}

/// One switch interface, keyed by ifIndex in `DeviceModel::interfaces`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interface {
    pub if_index: u32,
    pub name: String,
    pub if_type: IfType,
    pub mtu: Option<u32>,
    pub admin_status: AdminStatus,
    pub oper_status: OperStatus,
    pub speed_mbps: Option<u64>,
    pub phys_addr: Option<EthernetAddress>,
    pub alias: String,

    /// Q-Bridge `dot1dBasePort` id; 0 if the interface does not
    /// participate in the bridge.
    pub port_id: u32,

    pub untagged_vlan: Option<u16>,
    pub untagged_vlan_name: Option<String>,
    pub is_tagged: bool,
    pub tagged_vlans: Vec<u16>,

    pub gvrp_enabled: bool,
    pub mvrp_enabled: bool,

    pub known_macs: BTreeMap<EthernetAddress, ()>,
    pub arp_entries: BTreeMap<std::net::Ipv4Addr, EthernetAddress>,
    pub lldp_neighbors: Vec<NeighborKey>,

    pub poe_port: Option<PoePort>,
    pub ipv4_addresses: Vec<Ip4Address>,

    pub visible: bool,
    pub manageable: bool,
    pub can_edit_alias: bool,
    pub allow_poe_toggle: bool,

    pub disabled: bool,
    pub disabled_reason: Option<String>,
}

impl Interface {
    pub fn new(if_index: u32) -> Self {
        Interface {
            if_index,
            name: String::new(),
            if_type: IfType::Other(0),
            mtu: None,
            admin_status: AdminStatus::Down,
            oper_status: OperStatus::Unknown,
            speed_mbps: None,
            phys_addr: None,
            alias: String::new(),
            port_id: 0,
            untagged_vlan: None,
            untagged_vlan_name: None,
            is_tagged: false,
            tagged_vlans: Vec::new(),
            gvrp_enabled: false,
            mvrp_enabled: false,
            known_macs: BTreeMap::new(),
            arp_entries: BTreeMap::new(),
            lldp_neighbors: Vec::new(),
            poe_port: None,
            ipv4_addresses: Vec::new(),
            visible: true,
            manageable: true,
            can_edit_alias: false,
            allow_poe_toggle: false,
            disabled: false,
            disabled_reason: None,
        }
    }

    pub fn disable(&mut self, reason: impl Into<String>) {
        self.disabled = true;
        self.disabled_reason = Some(reason.into());
    }
}
