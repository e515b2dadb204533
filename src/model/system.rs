// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::poe::PoePSE;

/// `system` and PoE-aggregate state for the whole switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct System {
    pub name: String,
    pub description: String,
    pub object_id: String,
    pub uptime_ticks: u64,
    pub contact: String,
    pub location: String,

    pub vlan_count: u32,
    pub gvrp_enabled: bool,

    pub poe_capable: bool,
    pub poe_enabled: bool,
    pub poe_max_power: Option<u32>,
    pub poe_power_consumed: Option<u32>,
    pub poe_pse_devices: BTreeMap<u32, PoePSE>,
}

impl Default for System {
    fn default() -> Self {
        System {
            name: String::new(),
            description: String::new(),
            object_id: String::new(),
            uptime_ticks: 0,
            contact: String::new(),
            location: String::new(),
            vlan_count: 0,
            gvrp_enabled: false,
            poe_capable: false,
            poe_enabled: false,
            poe_max_power: None,
            poe_power_consumed: None,
            poe_pse_devices: BTreeMap::new(),
        }
    }
}
