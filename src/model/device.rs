// SPDX-License-Identifier: MIT

//! Device Model (C3): pure data, no behavior beyond trivial accessors.
//!
//! Interface/VLAN/Neighbor form a cyclic graph in the source system
//! (interfaces reference VLANs and neighbors and vice versa); rather than
//! hold pointers, every cross-reference is a stable integer id and the
//! entities themselves live in flat maps here (the "arena + integer id"
//! design note).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::interface::Interface;
use super::neighbor::{NeighborDevice, NeighborKey};
use super::stack::StackMember;
use super::system::System;
use super::vlan::Vlan;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceModel {
    pub system: System,
    pub interfaces: BTreeMap<u32, Interface>,
    pub vlans: BTreeMap<u16, Vlan>,
    pub stack_members: BTreeMap<u32, StackMember>,
    pub neighbors: BTreeMap<NeighborKey, NeighborDevice>,
    pub poe_ports: BTreeMap<String, super::poe::PoePort>,

    /// Q-Bridge `port_id -> ifIndex`, authoritative when non-empty; see
    /// the index reconciler.
    pub port_id_to_if_index: BTreeMap<u32, u32>,
}

impl DeviceModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interface(&self, if_index: u32) -> Option<&Interface> {
        self.interfaces.get(&if_index)
    }

    pub fn interface_mut(&mut self, if_index: u32) -> Option<&mut Interface> {
        self.interfaces.get_mut(&if_index)
    }

    pub fn vlan(&self, vid: u16) -> Option<&Vlan> {
        self.vlans.get(&vid)
    }

    /// Invariant 1/2: every tagged/untagged VLAN referenced by an
    /// interface is present in `self.vlans`; flags interfaces that
    /// violate it as disabled rather than dropping data.
    pub fn flag_undefined_vlan_references(&mut self) {
        let known_vids: Vec<u16> = self.vlans.keys().copied().collect();
        for iface in self.interfaces.values_mut() {
            let has_undefined_tagged = iface
                .tagged_vlans
                .iter()
                .any(|vid| !known_vids.contains(vid));
            let has_undefined_untagged = iface
                .untagged_vlan
                .map(|vid| !known_vids.contains(&vid))
                .unwrap_or(false);
            if has_undefined_tagged || has_undefined_untagged {
                iface.disable("Undefined vlan");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::interface::Interface;

    #[test]
    fn invariant_flags_interfaces_referencing_unknown_vlans() {
        let mut model = DeviceModel::new();
        let mut iface = Interface::new(1);
        iface.untagged_vlan = Some(99);
        model.interfaces.insert(1, iface);

        model.flag_undefined_vlan_references();

        let iface = model.interface(1).unwrap();
        assert!(iface.disabled);
        assert_eq!(iface.disabled_reason.as_deref(), Some("Undefined vlan"));
    }

    #[test]
    fn invariant_leaves_well_formed_interfaces_alone() {
        let mut model = DeviceModel::new();
        model.vlans.insert(10, Vlan::new(10));
        let mut iface = Interface::new(1);
        iface.untagged_vlan = Some(10);
        model.interfaces.insert(1, iface);

        model.flag_undefined_vlan_references();

        assert!(!model.interface(1).unwrap().disabled);
    }
}
