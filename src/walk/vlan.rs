// SPDX-License-Identifier: MIT

//! Q-BRIDGE-MIB VLAN walks (§4.4, branches 8–11): static VLAN table,
//! per-port PVID, current egress bitmap reconciliation, and per-port
//! GVRP status.

use futures::StreamExt;

use crate::bytes::bitmap_parse;
use crate::error::DalResult;
use crate::model::{DeviceModel, Vlan, VlanStatus};
use crate::oid::OidName;
use crate::snmp::{walk_branch, Transport};

pub async fn walk_static_vlans(transport: &dyn Transport, model: &mut DeviceModel, max_repetitions: u32) -> DalResult<u64> {
    let mut count = 0u64;

    let row_status_base = OidName::dot1qVlanStaticRowStatus.oid();
    let mut stream = walk_branch(transport, row_status_base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some([vid]) = vb.oid.suffix_of(&row_status_base) else { continue };
        model.vlans.entry(*vid as u16).or_insert_with(|| Vlan::new(*vid as u16));
    }

    let name_base = OidName::dot1qVlanStaticName.oid();
    let mut stream = walk_branch(transport, name_base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some([vid]) = vb.oid.suffix_of(&name_base) else { continue };
        if let Some(vlan) = model.vlans.get_mut(&(*vid as u16)) {
            vlan.name = vb.value.as_str().unwrap_or_default().to_string();
        }
    }

    let status_base = OidName::dot1qVlanStatus.oid();
    let mut stream = walk_branch(transport, status_base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some([vid]) = vb.oid.suffix_of(&status_base) else { continue };
        if let (Some(vlan), Some(raw)) = (model.vlans.get_mut(&(*vid as u16)), vb.value.as_integer()) {
            vlan.status = VlanStatus::from_dot1q_vlan_status(raw);
        }
    }

    let egress_base = OidName::dot1qVlanStaticEgressPorts.oid();
    let mut stream = walk_branch(transport, egress_base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some([vid]) = vb.oid.suffix_of(&egress_base) else { continue };
        if let (Some(vlan), Some(bitmap)) = (model.vlans.get_mut(&(*vid as u16)), vb.value.as_octet_string()) {
            vlan.static_egress_ports = bitmap.to_vec();
        }
    }

    Ok(count)
}

/// `dot1qPvid` is indexed by `dot1dBasePort`, not ifIndex; resolved
/// through `DeviceModel::port_id_to_if_index` (the index reconciler's
/// seed map, populated by `crate::walk::bridge`).
pub async fn walk_pvid(transport: &dyn Transport, model: &mut DeviceModel, max_repetitions: u32) -> DalResult<u64> {
    let base = OidName::dot1qPvid.oid();
    let mut count = 0u64;
    let mut stream = walk_branch(transport, base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some([port_id]) = vb.oid.suffix_of(&base) else { continue };
        let Some(vid) = vb.value.as_integer() else { continue };
        let Some(&if_index) = model.port_id_to_if_index.get(port_id) else { continue };
        if let Some(iface) = model.interface_mut(if_index) {
            iface.untagged_vlan = Some(vid as u16);
        }
    }
    Ok(count)
}

/// Reconciles `dot1qVlanCurrentEgressPorts` bitmaps into per-interface
/// tagged/untagged membership (§4.1's "bitmap reconciliation" step): a
/// set bit means the port egresses that VLAN; whether it egresses
/// tagged or untagged depends on whether the VLAN equals the port's
/// already-known PVID.
pub async fn walk_current_egress(transport: &dyn Transport, model: &mut DeviceModel, max_repetitions: u32) -> DalResult<u64> {
    let base = OidName::dot1qVlanCurrentEgressPorts.oid();
    let mut count = 0u64;
    let mut stream = walk_branch(transport, base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        // index is `<timeFilter>.<vid>`; timeFilter is conventionally 0.
        let Some(suffix) = vb.oid.suffix_of(&base) else { continue };
        let &[_time_filter, vid] = suffix else { continue };
        let Some(bitmap) = vb.value.as_octet_string() else { continue };

        if let Some(vlan) = model.vlans.get_mut(&(vid as u16)) {
            vlan.current_egress_ports = bitmap.to_vec();
        }

        for port_id in bitmap_parse(bitmap) {
            let Some(&if_index) = model.port_id_to_if_index.get(&port_id) else { continue };
            let Some(iface) = model.interface_mut(if_index) else { continue };
            if iface.untagged_vlan != Some(vid as u16) && !iface.tagged_vlans.contains(&(vid as u16)) {
                iface.tagged_vlans.push(vid as u16);
                iface.is_tagged = true;
            }
        }
    }
    Ok(count)
}

pub async fn walk_port_gvrp(transport: &dyn Transport, model: &mut DeviceModel, max_repetitions: u32) -> DalResult<u64> {
    let base = OidName::dot1qPortGvrpStatus.oid();
    let mut count = 0u64;
    let mut stream = walk_branch(transport, base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some([port_id]) = vb.oid.suffix_of(&base) else { continue };
        let Some(&if_index) = model.port_id_to_if_index.get(port_id) else { continue };
        if let Some(iface) = model.interface_mut(if_index) {
            iface.gvrp_enabled = vb.value.as_integer() == Some(1);
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Interface;
    use crate::snmp::mock::{ScriptedBranch, ScriptedTransport};
    use crate::snmp::value::SnmpValue;

    #[tokio::test]
    async fn s1_static_vlan_walk_populates_name_and_status() {
        let name_base = OidName::dot1qVlanStaticName.oid();
        let status_base = OidName::dot1qVlanStatus.oid();
        let row_base = OidName::dot1qVlanStaticRowStatus.oid();
        let transport = ScriptedTransport::new()
            .with_branch(ScriptedBranch { base: row_base.clone(), entries: vec![(row_base.child(10), SnmpValue::Integer(1))] })
            .with_branch(ScriptedBranch { base: name_base.clone(), entries: vec![(name_base.child(10), SnmpValue::OctetString(b"engineering".to_vec()))] })
            .with_branch(ScriptedBranch { base: status_base.clone(), entries: vec![(status_base.child(10), SnmpValue::Integer(2))] })
            .with_branch(ScriptedBranch {
                base: OidName::dot1qVlanStaticEgressPorts.oid(),
                entries: vec![],
            });

        let mut model = DeviceModel::new();
        walk_static_vlans(&transport, &mut model, 25).await.unwrap();

        let vlan = model.vlan(10).unwrap();
        assert_eq!(vlan.name, "engineering");
        assert_eq!(vlan.status, VlanStatus::Static);
    }

    #[tokio::test]
    async fn s2_egress_bitmap_reconciles_tagged_membership() {
        let mut model = DeviceModel::new();
        model.vlans.insert(10, Vlan::new(10));
        model.port_id_to_if_index.insert(1, 101);
        model.port_id_to_if_index.insert(3, 103);
        let mut iface101 = Interface::new(101);
        iface101.untagged_vlan = Some(1);
        model.interfaces.insert(101, iface101);
        model.interfaces.insert(103, Interface::new(103));

        let base = OidName::dot1qVlanCurrentEgressPorts.oid();
        let transport = ScriptedTransport::new().with_branch(ScriptedBranch {
            base: base.clone(),
            entries: vec![(base.extend(&[0, 10]), SnmpValue::OctetString(vec![0xA0, 0x00]))],
        });

        walk_current_egress(&transport, &mut model, 25).await.unwrap();

        assert!(model.interface(101).unwrap().tagged_vlans.contains(&10));
        assert!(model.interface(103).unwrap().tagged_vlans.contains(&10));
    }
}
