// SPDX-License-Identifier: MIT

//! LLDP-MIB remote-neighbor walk — detailed walk only (§4.4), indexed
//! `<timeMark>.<localPort>.<remoteIndex>`.

use futures::StreamExt;

use crate::error::DalResult;
use crate::model::{DeviceModel, LldpCapabilities, NeighborDevice, NeighborKey};
use crate::oid::OidName;
use crate::snmp::{walk_branch, Transport};

pub async fn walk_lldp(transport: &dyn Transport, model: &mut DeviceModel, max_repetitions: u32) -> DalResult<u64> {
    let mut count = 0u64;

    let port_id_base = OidName::lldpRemPortId.oid();
    let mut stream = walk_branch(transport, port_id_base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some(key) = vb.oid.suffix_of(&port_id_base).and_then(NeighborKey::parse) else { continue };
        model.neighbors.entry(key).or_insert_with(|| NeighborDevice::new(key));
    }

    let port_descr_base = OidName::lldpRemPortDesc.oid();
    let mut stream = walk_branch(transport, port_descr_base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some(key) = vb.oid.suffix_of(&port_descr_base).and_then(NeighborKey::parse) else { continue };
        if let Some(n) = model.neighbors.get_mut(&key) {
            n.port_descr = vb.value.as_str().map(String::from);
        }
    }

    let sys_name_base = OidName::lldpRemSysName.oid();
    let mut stream = walk_branch(transport, sys_name_base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some(key) = vb.oid.suffix_of(&sys_name_base).and_then(NeighborKey::parse) else { continue };
        if let Some(n) = model.neighbors.get_mut(&key) {
            n.sys_name = vb.value.as_str().map(String::from);
        }
    }

    let sys_desc_base = OidName::lldpRemSysDesc.oid();
    let mut stream = walk_branch(transport, sys_desc_base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some(key) = vb.oid.suffix_of(&sys_desc_base).and_then(NeighborKey::parse) else { continue };
        if let Some(n) = model.neighbors.get_mut(&key) {
            n.sys_descr = vb.value.as_str().map(String::from);
        }
    }

    let cap_base = OidName::lldpRemSysCapEnabled.oid();
    let mut stream = walk_branch(transport, cap_base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some(key) = vb.oid.suffix_of(&cap_base).and_then(NeighborKey::parse) else { continue };
        let Some(bytes) = vb.value.as_octet_string() else { continue };
        let raw = match bytes {
            [hi, lo] => u16::from_be_bytes([*hi, *lo]),
            [b] => *b as u16,
            _ => 0,
        };
        if let Some(n) = model.neighbors.get_mut(&key) {
            n.capabilities = LldpCapabilities::from_bits_truncate(raw);
        }
    }

    let chassis_subtype_base = OidName::lldpRemChassisIdSubtype.oid();
    let mut stream = walk_branch(transport, chassis_subtype_base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some(key) = vb.oid.suffix_of(&chassis_subtype_base).and_then(NeighborKey::parse) else { continue };
        if let Some(n) = model.neighbors.get_mut(&key) {
            n.chassis_type = vb.value.as_integer();
        }
    }

    let chassis_id_base = OidName::lldpRemChassisId.oid();
    let mut stream = walk_branch(transport, chassis_id_base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some(key) = vb.oid.suffix_of(&chassis_id_base).and_then(NeighborKey::parse) else { continue };
        if let Some(n) = model.neighbors.get_mut(&key) {
            n.chassis_string = vb.value.as_octet_string().map(|b| {
                std::str::from_utf8(b).map(String::from).unwrap_or_else(|_| hex_string(b))
            });
        }
    }

    let keys: Vec<NeighborKey> = model.neighbors.keys().copied().collect();
    for key in keys {
        let Some(&if_index) = model.port_id_to_if_index.get(&key.local_port) else { continue };
        if let Some(iface) = model.interface_mut(if_index) {
            if !iface.lldp_neighbors.contains(&key) {
                iface.lldp_neighbors.push(key);
            }
        }
    }

    Ok(count)
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Interface;
    use crate::snmp::mock::{ScriptedBranch, ScriptedTransport};
    use crate::snmp::value::SnmpValue;

    #[tokio::test]
    async fn collects_neighbor_and_links_it_to_local_interface() {
        let port_id_base = OidName::lldpRemPortId.oid();
        let sys_name_base = OidName::lldpRemSysName.oid();
        let cap_base = OidName::lldpRemSysCapEnabled.oid();
        let suffix = [0u32, 5, 1];

        let transport = ScriptedTransport::new()
            .with_branch(ScriptedBranch { base: port_id_base.clone(), entries: vec![(port_id_base.extend(&suffix), SnmpValue::OctetString(b"Gi0/1".to_vec()))] })
            .with_branch(ScriptedBranch { base: sys_name_base.clone(), entries: vec![(sys_name_base.extend(&suffix), SnmpValue::OctetString(b"neighbor-sw".to_vec()))] })
            .with_branch(ScriptedBranch { base: cap_base.clone(), entries: vec![(cap_base.extend(&suffix), SnmpValue::OctetString(vec![0b0000_0100]))] });

        let mut model = DeviceModel::new();
        model.port_id_to_if_index.insert(5, 1);
        model.interfaces.insert(1, Interface::new(1));

        walk_lldp(&transport, &mut model, 25).await.unwrap();

        let key = NeighborKey { time_mark: 0, local_port: 5, remote_index: 1 };
        let neighbor = model.neighbors.get(&key).unwrap();
        assert_eq!(neighbor.sys_name.as_deref(), Some("neighbor-sw"));
        assert!(neighbor.capabilities.contains(LldpCapabilities::BRIDGE));
        assert!(model.interface(1).unwrap().lldp_neighbors.contains(&key));
    }
}
