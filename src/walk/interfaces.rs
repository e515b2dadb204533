// SPDX-License-Identifier: MIT

//! `ifTable`/`ifXTable` walks (§4.4, branches 2–5): ifIndex/ifType/
//! ifAdminStatus/ifOperStatus, then ifName/ifDescr with fallback, then
//! ifAlias, then ifHighSpeed/ifSpeed with fallback.

use std::collections::BTreeMap;

use futures::StreamExt;

use crate::error::DalResult;
use crate::model::{AdminStatus, DeviceModel, EthernetAddress, IfType, Interface, OperStatus};
use crate::oid::{Oid, OidName};
use crate::snmp::value::SnmpValue;
use crate::snmp::{walk_branch, Transport};

async fn collect_column(transport: &dyn Transport, base: Oid, max_repetitions: u32) -> DalResult<(BTreeMap<u32, SnmpValue>, u64)> {
    let mut out = BTreeMap::new();
    let mut count = 0u64;
    let mut stream = walk_branch(transport, base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        if let Some(suffix) = vb.oid.suffix_of(&base) {
            if let [index] = suffix {
                out.insert(*index, vb.value);
            }
        }
    }
    Ok((out, count))
}

pub async fn walk_if_table(transport: &dyn Transport, model: &mut DeviceModel, max_repetitions: u32) -> DalResult<u64> {
    let (indices, c1) = collect_column(transport, OidName::ifIndex.oid(), max_repetitions).await?;
    let (types, c2) = collect_column(transport, OidName::ifType.oid(), max_repetitions).await?;
    let (admin, c3) = collect_column(transport, OidName::ifAdminStatus.oid(), max_repetitions).await?;
    let (oper, c4) = collect_column(transport, OidName::ifOperStatus.oid(), max_repetitions).await?;
    let (descr, c5) = collect_column(transport, OidName::ifDescr.oid(), max_repetitions).await?;
    let (mtu, c6) = collect_column(transport, OidName::ifMtu.oid(), max_repetitions).await?;
    let (speed, c7) = collect_column(transport, OidName::ifSpeed.oid(), max_repetitions).await?;
    let (phys, c8) = collect_column(transport, OidName::ifPhysAddress.oid(), max_repetitions).await?;

    for (&if_index, _) in indices.iter() {
        let mut iface = Interface::new(if_index);
        iface.if_type = types.get(&if_index).and_then(SnmpValue::as_integer).map(IfType::from_iftype).unwrap_or(IfType::Other(0));
        iface.admin_status = admin
            .get(&if_index)
            .and_then(SnmpValue::as_integer)
            .and_then(AdminStatus::from_ifadminstatus)
            .unwrap_or(AdminStatus::Down);
        iface.oper_status = oper
            .get(&if_index)
            .and_then(SnmpValue::as_integer)
            .and_then(OperStatus::from_ifoperstatus)
            .unwrap_or(OperStatus::Unknown);
        iface.name = descr.get(&if_index).and_then(SnmpValue::as_str).unwrap_or_default().to_string();
        iface.mtu = mtu.get(&if_index).and_then(SnmpValue::as_integer).map(|v| v as u32);
        iface.speed_mbps = speed.get(&if_index).and_then(SnmpValue::as_integer).map(|v| (v as u64) / 1_000_000);
        iface.phys_addr = phys.get(&if_index).and_then(SnmpValue::as_octet_string).and_then(EthernetAddress::decode);
        model.interfaces.insert(if_index, iface);
    }

    Ok(c1 + c2 + c3 + c4 + c5 + c6 + c7 + c8)
}

/// `ifXTable`: preferred `ifName`/`ifHighSpeed` over the legacy `ifDescr`/
/// `ifSpeed` already populated by `walk_if_table`, falling back to the
/// legacy value when the agent has no `ifXTable` entry for an index
/// (some embedded agents only implement `ifTable`).
pub async fn walk_if_x_table(transport: &dyn Transport, model: &mut DeviceModel, max_repetitions: u32) -> DalResult<u64> {
    let (names, c1) = collect_column(transport, OidName::ifName.oid(), max_repetitions).await?;
    let (aliases, c2) = collect_column(transport, OidName::ifAlias.oid(), max_repetitions).await?;
    let (high_speed, c3) = collect_column(transport, OidName::ifHighSpeed.oid(), max_repetitions).await?;

    for (if_index, iface) in model.interfaces.iter_mut() {
        if let Some(name) = names.get(if_index).and_then(SnmpValue::as_str) {
            if !name.is_empty() {
                iface.name = name.to_string();
            }
        }
        iface.alias = aliases.get(if_index).and_then(SnmpValue::as_str).unwrap_or_default().to_string();
        if let Some(mbps) = high_speed.get(if_index).and_then(SnmpValue::as_integer) {
            iface.speed_mbps = Some(mbps as u64);
        }
    }

    Ok(c1 + c2 + c3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snmp::mock::ScriptedBranch;
    use crate::snmp::mock::ScriptedTransport;

    fn branch(base: OidName, entries: &[(u32, SnmpValue)]) -> ScriptedBranch {
        ScriptedBranch {
            base: base.oid(),
            entries: entries.iter().map(|(i, v)| (base.oid().child(*i), v.clone())).collect(),
        }
    }

    #[tokio::test]
    async fn walks_if_table_and_falls_back_descr_to_name() {
        let transport = ScriptedTransport::new()
            .with_branch(branch(OidName::ifIndex, &[(1, SnmpValue::Integer(1))]))
            .with_branch(branch(OidName::ifType, &[(1, SnmpValue::Integer(6))]))
            .with_branch(branch(OidName::ifAdminStatus, &[(1, SnmpValue::Integer(1))]))
            .with_branch(branch(OidName::ifOperStatus, &[(1, SnmpValue::Integer(1))]))
            .with_branch(branch(OidName::ifDescr, &[(1, SnmpValue::OctetString(b"Gi1/0/1".to_vec()))]))
            .with_branch(branch(OidName::ifMtu, &[(1, SnmpValue::Integer(1500))]))
            .with_branch(branch(OidName::ifSpeed, &[(1, SnmpValue::Counter32(1_000_000_000))]))
            .with_branch(branch(OidName::ifPhysAddress, &[]))
            .with_branch(branch(OidName::ifName, &[]))
            .with_branch(branch(OidName::ifAlias, &[(1, SnmpValue::OctetString(b"uplink".to_vec()))]))
            .with_branch(branch(OidName::ifHighSpeed, &[]));

        let mut model = DeviceModel::new();
        walk_if_table(&transport, &mut model, 25).await.unwrap();
        walk_if_x_table(&transport, &mut model, 25).await.unwrap();

        let iface = model.interface(1).unwrap();
        assert_eq!(iface.name, "Gi1/0/1");
        assert_eq!(iface.alias, "uplink");
        assert_eq!(iface.speed_mbps, Some(1000));
        assert_eq!(iface.if_type, IfType::EthernetCsmacd);
        assert_eq!(iface.admin_status, AdminStatus::Up);
    }
}
