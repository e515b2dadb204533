// SPDX-License-Identifier: MIT

//! `ipAddrTable` walk (§4.4, branch 12): two-pass bridge from IP address
//! (the table index) to ifIndex, then to netmask, joined into
//! `Interface::ipv4_addresses`.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use futures::StreamExt;

use crate::error::DalResult;
use crate::model::{DeviceModel, Ip4Address};
use crate::oid::OidName;
use crate::snmp::{walk_branch, Transport};

fn ipv4_from_suffix(suffix: &[u32]) -> Option<Ipv4Addr> {
    match suffix {
        [a, b, c, d] => Some(Ipv4Addr::new(*a as u8, *b as u8, *c as u8, *d as u8)),
        _ => None,
    }
}

pub async fn walk_ip_addr_table(transport: &dyn Transport, model: &mut DeviceModel, max_repetitions: u32) -> DalResult<u64> {
    let mut count = 0u64;

    let if_index_base = OidName::ipAdEntIfIndex.oid();
    let mut if_index_by_ip: BTreeMap<Ipv4Addr, u32> = BTreeMap::new();
    let mut stream = walk_branch(transport, if_index_base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some(suffix) = vb.oid.suffix_of(&if_index_base) else { continue };
        let Some(ip) = ipv4_from_suffix(suffix) else { continue };
        if let Some(if_index) = vb.value.as_integer() {
            if_index_by_ip.insert(ip, if_index as u32);
        }
    }

    let netmask_base = OidName::ipAdEntNetMask.oid();
    let mut stream = walk_branch(transport, netmask_base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some(suffix) = vb.oid.suffix_of(&netmask_base) else { continue };
        let Some(ip) = ipv4_from_suffix(suffix) else { continue };
        let Some(netmask_bytes) = vb.value.as_octet_string() else { continue };
        let Ok(octets): Result<[u8; 4], _> = netmask_bytes.try_into() else { continue };
        let netmask = Ipv4Addr::from(octets);

        let Some(&if_index) = if_index_by_ip.get(&ip) else { continue };
        let Some(iface) = model.interface_mut(if_index) else { continue };
        iface.ipv4_addresses.push(Ip4Address::new(ip, netmask));
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
    async fn bridges_ip_addr_table_to_interface_ipv4_addresses() {
        let if_index_base = OidName::ipAdEntIfIndex.oid();
        let netmask_base = OidName::ipAdEntNetMask.oid();
        let transport = ScriptedTransport::new()
            .with_branch(ScriptedBranch {
                base: if_index_base.clone(),
                entries: vec![(if_index_base.extend(&[10, 0, 0, 5]), SnmpValue::Integer(1))],
            })
            .with_branch(ScriptedBranch {
                base: netmask_base.clone(),
                entries: vec![(netmask_base.extend(&[10, 0, 0, 5]), SnmpValue::OctetString(vec![255, 255, 255, 0]))],
            });

        let mut model = DeviceModel::new();
        model.interfaces.insert(1, Interface::new(1));
        walk_ip_addr_table(&transport, &mut model, 25).await.unwrap();

        let iface = model.interface(1).unwrap();
        assert_eq!(iface.ipv4_addresses.len(), 1);
        assert_eq!(iface.ipv4_addresses[0].to_string(), "10.0.0.5/24");
    }
}
