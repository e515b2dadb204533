// SPDX-License-Identifier: MIT

//! `ipNetToMediaPhysAddress` walk — detailed walk only (§4.4): the
//! ARP cache, indexed `<ifIndex>.<ip address>`.

use std::net::Ipv4Addr;

use futures::StreamExt;

use crate::error::DalResult;
use crate::model::{DeviceModel, EthernetAddress};
use crate::oid::OidName;
use crate::snmp::{walk_branch, Transport};

pub async fn walk_arp(transport: &dyn Transport, model: &mut DeviceModel, max_repetitions: u32) -> DalResult<u64> {
    let base = OidName::ipNetToMediaPhysAddress.oid();
    let mut count = 0u64;
    let mut stream = walk_branch(transport, base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some(&[if_index, a, b, c, d]) = vb.oid.suffix_of(&base) else { continue };
        let Some(mac_bytes) = vb.value.as_octet_string() else { continue };
        let Some(mac) = EthernetAddress::decode(mac_bytes) else { continue };
        let ip = Ipv4Addr::new(a as u8, b as u8, c as u8, d as u8);

        if let Some(iface) = model.interface_mut(if_index) {
            iface.arp_entries.insert(ip, mac);
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
    async fn bridges_arp_entries_onto_their_ifindex() {
        let base = OidName::ipNetToMediaPhysAddress.oid();
        let transport = ScriptedTransport::new().with_branch(ScriptedBranch {
            base: base.clone(),
            entries: vec![(base.extend(&[1, 10, 0, 0, 5]), SnmpValue::OctetString(vec![0xAA, 0xBB, 0xCC, 0x00, 0x11, 0x22]))],
        });

        let mut model = DeviceModel::new();
        model.interfaces.insert(1, Interface::new(1));

        walk_arp(&transport, &mut model, 25).await.unwrap();

        let iface = model.interface(1).unwrap();
        assert_eq!(iface.arp_entries.get(&"10.0.0.5".parse().unwrap()), Some(&EthernetAddress::new([0xAA, 0xBB, 0xCC, 0x00, 0x11, 0x22])));
    }
}
