// SPDX-License-Identifier: MIT

//! `dot1dTpFdbPort` walk — detailed walk only (§4.4): learned MAC
//! addresses per bridge port, bridged to ifIndex via the port-id map.

use futures::StreamExt;

use crate::error::DalResult;
use crate::model::{DeviceModel, EthernetAddress};
use crate::oid::OidName;
use crate::snmp::{walk_branch, Transport};

pub async fn walk_fdb(transport: &dyn Transport, model: &mut DeviceModel, max_repetitions: u32) -> DalResult<u64> {
    let base = OidName::dot1dTpFdbPort.oid();
    let mut count = 0u64;
    let mut stream = walk_branch(transport, base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some(suffix) = vb.oid.suffix_of(&base) else { continue };
        let mac_octets: Option<[u8; 6]> = (|| {
            let arr: [u32; 6] = suffix.try_into().ok()?;
            let mut bytes = [0u8; 6];
            for (i, v) in arr.iter().enumerate() {
                bytes[i] = u8::try_from(*v).ok()?;
            }
            Some(bytes)
        })();
        let Some(mac_octets) = mac_octets else { continue };
        let mac = EthernetAddress::new(mac_octets);

        let Some(port_id) = vb.value.as_integer() else { continue };
        let Some(&if_index) = model.port_id_to_if_index.get(&(port_id as u32)) else { continue };
        if let Some(iface) = model.interface_mut(if_index) {
            iface.known_macs.insert(mac, ());
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
    async fn learns_fdb_macs_bridged_to_ifindex() {
        let base = OidName::dot1dTpFdbPort.oid();
        let transport = ScriptedTransport::new().with_branch(ScriptedBranch {
            base: base.clone(),
            entries: vec![(base.extend(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]), SnmpValue::Integer(10))],
        });

        let mut model = DeviceModel::new();
        model.port_id_to_if_index.insert(10, 1);
        model.interfaces.insert(1, Interface::new(1));

        walk_fdb(&transport, &mut model, 25).await.unwrap();

        let iface = model.interface(1).unwrap();
        assert!(iface.known_macs.contains_key(&EthernetAddress::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55])));
    }
}
