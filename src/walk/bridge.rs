// SPDX-License-Identifier: MIT

//! Q-BRIDGE/BRIDGE-MIB base walks (§4.4, branches 6–7): the GVRP/MVRP
//! scalars and the `dot1dBasePortIfIndex` table that seeds the index
//! reconciler's port-id-to-ifIndex map.

use futures::StreamExt;

use crate::error::DalResult;
use crate::model::DeviceModel;
use crate::oid::OidName;
use crate::snmp::{walk_branch, Transport};

pub async fn walk_dot1q_base(transport: &dyn Transport, model: &mut DeviceModel, _max_repetitions: u32) -> DalResult<u64> {
    let mut count = 0u64;
    if let Ok(vb) = transport.get(&OidName::dot1qNumVlans.oid().child(0)).await {
        model.system.vlan_count = vb.value.as_integer().unwrap_or(0) as u32;
        count += 1;
    }
    if let Ok(vb) = transport.get(&OidName::dot1qGvrpStatus.oid().child(0)).await {
        model.system.gvrp_enabled = vb.value.as_integer() == Some(1);
        count += 1;
    }
    Ok(count)
}

pub async fn walk_base_port_if_index(transport: &dyn Transport, model: &mut DeviceModel, max_repetitions: u32) -> DalResult<u64> {
    let base = OidName::dot1dBasePortIfIndex.oid();
    let mut count = 0u64;
    let mut stream = walk_branch(transport, base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some([port_id]) = vb.oid.suffix_of(&base) else { continue };
        let Some(if_index) = vb.value.as_integer() else { continue };
        let if_index = if_index as u32;
        model.port_id_to_if_index.insert(*port_id, if_index);
        if let Some(iface) = model.interface_mut(if_index) {
            iface.port_id = *port_id;
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
    async fn dot1q_base_populates_vlan_count_and_gvrp() {
        let transport = ScriptedTransport::new()
            .with_get(OidName::dot1qNumVlans.oid().child(0), SnmpValue::Integer(4))
            .with_get(OidName::dot1qGvrpStatus.oid().child(0), SnmpValue::Integer(1));
        let mut model = DeviceModel::new();
        walk_dot1q_base(&transport, &mut model, 25).await.unwrap();
        assert_eq!(model.system.vlan_count, 4);
        assert!(model.system.gvrp_enabled);
    }

    #[tokio::test]
    async fn base_port_if_index_seeds_reconciler_map_and_interface_port_id() {
        let base = OidName::dot1dBasePortIfIndex.oid();
        let transport = ScriptedTransport::new().with_branch(ScriptedBranch {
            base: base.clone(),
            entries: vec![(base.child(10), SnmpValue::Integer(1))],
        });
        let mut model = DeviceModel::new();
        model.interfaces.insert(1, Interface::new(1));

        walk_base_port_if_index(&transport, &mut model, 25).await.unwrap();

        assert_eq!(model.port_id_to_if_index.get(&10), Some(&1));
        assert_eq!(model.interface(1).unwrap().port_id, 10);
    }
}
