// SPDX-License-Identifier: MIT

//! POWER-ETHERNET-MIB walk (§4.4, branch 13): PSE aggregate power state
//! and per-port admin/detection status, keyed by `<group>.<port>` for
//! the index reconciler to match against interface name suffixes.

use futures::StreamExt;

use crate::error::DalResult;
use crate::model::{DeviceModel, PoeAdminStatus, PoeDetectStatus, PoePSE, PoePort};
use crate::oid::OidName;
use crate::snmp::{walk_branch, Transport};

pub async fn walk_main_pse(transport: &dyn Transport, model: &mut DeviceModel, max_repetitions: u32) -> DalResult<u64> {
    let mut count = 0u64;

    let power_base = OidName::pethMainPsePower.oid();
    let mut stream = walk_branch(transport, power_base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some([pse_id]) = vb.oid.suffix_of(&power_base) else { continue };
        let pse = model.system.poe_pse_devices.entry(*pse_id).or_insert_with(|| PoePSE::new(*pse_id));
        pse.max_power = vb.value.as_integer().map(|v| v as u32);
    }

    let oper_base = OidName::pethMainPseOperStatus.oid();
    let mut stream = walk_branch(transport, oper_base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some([pse_id]) = vb.oid.suffix_of(&oper_base) else { continue };
        let pse = model.system.poe_pse_devices.entry(*pse_id).or_insert_with(|| PoePSE::new(*pse_id));
        pse.status = vb.value.as_integer();
    }

    let consumption_base = OidName::pethMainPseConsumptionPower.oid();
    let mut stream = walk_branch(transport, consumption_base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some([pse_id]) = vb.oid.suffix_of(&consumption_base) else { continue };
        let pse = model.system.poe_pse_devices.entry(*pse_id).or_insert_with(|| PoePSE::new(*pse_id));
        pse.power_consumed = vb.value.as_integer().map(|v| v as u32);
    }

    let threshold_base = OidName::pethMainPseUsageThreshold.oid();
    let mut stream = walk_branch(transport, threshold_base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some([pse_id]) = vb.oid.suffix_of(&threshold_base) else { continue };
        let pse = model.system.poe_pse_devices.entry(*pse_id).or_insert_with(|| PoePSE::new(*pse_id));
        pse.threshold = vb.value.as_integer().map(|v| v as u32);
    }

    model.system.poe_capable = !model.system.poe_pse_devices.is_empty();
    model.system.poe_enabled = model.system.poe_pse_devices.values().any(|pse| pse.status == Some(1));
    model.system.poe_max_power = model.system.poe_pse_devices.values().filter_map(|pse| pse.max_power).max();
    model.system.poe_power_consumed = model.system.poe_pse_devices.values().filter_map(|pse| pse.power_consumed).sum::<u32>().into();

    Ok(count)
}

pub async fn walk_pse_ports(transport: &dyn Transport, model: &mut DeviceModel, max_repetitions: u32) -> DalResult<u64> {
    let mut count = 0u64;

    let admin_base = OidName::pethPsePortAdminEnable.oid();
    let mut stream = walk_branch(transport, admin_base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some(&[group, port]) = vb.oid.suffix_of(&admin_base) else { continue };
        let key = format!("{group}.{port}");
        let entry = model.poe_ports.entry(key).or_insert_with(|| PoePort {
            group,
            port,
            admin_status: None,
            detect_status: None,
        });
        entry.admin_status = vb.value.as_integer().and_then(PoeAdminStatus::from_peth_admin_enable);
    }

    let detect_base = OidName::pethPsePortDetectionStatus.oid();
    let mut stream = walk_branch(transport, detect_base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some(&[group, port]) = vb.oid.suffix_of(&detect_base) else { continue };
        let key = format!("{group}.{port}");
        let entry = model.poe_ports.entry(key).or_insert_with(|| PoePort {
            group,
            port,
            admin_status: None,
            detect_status: None,
        });
        entry.detect_status = vb.value.as_integer().and_then(PoeDetectStatus::from_peth_detection_status);
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snmp::mock::{ScriptedBranch, ScriptedTransport};
    use crate::snmp::value::SnmpValue;

    #[tokio::test]
    async fn collects_pse_ports_keyed_by_group_dot_port() {
        let admin_base = OidName::pethPsePortAdminEnable.oid();
        let detect_base = OidName::pethPsePortDetectionStatus.oid();
        let transport = ScriptedTransport::new()
            .with_branch(ScriptedBranch {
                base: admin_base.clone(),
                entries: vec![(admin_base.extend(&[1, 24]), SnmpValue::Integer(1))],
            })
            .with_branch(ScriptedBranch {
                base: detect_base.clone(),
                entries: vec![(detect_base.extend(&[1, 24]), SnmpValue::Integer(3))],
            });

        let mut model = DeviceModel::new();
        walk_pse_ports(&transport, &mut model, 25).await.unwrap();

        let port = model.poe_ports.get("1.24").unwrap();
        assert_eq!(port.admin_status, Some(PoeAdminStatus::Enabled));
        assert_eq!(port.detect_status, Some(PoeDetectStatus::DeliveringPower));
        assert_eq!(port.interface_suffix(), "1/24");
    }
}
