// SPDX-License-Identifier: MIT

//! `system` group (§4.4, branch 1): six scalar GETs, no bulk walk.

use crate::error::DalResult;
use crate::model::DeviceModel;
use crate::oid::OidName;
use crate::snmp::Transport;

pub async fn walk_system(transport: &dyn Transport, model: &mut DeviceModel) -> DalResult<()> {
    let descr = transport.get(&OidName::sysDescr.oid().child(0)).await?;
    let object_id = transport.get(&OidName::sysObjectID.oid().child(0)).await?;
    let uptime = transport.get(&OidName::sysUpTime.oid().child(0)).await?;
    let contact = transport.get(&OidName::sysContact.oid().child(0)).await?;
    let name = transport.get(&OidName::sysName.oid().child(0)).await?;
    let location = transport.get(&OidName::sysLocation.oid().child(0)).await?;

    model.system.description = descr.value.as_str().unwrap_or_default().to_string();
    model.system.object_id = match &object_id.value {
        crate::snmp::SnmpValue::ObjectIdentifier(oid) => oid.to_string(),
        other => other.as_str().unwrap_or_default().to_string(),
    };
    model.system.uptime_ticks = uptime.value.as_integer().unwrap_or(0) as u64;
    model.system.contact = contact.value.as_str().unwrap_or_default().to_string();
    model.system.name = name.value.as_str().unwrap_or_default().to_string();
    model.system.location = location.value.as_str().unwrap_or_default().to_string();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid::Oid;
    use crate::snmp::mock::ScriptedTransport;
    use crate::snmp::value::SnmpValue;

    #[tokio::test]
    async fn populates_system_fields_from_scalar_gets() {
        let transport = ScriptedTransport::new()
            .with_get(OidName::sysDescr.oid().child(0), SnmpValue::OctetString(b"Cisco IOS".to_vec()))
            .with_get(OidName::sysObjectID.oid().child(0), SnmpValue::ObjectIdentifier(Oid::new(vec![1, 3, 6, 1, 4, 1, 9])))
            .with_get(OidName::sysUpTime.oid().child(0), SnmpValue::TimeTicks(123456))
            .with_get(OidName::sysContact.oid().child(0), SnmpValue::OctetString(b"noc@example.com".to_vec()))
            .with_get(OidName::sysName.oid().child(0), SnmpValue::OctetString(b"sw1".to_vec()))
            .with_get(OidName::sysLocation.oid().child(0), SnmpValue::OctetString(b"rack 4".to_vec()));

        let mut model = DeviceModel::new();
        walk_system(&transport, &mut model).await.unwrap();

        assert_eq!(model.system.description, "Cisco IOS");
        assert_eq!(model.system.name, "sw1");
        assert_eq!(model.system.uptime_ticks, 123456);
        assert_eq!(model.system.location, "rack 4");
    }
}
