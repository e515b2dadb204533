// SPDX-License-Identifier: MIT

//! Mutation Engine (C8): VLAN change, admin up/down, PoE toggle, and
//! alias edit, each as a coordinated multi-set with read-modify-write
//! of VLAN egress bitmaps where needed (§4.8). Read-modify-write is not
//! atomic at the device; each function documents what it guarantees on
//! partial failure.

use tokio::time::sleep;

use crate::audit::{AuditEvent, AuditEventKind, AuditMeta, AuditSink};
use crate::bytes::clear_bit_preserving_width;
use crate::error::{DalError, DalResult};
use crate::model::{AdminStatus, DeviceModel, PoeAdminStatus};
use crate::oid::OidName;
use crate::settings::Settings;
use crate::snmp::value::SnmpValue;
use crate::snmp::Transport;

fn emit(sink: &dyn AuditSink, meta: &AuditMeta, if_index: Option<u32>, kind: AuditEventKind, action: &'static str, description: impl Into<String>) {
    sink.emit(AuditEvent::new(meta, if_index, kind, action, description));
}

/// One SET on `ifAdminStatus.<ifIndex>`, retried once on a transient
/// transport error (timeout or I/O failure; protocol/policy errors are
/// not retried since a retry would not change the outcome).
pub async fn set_admin_status(transport: &dyn Transport, model: &mut DeviceModel, sink: &dyn AuditSink, meta: &AuditMeta, if_index: u32, status: AdminStatus) -> DalResult<()> {
    let oid = OidName::ifAdminStatus.oid().child(if_index);
    let value = SnmpValue::Integer(status.to_ifadminstatus());

    let result = match transport.set(&oid, value.clone()).await {
        Err(DalError::Transport { .. } | DalError::Timeout { .. }) => transport.set(&oid, value).await,
        other => other,
    };

    match result {
        Ok(()) => {
            if let Some(iface) = model.interface_mut(if_index) {
                iface.admin_status = status;
            }
            emit(sink, meta, Some(if_index), AuditEventKind::Change, "set_admin_status", format!("admin status set to {status:?}"));
            Ok(())
        }
        Err(e) => {
            emit(sink, meta, Some(if_index), AuditEventKind::Error, "set_admin_status", format!("failed: {e}"));
            Err(e)
        }
    }
}

/// Sets `ifAlias`, optionally preserving a leading substring matched by
/// `IFACE_ALIAS_KEEP_BEGINNING_REGEX` against the existing alias, and
/// rejecting the result with `DalError::Policy` before any write if it
/// matches `IFACE_ALIAS_NOT_ALLOW_REGEX`.
pub async fn set_alias(transport: &dyn Transport, model: &mut DeviceModel, sink: &dyn AuditSink, meta: &AuditMeta, settings: &Settings, if_index: u32, new_alias: &str) -> DalResult<()> {
    let existing = model.interface(if_index).map(|i| i.alias.clone()).unwrap_or_default();

    let mut final_alias = new_alias.to_string();
    if let Some(re) = settings.alias_keep_beginning_regex() {
        if let Some(m) = re.find(&existing) {
            final_alias = format!("{}{}", m.as_str(), new_alias);
        }
    }

    if let Some(re) = settings.alias_not_allow_regex() {
        if re.is_match(&final_alias) {
            let msg = format!("alias '{final_alias}' matches the not-allowed pattern");
            emit(sink, meta, Some(if_index), AuditEventKind::Warning, "set_alias", &msg);
            return Err(DalError::Policy(msg));
        }
    }

    let oid = OidName::ifAlias.oid().child(if_index);
    transport.set(&oid, SnmpValue::OctetString(final_alias.clone().into_bytes())).await.map_err(|e| {
        emit(sink, meta, Some(if_index), AuditEventKind::Error, "set_alias", format!("failed: {e}"));
        e
    })?;

    if let Some(iface) = model.interface_mut(if_index) {
        iface.alias = final_alias.clone();
    }
    emit(sink, meta, Some(if_index), AuditEventKind::Change, "set_alias", format!("alias set to '{final_alias}'"));
    Ok(())
}

/// Disables then re-enables the PoE port mapped to `if_index`, waiting
/// `settings.poe_toggle_delay` in between. Both sets are attempted even
/// if the first fails; the final admin status and any error are
/// reported to the caller.
pub async fn toggle_poe(transport: &dyn Transport, model: &mut DeviceModel, sink: &dyn AuditSink, meta: &AuditMeta, settings: &Settings, if_index: u32) -> DalResult<()> {
    let Some(port) = model.interface(if_index).and_then(|i| i.poe_port.clone()) else {
        let msg = "interface has no mapped PoE port".to_string();
        emit(sink, meta, Some(if_index), AuditEventKind::Error, "toggle_poe", &msg);
        return Err(DalError::Policy(msg));
    };

    let oid = OidName::pethPsePortAdminEnable.oid().extend(&[port.group, port.port]);

    let disable_result = transport.set(&oid, SnmpValue::Integer(PoeAdminStatus::Disabled.to_peth_admin_enable())).await;
    sleep(settings.poe_toggle_delay).await;
    let enable_result = transport.set(&oid, SnmpValue::Integer(PoeAdminStatus::Enabled.to_peth_admin_enable())).await;

    if let Some(iface) = model.interface_mut(if_index) {
        if let Some(p) = &mut iface.poe_port {
            p.admin_status = enable_result.is_ok().then_some(PoeAdminStatus::Enabled);
        }
    }

    match (&disable_result, &enable_result) {
        (Ok(()), Ok(())) => {
            emit(sink, meta, Some(if_index), AuditEventKind::Change, "toggle_poe", "power cycled");
            Ok(())
        }
        _ => {
            let msg = format!("disable={disable_result:?} enable={enable_result:?}");
            emit(sink, meta, Some(if_index), AuditEventKind::Error, "toggle_poe", &msg);
            enable_result.and(disable_result)
        }
    }
}

/// The canonical multi-step VLAN-change transaction (§4.8):
/// 1. resolve `port_id`, fail `NotBridged` if absent;
/// 2. set `dot1qPvid.<port_id> = new_vid`;
/// 3. GET + parse `dot1qVlanStaticEgressPorts.<old_vid>`;
/// 4. clear bit `port_id`, re-encode, SET;
/// 5. GET `dot1qVlanCurrentEgressPorts.0.<old_vid>` and `.0.<new_vid>` to
///    refresh the model.
///
/// Any failure after step 2 returns `DalError::PartialUpdate` naming the
/// last successful step rather than rolling back; steps 2 and 4 are each
/// idempotent so callers may retry.
pub async fn set_untagged_vlan(transport: &dyn Transport, model: &mut DeviceModel, sink: &dyn AuditSink, meta: &AuditMeta, if_index: u32, old_vid: u16, new_vid: u16) -> DalResult<()> {
    let Some(port_id) = model.interface(if_index).map(|i| i.port_id).filter(|&p| p != 0) else {
        emit(sink, meta, Some(if_index), AuditEventKind::Error, "set_untagged_vlan", "interface is not bridged");
        return Err(DalError::NotBridged);
    };

    let pvid_oid = OidName::dot1qPvid.oid().child(port_id);
    if let Err(e) = transport.set(&pvid_oid, SnmpValue::Unsigned32(new_vid as u32)).await {
        emit(sink, meta, Some(if_index), AuditEventKind::Error, "set_untagged_vlan", format!("failed at step pvid: {e}"));
        return Err(e);
    }

    let egress_oid = OidName::dot1qVlanStaticEgressPorts.oid().child(old_vid as u32);
    let current = match transport.get(&egress_oid).await {
        Ok(vb) => vb.value,
        Err(e) => {
            emit(sink, meta, Some(if_index), AuditEventKind::Error, "set_untagged_vlan", format!("failed at step pvid: {e}"));
            return Err(DalError::PartialUpdate { last_good_step: "pvid" });
        }
    };
    let Some(bitmap) = current.as_octet_string() else {
        emit(sink, meta, Some(if_index), AuditEventKind::Error, "set_untagged_vlan", "egress bitmap was not an octet string");
        return Err(DalError::PartialUpdate { last_good_step: "pvid" });
    };

    let cleared = clear_bit_preserving_width(bitmap, port_id);
    if let Err(e) = transport.set(&egress_oid, SnmpValue::OctetString(cleared)).await {
        emit(sink, meta, Some(if_index), AuditEventKind::Error, "set_untagged_vlan", format!("failed at step egress-read: {e}"));
        return Err(DalError::PartialUpdate { last_good_step: "egress-read" });
    }

    let old_current_oid = OidName::dot1qVlanCurrentEgressPorts.oid().extend(&[0, old_vid as u32]);
    let new_current_oid = OidName::dot1qVlanCurrentEgressPorts.oid().extend(&[0, new_vid as u32]);
    let old_current = transport.get(&old_current_oid).await.ok();
    let new_current = transport.get(&new_current_oid).await.ok();

    if let Some(iface) = model.interface_mut(if_index) {
        iface.untagged_vlan = Some(new_vid);
    }
    if let Some(vb) = old_current {
        if let (Some(vlan), Some(bitmap)) = (model.vlans.get_mut(&old_vid), vb.value.as_octet_string()) {
            vlan.current_egress_ports = bitmap.to_vec();
        }
    }
    if let Some(vb) = new_current {
        if let (Some(vlan), Some(bitmap)) = (model.vlans.get_mut(&new_vid), vb.value.as_octet_string()) {
            vlan.current_egress_ports = bitmap.to_vec();
        }
    }

    emit(sink, meta, Some(if_index), AuditEventKind::Change, "set_untagged_vlan", format!("untagged vlan changed {old_vid} -> {new_vid}"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::RecordingAuditSink;
    use crate::model::{Interface, Vlan};
    use crate::snmp::mock::{ScriptedBranch, ScriptedTransport};

    fn meta() -> AuditMeta {
        AuditMeta { user: "alice".into(), remote_ip: "10.0.0.1".into(), group: "noc".into(), switch: "sw1".into() }
    }

    #[tokio::test]
    async fn sets_admin_status_and_updates_model() {
        let transport = ScriptedTransport::new();
        let mut model = DeviceModel::new();
        model.interfaces.insert(1, Interface::new(1));
        let sink = RecordingAuditSink::new();

        set_admin_status(&transport, &mut model, &sink, &meta(), 1, AdminStatus::Down).await.unwrap();

        assert_eq!(model.interface(1).unwrap().admin_status, AdminStatus::Down);
        assert_eq!(sink.events().len(), 1);
    }

    #[tokio::test]
    async fn set_alias_rejects_forbidden_pattern_before_any_set() {
        let transport = ScriptedTransport::new();
        let mut model = DeviceModel::new();
        model.interfaces.insert(1, Interface::new(1));
        let sink = RecordingAuditSink::new();
        let mut settings = Settings::default();
        settings.iface_alias_not_allow_regex = Some("forbidden".to_string());

        let err = set_alias(&transport, &mut model, &sink, &meta(), &settings, 1, "this is forbidden").await.unwrap_err();

        assert!(matches!(err, DalError::Policy(_)));
        assert_eq!(model.interface(1).unwrap().alias, "");
    }

    #[tokio::test]
    async fn set_alias_keeps_beginning_when_configured() {
        let transport = ScriptedTransport::new();
        let mut model = DeviceModel::new();
        let mut iface = Interface::new(1);
        iface.alias = "SITE-A: old desc".to_string();
        model.interfaces.insert(1, iface);
        let sink = RecordingAuditSink::new();
        let mut settings = Settings::default();
        settings.iface_alias_keep_beginning_regex = Some(r"^SITE-A: ".to_string());

        set_alias(&transport, &mut model, &sink, &meta(), &settings, 1, "new desc").await.unwrap();

        assert_eq!(model.interface(1).unwrap().alias, "SITE-A: new desc");
    }

    #[tokio::test]
    async fn s4_vlan_change_success_clears_old_egress_bit() {
        let egress_base = OidName::dot1qVlanStaticEgressPorts.oid();
        let current_base = OidName::dot1qVlanCurrentEgressPorts.oid();
        let transport = ScriptedTransport::new()
            .with_get(egress_base.child(10), SnmpValue::OctetString(vec![0x80, 0x00]))
            .with_get(current_base.extend(&[0, 10]), SnmpValue::OctetString(vec![0x00, 0x00]))
            .with_get(current_base.extend(&[0, 20]), SnmpValue::OctetString(vec![0x80, 0x00]));

        let mut model = DeviceModel::new();
        let mut iface = Interface::new(101);
        iface.port_id = 1;
        iface.untagged_vlan = Some(10);
        model.interfaces.insert(101, iface);
        model.port_id_to_if_index.insert(1, 101);
        model.vlans.insert(10, Vlan::new(10));
        model.vlans.insert(20, Vlan::new(20));
        let sink = RecordingAuditSink::new();

        set_untagged_vlan(&transport, &mut model, &sink, &meta(), 101, 10, 20).await.unwrap();

        assert_eq!(model.interface(101).unwrap().untagged_vlan, Some(20));
        assert_eq!(transport.recorded_sets().len(), 2);
    }

    #[tokio::test]
    async fn set_untagged_vlan_fails_not_bridged_without_port_id() {
        let transport = ScriptedTransport::new();
        let mut model = DeviceModel::new();
        model.interfaces.insert(101, Interface::new(101));
        let sink = RecordingAuditSink::new();

        let err = set_untagged_vlan(&transport, &mut model, &sink, &meta(), 101, 10, 20).await.unwrap_err();
        assert!(matches!(err, DalError::NotBridged));
    }
}
