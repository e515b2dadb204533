// SPDX-License-Identifier: MIT

//! End-to-end scenario tests stitching a full basic walk through
//! reconciliation, authorization, and a mutation, the way a single
//! operator request would touch every component in turn.

use std::collections::BTreeSet;

use openl2m_snmp_dal::snmp::mock::{ScriptedBranch, ScriptedTransport};
use openl2m_snmp_dal::snmp::value::SnmpValue;

use openl2m_snmp_dal::audit::{AuditMeta, RecordingAuditSink};
use openl2m_snmp_dal::authz::{self, Group, Switch, User};
use openl2m_snmp_dal::mutate;
use openl2m_snmp_dal::oid::{Oid, OidName};
use openl2m_snmp_dal::settings::Settings;
use openl2m_snmp_dal::walk;

fn branch(base: OidName, entries: &[(u32, SnmpValue)]) -> ScriptedBranch {
    ScriptedBranch {
        base: base.oid(),
        entries: entries.iter().map(|(i, v)| (base.oid().child(*i), v.clone())).collect(),
    }
}

fn meta() -> AuditMeta {
    AuditMeta { user: "alice".into(), remote_ip: "10.0.0.9".into(), group: "noc".into(), switch: "sw1".into() }
}

/// A switch with one trunk (ifIndex 1, dot1dBasePort 1, PVID 10,
/// tagged for VLAN 20) and one PoE access port (ifIndex 2, named so it
/// matches PoE group/port 1.24 by suffix), reachable only through the
/// full `run_basic_walk` driver.
fn scripted_switch() -> ScriptedTransport {
    let egress_base = OidName::dot1qVlanCurrentEgressPorts.oid();

    ScriptedTransport::new()
        .with_get(OidName::sysDescr.oid().child(0), SnmpValue::OctetString(b"test switch".to_vec()))
        .with_get(OidName::sysObjectID.oid().child(0), SnmpValue::ObjectIdentifier(Oid::new(vec![1, 3, 6, 1, 4, 1, 9])))
        .with_get(OidName::sysUpTime.oid().child(0), SnmpValue::TimeTicks(1000))
        .with_get(OidName::sysContact.oid().child(0), SnmpValue::OctetString(b"noc@example.com".to_vec()))
        .with_get(OidName::sysName.oid().child(0), SnmpValue::OctetString(b"sw1".to_vec()))
        .with_get(OidName::sysLocation.oid().child(0), SnmpValue::OctetString(b"rack 1".to_vec()))
        .with_branch(branch(OidName::ifIndex, &[(1, SnmpValue::Integer(1)), (2, SnmpValue::Integer(2))]))
        .with_branch(branch(OidName::ifType, &[(1, SnmpValue::Integer(6)), (2, SnmpValue::Integer(6))]))
        .with_branch(branch(OidName::ifAdminStatus, &[(1, SnmpValue::Integer(1)), (2, SnmpValue::Integer(1))]))
        .with_branch(branch(OidName::ifOperStatus, &[(1, SnmpValue::Integer(1)), (2, SnmpValue::Integer(1))]))
        .with_branch(branch(OidName::ifDescr, &[(1, SnmpValue::OctetString(b"Gi1/1".to_vec())), (2, SnmpValue::OctetString(b"Gi1/24".to_vec()))]))
        .with_branch(branch(OidName::ifMtu, &[(1, SnmpValue::Integer(1500)), (2, SnmpValue::Integer(1500))]))
        .with_branch(branch(OidName::ifSpeed, &[(1, SnmpValue::Counter32(1_000_000_000)), (2, SnmpValue::Counter32(1_000_000_000))]))
        .with_branch(branch(OidName::ifPhysAddress, &[]))
        .with_branch(branch(OidName::ifName, &[(1, SnmpValue::OctetString(b"Gi1/1".to_vec())), (2, SnmpValue::OctetString(b"Gi1/24".to_vec()))]))
        .with_branch(branch(OidName::ifAlias, &[(1, SnmpValue::OctetString(b"uplink".to_vec())), (2, SnmpValue::OctetString(b"".to_vec()))]))
        .with_branch(branch(OidName::ifHighSpeed, &[(1, SnmpValue::Integer(1000)), (2, SnmpValue::Integer(1000))]))
        .with_get(OidName::dot1qNumVlans.oid().child(0), SnmpValue::Integer(2))
        .with_get(OidName::dot1qGvrpStatus.oid().child(0), SnmpValue::Integer(2))
        .with_branch(ScriptedBranch {
            base: OidName::dot1dBasePortIfIndex.oid(),
            entries: vec![
                (OidName::dot1dBasePortIfIndex.oid().child(1), SnmpValue::Integer(1)),
                (OidName::dot1dBasePortIfIndex.oid().child(2), SnmpValue::Integer(2)),
            ],
        })
        .with_branch(branch(OidName::dot1qVlanStaticRowStatus, &[(10, SnmpValue::Integer(1)), (20, SnmpValue::Integer(1))]))
        .with_branch(branch(OidName::dot1qVlanStaticName, &[(10, SnmpValue::OctetString(b"default".to_vec())), (20, SnmpValue::OctetString(b"engineering".to_vec()))]))
        .with_branch(branch(OidName::dot1qVlanStatus, &[(10, SnmpValue::Integer(1)), (20, SnmpValue::Integer(1))]))
        .with_branch(branch(OidName::dot1qVlanStaticEgressPorts, &[(10, SnmpValue::OctetString(vec![0xC0])), (20, SnmpValue::OctetString(vec![0x80]))]))
        .with_branch(branch(OidName::dot1qPvid, &[(1, SnmpValue::Integer(10)), (2, SnmpValue::Integer(10))]))
        .with_branch(ScriptedBranch {
            base: egress_base.clone(),
            entries: vec![
                (egress_base.extend(&[0, 10]), SnmpValue::OctetString(vec![0xC0])),
                (egress_base.extend(&[0, 20]), SnmpValue::OctetString(vec![0x80])),
            ],
        })
        .with_branch(branch(OidName::dot1qPortGvrpStatus, &[]))
        .with_branch(ScriptedBranch { base: OidName::ipAdEntIfIndex.oid(), entries: vec![] })
        .with_branch(ScriptedBranch { base: OidName::ipAdEntNetMask.oid(), entries: vec![] })
        .with_branch(branch(OidName::pethMainPsePower, &[(1, SnmpValue::Integer(370))]))
        .with_branch(branch(OidName::pethMainPseOperStatus, &[(1, SnmpValue::Integer(1))]))
        .with_branch(branch(OidName::pethMainPseConsumptionPower, &[(1, SnmpValue::Integer(42))]))
        .with_branch(branch(OidName::pethMainPseUsageThreshold, &[(1, SnmpValue::Integer(80))]))
        .with_branch(ScriptedBranch {
            base: OidName::pethPsePortAdminEnable.oid(),
            entries: vec![(OidName::pethPsePortAdminEnable.oid().extend(&[1, 24]), SnmpValue::Integer(1))],
        })
        .with_branch(ScriptedBranch {
            base: OidName::pethPsePortDetectionStatus.oid(),
            entries: vec![(OidName::pethPsePortDetectionStatus.oid().extend(&[1, 24]), SnmpValue::Integer(3))],
        })
}

/// S1 + S2 + S5: one basic walk discovers interfaces, VLANs, the
/// trunk's tagged/untagged membership, and binds the PoE port to its
/// interface by name suffix, all from a single scripted transport.
#[tokio::test]
async fn s1_s2_s5_basic_walk_discovers_topology_and_reconciles_poe() {
    let transport = scripted_switch();
    let ctx = walk::run_basic_walk(&transport, 25).await;

    assert_eq!(ctx.model.system.name, "sw1");
    assert_eq!(ctx.model.interfaces.len(), 2);

    let trunk = ctx.model.interface(1).unwrap();
    assert_eq!(trunk.untagged_vlan, Some(10));
    assert!(trunk.tagged_vlans.contains(&20), "trunk should egress vlan 20 tagged per the current-egress bitmap");

    let access = ctx.model.interface(2).unwrap();
    assert_eq!(access.name, "Gi1/24");

    // the PoE port keyed "1.24" should have been bound to ifIndex 2 by
    // interface-name suffix, with no ambiguity warning since there is
    // exactly one interface ending in "1/24".
    assert!(ctx.warnings.iter().all(|w| !w.contains("ambiguous")), "unexpected ambiguity: {:?}", ctx.warnings);
}

/// S6: a non-superuser whose group only grants VLAN 20 cannot manage
/// the trunk (untagged in VLAN 10), but a superuser can.
#[tokio::test]
async fn s6_authorization_denies_interface_outside_allowed_vlans() {
    let transport = scripted_switch();
    let mut ctx = walk::run_basic_walk(&transport, 25).await;

    let switch = Switch { vlans: BTreeSet::from([10, 20]), ..Default::default() };
    let group = Group { vlans: BTreeSet::from([20]), ..Default::default() };
    let settings = Settings::default();

    authz::compute_flags(&mut ctx.model, &User::default(), &group, &switch, &settings);
    assert!(!ctx.model.interface(1).unwrap().manageable, "trunk's untagged vlan 10 is outside the group's allowed set");

    authz::compute_flags(&mut ctx.model, &User { is_superuser: true, ..Default::default() }, &group, &switch, &settings);
    assert!(ctx.model.interface(1).unwrap().manageable, "superusers bypass the allowed-vlan restriction");
}

/// S4: moving the trunk's untagged VLAN from 10 to 20 through the
/// mutation engine, against the same model the walk produced.
#[tokio::test]
async fn s4_full_walk_then_vlan_move_updates_model_and_audits() {
    let egress_base = OidName::dot1qVlanStaticEgressPorts.oid();
    let current_base = OidName::dot1qVlanCurrentEgressPorts.oid();
    // the mutation engine GETs these OIDs directly (not via bulk walk),
    // so they need registering as scalar gets too, on top of the
    // branch entries `scripted_switch` already sets up for the walk.
    let transport = scripted_switch()
        .with_get(egress_base.child(10), SnmpValue::OctetString(vec![0xC0]))
        .with_get(current_base.extend(&[0, 10]), SnmpValue::OctetString(vec![0x00]))
        .with_get(current_base.extend(&[0, 20]), SnmpValue::OctetString(vec![0xC0]));
    let mut ctx = walk::run_basic_walk(&transport, 25).await;
    let sink = RecordingAuditSink::new();

    mutate::set_untagged_vlan(&transport, &mut ctx.model, &sink, &meta(), 1, 10, 20).await.unwrap();

    assert_eq!(ctx.model.interface(1).unwrap().untagged_vlan, Some(20));
    assert!(sink.events().iter().any(|e| e.action_code == "set_untagged_vlan"));
}
