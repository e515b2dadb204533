// SPDX-License-Identifier: MIT

//! Authorization Filter (C7): computes per-interface `visible`/
//! `manageable`/`can_edit_alias`/`allow_poe_toggle` flags from
//! user×group×switch policy (§4.7). Runs after every basic walk and
//! after every cache restore — flags are never persisted as part of the
//! model's own truth, only derived from it.

use std::collections::BTreeSet;

use crate::model::{DeviceModel, IfType};
use crate::settings::Settings;

#[derive(Debug, Clone, Default)]
pub struct VlanGroup {
    pub vlans: BTreeSet<u16>,
}

#[derive(Debug, Clone, Default)]
pub struct Group {
    pub read_only: bool,
    pub edit_alias: bool,
    pub poe_toggle: bool,
    pub vlans: BTreeSet<u16>,
    pub vlan_groups: Vec<VlanGroup>,
}

#[derive(Debug, Clone, Default)]
pub struct User {
    pub is_superuser: bool,
    pub read_only: bool,
    pub edit_alias: bool,
    pub poe_toggle: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Switch {
    pub read_only: bool,
    pub edit_alias: bool,
    pub poe_toggle: bool,
    pub vlans: BTreeSet<u16>,
}

/// The default ifType set treated as manageable interfaces; ports,
/// port-channels, and SVIs, but not loopbacks or tunnels.
fn default_visible_types(if_type: IfType) -> bool {
    matches!(if_type, IfType::EthernetCsmacd | IfType::Ieee8023adLag | IfType::L2vlan)
}

/// `allowed_vlans(user,group,switch)` (§4.7): superusers see every VLAN
/// the switch has; everyone else sees the intersection of what their
/// group (directly or via a vlan_group) grants with what the switch
/// actually carries. A read-only group grants nothing to non-superusers.
pub fn allowed_vlans(user: &User, group: &Group, switch: &Switch) -> BTreeSet<u16> {
    if user.is_superuser {
        return switch.vlans.clone();
    }
    if group.read_only {
        return BTreeSet::new();
    }
    let mut granted: BTreeSet<u16> = group.vlans.clone();
    for vg in &group.vlan_groups {
        granted.extend(vg.vlans.iter().copied());
    }
    granted.intersection(&switch.vlans).copied().collect()
}

/// Recomputes `visible`/`manageable`/`can_edit_alias`/`allow_poe_toggle`
/// on every interface in `model` from (user, group, switch, settings).
/// Order matters: the ethernet-type invariant applies before the
/// superuser early-return, since invariant 5 only guarantees
/// `visible=true` for superusers, not `manageable=true`.
pub fn compute_flags(model: &mut DeviceModel, user: &User, group: &Group, switch: &Switch, settings: &Settings) {
    let allowed = allowed_vlans(user, group, switch);
    let hide_ifname = settings.hide_ifname_regex();
    let hide_ifdescr = settings.hide_ifdescr_regex();

    for iface in model.interfaces.values_mut() {
        iface.visible = true;
        iface.manageable = true;
        iface.can_edit_alias = false;
        iface.allow_poe_toggle = false;

        if !iface.if_type.is_ethernet() {
            iface.manageable = false;
        }

        if group.read_only || switch.read_only || user.read_only {
            iface.manageable = false;
        }

        if user.is_superuser {
            iface.visible = true;
            iface.can_edit_alias = true;
            iface.allow_poe_toggle = true;
            continue;
        }

        if settings.always_allow_poe_toggle || switch.poe_toggle || group.poe_toggle || user.poe_toggle {
            iface.allow_poe_toggle = true;
        }

        if switch.edit_alias && group.edit_alias && user.edit_alias {
            iface.can_edit_alias = true;
        }

        let type_visible = default_visible_types(iface.if_type)
            && !(settings.hide_none_ethernet_interfaces && !iface.if_type.is_ethernet());
        if !type_visible {
            iface.visible = false;
            iface.manageable = false;
        }

        if let Some(re) = &hide_ifname {
            if re.is_match(&iface.name) {
                iface.manageable = false;
            }
        }
        if let Some(re) = &hide_ifdescr {
            if re.is_match(&iface.alias) {
                iface.manageable = false;
            }
        }

        if let Some(limit) = settings.iface_hide_speed_above {
            if iface.speed_mbps.map(|s| s > limit).unwrap_or(false) {
                iface.manageable = false;
            }
        }

        if let Some(vid) = iface.untagged_vlan {
            if !allowed.contains(&vid) {
                iface.manageable = false;
            }
        }
    }
}
