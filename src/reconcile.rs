// SPDX-License-Identifier: MIT

//! Index Reconciler (C5): folds the overlapping indexing schemes the
//! MIB walkers (C4) leave lying around — PoE `<group>.<port>` entries,
//! the Q-Bridge port-id map, LLDP remote keys — into the single ifIndex
//! keyspace the rest of the model uses. Q-Bridge↔ifIndex and IP↔ifIndex
//! are folded in directly by `crate::walk::bridge`/`crate::walk::ip`
//! since they're produced by a single table walk each; this module
//! covers the reconciliation step that genuinely needs a second pass
//! over already-walked data: PoE port-to-interface suffix matching.

use tracing::warn;

use crate::model::DeviceModel;

/// Matches each `PoePort` (keyed `<group>.<port>`) to the interface
/// whose name ends with `<group>/<port>` (§4.5). Ties are broken by
/// first-found in ifIndex order; an ambiguous match (more than one
/// interface name ending with the same suffix) is logged, not an error.
pub fn reconcile_poe_ports(model: &mut DeviceModel) -> Vec<String> {
    let mut warnings = Vec::new();
    let keys: Vec<String> = model.poe_ports.keys().cloned().collect();

    for key in keys {
        let suffix = model.poe_ports[&key].interface_suffix();
        let matches: Vec<u32> = model
            .interfaces
            .values()
            .filter(|iface| iface.name.ends_with(&suffix))
            .map(|iface| iface.if_index)
            .collect();

        if matches.len() > 1 {
            warn!(suffix = %suffix, candidates = ?matches, "ambiguous PoE port to interface match, using first");
            warnings.push(format!("PoE entry {key} matches {} interfaces by suffix {suffix}, using ifIndex {}", matches.len(), matches[0]));
        }

        if let Some(&if_index) = matches.first() {
            let port = model.poe_ports[&key].clone();
            if let Some(iface) = model.interface_mut(if_index) {
                iface.poe_port = Some(port);
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Interface, PoePort};

    #[test]
    fn s5_poe_entries_bind_to_interfaces_by_suffix() {
        let mut model = DeviceModel::new();
        let mut gi = Interface::new(1);
        gi.name = "GigabitEthernet1/24".to_string();
        let mut ten = Interface::new(2);
        ten.name = "TenGig2/3".to_string();
        model.interfaces.insert(1, gi);
        model.interfaces.insert(2, ten);
        model.poe_ports.insert("1.24".to_string(), PoePort { group: 1, port: 24, admin_status: None, detect_status: None });
        model.poe_ports.insert("2.3".to_string(), PoePort { group: 2, port: 3, admin_status: None, detect_status: None });

        let warnings = reconcile_poe_ports(&mut model);

        assert!(warnings.is_empty());
        assert!(model.interface(1).unwrap().poe_port.is_some());
        assert_eq!(model.interface(2).unwrap().poe_port.as_ref().unwrap().group, 2);
    }

    #[test]
    fn logs_ambiguity_but_still_picks_first_match() {
        let mut model = DeviceModel::new();
        let mut a = Interface::new(1);
        a.name = "Gi1/24".to_string();
        let mut b = Interface::new(2);
        b.name = "Lag-Gi1/24".to_string();
        model.interfaces.insert(1, a);
        model.interfaces.insert(2, b);
        model.poe_ports.insert("1.24".to_string(), PoePort { group: 1, port: 24, admin_status: None, detect_status: None });

        let warnings = reconcile_poe_ports(&mut model);

        assert_eq!(warnings.len(), 1);
        assert!(model.interface(1).unwrap().poe_port.is_some() || model.interface(2).unwrap().poe_port.is_some());
    }
}
