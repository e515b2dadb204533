// SPDX-License-Identifier: MIT

//! OID Registry & Parser Dispatcher (C2).
//!
//! A static table of symbolic names to base OIDs, plus the `oid_in_branch`
//! helper branch walkers use to test membership and extract the table index
//! suffix beneath a branch.

use std::fmt;

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// A dotted SNMP object identifier, e.g. `1.3.6.1.2.1.2.2.1.1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Oid(pub Vec<u32>);

impl Oid {
    pub fn new(components: Vec<u32>) -> Self {
        Oid(components)
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let comps: Result<Vec<u32>, _> = s
            .trim_start_matches('.')
            .split('.')
            .filter(|p| !p.is_empty())
            .map(|p| p.parse::<u32>())
            .collect();
        comps.ok().map(Oid)
    }

    pub fn child(&self, suffix: u32) -> Oid {
        let mut v = self.0.clone();
        v.push(suffix);
        Oid(v)
    }

    pub fn extend(&self, suffix: &[u32]) -> Oid {
        let mut v = self.0.clone();
        v.extend_from_slice(suffix);
        Oid(v)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &Oid) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    /// Returns the components of `self` beneath `branch`, or `None` if
    /// `self` does not fall under `branch` at all.
    ///
    /// Used by `getbulk` iteration to decide when a walk has left its
    /// requested branch, and by the default parser dispatcher to recover
    /// the table index (the part of the OID after the base OID).
    pub fn suffix_of(&self, branch: &Oid) -> Option<&[u32]> {
        if self.starts_with(branch) {
            Some(&self.0[branch.0.len()..])
        } else {
            None
        }
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// `oid_in_branch(branch, oid)`: `Some(suffix)` when `oid` is beneath
/// `branch.`, `None` ("not in this branch") otherwise.
pub fn oid_in_branch<'a>(branch: &Oid, oid: &'a Oid) -> Option<&'a [u32]> {
    oid.suffix_of(branch)
}

macro_rules! oid_table {
    ($($name:ident => $lit:literal),+ $(,)?) => {
        /// Symbolic names for the standard MIB objects this DAL walks.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[allow(non_camel_case_types)]
        pub enum OidName {
            $($name),+
        }

        static OID_TABLE: Lazy<HashMap<OidName, Oid>> = Lazy::new(|| {
            let mut m = HashMap::new();
            $(m.insert(OidName::$name, Oid::from_str($lit).expect("static OID literal"));)+
            m
        });
    };
}

oid_table! {
    sysDescr => "1.3.6.1.2.1.1.1",
    sysObjectID => "1.3.6.1.2.1.1.2",
    sysUpTime => "1.3.6.1.2.1.1.3",
    sysContact => "1.3.6.1.2.1.1.4",
    sysName => "1.3.6.1.2.1.1.5",
    sysLocation => "1.3.6.1.2.1.1.6",

    ifIndex => "1.3.6.1.2.1.2.2.1.1",
    ifType => "1.3.6.1.2.1.2.2.1.3",
    ifMtu => "1.3.6.1.2.1.2.2.1.4",
    ifSpeed => "1.3.6.1.2.1.2.2.1.5",
    ifPhysAddress => "1.3.6.1.2.1.2.2.1.6",
    ifAdminStatus => "1.3.6.1.2.1.2.2.1.7",
    ifOperStatus => "1.3.6.1.2.1.2.2.1.8",
    ifDescr => "1.3.6.1.2.1.2.2.1.2",

    ifName => "1.3.6.1.2.1.31.1.1.1.1",
    ifAlias => "1.3.6.1.2.1.31.1.1.1.18",
    ifHighSpeed => "1.3.6.1.2.1.31.1.1.1.15",

    dot1dBasePortIfIndex => "1.3.6.1.2.1.17.1.4.1.2",

    dot1qVlanVersionNumber => "1.3.6.1.2.1.17.7.1.1.1",
    dot1qNumVlans => "1.3.6.1.2.1.17.7.1.1.2",
    dot1qGvrpStatus => "1.3.6.1.2.1.17.7.1.1.3",
    ieee8021QBridgeMvrpEnabledStatus => "1.3.6.1.2.1.243.1.1.1.1.1",

    dot1qVlanStaticRowStatus => "1.3.6.1.2.1.17.7.1.4.3.1.5",
    dot1qVlanStaticName => "1.3.6.1.2.1.17.7.1.4.3.1.1",
    dot1qVlanStatus => "1.3.6.1.2.1.17.7.1.4.2.1.3",
    dot1qVlanStaticEgressPorts => "1.3.6.1.2.1.17.7.1.4.3.1.2",
    dot1qVlanCurrentEgressPorts => "1.3.6.1.2.1.17.7.1.4.2.1.4",

    dot1qPvid => "1.3.6.1.2.1.17.7.1.4.5.1.1",
    dot1qPortGvrpStatus => "1.3.6.1.2.1.17.7.1.4.5.1.4",

    ipAdEntIfIndex => "1.3.6.1.2.1.4.20.1.2",
    ipAdEntNetMask => "1.3.6.1.2.1.4.20.1.3",

    pethPsePortAdminEnable => "1.3.6.1.2.1.105.1.1.1.3",
    pethPsePortDetectionStatus => "1.3.6.1.2.1.105.1.1.1.6",
    pethMainPsePower => "1.3.6.1.2.1.105.1.3.1.1.2",
    pethMainPseOperStatus => "1.3.6.1.2.1.105.1.3.1.1.3",
    pethMainPseConsumptionPower => "1.3.6.1.2.1.105.1.3.1.1.4",
    pethMainPseUsageThreshold => "1.3.6.1.2.1.105.1.3.1.1.5",

    dot1dTpFdbPort => "1.3.6.1.2.1.17.4.3.1.2",
    ipNetToMediaPhysAddress => "1.3.6.1.2.1.4.22.1.2",

    lldpRemPortId => "1.0.8802.1.1.2.1.4.1.1.7",
    lldpRemPortDesc => "1.0.8802.1.1.2.1.4.1.1.8",
    lldpRemSysName => "1.0.8802.1.1.2.1.4.1.1.9",
    lldpRemSysDesc => "1.0.8802.1.1.2.1.4.1.1.10",
    lldpRemSysCapEnabled => "1.0.8802.1.1.2.1.4.1.1.12",
    lldpRemChassisIdSubtype => "1.0.8802.1.1.2.1.4.1.1.4",
    lldpRemChassisId => "1.0.8802.1.1.2.1.4.1.1.5",

    entPhysicalClass => "1.3.6.1.2.1.47.1.1.1.1.5",
    entPhysicalSerialNum => "1.3.6.1.2.1.47.1.1.1.1.11",
    entPhysicalSoftwareRev => "1.3.6.1.2.1.47.1.1.1.1.10",
    entPhysicalModelName => "1.3.6.1.2.1.47.1.1.1.1.13",
}

impl OidName {
    /// The base OID this symbolic name refers to.
    pub fn oid(self) -> Oid {
        OID_TABLE.get(&self).expect("all variants registered").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_of_detects_branch_membership() {
        let branch = OidName::ifIndex.oid();
        let inside = branch.child(5);
        let outside = Oid::from_str("1.3.6.1.2.1.2.2.1.2.5").unwrap();

        assert_eq!(oid_in_branch(&branch, &inside), Some(&[5u32][..]));
        assert_eq!(oid_in_branch(&branch, &outside), None);
    }

    #[test]
    fn oid_round_trips_through_string() {
        let oid = Oid::new(vec![1, 3, 6, 1, 2, 1, 1, 1]);
        assert_eq!(Oid::from_str(&oid.to_string()).unwrap(), oid);
    }

    #[test]
    fn every_registered_name_resolves() {
        assert_eq!(OidName::sysDescr.oid().to_string(), "1.3.6.1.2.1.1.1");
        assert_eq!(
            OidName::dot1qVlanCurrentEgressPorts.oid().to_string(),
            "1.3.6.1.2.1.17.7.1.4.2.1.4"
        );
    }
}
