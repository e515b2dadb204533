// SPDX-License-Identifier: MIT

//! Host-provided configuration, threaded explicitly into connector
//! construction rather than read from process-wide globals (see the
//! "Global settings as state" design note).

use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EthFormat {
    Colon,
    Hyphen,
    Cisco,
}

impl Default for EthFormat {
    fn default() -> Self {
        EthFormat::Colon
    }
}

fn default_snmp_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_snmp_retries() -> u32 {
    3
}

fn default_max_repetitions() -> u32 {
    25
}

fn default_poe_toggle_delay() -> Duration {
    Duration::from_secs(3)
}

fn default_port_toggle_delay() -> Duration {
    Duration::from_secs(0)
}

/// Settings recognized per spec §6, with the documented defaults. Hosts
/// deserialize this from their own configuration store (e.g. via
/// `serde_json`) and pass it into `new_connector`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_snmp_timeout", with = "duration_secs")]
    pub snmp_timeout: Duration,
    #[serde(default = "default_snmp_retries")]
    pub snmp_retries: u32,
    #[serde(default = "default_max_repetitions")]
    pub snmp_max_repetitions: u32,

    #[serde(default = "default_port_toggle_delay", with = "duration_secs")]
    pub port_toggle_delay: Duration,
    #[serde(default = "default_poe_toggle_delay", with = "duration_secs")]
    pub poe_toggle_delay: Duration,

    #[serde(default)]
    pub always_allow_poe_toggle: bool,

    #[serde(default)]
    pub iface_hide_regex_ifname: Option<String>,
    #[serde(default)]
    pub iface_hide_regex_ifdescr: Option<String>,
    #[serde(default)]
    pub iface_hide_speed_above: Option<u64>,
    #[serde(default)]
    pub iface_alias_not_allow_regex: Option<String>,
    #[serde(default)]
    pub iface_alias_keep_beginning_regex: Option<String>,

    #[serde(default)]
    pub eth_format: EthFormat,
    #[serde(default)]
    pub eth_format_uppercase: bool,

    #[serde(default)]
    pub hide_none_ethernet_interfaces: bool,

    #[serde(default)]
    pub log_max_age: Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            snmp_timeout: default_snmp_timeout(),
            snmp_retries: default_snmp_retries(),
            snmp_max_repetitions: default_max_repetitions(),
            port_toggle_delay: default_port_toggle_delay(),
            poe_toggle_delay: default_poe_toggle_delay(),
            always_allow_poe_toggle: false,
            iface_hide_regex_ifname: None,
            iface_hide_regex_ifdescr: None,
            iface_hide_speed_above: None,
            iface_alias_not_allow_regex: None,
            iface_alias_keep_beginning_regex: None,
            eth_format: EthFormat::default(),
            eth_format_uppercase: false,
            hide_none_ethernet_interfaces: false,
            log_max_age: None,
        }
    }
}

impl Settings {
    pub fn hide_ifname_regex(&self) -> Option<Regex> {
        self.iface_hide_regex_ifname.as_deref().and_then(|p| Regex::new(p).ok())
    }

    pub fn hide_ifdescr_regex(&self) -> Option<Regex> {
        self.iface_hide_regex_ifdescr.as_deref().and_then(|p| Regex::new(p).ok())
    }

    pub fn alias_not_allow_regex(&self) -> Option<Regex> {
        self.iface_alias_not_allow_regex.as_deref().and_then(|p| Regex::new(p).ok())
    }

    pub fn alias_keep_beginning_regex(&self) -> Option<Regex> {
        self.iface_alias_keep_beginning_regex.as_deref().and_then(|p| Regex::new(p).ok())
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}
