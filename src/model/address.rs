// SPDX-License-Identifier: MIT

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::settings::EthFormat;

/// A 6-byte hardware address, with an optionally resolved IPv4 address
/// (from ARP).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EthernetAddress(pub [u8; 6]);

impl EthernetAddress {
    pub fn new(bytes: [u8; 6]) -> Self {
        EthernetAddress(bytes)
    }

    /// Parses a 6-byte octet string as learned off the wire
    /// (`dot1dTpFdbAddress`, `ipNetToMediaPhysAddress`).
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; 6] = bytes.try_into().ok()?;
        Some(EthernetAddress(arr))
    }

    pub fn encode(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Renders the address per `ETH_FORMAT`/`ETH_FORMAT_UPPERCASE`.
    pub fn format(&self, style: EthFormat, uppercase: bool) -> String {
        let hex: Vec<String> = self.0.iter().map(|b| format!("{b:02x}")).collect();
        let s = match style {
            EthFormat::Colon => hex.join(":"),
            EthFormat::Hyphen => hex.join("-"),
            EthFormat::Cisco => hex
                .chunks(2)
                .map(|pair| pair.concat())
                .collect::<Vec<_>>()
                .join("."),
        };
        if uppercase {
            s.to_uppercase()
        } else {
            s
        }
    }

    /// Parses any of the three `ETH_FORMAT` renderings back into bytes.
    pub fn parse_formatted(s: &str) -> Option<Self> {
        let hex: String = s.chars().filter(|c| *c != ':' && *c != '-' && *c != '.').collect();
        if hex.len() != 12 {
            return None;
        }
        let mut bytes = [0u8; 6];
        for i in 0..6 {
            bytes[i] = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(EthernetAddress(bytes))
    }
}

impl fmt::Display for EthernetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(EthFormat::Colon, false))
    }
}

/// An IPv4 address with its netmask; prefix length is derived on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ip4Address {
    pub address: Ipv4Addr,
    pub netmask: Ipv4Addr,
}

impl Ip4Address {
    pub fn new(address: Ipv4Addr, netmask: Ipv4Addr) -> Self {
        Ip4Address { address, netmask }
    }

    pub fn prefix_len(&self) -> u32 {
        u32::from(self.netmask).count_ones()
    }
}

impl fmt::Display for Ip4Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len())
    }
}
