// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::oid::Oid;

/// SNMP values as a tagged variant (per the "dynamic dispatch on
/// SNMP-type strings" design note: enumerate the type, let parsers match
/// the tag instead of branching on a string).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnmpValue {
    Integer(i64),
    OctetString(Vec<u8>),
    Null,
    ObjectIdentifier(Oid),
    IpAddress([u8; 4]),
    Counter32(u32),
    Unsigned32(u32),
    TimeTicks(u32),
    Opaque(Vec<u8>),
    Counter64(u64),
    /// Agent-reported exception values, carried through rather than
    /// mapped to a transport error: a `getbulk` response legitimately
    /// ends a column with one of these.
    NoSuchObject,
    NoSuchInstance,
    EndOfMibView,
}

impl SnmpValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SnmpValue::Integer(v) => Some(*v),
            SnmpValue::Counter32(v) | SnmpValue::Unsigned32(v) | SnmpValue::TimeTicks(v) => {
                Some(*v as i64)
            }
            SnmpValue::Counter64(v) => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_octet_string(&self) -> Option<&[u8]> {
        match self {
            SnmpValue::OctetString(b) | SnmpValue::Opaque(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_octet_string().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            SnmpValue::NoSuchObject | SnmpValue::NoSuchInstance | SnmpValue::EndOfMibView
        )
    }
}
