// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::oid::Oid;

/// Error taxonomy for the SNMP device abstraction layer.
///
/// Branch walkers (see `crate::walk`) absorb `Transport`/`Auth`/`Protocol`
/// errors locally and continue with the next branch; everything else
/// surfaces to the connector's caller.
#[derive(Debug, Error)]
pub enum DalError {
    #[error("SNMP transport error talking to {peer}: {source}")]
    Transport {
        peer: String,
        #[source]
        source: std::io::Error,
    },

    #[error("SNMP transport timed out after {attempts} attempt(s)")]
    Timeout { attempts: u32 },

    #[error("SNMP security negotiation failed: {0}")]
    Auth(String),

    #[error("agent returned error-status {status} (index {index}) for request on {oid}")]
    Protocol {
        status: u32,
        index: u32,
        oid: Oid,
    },

    #[error("no such object: {0}")]
    NoSuchObject(Oid),

    #[error("failed to decode value at {oid}: {reason}")]
    Decode { oid: Oid, reason: String },

    #[error("policy denied the operation before any SNMP write: {0}")]
    Policy(String),

    #[error("mutation partially applied; last successful step was {last_good_step}")]
    PartialUpdate { last_good_step: &'static str },

    #[error("interface is not participating in the bridge (no dot1dBasePort)")]
    NotBridged,

    #[error("no SNMP profile is bound to this switch")]
    Configuration(String),
}

pub type DalResult<T> = Result<T, DalError>;
