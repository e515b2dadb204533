// SPDX-License-Identifier: MIT

//! SNMP Device Abstraction Layer for the OpenL2M layer-2 switch
//! console: discovers a switch's topology by bulk-walking a prescribed
//! set of standard MIBs, reconciles the overlapping indexing schemes
//! those MIBs use into one coherent device model, caches that model per
//! user session, applies a layered authorization policy, and performs
//! the transactional multi-OID writes a VLAN or PoE change requires.
//!
//! Entry point: [`connector::new_connector`].

pub mod audit;
pub mod authz;
pub mod bytes;
pub mod cache;
pub mod connector;
pub mod error;
mod macros;
pub mod model;
pub mod mutate;
pub mod oid;
pub mod reconcile;
pub mod settings;
pub mod snmp;
pub mod walk;

pub use audit::{AuditEvent, AuditEventKind, AuditMeta, AuditSink, NullAuditSink, RecordingAuditSink};
pub use authz::{Group, Switch, User, VlanGroup};
pub use cache::{CacheSlice, InMemorySessionStore, SessionStore};
pub use connector::{new_connector, Connector, SessionInfo, StandardCapabilities, SwitchRecord, VendorCapabilities};
pub use error::{DalError, DalResult};
pub use model::DeviceModel;
pub use oid::{Oid, OidName};
pub use settings::Settings;
pub use snmp::{Credentials, Transport, UdpTransport};
