// SPDX-License-Identifier: MIT

pub mod ber;
pub mod credentials;
pub mod mock;
pub mod pdu;
pub mod transport;
pub mod usm;
pub mod value;

pub use credentials::{AuthProtocol, Credentials, PrivProtocol, SecurityLevel, UsmCredentials};
pub use transport::{walk_branch, BranchTiming, Transport, UdpTransport, VarBind};
pub use value::SnmpValue;
