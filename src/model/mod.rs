// SPDX-License-Identifier: MIT

pub mod address;
pub mod device;
pub mod interface;
pub mod neighbor;
pub mod poe;
pub mod stack;
pub mod system;
pub mod vlan;

pub use address::{EthernetAddress, Ip4Address};
pub use device::DeviceModel;
pub use interface::{AdminStatus, IfType, Interface, OperStatus};
pub use neighbor::{LldpCapabilities, NeighborDevice, NeighborKey};
pub use poe::{PoeAdminStatus, PoeDetectStatus, PoePSE, PoePort};
pub use stack::{StackMember, StackMemberType};
pub use system::System;
pub use vlan::{Vlan, VlanStatus};
