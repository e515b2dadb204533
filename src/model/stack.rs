// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackMemberType {
    Stack,
    Chassis,
    Module,
}

impl StackMemberType {
    /// `entPhysicalClass` values relevant to stack-member discovery.
    pub fn from_ent_physical_class(v: i64) -> Option<Self> {
        match v {
            3 => Some(StackMemberType::Chassis),
            9 => Some(StackMemberType::Module),
            11 => Some(StackMemberType::Stack),
            _ => None,
        }
    }
}

/// One entry from the ENTITY-MIB hardware walk, keyed by entity id in
/// `DeviceModel::stack_members`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackMember {
    pub entity_id: u32,
    pub member_type: StackMemberType,
    pub serial: Option<String>,
    pub firmware_version: Option<String>,
    pub model: Option<String>,
}

impl StackMember {
    pub fn new(entity_id: u32, member_type: StackMemberType) -> Self {
        StackMember {
            entity_id,
            member_type,
            serial: None,
            firmware_version: None,
            model: None,
        }
    }
}
