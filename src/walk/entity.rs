// SPDX-License-Identifier: MIT

//! ENTITY-MIB walk — hardware walk only (§4.4): stack/chassis/module
//! inventory, cached by the session cache once fetched.

use futures::StreamExt;

use crate::error::DalResult;
use crate::model::{DeviceModel, StackMember, StackMemberType};
use crate::oid::OidName;
use crate::snmp::{walk_branch, Transport};

pub async fn walk_entity(transport: &dyn Transport, model: &mut DeviceModel, max_repetitions: u32) -> DalResult<u64> {
    let mut count = 0u64;

    let class_base = OidName::entPhysicalClass.oid();
    let mut stream = walk_branch(transport, class_base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some(&[entity_id]) = vb.oid.suffix_of(&class_base) else { continue };
        let Some(member_type) = vb.value.as_integer().and_then(StackMemberType::from_ent_physical_class) else { continue };
        model.stack_members.insert(entity_id, StackMember::new(entity_id, member_type));
    }

    let serial_base = OidName::entPhysicalSerialNum.oid();
    let mut stream = walk_branch(transport, serial_base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some(&[entity_id]) = vb.oid.suffix_of(&serial_base) else { continue };
        if let Some(member) = model.stack_members.get_mut(&entity_id) {
            member.serial = vb.value.as_str().map(String::from);
        }
    }

    let firmware_base = OidName::entPhysicalSoftwareRev.oid();
    let mut stream = walk_branch(transport, firmware_base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some(&[entity_id]) = vb.oid.suffix_of(&firmware_base) else { continue };
        if let Some(member) = model.stack_members.get_mut(&entity_id) {
            member.firmware_version = vb.value.as_str().map(String::from);
        }
    }

    let model_base = OidName::entPhysicalModelName.oid();
    let mut stream = walk_branch(transport, model_base.clone(), max_repetitions);
    while let Some(item) = stream.next().await {
        let vb = item?;
        count += 1;
        let Some(&[entity_id]) = vb.oid.suffix_of(&model_base) else { continue };
        if let Some(member) = model.stack_members.get_mut(&entity_id) {
            member.model = vb.value.as_str().map(String::from);
        }
    }

    Ok(count)
}
