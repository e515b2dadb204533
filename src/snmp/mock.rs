// SPDX-License-Identifier: MIT

//! A scripted `Transport` double used by the end-to-end scenario tests
//! (§8 S1–S6). Always compiled (not `#[cfg(test)]`-gated) so both this
//! crate's own tests and any downstream integration test can drive a
//! connector without a real agent.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{DalError, DalResult};
use crate::oid::Oid;
use crate::snmp::transport::{Transport, VarBind};
use crate::snmp::value::SnmpValue;

/// One scripted table: a branch base OID plus the varbinds an agent
/// would return for a walk of that branch, in order.
#[derive(Debug, Clone)]
pub struct ScriptedBranch {
    pub base: Oid,
    pub entries: Vec<(Oid, SnmpValue)>,
}

#[derive(Default)]
pub struct ScriptedTransport {
    branches: Mutex<Vec<ScriptedBranch>>,
    gets: Mutex<Vec<(Oid, SnmpValue)>>,
    sets: Mutex<Vec<(Oid, SnmpValue)>>,
    recorded_sets: Mutex<Vec<(Oid, SnmpValue)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branch(self, branch: ScriptedBranch) -> Self {
        self.branches.lock().unwrap().push(branch);
        self
    }

    pub fn with_get(self, oid: Oid, value: SnmpValue) -> Self {
        self.gets.lock().unwrap().push((oid, value));
        self
    }

    /// Queues the value to return for a `set()`/`set_multi()` on `oid`
    /// when the mutation engine re-reads it (e.g. step 3's GET of the
    /// static egress bitmap) by also registering it as a `get`.
    pub fn with_set_ack(self, oid: Oid, value: SnmpValue) -> Self {
        self.sets.lock().unwrap().push((oid, value));
        self
    }

    pub fn recorded_sets(&self) -> Vec<(Oid, SnmpValue)> {
        self.recorded_sets.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, oid: &Oid) -> DalResult<VarBind> {
        let gets = self.gets.lock().unwrap();
        for (o, v) in gets.iter() {
            if o == oid {
                return Ok(VarBind { oid: oid.clone(), value: v.clone() });
            }
        }
        Err(DalError::NoSuchObject(oid.clone()))
    }

    async fn get_bulk_page(&self, start_oid: &Oid, _non_repeaters: u32, max_repetitions: u32) -> DalResult<Vec<VarBind>> {
        let branches = self.branches.lock().unwrap();
        for branch in branches.iter() {
            if start_oid.starts_with(&branch.base) || *start_oid == branch.base {
                let mut page = Vec::new();
                for (oid, value) in &branch.entries {
                    if oid > start_oid {
                        page.push(VarBind { oid: oid.clone(), value: value.clone() });
                        if page.len() as u32 >= max_repetitions {
                            break;
                        }
                    }
                }
                return Ok(page);
            }
        }
        Ok(Vec::new())
    }

    async fn set(&self, oid: &Oid, value: SnmpValue) -> DalResult<()> {
        self.recorded_sets.lock().unwrap().push((oid.clone(), value));
        Ok(())
    }

    async fn set_multi(&self, items: &[(Oid, SnmpValue)]) -> DalResult<()> {
        let mut recorded = self.recorded_sets.lock().unwrap();
        for (oid, value) in items {
            recorded.push((oid.clone(), value.clone()));
        }
        Ok(())
    }
}
