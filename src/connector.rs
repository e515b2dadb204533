// SPDX-License-Identifier: MIT

//! The boundary adapter's single entry point: selects/builds a
//! connector bound to one switch, wires C1 (Transport) through C9
//! (Audit) together, and exposes the method surface an operator action
//! drives (§6).

use std::collections::{BTreeSet, HashMap};
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;

use crate::audit::{AuditEvent, AuditEventKind, AuditMeta, AuditSink};
use crate::authz::{self, Group, User};
use crate::cache::{restore_for_switch, CacheSlice, SessionStore};
use crate::error::{DalError, DalResult};
use crate::model::{AdminStatus, DeviceModel, Interface, Vlan};
use crate::mutate;
use crate::settings::Settings;
use crate::snmp::credentials::Credentials;
use crate::snmp::transport::BranchTiming;
use crate::snmp::{Transport, UdpTransport};
use crate::walk;

/// The subset of a host's Switch persistence record this crate needs;
/// everything else (inventory metadata, group membership, etc.) lives
/// outside the DAL's scope.
#[derive(Debug, Clone)]
pub struct SwitchRecord {
    pub switch_id: String,
    pub peer: SocketAddr,
    pub credentials: Option<Credentials>,
    pub vlans: BTreeSet<u16>,
    pub read_only: bool,
    pub edit_alias: bool,
    pub poe_toggle: bool,
}

/// Per-request session identity; `session_key` scopes the cache,
/// `remote_ip` is threaded into every audit event.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub session_key: String,
    pub remote_ip: String,
}

/// Per-vendor override point (§9's capability-set design note): the
/// standard SNMP-only implementation is the default; vendor variants
/// override individual capabilities rather than the whole connector.
#[async_trait]
pub trait VendorCapabilities: Send + Sync {
    fn can_save_config(&self) -> bool {
        false
    }

    async fn save_config(&self, _transport: &dyn Transport) -> DalResult<()> {
        Ok(())
    }
}

/// The SNMP-only baseline: no vendor-specific "copy running to startup"
/// command, so `save_config` is a capability-checked no-op.
#[derive(Debug, Default)]
pub struct StandardCapabilities;

impl VendorCapabilities for StandardCapabilities {}

pub struct Connector {
    transport: Box<dyn Transport>,
    model: DeviceModel,
    settings: Settings,
    user: User,
    group: Group,
    switch: SwitchRecord,
    session: SessionInfo,
    sink: Arc<dyn AuditSink>,
    capabilities: Box<dyn VendorCapabilities>,
    warnings: Vec<String>,
    timing: HashMap<String, BranchTiming>,
    hardware_loaded: bool,
    snmp_write_count: u64,
    save_needed: bool,
}

impl Connector {
    fn meta(&self) -> AuditMeta {
        AuditMeta {
            user: self.user_display(),
            remote_ip: self.session.remote_ip.clone(),
            group: self.group_display(),
            switch: self.switch.switch_id.clone(),
        }
    }

    // `User`/`Group` carry only policy flags, not display names (those
    // live in the host's record); the audit trail still needs *some*
    // identifier, so the session key and switch id stand in here.
    fn user_display(&self) -> String {
        self.session.session_key.clone()
    }

    fn group_display(&self) -> String {
        self.switch.switch_id.clone()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn mib_timing(&self) -> &HashMap<String, BranchTiming> {
        &self.timing
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &Interface> {
        self.model.interfaces.values()
    }

    pub fn vlans(&self) -> impl Iterator<Item = &Vlan> {
        self.model.vlans.values()
    }

    pub fn snmp_write_count(&self) -> u64 {
        self.snmp_write_count
    }

    pub fn save_needed(&self) -> bool {
        self.save_needed
    }

    fn record_write(&mut self) {
        self.snmp_write_count += 1;
        self.save_needed = true;
    }

    fn persist(&self, store: &dyn SessionStore) {
        let mut slice = CacheSlice::new(self.switch.switch_id.clone(), self.model.clone());
        slice.hardware_loaded = self.hardware_loaded;
        slice.timing = self.timing.clone();
        store.put(&self.session.session_key, slice);
    }

    fn apply_authz(&mut self) {
        authz::compute_flags(&mut self.model, &self.user, &self.group, &switch_policy(&self.switch), &self.settings);
    }

    /// The basic walk (§4.4), or a cache restore when the session
    /// already has a fresh slice for this switch-id.
    pub async fn get_basic(&mut self, store: &dyn SessionStore) -> DalResult<&DeviceModel> {
        if let Some(slice) = restore_for_switch(store, &self.session.session_key, &self.switch.switch_id) {
            self.model = slice.model;
            self.hardware_loaded = slice.hardware_loaded;
            self.timing = slice.timing;
            self.apply_authz();
            return Ok(&self.model);
        }

        let mut ctx = walk::run_basic_walk(self.transport.as_ref(), self.settings.snmp_max_repetitions).await;
        self.model = std::mem::take(&mut ctx.model);
        self.warnings = ctx.warnings;
        self.timing = ctx.timing;
        self.apply_authz();
        self.persist(store);
        Ok(&self.model)
    }

    /// The hardware walk (§4.4): cached across calls, unlike the
    /// detailed walk.
    pub async fn get_hardware(&mut self, store: &dyn SessionStore) -> DalResult<&DeviceModel> {
        if !self.hardware_loaded {
            let warnings = walk::run_hardware_walk(self.transport.as_ref(), &mut self.model, self.settings.snmp_max_repetitions).await;
            self.warnings.extend(warnings);
            self.hardware_loaded = true;
            self.persist(store);
        }
        Ok(&self.model)
    }

    /// The detailed walk (§4.4): never cached, always re-run.
    pub async fn get_details(&mut self) -> DalResult<&DeviceModel> {
        let warnings = walk::run_detailed_walk(self.transport.as_ref(), &mut self.model, self.settings.snmp_max_repetitions).await;
        self.warnings.extend(warnings);
        Ok(&self.model)
    }

    pub async fn set_admin_status(&mut self, store: &dyn SessionStore, if_index: u32, status: AdminStatus) -> DalResult<()> {
        let meta = self.meta();
        mutate::set_admin_status(self.transport.as_ref(), &mut self.model, self.sink.as_ref(), &meta, if_index, status).await?;
        self.record_write();
        self.persist(store);
        Ok(())
    }

    pub async fn set_alias(&mut self, store: &dyn SessionStore, if_index: u32, new_alias: &str) -> DalResult<()> {
        let meta = self.meta();
        mutate::set_alias(self.transport.as_ref(), &mut self.model, self.sink.as_ref(), &meta, &self.settings, if_index, new_alias).await?;
        self.record_write();
        self.persist(store);
        Ok(())
    }

    pub async fn toggle_poe(&mut self, store: &dyn SessionStore, if_index: u32) -> DalResult<()> {
        let meta = self.meta();
        mutate::toggle_poe(self.transport.as_ref(), &mut self.model, self.sink.as_ref(), &meta, &self.settings, if_index).await?;
        self.record_write();
        self.persist(store);
        Ok(())
    }

    pub async fn set_untagged_vlan(&mut self, store: &dyn SessionStore, if_index: u32, old_vid: u16, new_vid: u16) -> DalResult<()> {
        let meta = self.meta();
        mutate::set_untagged_vlan(self.transport.as_ref(), &mut self.model, self.sink.as_ref(), &meta, if_index, old_vid, new_vid).await?;
        self.record_write();
        self.persist(store);
        Ok(())
    }

    /// Vendor-overridable "copy running to startup"; the standard
    /// capability set treats this as unsupported-but-harmless.
    pub async fn save_config(&mut self) -> DalResult<()> {
        if !self.capabilities.can_save_config() {
            return Ok(());
        }
        self.capabilities.save_config(self.transport.as_ref()).await?;
        self.save_needed = false;
        self.sink.emit(AuditEvent::new(&self.meta(), None, AuditEventKind::Command, "save_config", "running config saved to startup"));
        Ok(())
    }
}

fn switch_policy(switch: &SwitchRecord) -> authz::Switch {
    authz::Switch {
        read_only: switch.read_only,
        edit_alias: switch.edit_alias,
        poe_toggle: switch.poe_toggle,
        vlans: switch.vlans.clone(),
    }
}

/// Builds a connector bound to `switch`, failing `DalError::Configuration`
/// if no SNMP profile is bound (invariant: "If no SNMP profile is bound
/// to a switch, constructing a connector fails").
pub async fn new_connector(
    session: SessionInfo,
    switch: SwitchRecord,
    user: User,
    group: Group,
    settings: Settings,
    sink: Arc<dyn AuditSink>,
) -> DalResult<Connector> {
    let Some(credentials) = switch.credentials.clone() else {
        return Err(DalError::Configuration(format!("no SNMP profile bound to switch {}", switch.switch_id)));
    };

    let transport = UdpTransport::connect(switch.peer, credentials, settings.snmp_timeout, settings.snmp_retries).await?;

    Ok(Connector {
        transport: Box::new(transport),
        model: DeviceModel::new(),
        settings,
        user,
        group,
        switch,
        session,
        sink,
        capabilities: Box::new(StandardCapabilities),
        warnings: Vec::new(),
        timing: HashMap::new(),
        hardware_loaded: false,
        snmp_write_count: 0,
        save_needed: false,
    })
}
