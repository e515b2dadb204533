// SPDX-License-Identifier: MIT

//! MIB Walkers / Parsers (C4): one parser per MIB branch, populating the
//! device model (C3) from the transport (C1). See §4.4 for the basic,
//! detailed, and hardware walk branch orderings.

pub mod arp;
pub mod bridge;
pub mod entity;
pub mod fdb;
pub mod interfaces;
pub mod ip;
pub mod lldp;
pub mod poe;
pub mod system;
pub mod vlan;

use std::collections::HashMap;
use std::time::Instant;

use tracing::warn;

use crate::error::DalError;
use crate::model::DeviceModel;
use crate::snmp::{BranchTiming, Transport};

/// Accumulated state threaded through every branch of a walk: the
/// model under construction, warnings from branches that failed but
/// didn't abort the walk, and per-branch timing.
pub struct WalkContext<'a> {
    pub transport: &'a dyn Transport,
    pub model: DeviceModel,
    pub warnings: Vec<String>,
    pub timing: HashMap<String, BranchTiming>,
    pub max_repetitions: u32,
}

impl<'a> WalkContext<'a> {
    pub fn new(transport: &'a dyn Transport, max_repetitions: u32) -> Self {
        WalkContext {
            transport,
            model: DeviceModel::new(),
            warnings: Vec::new(),
            timing: HashMap::new(),
            max_repetitions,
        }
    }
}

/// The basic walk driver used by the connector (§4.4, branches in
/// order). Sequential (§5: all C4 operations suspend at every C1 call,
/// no concurrency within one connector); each branch degrades to a
/// warning on failure instead of aborting the walk.
pub async fn run_basic_walk(transport: &dyn Transport, max_repetitions: u32) -> WalkContext<'_> {
    let mut ctx = WalkContext::new(transport, max_repetitions);

    if let Err(e) = system::walk_system(transport, &mut ctx.model).await {
        warn!(branch = "system", error = %e, "branch walk failed, continuing");
        ctx.warnings.push(format!("system: {e}"));
    }

    run_timed(&mut ctx, "ifTable", |t, m, mr| Box::pin(interfaces::walk_if_table(t, m, mr))).await;
    run_timed(&mut ctx, "ifXTable", |t, m, mr| Box::pin(interfaces::walk_if_x_table(t, m, mr))).await;
    run_timed(&mut ctx, "dot1qBase", |t, m, mr| Box::pin(bridge::walk_dot1q_base(t, m, mr))).await;
    run_timed(&mut ctx, "dot1dBasePortIfIndex", |t, m, mr| Box::pin(bridge::walk_base_port_if_index(t, m, mr))).await;
    run_timed(&mut ctx, "dot1qVlanStatic", |t, m, mr| Box::pin(vlan::walk_static_vlans(t, m, mr))).await;
    run_timed(&mut ctx, "dot1qPvid", |t, m, mr| Box::pin(vlan::walk_pvid(t, m, mr))).await;
    run_timed(&mut ctx, "dot1qVlanCurrentEgressPorts", |t, m, mr| Box::pin(vlan::walk_current_egress(t, m, mr))).await;
    run_timed(&mut ctx, "dot1qPortGvrpStatus", |t, m, mr| Box::pin(vlan::walk_port_gvrp(t, m, mr))).await;
    run_timed(&mut ctx, "ipAddrTable", |t, m, mr| Box::pin(ip::walk_ip_addr_table(t, m, mr))).await;
    run_timed(&mut ctx, "pethMainPse", |t, m, mr| Box::pin(poe::walk_main_pse(t, m, mr))).await;
    run_timed(&mut ctx, "pethPsePort", |t, m, mr| Box::pin(poe::walk_pse_ports(t, m, mr))).await;

    let ambiguous = crate::reconcile::reconcile_poe_ports(&mut ctx.model);
    ctx.warnings.extend(ambiguous);
    ctx.model.flag_undefined_vlan_references();
    ctx
}

type BranchFut<'b> = std::pin::Pin<Box<dyn std::future::Future<Output = Result<u64, DalError>> + 'b>>;

/// `F` is higher-ranked over the borrow lifetime `'b` of each call's
/// `&mut DeviceModel`, not the transport's outer `'a`: the returned
/// future only needs to live as long as that one borrow, so a closure
/// that holds `&'b mut DeviceModel` in its future can never be forced
/// to outlive it as `'a` would require.
async fn run_timed<'a, F>(ctx: &mut WalkContext<'a>, name: &str, f: F)
where
    F: for<'b> FnOnce(&'b dyn Transport, &'b mut DeviceModel, u32) -> BranchFut<'b>,
{
    let start = Instant::now();
    let result = {
        let transport = ctx.transport;
        let max_rep = ctx.max_repetitions;
        f(transport, &mut ctx.model, max_rep).await
    };
    match result {
        Ok(count) => {
            let entry = ctx.timing.entry(name.to_string()).or_default();
            entry.varbind_count += count;
            entry.elapsed += start.elapsed();
        }
        Err(e) => {
            warn!(branch = name, error = %e, "branch walk failed, continuing");
            ctx.warnings.push(format!("{name}: {e}"));
        }
    }
}

/// The detailed walk (§4.4): never cached, run on demand.
pub async fn run_detailed_walk(transport: &dyn Transport, model: &mut DeviceModel, max_repetitions: u32) -> Vec<String> {
    let mut warnings = Vec::new();
    if let Err(e) = fdb::walk_fdb(transport, model, max_repetitions).await {
        warnings.push(format!("dot1dTpFdbPort: {e}"));
    }
    if let Err(e) = arp::walk_arp(transport, model, max_repetitions).await {
        warnings.push(format!("ipNetToMediaPhysAddress: {e}"));
    }
    if let Err(e) = lldp::walk_lldp(transport, model, max_repetitions).await {
        warnings.push(format!("lldpRem*: {e}"));
    }
    warnings
}

/// The hardware walk (§4.4): cached, run on demand.
pub async fn run_hardware_walk(transport: &dyn Transport, model: &mut DeviceModel, max_repetitions: u32) -> Vec<String> {
    let mut warnings = Vec::new();
    if let Err(e) = entity::walk_entity(transport, model, max_repetitions).await {
        warnings.push(format!("entPhysical*: {e}"));
    }
    warnings
}
