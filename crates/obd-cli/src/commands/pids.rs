//! Pids command - supported current-data parameters per module

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use obd_core::ObdDevice;

use crate::output::{OutputContext, PidRow};

/// List the supported service 0x01 PIDs of every responding module
pub async fn pids(device: &dyn ObdDevice, ctx: &OutputContext) -> Result<()> {
    let modules = device
        .modules()
        .await
        .context("Cannot enumerate modules")?;

    if modules.is_empty() {
        ctx.info("No modules found");
        return Ok(());
    }

    let mut rows = Vec::with_capacity(modules.len());
    for module in &modules {
        match device.supported_pids(module.address).await {
            Ok(supported) => rows.push(PidRow {
                module: module.to_string(),
                count: supported.len(),
                pids: format_pids(&supported),
            }),
            Err(e) => ctx.error(&format!("{}: {}", module, e)),
        }
    }

    ctx.print(&rows);
    Ok(())
}

fn format_pids(pids: &BTreeSet<u16>) -> String {
    pids.iter()
        .map(|pid| format!("{:02X}", pid))
        .collect::<Vec<_>>()
        .join(" ")
}
