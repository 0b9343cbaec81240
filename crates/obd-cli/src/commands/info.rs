//! Info command - vehicle identification

use anyhow::{Context, Result};
use obd_core::{ModuleInfo, ObdDevice};

use crate::output::{OutputContext, OutputFormat};

/// Show VIN, ignition type and responding modules
pub async fn info(device: &dyn ObdDevice, ctx: &OutputContext) -> Result<()> {
    let info = device
        .vehicle_info()
        .await
        .context("Cannot read vehicle information")?;

    if ctx.format == OutputFormat::Json {
        ctx.print_json(&info);
        return Ok(());
    }

    let vin = if info.vin.is_empty() {
        "Unknown".to_string()
    } else {
        info.vin.clone()
    };

    ctx.print_kv(&[
        ("VIN", vin),
        ("Ignition", info.ignition.to_string()),
        ("Modules", format_modules(&info.modules)),
    ]);
    Ok(())
}

/// `None`, or one `7E0: Engine` line per module
fn format_modules(modules: &[ModuleInfo]) -> String {
    if modules.is_empty() {
        return "None".to_string();
    }

    modules
        .iter()
        .map(|m| format!("\n  {}", m))
        .collect::<String>()
}
