//! DTC commands - list and clear stored trouble codes

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use obd_core::ObdDevice;
use obd_telemetry::{clear_trouble_codes, collect_trouble_codes, ModuleTroubleCodes};

use crate::output::{OutputContext, OutputFormat, TroubleCodeRow};

/// List stored trouble codes, fetched from all modules concurrently
pub async fn dtc_list(device: Arc<dyn ObdDevice>, ctx: &OutputContext) -> Result<()> {
    let modules = device
        .modules()
        .await
        .context("Cannot enumerate modules")?;

    if modules.is_empty() {
        ctx.info("No modules found");
        return Ok(());
    }

    let results = collect_trouble_codes(device, modules).await;

    match ctx.format {
        OutputFormat::Table => print_listing(&results, ctx),
        OutputFormat::Json => {
            for result in &results {
                if let Err(e) = &result.codes {
                    ctx.error(&format!("{}: {}", result.module, e));
                }
            }
            ctx.print(&rows(&results));
        }
    }
    Ok(())
}

fn print_listing(results: &[ModuleTroubleCodes], ctx: &OutputContext) {
    for result in results {
        ctx.heading(&result.module.to_string());
        match &result.codes {
            Ok(codes) if codes.is_empty() => ctx.info("  No DTCs"),
            Ok(codes) => {
                for code in codes {
                    ctx.info(&format!("  {} ({})", code, code.category));
                }
            }
            Err(e) => ctx.error(&format!("  {}", e)),
        }
    }
}

fn rows(results: &[ModuleTroubleCodes]) -> Vec<TroubleCodeRow> {
    results
        .iter()
        .filter_map(|r| r.codes.as_ref().ok().map(|codes| (&r.module, codes)))
        .flat_map(|(module, codes)| {
            codes.iter().map(move |code| TroubleCodeRow {
                module: module.to_string(),
                code: code.code.clone(),
                category: code.category.to_string(),
            })
        })
        .collect()
}

/// Clear stored trouble codes on every module
pub async fn dtc_clear(device: &dyn ObdDevice, ctx: &OutputContext) -> Result<()> {
    let modules = device
        .modules()
        .await
        .context("Cannot enumerate modules")?;

    if modules.is_empty() {
        ctx.info("No modules found");
        return Ok(());
    }

    let results = clear_trouble_codes(device, &modules).await;
    let mut failed = 0;
    for (module, result) in &results {
        match result {
            Ok(()) => ctx.success(&format!("{}: cleared", module)),
            Err(e) => {
                failed += 1;
                ctx.error(&format!("{}: {}", module, e));
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} module(s) were not cleared", failed, results.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use obd_core::{CoreError, ModuleInfo, TroubleCode};
    use obd_device::{DeviceConfig, Obd2Device};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rows_skip_failed_modules() {
        let results = vec![
            ModuleTroubleCodes {
                module: ModuleInfo::new(0x7E0, "Engine"),
                codes: Ok(vec![
                    TroubleCode::from_raw(0x0123),
                    TroubleCode::from_raw(0x4156),
                ]),
            },
            ModuleTroubleCodes {
                module: ModuleInfo::new(0x7E1, "Transmission"),
                codes: Err(CoreError::DeviceUnavailable("timeout".to_string())),
            },
        ];

        let rows = rows(&results);
        let codes: Vec<&str> = rows.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["P0123", "C0156"]);
        assert!(rows.iter().all(|r| r.module == "7E0: Engine"));
    }

    #[tokio::test]
    async fn test_clear_on_simulated_vehicle() {
        let device = Obd2Device::connect(DeviceConfig::for_network("mock"))
            .await
            .unwrap();
        assert!(!device.trouble_codes(0x7E0).await.unwrap().is_empty());

        let ctx = OutputContext::new(OutputFormat::Table, true, true);
        dtc_clear(&device, &ctx).await.unwrap();

        assert!(device.trouble_codes(0x7E0).await.unwrap().is_empty());
        assert!(device.trouble_codes(0x7E1).await.unwrap().is_empty());
    }
}
