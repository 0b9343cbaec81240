//! Trouble-code collection across modules
//!
//! One task per module, joined in module order. A failing module does not
//! cancel the others; its error is reported in its own slot.

use std::sync::Arc;

use obd_core::{CoreError, CoreResult, ModuleInfo, ObdDevice, TroubleCode};
use tracing::warn;

/// Trouble codes (or the failure) for one module
#[derive(Debug)]
pub struct ModuleTroubleCodes {
    pub module: ModuleInfo,
    pub codes: CoreResult<Vec<TroubleCode>>,
}

/// Fetch stored codes from every module concurrently
pub async fn collect_trouble_codes(
    device: Arc<dyn ObdDevice>,
    modules: Vec<ModuleInfo>,
) -> Vec<ModuleTroubleCodes> {
    let handles: Vec<_> = modules
        .into_iter()
        .map(|module| {
            let device = device.clone();
            let address = module.address;
            let handle = tokio::spawn(async move { device.trouble_codes(address).await });
            (module, handle)
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (module, handle) in handles {
        let codes = match handle.await {
            Ok(codes) => codes,
            Err(e) => Err(CoreError::DeviceUnavailable(format!(
                "trouble code task failed: {}",
                e
            ))),
        };

        if let Err(e) = &codes {
            warn!(module = %module, error = %e, "Trouble code read failed");
        }
        results.push(ModuleTroubleCodes { module, codes });
    }

    results
}

/// Clear stored codes on every module, in order
pub async fn clear_trouble_codes(
    device: &dyn ObdDevice,
    modules: &[ModuleInfo],
) -> Vec<(ModuleInfo, CoreResult<()>)> {
    let mut results = Vec::with_capacity(modules.len());
    for module in modules {
        let result = device.clear_trouble_codes(module.address).await;
        results.push((module.clone(), result));
    }
    results
}
