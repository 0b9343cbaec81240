//! OBD-II device - implements the `ObdDevice` port

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use obd_core::{
    CoreError, CoreResult, IgnitionType, LiveQuery, ModuleInfo, ObdDevice, TroubleCode,
    VehicleInfo,
};
use tracing::{debug, info, warn};

use crate::config::DeviceConfig;
use crate::live::LiveQueryManager;
use crate::obd::{pid, service_id, ObdError, ObdService};
use crate::transport::{create_transport, TransportAdapter};

/// Conventional name of the module at a request address
pub fn module_name(address: u32) -> String {
    match address {
        0x7E0 => "Engine".to_string(),
        0x7E1 => "Transmission".to_string(),
        0x7E2 => "Hybrid".to_string(),
        0x7E3 => "Battery".to_string(),
        _ => format!("ECU {:03X}", address),
    }
}

/// A connected OBD-II device
pub struct Obd2Device {
    config: DeviceConfig,
    service: ObdService,
    live: LiveQueryManager,
}

impl Obd2Device {
    /// Open the configured transport and start the live query refresh.
    pub async fn connect(config: DeviceConfig) -> Result<Self, ObdError> {
        let transport = create_transport(&config.transport).await?;
        info!(network = %transport.name(), "OBD-II device connected");
        Ok(Self::with_transport(transport, config))
    }

    /// Build a device over an existing transport.
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_transport(transport: Arc<dyn TransportAdapter>, config: DeviceConfig) -> Self {
        let service = ObdService::new(transport).with_timeout(config.request_timeout());
        let live = LiveQueryManager::new(service.clone(), config.refresh_interval());

        Self {
            config,
            service,
            live,
        }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn service(&self) -> &ObdService {
        &self.service
    }

    pub fn live_queries(&self) -> &LiveQueryManager {
        &self.live
    }

    /// Reconnect a dropped transport before a device-wide operation
    async fn ensure_connected(&self) -> CoreResult<()> {
        let transport = self.service.transport();
        if transport.is_connected().await {
            return Ok(());
        }

        warn!(network = %transport.name(), "Transport disconnected, reconnecting");
        transport.reconnect().await.map_err(|e| {
            CoreError::DeviceUnavailable(format!("{} is not connected: {}", transport.name(), e))
        })?;
        info!(network = %transport.name(), "Transport reconnected");
        Ok(())
    }
}

#[async_trait]
impl ObdDevice for Obd2Device {
    async fn supported_pids(&self, module: u32) -> CoreResult<BTreeSet<u16>> {
        self.ensure_connected().await?;
        Ok(self.service.supported_pids(module).await?)
    }

    fn primary_module(&self) -> u32 {
        self.config.primary_module
    }

    fn bind_live_query(
        &self,
        module: u32,
        service: u8,
        pid: u16,
        formula: Option<&str>,
    ) -> Arc<dyn LiveQuery> {
        self.live.bind(module, service, pid, formula)
    }

    async fn trouble_codes(&self, module: u32) -> CoreResult<Vec<TroubleCode>> {
        Ok(self.service.stored_trouble_codes(module).await?)
    }

    async fn clear_trouble_codes(&self, module: u32) -> CoreResult<()> {
        self.service.clear_trouble_codes(module).await?;
        info!(module = %format!("{:03X}", module), "Trouble codes cleared");
        Ok(())
    }

    async fn modules(&self) -> CoreResult<Vec<ModuleInfo>> {
        self.ensure_connected().await?;

        let probes = self.config.module_candidates.iter().map(|&address| async move {
            let result = self
                .service
                .read(address, service_id::CURRENT_DATA, pid::SUPPORTED_PIDS_01_20)
                .await;
            (address, result)
        });

        let modules: Vec<ModuleInfo> = join_all(probes)
            .await
            .into_iter()
            .filter_map(|(address, result)| match result {
                Ok(_) => Some(ModuleInfo::new(address, module_name(address))),
                Err(e) => {
                    debug!(module = %format!("{:03X}", address), error = %e, "No module");
                    None
                }
            })
            .collect();

        info!(count = modules.len(), "Module enumeration finished");
        Ok(modules)
    }

    async fn vehicle_info(&self) -> CoreResult<VehicleInfo> {
        self.ensure_connected().await?;
        let primary = self.config.primary_module;

        let vin = self.service.vin(primary).await.unwrap_or_else(|e| {
            warn!(error = %e, "VIN not available");
            String::new()
        });

        let ignition = self
            .service
            .ignition_type(primary)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Ignition type not available");
                IgnitionType::Unknown
            });

        let modules = self.modules().await?;

        Ok(VehicleInfo {
            vin,
            ignition,
            modules,
        })
    }

    fn set_refresh_interval(&self, interval: Duration) {
        self.live.set_refresh_interval(interval);
    }
}
