//! Scripted fake device shared by the pipeline tests

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveTime;
use obd_core::{CoreError, CoreResult, LiveQuery, ObdDevice, TroubleCode};
use obd_telemetry::Clock;
use parking_lot::{Mutex, RwLock};

// =============================================================================
// Fake live query
// =============================================================================

pub struct FakeQuery {
    pub address: (u32, u8, u16),
    raw: RwLock<Vec<u8>>,
    value: RwLock<f64>,
    formula: Option<String>,
    failing: AtomicBool,
}

impl FakeQuery {
    pub fn set(&self, raw: Vec<u8>, value: f64) {
        *self.raw.write() = raw;
        *self.value.write() = value;
    }

    /// Make every read return an error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> CoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(CoreError::DeviceUnavailable("read failed".to_string()))
        } else {
            Ok(())
        }
    }
}

impl LiveQuery for FakeQuery {
    fn current_raw(&self) -> CoreResult<Vec<u8>> {
        self.check()?;
        Ok(self.raw.read().clone())
    }

    fn current_value(&self) -> CoreResult<f64> {
        self.check()?;
        Ok(*self.value.read())
    }

    fn formula(&self) -> Option<&str> {
        self.formula.as_deref()
    }
}

// =============================================================================
// Fake device
// =============================================================================

#[derive(Default)]
pub struct FakeDevice {
    /// `None` makes capability discovery fail
    supported: Option<BTreeSet<u16>>,
    /// Preset (raw, value) per (module, service, pid)
    presets: HashMap<(u32, u8, u16), (Vec<u8>, f64)>,
    /// Stored codes per module; `Err` makes the fetch fail
    codes: HashMap<u32, Result<Vec<u16>, String>>,
    /// Artificial delay for trouble code reads, per module
    delays: HashMap<u32, Duration>,
    /// Overrides the default primary module
    primary: Option<u32>,
    pub discovery_calls: AtomicUsize,
    pub discovered_modules: Mutex<Vec<u32>>,
    pub bound: Mutex<Vec<Arc<FakeQuery>>>,
    pub cleared: Mutex<Vec<u32>>,
    pub refresh_interval: Mutex<Option<Duration>>,
}

impl FakeDevice {
    pub fn supporting(pids: &[u16]) -> Self {
        Self {
            supported: Some(pids.iter().copied().collect()),
            ..Self::default()
        }
    }

    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn with_preset(mut self, module: u32, service: u8, pid: u16, raw: &[u8], value: f64) -> Self {
        self.presets
            .insert((module, service, pid), (raw.to_vec(), value));
        self
    }

    pub fn with_codes(mut self, module: u32, codes: &[u16]) -> Self {
        self.codes.insert(module, Ok(codes.to_vec()));
        self
    }

    pub fn with_failing_codes(mut self, module: u32, reason: &str) -> Self {
        self.codes.insert(module, Err(reason.to_string()));
        self
    }

    pub fn with_delay(mut self, module: u32, delay: Duration) -> Self {
        self.delays.insert(module, delay);
        self
    }

    pub fn with_primary_module(mut self, module: u32) -> Self {
        self.primary = Some(module);
        self
    }

    pub fn bound_addresses(&self) -> Vec<(u32, u8, u16)> {
        self.bound.lock().iter().map(|q| q.address).collect()
    }

    pub fn query(&self, index: usize) -> Arc<FakeQuery> {
        self.bound.lock()[index].clone()
    }
}

#[async_trait]
impl ObdDevice for FakeDevice {
    fn primary_module(&self) -> u32 {
        self.primary.unwrap_or(obd_core::PRIMARY_MODULE)
    }

    async fn supported_pids(&self, module: u32) -> CoreResult<BTreeSet<u16>> {
        self.discovery_calls.fetch_add(1, Ordering::SeqCst);
        self.discovered_modules.lock().push(module);
        self.supported
            .clone()
            .ok_or_else(|| CoreError::DeviceUnavailable("no answer from 7E0".to_string()))
    }

    fn bind_live_query(
        &self,
        module: u32,
        service: u8,
        pid: u16,
        formula: Option<&str>,
    ) -> Arc<dyn LiveQuery> {
        let (raw, value) = self
            .presets
            .get(&(module, service, pid))
            .cloned()
            .unwrap_or((Vec::new(), f64::NAN));

        let query = Arc::new(FakeQuery {
            address: (module, service, pid),
            raw: RwLock::new(raw),
            value: RwLock::new(if formula.is_some() { value } else { f64::NAN }),
            formula: formula.map(str::to_string),
            failing: AtomicBool::new(false),
        });
        self.bound.lock().push(query.clone());
        query
    }

    async fn trouble_codes(&self, module: u32) -> CoreResult<Vec<TroubleCode>> {
        if let Some(delay) = self.delays.get(&module) {
            tokio::time::sleep(*delay).await;
        }

        match self.codes.get(&module) {
            Some(Ok(codes)) => Ok(codes.iter().copied().map(TroubleCode::from_raw).collect()),
            Some(Err(reason)) => Err(CoreError::DeviceUnavailable(reason.clone())),
            None => Ok(Vec::new()),
        }
    }

    async fn clear_trouble_codes(&self, module: u32) -> CoreResult<()> {
        self.cleared.lock().push(module);
        Ok(())
    }

    fn set_refresh_interval(&self, interval: Duration) {
        *self.refresh_interval.lock() = Some(interval);
    }
}

// =============================================================================
// Fixed clock
// =============================================================================

pub struct FixedClock(pub NaiveTime);

impl FixedClock {
    pub fn at(h: u32, m: u32, s: u32) -> Self {
        Self(NaiveTime::from_hms_opt(h, m, s).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveTime {
        self.0
    }
}
